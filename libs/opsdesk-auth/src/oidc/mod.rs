//! `OpenID` Connect authorization-code flow with PKCE.

mod config;
mod discovery;
mod pkce;
mod session;
mod token;

pub use config::{DEFAULT_SCOPES, OidcConfig};
pub use discovery::{ProviderMetadata, discover};
pub use pkce::{PkceChallenge, random_state};
pub use session::OidcSession;
pub use token::IdTokenClaims;
