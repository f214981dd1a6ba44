#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Identity session and authenticated request gateway for the Opsdesk console.
//!
//! - [`IdentitySession`] is the seam to the identity provider. [`OidcSession`]
//!   implements it with the authorization-code flow (PKCE) and refresh-token
//!   based silent sign-in.
//! - [`AuthGateway`] wraps every backend call: it attaches the bearer token,
//!   retries once after a silent refresh when the backend answers 401, and
//!   signs the user out when no token can be obtained.

pub mod error;
pub mod gateway;
pub mod http_error;
pub mod navigator;
pub mod oidc;
pub mod session;
pub mod store;

pub use error::{GatewayError, SessionError};
pub use gateway::{AuthGateway, GatewayRequest, MAX_ATTEMPTS};
pub use navigator::{LogNavigator, Navigator, RecordingNavigator};
pub use oidc::{OidcConfig, OidcSession, ProviderMetadata};
pub use session::{IdentitySession, PendingLogin, SessionRecord, TokenSet};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

pub use opsdesk_utils::SecretString;
