//! PKCE (RFC 7636, `S256` method) and `state` generation.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use opsdesk_utils::SecretString;

/// Verifier/challenge pair for one authorization request.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub verifier: SecretString,
    pub challenge: String,
}

impl PkceChallenge {
    /// 32 random bytes, base64url encoded (43 characters).
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; 32] = rand::random();
        Self::from_verifier(SecretString::new(URL_SAFE_NO_PAD.encode(bytes)))
    }

    #[must_use]
    pub fn from_verifier(verifier: SecretString) -> Self {
        let challenge = challenge_for(verifier.expose());
        Self {
            verifier,
            challenge,
        }
    }

    #[must_use]
    pub fn method(&self) -> &'static str {
        "S256"
    }
}

fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Opaque value tying the callback to the request that started it.
#[must_use]
pub fn random_state() -> String {
    let bytes: [u8; 16] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}
