//! Credential payload encoding for new profiles.
//!
//! The backend expects base64 (standard alphabet) encoded JSON. Users may
//! paste either the raw JSON key file or an already encoded one.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::DecodePaddingMode;
use base64::engine::general_purpose::{self, GeneralPurpose, STANDARD};
use thiserror::Error;

/// Decoder for pasted base64: padding optional, trailing bits ignored.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    general_purpose::PAD
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("Credential data is required")]
    Empty,
    #[error("Credential data must be valid JSON")]
    InvalidJson,
}

/// Encode pasted credential data for transmission.
///
/// - valid JSON is base64 encoded
/// - base64 that decodes to valid JSON is passed through with ASCII
///   whitespace removed, so wrapped `base64` output is accepted
/// - anything else is rejected
///
/// # Errors
/// [`CredentialError::Empty`] for blank input, [`CredentialError::InvalidJson`]
/// when the input is neither JSON nor base64 encoded JSON.
pub fn encode_credential_data(raw: &str) -> Result<String, CredentialError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CredentialError::Empty);
    }

    if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return Ok(STANDARD.encode(trimmed));
    }

    let compact: String = trimmed
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let decoded = LENIENT
        .decode(&compact)
        .map_err(|_| CredentialError::InvalidJson)?;
    serde_json::from_slice::<serde_json::Value>(&decoded)
        .map_err(|_| CredentialError::InvalidJson)?;
    Ok(compact)
}
