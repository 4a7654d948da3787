// src/services/token.rs
// DOCUMENTATION: API token generation and Authorization header parsing

use crate::errors::ApiError;
use rand::RngCore;

const KEY_BYTES: usize = 20;
const SCHEME: &str = "token";

pub const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";
pub const INVALID_TOKEN: &str = "Invalid token.";

/// Generate a new 40 character hex token key
pub fn generate_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Extract the key from an `Authorization: Token <key>` header value
/// DOCUMENTATION: None header means no credentials. A different scheme is
/// treated as no credentials too, so other auth schemes can coexist.
pub fn parse_authorization(header: Option<&str>) -> Result<&str, ApiError> {
    let header = header.ok_or_else(|| ApiError::Unauthorized(MISSING_CREDENTIALS.into()))?;

    let mut parts = header.split_whitespace();
    match parts.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case(SCHEME) => {}
        _ => return Err(ApiError::Unauthorized(MISSING_CREDENTIALS.into())),
    }

    let key = parts.next().ok_or_else(|| {
        ApiError::Unauthorized("Invalid token header. No credentials provided.".into())
    })?;

    if parts.next().is_some() {
        return Err(ApiError::Unauthorized(
            "Invalid token header. Token string should not contain spaces.".into(),
        ));
    }

    Ok(key)
}
