//! Bearer token inspection.
//!
//! # Design
//! - The client never verifies signatures; the backend is the trust boundary.
//! - Only the payload's `exp` (and `sub`, when present) are read.
//! - Every decode failure is reported as [`TokenError::Malformed`] and callers treat it
//!   exactly like an expired token.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use serde::Deserialize;
use thiserror::Error;

/// Reasons a token cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not a three-part token, or the payload is not decodable JSON with `exp`.
    #[error("token is malformed")]
    Malformed,
    /// `exp` is at or before the current time.
    #[error("token has expired")]
    Expired,
}

/// Claims the client cares about.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Claims {
    /// Expiry in seconds since the Unix epoch; issuers may send fractional seconds.
    pub exp: f64,
    /// Subject; the backend issues the user id here.
    #[serde(default)]
    pub sub: Option<String>,
}

impl Claims {
    /// Expiry in epoch milliseconds, truncated and saturating at the `i64` range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn expires_at_ms(&self) -> i64 {
        (self.exp * 1000.0) as i64
    }
}

/// Decode the payload segment of a `header.payload.signature` token.
///
/// # Errors
///
/// Returns [`TokenError::Malformed`] when the structure, encoding or JSON is invalid.
pub fn decode_claims(token: &str) -> Result<Claims, TokenError> {
    let mut segments = token.trim().split('.');
    let (Some(header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Malformed);
    };
    if header.is_empty() || payload.is_empty() {
        return Err(TokenError::Malformed);
    }

    let bytes = decode_segment(payload)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

/// Decode and reject tokens whose `exp * 1000 <= now_ms`.
///
/// # Errors
///
/// Returns [`TokenError::Malformed`] or [`TokenError::Expired`].
pub fn check(token: &str, now_ms: i64) -> Result<Claims, TokenError> {
    let claims = decode_claims(token)?;
    if claims.expires_at_ms() <= now_ms {
        return Err(TokenError::Expired);
    }
    Ok(claims)
}

/// Fail-closed expiry test: absent and undecodable tokens count as expired.
#[must_use]
pub fn is_expired(token: Option<&str>, now_ms: i64) -> bool {
    token.is_none_or(|token| check(token, now_ms).is_err())
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, TokenError> {
    // Issuers emit unpadded base64url; tolerate padding and the standard alphabet.
    let trimmed = segment.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .map_err(|_| TokenError::Malformed)
}
