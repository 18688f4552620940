//! Access token inspection.
//!
//! Tokens are JWT-shaped: three dot-separated segments, the middle one a
//! base64-encoded JSON payload carrying an `exp` claim in seconds since the
//! epoch. Signatures are not checked; the backend does that.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::Value;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Decodes the payload segment of a token.
///
/// Returns `None` unless the token has exactly three segments and the middle
/// one decodes (base64url or standard base64, padding optional) to a JSON
/// object.
pub fn decode_payload(token: &str) -> Option<Value> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    let bytes = URL_SAFE_LENIENT
        .decode(payload)
        .or_else(|_| STANDARD_LENIENT.decode(payload))
        .ok()?;
    let value: Value = serde_json::from_slice(&bytes).ok()?;
    value.is_object().then_some(value)
}

/// The `exp` claim, when present and numeric.
pub fn expires_at(token: &str) -> Option<f64> {
    decode_payload(token)?.get("exp")?.as_f64()
}

/// Whether the token must be treated as expired at `now` (seconds since the
/// epoch).
///
/// Fail-closed: absent, malformed or `exp`-less tokens are expired.
pub fn is_expired_at(token: Option<&str>, now: f64) -> bool {
    match token.and_then(expires_at) {
        Some(exp) => exp < now,
        None => true,
    }
}

/// [`is_expired_at`] against the current wall clock.
pub fn is_expired(token: Option<&str>) -> bool {
    is_expired_at(token, now_seconds())
}

pub fn now_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
