//! HMAC signing and verification for Shopify OAuth callbacks.
//!
//! This module provides the cryptographic layer that protects the handshake:
//! HMAC-SHA256 signatures in lower-case hex, constant-time comparison, the
//! timestamp tolerance check and the two query canonicalization schemes.
//!
//! # Security
//!
//! Every comparison of secret-derived material goes through
//! [`constant_time_eq`]. Buffers of different lengths are rejected
//! immediately; equal-length buffers are compared without an early exit.
//!
//! # Example
//!
//! ```rust
//! use shopify_oauth::auth::oauth::hmac::{canonicalize_query, hmac_hex, HmacSignator};
//! use shopify_oauth::auth::oauth::AuthQuery;
//!
//! let query = AuthQuery::from_query_str("shop=test.myshopify.com&code=abc&timestamp=1700000000");
//! let message = canonicalize_query(&query, HmacSignator::Admin);
//! assert_eq!(message, "code=abc&shop=test.myshopify.com&timestamp=1700000000");
//!
//! let signature = hmac_hex("my-api-secret", &message);
//! assert_eq!(signature.len(), 64);
//! ```

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::auth::oauth::{AuthQuery, OAuthError, QueryValue};
use crate::config::ApiSecretKey;

type HmacSha256 = Hmac<Sha256>;

/// Permitted clock skew, in seconds, between Shopify and this app.
pub const HMAC_TIMESTAMP_TOLERANCE_SECS: i64 = 90;

/// Which party signed a request, selecting the canonical form and the
/// signature parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HmacSignator {
    /// Admin redirects such as the OAuth callback. Signed in `hmac`.
    #[default]
    Admin,
    /// App proxy requests. Signed in `signature`.
    AppProxy,
}

impl HmacSignator {
    /// Returns the query parameter that carries the signature.
    #[must_use]
    pub const fn signature_param(self) -> &'static str {
        match self {
            Self::Admin => "hmac",
            Self::AppProxy => "signature",
        }
    }
}

/// Computes HMAC-SHA256 of `message` under `secret`, as lower-case hex.
///
/// # Example
///
/// ```rust
/// use shopify_oauth::auth::oauth::hmac::hmac_hex;
///
/// assert_eq!(
///     hmac_hex("key", "message"),
///     "6e9ef29b75fffc5b7abae527d58fdadb2fe42e7219011976917343065f58ed4a"
/// );
/// ```
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn hmac_hex(secret: &str, message: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Compares two byte buffers in constant time.
///
/// Returns `false` at once when the lengths differ. Equal-length buffers are
/// compared in full, with no exit at the first differing byte.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Compares two strings in constant time.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}

/// Compares two query values in constant time.
///
/// Both sides are serialized identically as JSON before comparison, so a
/// string is never implicitly coerced to an array or the reverse.
///
/// # Errors
///
/// Returns [`OAuthError::TypeMismatch`] when one value is a single string and
/// the other an array. This is a usage error, not a failed verification.
pub fn safe_compare(a: &QueryValue, b: &QueryValue) -> Result<bool, OAuthError> {
    let mismatch = || OAuthError::TypeMismatch {
        left: a.kind(),
        right: b.kind(),
    };

    if a.kind() != b.kind() {
        return Err(mismatch());
    }

    let left = serde_json::to_vec(a).map_err(|_| mismatch())?;
    let right = serde_json::to_vec(b).map_err(|_| mismatch())?;
    Ok(constant_time_eq(&left, &right))
}

/// Returns `true` if `timestamp` is within `tolerance_secs` of `now`.
///
/// The window is closed: a skew of exactly `tolerance_secs` is accepted.
#[must_use]
pub const fn validate_timestamp(timestamp: i64, now: i64, tolerance_secs: i64) -> bool {
    now.abs_diff(timestamp) <= tolerance_secs.unsigned_abs()
}

/// Serializes `query` into the byte sequence Shopify signed.
///
/// Keys are sorted by byte order and array values joined with `,` in both
/// forms.
///
/// - [`HmacSignator::Admin`]: form-encoded `key=value` pairs joined by `&`.
/// - [`HmacSignator::AppProxy`]: raw `key=value` pairs concatenated with no
///   separator and no escaping.
///
/// The signature parameter itself must already be removed; [`verify_hmac`]
/// does this.
#[must_use]
pub fn canonicalize_query(query: &AuthQuery, signator: HmacSignator) -> String {
    match signator {
        HmacSignator::Admin => {
            let mut serializer = url::form_urlencoded::Serializer::new(String::new());
            for (key, value) in query.iter() {
                serializer.append_pair(key, &value.joined());
            }
            serializer.finish()
        }
        HmacSignator::AppProxy => query
            .iter()
            .map(|(key, value)| format!("{key}={}", value.joined()))
            .collect(),
    }
}

/// Checks the callback timestamp against the local clock.
///
/// # Errors
///
/// Returns [`OAuthError::InvalidCallback`] if the timestamp is missing or
/// garbled, and [`OAuthError::TimestampOutOfTolerance`] if it is stale or
/// from the future.
pub fn check_timestamp(query: &AuthQuery, now: i64) -> Result<(), OAuthError> {
    let timestamp = query.timestamp()?;
    if validate_timestamp(timestamp, now, HMAC_TIMESTAMP_TOLERANCE_SECS) {
        Ok(())
    } else {
        Err(OAuthError::TimestampOutOfTolerance {
            timestamp,
            now,
            tolerance_secs: HMAC_TIMESTAMP_TOLERANCE_SECS,
        })
    }
}

/// Verifies the signature of a Shopify-signed query against the current time.
///
/// See [`verify_hmac_at`].
///
/// # Errors
///
/// Same as [`verify_hmac_at`].
pub fn verify_hmac(
    secret: &ApiSecretKey,
    query: &AuthQuery,
    signator: HmacSignator,
) -> Result<bool, OAuthError> {
    verify_hmac_at(secret, query, signator, Utc::now().timestamp())
}

/// Verifies the signature of a Shopify-signed query.
///
/// The timestamp is checked first and a stale request is rejected before any
/// signature comparison takes place. The signature parameter selected by
/// `signator` is then removed, the remainder canonicalized and signed, and
/// the result compared in constant time with the received signature.
///
/// Returns `Ok(false)` when the signature is absent or does not match.
///
/// # Errors
///
/// Returns [`OAuthError::TimestampOutOfTolerance`] or
/// [`OAuthError::InvalidCallback`] if the timestamp check fails.
pub fn verify_hmac_at(
    secret: &ApiSecretKey,
    query: &AuthQuery,
    signator: HmacSignator,
    now: i64,
) -> Result<bool, OAuthError> {
    check_timestamp(query, now)?;

    let mut signed = query.clone();
    let Some(QueryValue::Single(received)) = signed.remove(signator.signature_param()) else {
        return Ok(false);
    };

    let expected = hmac_hex(secret.as_ref(), &canonicalize_query(&signed, signator));
    Ok(constant_time_compare(&expected, &received))
}
