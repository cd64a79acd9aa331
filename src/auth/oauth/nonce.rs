//! State nonce generation for OAuth CSRF protection.
//!
//! A fresh nonce is drawn for every `begin`, sent to Shopify as `state` and
//! kept by the browser in the signed state cookie. The callback is accepted
//! only if both copies agree.

use std::fmt;

use rand::RngCore;

/// Number of decimal digits in a nonce.
pub const NONCE_LENGTH: usize = 15;

/// Generates a 15-digit numeric nonce.
///
/// Each digit is one byte from the thread-local CSPRNG reduced modulo 10.
/// Digits 0 to 5 are therefore slightly more likely than 6 to 9.
///
/// ```rust
/// use shopify_oauth::auth::oauth::nonce;
///
/// let value = nonce();
/// assert_eq!(value.len(), 15);
/// assert!(value.chars().all(|c| c.is_ascii_digit()));
/// ```
#[must_use]
pub fn nonce() -> String {
    let mut bytes = [0u8; NONCE_LENGTH];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|byte| char::from(b'0' + byte % 10)).collect()
}

/// The OAuth `state` value binding a callback to the `begin` that issued it.
#[derive(Clone, PartialEq, Eq)]
pub struct StateParam(String);

impl StateParam {
    /// Draws a new random state.
    #[must_use]
    pub fn new() -> Self {
        Self(nonce())
    }

    /// Wraps a state value received from a cookie or a query.
    #[must_use]
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Consumes the state, returning the raw string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Default for StateParam {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<str> for StateParam {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateParam(*****)")
    }
}

// Verify StateParam is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StateParam>();
};
