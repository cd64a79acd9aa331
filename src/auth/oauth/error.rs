//! OAuth-specific error types.
//!
//! Every failure of a handshake step maps to its own variant, so operators
//! can tell which check rejected a callback. No variant carries the API
//! secret, a computed HMAC, the state nonce or an access token.
//!
//! # Example
//!
//! ```rust
//! use shopify_oauth::auth::oauth::OAuthError;
//!
//! let error = OAuthError::MissingCookie { name: "shopify_app_state".to_string() };
//! assert!(error.to_string().contains("shopify_app_state"));
//! assert!(error.is_verification_failure());
//!
//! let error = OAuthError::TokenExchangeFailed {
//!     shop: "test.myshopify.com".to_string(),
//!     status: 401,
//!     message: "invalid_client".to_string(),
//! };
//! assert!(!error.is_verification_failure());
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::auth::SessionStorageError;

/// Errors that can occur during the OAuth handshake.
///
/// All verification failures are fatal to the handshake attempt. Nothing is
/// retried; the caller restarts from `begin`.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// The callback `timestamp` is outside the permitted clock tolerance.
    #[error("HMAC timestamp {timestamp} is outside the {tolerance_secs}s tolerance window (now {now})")]
    TimestampOutOfTolerance {
        /// The timestamp from the query, in Unix seconds.
        timestamp: i64,
        /// The verifier's clock, in Unix seconds.
        now: i64,
        /// The permitted skew.
        tolerance_secs: i64,
    },

    /// The state cookie is absent from the request.
    #[error("Missing cookie '{name}'")]
    MissingCookie {
        /// The cookie name.
        name: String,
    },

    /// The signature companion of the state cookie is absent.
    #[error("Missing signature cookie for '{name}'")]
    MissingSignature {
        /// The name of the signed cookie.
        name: String,
    },

    /// The state cookie's signature does not match its value.
    #[error("Invalid signature for cookie '{name}'")]
    SignatureMismatch {
        /// The name of the signed cookie.
        name: String,
    },

    /// The state cookie outlived its lifetime.
    #[error("Cookie '{name}' has expired")]
    ExpiredCookie {
        /// The cookie name.
        name: String,
    },

    /// The callback `state` does not match the state cookie.
    #[error("OAuth state mismatch for shop '{shop}'")]
    StateMismatch {
        /// The shop named in the callback.
        shop: String,
    },

    /// The callback HMAC does not match the query.
    #[error("HMAC signature validation failed for shop '{shop}'")]
    InvalidHmac {
        /// The shop named in the callback.
        shop: String,
    },

    /// The token endpoint answered with a non-success status or an
    /// unreadable body.
    #[error("Token exchange for '{shop}' failed with status {status}: {message}")]
    TokenExchangeFailed {
        /// The shop the code was exchanged with.
        shop: String,
        /// The upstream HTTP status code.
        status: u16,
        /// The upstream response body or parse failure.
        message: String,
    },

    /// The token endpoint did not answer within the deadline.
    #[error("Token exchange for '{shop}' timed out after {timeout:?}")]
    TokenExchangeTimeout {
        /// The shop the code was exchanged with.
        shop: String,
        /// The deadline that elapsed.
        timeout: Duration,
    },

    /// The token request never produced an HTTP response.
    #[error("Token exchange request for '{shop}' failed: {source}")]
    TokenExchangeTransport {
        /// The shop the code was exchanged with.
        shop: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// A required callback parameter is missing or malformed.
    #[error("Invalid callback: {reason}")]
    InvalidCallback {
        /// Description of what's invalid about the callback.
        reason: String,
    },

    /// A constant-time comparison was asked to compare values of different shapes.
    #[error("Mismatched data types provided: {left} and {right}")]
    TypeMismatch {
        /// Shape of the left operand.
        left: &'static str,
        /// Shape of the right operand.
        right: &'static str,
    },

    /// A response header could not be encoded.
    #[error("Invalid value for response header '{name}'")]
    InvalidHeader {
        /// The header name.
        name: &'static str,
    },

    /// The session store failed to persist the new session.
    #[error(transparent)]
    SessionStorage(#[from] SessionStorageError),
}

impl OAuthError {
    /// Returns `true` for failures of a local verification check, as opposed
    /// to upstream, network or storage failures.
    #[must_use]
    pub const fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::TimestampOutOfTolerance { .. }
                | Self::MissingCookie { .. }
                | Self::MissingSignature { .. }
                | Self::SignatureMismatch { .. }
                | Self::ExpiredCookie { .. }
                | Self::StateMismatch { .. }
                | Self::InvalidHmac { .. }
                | Self::InvalidCallback { .. }
                | Self::TypeMismatch { .. }
        )
    }
}

// Verify OAuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_errors_are_distinct_and_name_the_cookie() {
        let errors = [
            OAuthError::MissingCookie { name: "c".to_string() },
            OAuthError::MissingSignature { name: "c".to_string() },
            OAuthError::SignatureMismatch { name: "c".to_string() },
            OAuthError::ExpiredCookie { name: "c".to_string() },
        ];

        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        for (i, a) in messages.iter().enumerate() {
            assert!(a.contains("'c'"));
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_token_exchange_failed_includes_shop_and_status() {
        let error = OAuthError::TokenExchangeFailed {
            shop: "test.myshopify.com".to_string(),
            status: 401,
            message: "Invalid client credentials".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("test.myshopify.com"));
        assert!(message.contains("401"));
        assert!(message.contains("Invalid client credentials"));
    }

    #[test]
    fn test_timestamp_error_reports_window() {
        let error = OAuthError::TimestampOutOfTolerance {
            timestamp: 100,
            now: 500,
            tolerance_secs: 90,
        };
        assert!(error.to_string().contains("90s"));
    }

    #[test]
    fn test_verification_failures_are_classified() {
        assert!(OAuthError::InvalidHmac { shop: "s".to_string() }.is_verification_failure());
        assert!(OAuthError::StateMismatch { shop: "s".to_string() }.is_verification_failure());
        assert!(OAuthError::TypeMismatch { left: "string", right: "array" }.is_verification_failure());
        assert!(!OAuthError::TokenExchangeTimeout {
            shop: "s".to_string(),
            timeout: Duration::from_secs(1),
        }
        .is_verification_failure());
        assert!(!OAuthError::InvalidHeader { name: "Location" }.is_verification_failure());
    }

    #[test]
    fn test_from_session_storage_error() {
        let error: OAuthError = SessionStorageError::Backend {
            message: "disk full".to_string(),
        }
        .into();
        assert!(matches!(error, OAuthError::SessionStorage(_)));
        assert!(error.to_string().contains("disk full"));
    }

    #[test]
    fn test_oauth_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OAuthError>();
    }
}
