//! Error types for app configuration.
//!
//! This module contains the errors raised while building an [`AppConfig`]
//! or one of its validated newtypes.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation at process start, before any handshake runs.
//!
//! # Example
//!
//! ```rust
//! use shopify_oauth::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```
//!
//! [`AppConfig`]: crate::AppConfig

use thiserror::Error;

/// Errors that can occur during app configuration.
///
/// Every variant describes a malformed or missing configuration value.
/// None of them carries the API secret key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide a valid Shopify API key.")]
    EmptyApiKey,

    /// API secret key cannot be empty.
    #[error("API secret key cannot be empty. Please provide a valid Shopify API secret key.")]
    EmptyApiSecretKey,

    /// Shop domain is invalid.
    #[error("Invalid shop domain '{domain}'. Expected format: 'shop-name' or 'shop-name.myshopify.com'.")]
    InvalidShopDomain {
        /// The invalid domain that was provided.
        domain: String,
    },

    /// Host name is invalid.
    #[error("Invalid host name '{host}'. Expected a bare host such as 'myapp.example.com' or 'localhost:3000'.")]
    InvalidHostName {
        /// The invalid host name that was provided.
        host: String,
    },

    /// Host scheme is neither `http` nor `https`.
    #[error("Invalid host scheme '{scheme}'. Expected 'http' or 'https'.")]
    InvalidHostScheme {
        /// The invalid scheme that was provided.
        scheme: String,
    },

    /// Scopes are invalid.
    #[error("Invalid scopes: {reason}")]
    InvalidScopes {
        /// The reason the scopes are invalid.
        reason: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// A required environment variable is unset.
    #[error("Missing environment variable '{name}'.")]
    MissingEnvVar {
        /// The name of the variable.
        name: &'static str,
    },

    /// The API host override is not an absolute URL.
    #[error("Invalid API host '{url}'. Please provide an absolute URL (e.g., 'http://127.0.0.1:8080').")]
    InvalidApiHost {
        /// The invalid URL that was provided.
        url: String,
    },
}
