//! # Shopify OAuth
//!
//! The OAuth 2.0 authorization code handshake a Shopify app runs to obtain
//! an access token for a merchant's shop, together with the verification
//! layer that protects it against forgery and replay.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`AppConfig`] and [`AppConfigBuilder`]
//! - Validated newtypes for API credentials and domain values
//! - OAuth scope handling with implied scope support
//! - `begin` and `callback` entry points via [`auth::oauth`]
//! - HMAC-SHA256 signing, constant-time comparison, timestamp tolerance and
//!   query canonicalization via [`auth::oauth::hmac`]
//! - Signed state cookies via [`auth::oauth::cookie`]
//! - Typed request and response values at the HTTP boundary via [`http`]
//! - A [`SessionStore`] seam for persisting completed sessions
//!
//! The HTTP server, the router and durable storage are left to the
//! application. Every operation receives the [`AppConfig`] explicitly.
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_oauth::{ApiKey, ApiSecretKey, AppConfig, HostName, ShopDomain};
//! use shopify_oauth::auth::oauth::begin;
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-api-secret").unwrap())
//!     .scopes("read_products,write_orders".parse().unwrap())
//!     .host_name(HostName::new("your-app.com").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let shop = ShopDomain::new("example-shop").unwrap();
//! let response = begin(&config, &shop, "/auth/callback", false).unwrap();
//! assert_eq!(response.status.as_u16(), 302);
//! ```
//!
//! ## Handling the Callback
//!
//! ```rust,ignore
//! use shopify_oauth::auth::oauth::{complete_callback, CallbackOptions};
//! use shopify_oauth::http::AuthRequest;
//!
//! let request = AuthRequest::from_parts(uri.to_string(), headers);
//! let completed = complete_callback(&config, &request, &CallbackOptions::new(), &store).await?;
//! // Send completed.response to the browser
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events and never installs a subscriber.
//! Secrets, signatures, state values and access tokens are never logged.
//!
//! ## Thread Safety
//!
//! All public types are `Send + Sync`. Handshakes share no in-process state
//! and may run concurrently.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;

// Re-export public types at crate root for convenience
pub use auth::{
    AccessTokenResponse, AssociatedUser, AuthScopes, MemorySessionStore, Session,
    SessionStorageError, SessionStore,
};
pub use config::{
    ApiKey, ApiSecretKey, AppConfig, AppConfigBuilder, HostName, HostScheme, ShopDomain,
};
pub use error::ConfigError;

// Re-export OAuth types for convenience
pub use auth::oauth::{
    begin, callback, complete_callback, nonce, AuthQuery, CallbackOptions, CompletedAuth,
    HmacSignator, OAuthError, QueryValue, StateParam,
};
pub use http::{AuthRequest, AuthResponse};
