//! OAuth 2.0 authorization code handshake for Shopify apps.
//!
//! The handshake has two entry points:
//!
//! 1. **Authorization Initiation** ([`begin`]): Draw a state nonce, set it in
//!    a signed cookie and redirect the merchant to Shopify.
//!
//! 2. **Callback Validation** ([`callback`]): Verify the cookie, the query
//!    signature and the state, then exchange the code for a [`Session`].
//!    [`complete_callback`] also stores the session and redirects onward.
//!
//! # Security Features
//!
//! - **HMAC Validation**: Callbacks are verified with HMAC-SHA256 over the
//!   canonical query ([`hmac`])
//! - **Replay Window**: Callbacks older than 90 seconds are rejected before
//!   the signature is looked at
//! - **CSRF Protection**: The `state` parameter must match the signed cookie
//! - **Constant-Time Comparison**: Every comparison of secret-derived
//!   material runs in constant time for equal-length inputs
//!
//! # Example
//!
//! ```rust,no_run
//! use shopify_oauth::{ApiKey, ApiSecretKey, AppConfig, HostName, MemorySessionStore, ShopDomain};
//! use shopify_oauth::auth::oauth::{begin, complete_callback, CallbackOptions, OAuthError};
//! use shopify_oauth::http::AuthRequest;
//!
//! # async fn run(inbound: AuthRequest) -> Result<(), OAuthError> {
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-secret").unwrap())
//!     .host_name(HostName::new("your-app.com").unwrap())
//!     .scopes("read_products,write_orders".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! // GET /auth?shop=example-shop
//! let shop = ShopDomain::new("example-shop").unwrap();
//! let redirect = begin(&config, &shop, "/auth/callback", false)?;
//! // The router sends `redirect` to the browser.
//!
//! // GET /auth/callback?...
//! let store = MemorySessionStore::new();
//! let completed = complete_callback(&config, &inbound, &CallbackOptions::new(), &store).await?;
//! println!("Authorized {}", completed.session.shop);
//! # Ok(())
//! # }
//! ```
//!
//! [`Session`]: crate::auth::Session

mod auth_query;
mod begin_auth;
mod callback;
pub mod cookie;
mod error;
pub mod hmac;
mod nonce;
pub mod token_exchange;

pub use auth_query::{AuthQuery, QueryValue};
pub use begin_auth::{authorization_url, begin, PER_USER_GRANT};
pub use callback::{callback, complete_callback, CallbackOptions, CompletedAuth};
pub use error::OAuthError;
pub use self::hmac::{verify_hmac, HmacSignator};
pub use nonce::{nonce, StateParam, NONCE_LENGTH};
