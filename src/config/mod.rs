//! Configuration types for the OAuth handshake.
//!
//! This module provides the immutable [`AppConfig`] value that every
//! handshake operation receives explicitly. Nothing in the crate reads
//! configuration from ambient global state; bootstrap code builds one
//! `AppConfig` at process start (optionally from the environment via
//! [`AppConfig::from_env`]) and threads it through each call.
//!
//! # Overview
//!
//! - [`AppConfig`]: API credentials, requested scopes and the app's public host
//! - [`AppConfigBuilder`]: A builder for constructing [`AppConfig`] instances
//! - [`ApiKey`], [`ApiSecretKey`], [`ShopDomain`], [`HostName`], [`HostScheme`]:
//!   validated newtypes
//!
//! # Example
//!
//! ```rust
//! use shopify_oauth::{AppConfig, ApiKey, ApiSecretKey, HostName, HostScheme};
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .scopes("read_orders,write_products".parse().unwrap())
//!     .host_name(HostName::new("myapp.example.com").unwrap())
//!     .host_scheme(HostScheme::Https)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.redirect_uri("/auth/callback"), "https://myapp.example.com/auth/callback");
//! ```

mod newtypes;

pub use newtypes::{ApiKey, ApiSecretKey, HostName, HostScheme, ShopDomain};

use std::time::Duration;

use crate::auth::AuthScopes;
use crate::error::ConfigError;

/// Default upper bound on the code-for-token exchange request.
pub const DEFAULT_TOKEN_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "SHOPIFY_CLIENT_ID";
/// Environment variable holding the API secret key.
pub const ENV_API_SECRET_KEY: &str = "SHOPIFY_CLIENT_SECRET";
/// Environment variable holding the comma-separated scopes.
pub const ENV_SCOPES: &str = "SHOPIFY_SCOPES";
/// Environment variable holding the app host name.
pub const ENV_HOST: &str = "HOST";
/// Environment variable holding the app host scheme (`http` or `https`).
pub const ENV_HOST_SCHEME: &str = "HOST_SCHEME";

/// Immutable configuration for the OAuth handshake.
///
/// # Thread Safety
///
/// `AppConfig` is `Clone`, `Send`, and `Sync`. Concurrent handshakes can
/// share one instance without locking.
#[derive(Clone, Debug)]
pub struct AppConfig {
    api_key: ApiKey,
    api_secret_key: ApiSecretKey,
    scopes: AuthScopes,
    host_name: HostName,
    host_scheme: HostScheme,
    api_host: Option<String>,
    user_agent_prefix: Option<String>,
    token_exchange_timeout: Duration,
}

impl AppConfig {
    /// Creates a new builder for constructing an `AppConfig`.
    #[must_use]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::new()
    }

    /// Builds a configuration from the process environment.
    ///
    /// Reads `SHOPIFY_CLIENT_ID`, `SHOPIFY_CLIENT_SECRET`, `SHOPIFY_SCOPES`,
    /// `HOST` and `HOST_SCHEME` (defaults to `https`).
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use shopify_oauth::AppConfig;
    ///
    /// let vars = HashMap::from([
    ///     ("SHOPIFY_CLIENT_ID", "key"),
    ///     ("SHOPIFY_CLIENT_SECRET", "secret"),
    ///     ("SHOPIFY_SCOPES", "read_orders"),
    ///     ("HOST", "myapp.example.com"),
    /// ]);
    ///
    /// let config = AppConfig::from_lookup(|name| vars.get(name).map(ToString::to_string)).unwrap();
    /// assert_eq!(config.scopes().to_string(), "read_orders");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when a required variable is
    /// unset, or the validation error of the offending value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingEnvVar { name })
        };

        let host_scheme = match lookup(ENV_HOST_SCHEME) {
            Some(scheme) if !scheme.trim().is_empty() => scheme.parse()?,
            _ => HostScheme::default(),
        };

        Self::builder()
            .api_key(ApiKey::new(required(ENV_API_KEY)?)?)
            .api_secret_key(ApiSecretKey::new(required(ENV_API_SECRET_KEY)?)?)
            .scopes(required(ENV_SCOPES)?.parse()?)
            .host_name(HostName::new(required(ENV_HOST)?)?)
            .host_scheme(host_scheme)
            .build()
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API secret key.
    #[must_use]
    pub const fn api_secret_key(&self) -> &ApiSecretKey {
        &self.api_secret_key
    }

    /// Returns the requested OAuth scopes, in request order.
    #[must_use]
    pub const fn scopes(&self) -> &AuthScopes {
        &self.scopes
    }

    /// Returns the app host name.
    #[must_use]
    pub const fn host_name(&self) -> &HostName {
        &self.host_name
    }

    /// Returns the app host scheme.
    #[must_use]
    pub const fn host_scheme(&self) -> HostScheme {
        self.host_scheme
    }

    /// Returns the base URL override for token-exchange traffic, if configured.
    #[must_use]
    pub fn api_host(&self) -> Option<&str> {
        self.api_host.as_deref()
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the default timeout for the token exchange.
    #[must_use]
    pub const fn token_exchange_timeout(&self) -> Duration {
        self.token_exchange_timeout
    }

    /// Returns the app origin, `{scheme}://{host}`.
    #[must_use]
    pub fn app_origin(&self) -> String {
        format!("{}://{}", self.host_scheme, self.host_name.as_ref())
    }

    /// Builds the absolute redirect URI for a callback path.
    #[must_use]
    pub fn redirect_uri(&self, callback_path: &str) -> String {
        format!("{}{callback_path}", self.app_origin())
    }
}

// Verify AppConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AppConfig>();
};

/// Builder for constructing [`AppConfig`] instances.
///
/// Required fields are `api_key`, `api_secret_key` and `host_name`.
///
/// # Defaults
///
/// - `scopes`: Empty
/// - `host_scheme`: `https`
/// - `api_host`: `None` (token exchange goes to `https://{shop}`)
/// - `user_agent_prefix`: `None`
/// - `token_exchange_timeout`: 10 seconds
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    scopes: Option<AuthScopes>,
    host_name: Option<HostName>,
    host_scheme: Option<HostScheme>,
    api_host: Option<String>,
    user_agent_prefix: Option<String>,
    token_exchange_timeout: Option<Duration>,
}

impl AppConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key (required).
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the OAuth scopes.
    #[must_use]
    pub fn scopes(mut self, scopes: AuthScopes) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets the app host name (required).
    #[must_use]
    pub fn host_name(mut self, host: HostName) -> Self {
        self.host_name = Some(host);
        self
    }

    /// Sets the app host scheme.
    #[must_use]
    pub const fn host_scheme(mut self, scheme: HostScheme) -> Self {
        self.host_scheme = Some(scheme);
        self
    }

    /// Routes the token exchange through this base URL instead of
    /// `https://{shop}`. The shop domain is then sent in the `Host` header.
    #[must_use]
    pub fn api_host(mut self, url: impl Into<String>) -> Self {
        self.api_host = Some(url.into());
        self
    }

    /// Sets the user agent prefix for the token exchange request.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets the default timeout for the token exchange.
    #[must_use]
    pub const fn token_exchange_timeout(mut self, timeout: Duration) -> Self {
        self.token_exchange_timeout = Some(timeout);
        self
    }

    /// Builds the [`AppConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_key`,
    /// `api_secret_key` or `host_name` are not set, and
    /// [`ConfigError::InvalidApiHost`] if `api_host` is not an absolute URL.
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let api_secret_key = self
            .api_secret_key
            .ok_or(ConfigError::MissingRequiredField {
                field: "api_secret_key",
            })?;
        let host_name = self
            .host_name
            .ok_or(ConfigError::MissingRequiredField { field: "host_name" })?;

        let api_host = self
            .api_host
            .map(|raw| match url::Url::parse(&raw) {
                Ok(parsed) if parsed.has_host() => Ok(raw.trim_end_matches('/').to_string()),
                _ => Err(ConfigError::InvalidApiHost { url: raw }),
            })
            .transpose()?;

        Ok(AppConfig {
            api_key,
            api_secret_key,
            scopes: self.scopes.unwrap_or_default(),
            host_name,
            host_scheme: self.host_scheme.unwrap_or_default(),
            api_host,
            user_agent_prefix: self.user_agent_prefix,
            token_exchange_timeout: self
                .token_exchange_timeout
                .unwrap_or(DEFAULT_TOKEN_EXCHANGE_TIMEOUT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn minimal_builder() -> AppConfigBuilder {
        AppConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .host_name(HostName::new("myapp.example.com").unwrap())
    }

    #[test]
    fn test_builder_requires_api_key() {
        let result = AppConfigBuilder::new()
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .host_name(HostName::new("myapp.example.com").unwrap())
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "api_key" })
        ));
    }

    #[test]
    fn test_builder_requires_api_secret_key() {
        let result = AppConfigBuilder::new()
            .api_key(ApiKey::new("key").unwrap())
            .host_name(HostName::new("myapp.example.com").unwrap())
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField {
                field: "api_secret_key"
            })
        ));
    }

    #[test]
    fn test_builder_requires_host_name() {
        let result = AppConfigBuilder::new()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "host_name" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = minimal_builder().build().unwrap();

        assert!(config.scopes().is_empty());
        assert_eq!(config.host_scheme(), HostScheme::Https);
        assert!(config.api_host().is_none());
        assert!(config.user_agent_prefix().is_none());
        assert_eq!(
            config.token_exchange_timeout(),
            DEFAULT_TOKEN_EXCHANGE_TIMEOUT
        );
    }

    #[test]
    fn test_redirect_uri_joins_scheme_host_and_path() {
        let config = minimal_builder()
            .host_scheme(HostScheme::Http)
            .build()
            .unwrap();

        assert_eq!(config.app_origin(), "http://myapp.example.com");
        assert_eq!(
            config.redirect_uri("/auth/callback"),
            "http://myapp.example.com/auth/callback"
        );
    }

    #[test]
    fn test_api_host_must_be_absolute() {
        let result = minimal_builder().api_host("not a url").build();
        assert!(matches!(result, Err(ConfigError::InvalidApiHost { .. })));

        let config = minimal_builder()
            .api_host("http://127.0.0.1:8080/")
            .build()
            .unwrap();
        assert_eq!(config.api_host(), Some("http://127.0.0.1:8080"));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let config = AppConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("hunter2-secret").unwrap())
            .host_name(HostName::new("myapp.example.com").unwrap())
            .build()
            .unwrap();

        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("AppConfig"));
        assert!(!debug_str.contains("hunter2-secret"));
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let vars = HashMap::from([
            (ENV_API_KEY, "env-key"),
            (ENV_API_SECRET_KEY, "env-secret"),
            (ENV_SCOPES, "read_orders, write_products"),
            (ENV_HOST, "tunnel.example.com"),
            (ENV_HOST_SCHEME, "http"),
        ]);

        let config = AppConfig::from_lookup(|name| vars.get(name).map(ToString::to_string)).unwrap();

        assert_eq!(config.api_key().as_ref(), "env-key");
        assert_eq!(config.api_secret_key().as_ref(), "env-secret");
        assert_eq!(config.scopes().to_string(), "read_orders,write_products");
        assert_eq!(config.host_name().as_ref(), "tunnel.example.com");
        assert_eq!(config.host_scheme(), HostScheme::Http);
    }

    #[test]
    fn test_from_lookup_defaults_scheme_to_https() {
        let vars = HashMap::from([
            (ENV_API_KEY, "env-key"),
            (ENV_API_SECRET_KEY, "env-secret"),
            (ENV_SCOPES, "read_orders"),
            (ENV_HOST, "tunnel.example.com"),
        ]);

        let config = AppConfig::from_lookup(|name| vars.get(name).map(ToString::to_string)).unwrap();
        assert_eq!(config.host_scheme(), HostScheme::Https);
    }

    #[test]
    fn test_from_lookup_reports_missing_variable() {
        let vars = HashMap::from([(ENV_API_KEY, "env-key")]);

        let result = AppConfig::from_lookup(|name| vars.get(name).map(ToString::to_string));
        assert!(matches!(
            result,
            Err(ConfigError::MissingEnvVar {
                name: ENV_API_SECRET_KEY
            })
        ));
    }

    #[test]
    fn test_from_lookup_rejects_bad_scheme() {
        let vars = HashMap::from([
            (ENV_API_KEY, "env-key"),
            (ENV_API_SECRET_KEY, "env-secret"),
            (ENV_SCOPES, "read_orders"),
            (ENV_HOST, "tunnel.example.com"),
            (ENV_HOST_SCHEME, "gopher"),
        ]);

        let result = AppConfig::from_lookup(|name| vars.get(name).map(ToString::to_string));
        assert!(matches!(result, Err(ConfigError::InvalidHostScheme { .. })));
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AppConfig>();
    }
}
