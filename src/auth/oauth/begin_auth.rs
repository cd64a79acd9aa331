//! OAuth authorization redirect.
//!
//! This module provides [`begin`], the first step of the authorization code
//! flow. It draws a fresh state nonce, builds the Shopify authorization URL
//! and returns a `302` redirect carrying the state in a signed cookie. No
//! network call is made.
//!
//! # Example
//!
//! ```rust
//! use shopify_oauth::{ApiKey, ApiSecretKey, AppConfig, HostName, ShopDomain};
//! use shopify_oauth::auth::oauth::begin;
//!
//! let config = AppConfig::builder()
//!     .api_key(ApiKey::new("api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("secret").unwrap())
//!     .host_name(HostName::new("myapp.example.com").unwrap())
//!     .scopes("read_orders".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let shop = ShopDomain::new("test").unwrap();
//! let response = begin(&config, &shop, "/auth/callback", false).unwrap();
//!
//! assert_eq!(response.status.as_u16(), 302);
//! assert!(response.location().unwrap().starts_with("https://test.myshopify.com/admin/oauth/authorize?"));
//! assert_eq!(response.set_cookies().len(), 2);
//! ```

use crate::auth::oauth::cookie::{signed_cookie, STATE_COOKIE_NAME};
use crate::auth::oauth::{OAuthError, StateParam};
use crate::config::{AppConfig, ShopDomain};
use crate::http::AuthResponse;

/// Value of `grant_options[]` requesting an online (per-user) token.
pub const PER_USER_GRANT: &str = "per-user";

/// Builds the Shopify authorization URL for `shop`.
///
/// The query carries `client_id`, `scope` (comma-joined), `redirect_uri`,
/// `state` and `grant_options[]`, which is `per-user` for online tokens and
/// empty for offline tokens.
#[must_use]
pub fn authorization_url(
    config: &AppConfig,
    shop: &ShopDomain,
    callback_path: &str,
    state: &StateParam,
    is_online: bool,
) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("client_id", config.api_key().as_ref())
        .append_pair("scope", &config.scopes().to_string())
        .append_pair("redirect_uri", &config.redirect_uri(callback_path))
        .append_pair("state", state.as_ref())
        .append_pair("grant_options[]", if is_online { PER_USER_GRANT } else { "" })
        .finish();

    format!("https://{}/admin/oauth/authorize?{query}", shop.as_ref())
}

/// Starts the OAuth handshake for `shop`.
///
/// Returns a `302 Found` whose `Location` is the authorization URL and which
/// sets the `shopify_app_state` cookie and its `.sig` companion, both valid
/// for 600 seconds.
///
/// # Arguments
///
/// * `config` - App configuration
/// * `shop` - The shop to authorize against
/// * `callback_path` - Path on this app that receives the callback (e.g. `/auth/callback`)
/// * `is_online` - `true` for a per-user token, `false` for an offline token
///
/// # Errors
///
/// Returns [`OAuthError::InvalidHeader`] if the redirect or a cookie cannot
/// be encoded as a header, which only happens for a malformed `callback_path`.
pub fn begin(
    config: &AppConfig,
    shop: &ShopDomain,
    callback_path: &str,
    is_online: bool,
) -> Result<AuthResponse, OAuthError> {
    tracing::info!(shop = %shop, callback_path, is_online, "Beginning OAuth");

    let state = StateParam::new();
    let location = authorization_url(config, shop, callback_path, &state, is_online);

    let mut response = AuthResponse::redirect(&location)?;
    for cookie in signed_cookie(config.api_secret_key(), STATE_COOKIE_NAME, state.as_ref()) {
        response.add_cookie(&cookie)?;
    }

    tracing::debug!(shop = %shop, is_online, "OAuth started, redirecting to authorization URL");

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::oauth::cookie::STATE_COOKIE_MAX_AGE_SECS;
    use crate::auth::oauth::hmac::hmac_hex;
    use crate::auth::oauth::AuthQuery;
    use crate::config::{ApiKey, ApiSecretKey, HostName, HostScheme};
    use chrono::Utc;

    fn create_test_config() -> AppConfig {
        AppConfig::builder()
            .api_key(ApiKey::new("test-api-key").unwrap())
            .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
            .host_name(HostName::new("myapp.example.com").unwrap())
            .scopes("read_products,write_orders".parse().unwrap())
            .build()
            .unwrap()
    }

    fn shop() -> ShopDomain {
        ShopDomain::new("test.myshopify.com").unwrap()
    }

    fn location_of(response: &AuthResponse) -> url::Url {
        url::Url::parse(response.location().unwrap()).unwrap()
    }

    #[test]
    fn test_begin_redirects_to_shop_authorize_endpoint() {
        let response = begin(&create_test_config(), &shop(), "/auth/callback", false).unwrap();

        assert_eq!(response.status.as_u16(), 302);
        let location = location_of(&response);
        assert_eq!(location.scheme(), "https");
        assert_eq!(location.host_str(), Some("test.myshopify.com"));
        assert_eq!(location.path(), "/admin/oauth/authorize");
    }

    #[test]
    fn test_begin_query_parameters() {
        let response = begin(&create_test_config(), &shop(), "/auth/callback", false).unwrap();
        let query = AuthQuery::from_url(response.location().unwrap()).unwrap();

        assert_eq!(query.get_str("client_id"), Some("test-api-key"));
        assert_eq!(query.get_str("scope"), Some("read_products,write_orders"));
        assert_eq!(
            query.get_str("redirect_uri"),
            Some("https://myapp.example.com/auth/callback")
        );
        assert_eq!(query.state().map(str::len), Some(15));
        assert!(query.state().unwrap().chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_begin_grant_options_follow_access_mode() {
        let offline = begin(&create_test_config(), &shop(), "/cb", false).unwrap();
        let query = AuthQuery::from_url(offline.location().unwrap()).unwrap();
        assert_eq!(query.get("grant_options[]").map(|v| v.joined().into_owned()), Some(String::new()));

        let online = begin(&create_test_config(), &shop(), "/cb", true).unwrap();
        let query = AuthQuery::from_url(online.location().unwrap()).unwrap();
        assert_eq!(query.get_str("grant_options[]"), Some("per-user"));
    }

    #[test]
    fn test_begin_uses_configured_scheme() {
        let config = AppConfig::builder()
            .api_key(ApiKey::new("k").unwrap())
            .api_secret_key(ApiSecretKey::new("s").unwrap())
            .host_name(HostName::new("localhost:8000").unwrap())
            .host_scheme(HostScheme::Http)
            .build()
            .unwrap();

        let response = begin(&config, &shop(), "/auth/callback", false).unwrap();
        let query = AuthQuery::from_url(response.location().unwrap()).unwrap();
        assert_eq!(
            query.get_str("redirect_uri"),
            Some("http://localhost:8000/auth/callback")
        );
    }

    #[test]
    fn test_begin_sets_signed_state_cookie() {
        let response = begin(&create_test_config(), &shop(), "/auth/callback", false).unwrap();
        let set_cookies = response.set_cookies();

        assert_eq!(set_cookies.len(), 2);
        for header in &set_cookies {
            assert!(header.contains("Secure"));
            assert!(header.contains(&format!("Max-Age={STATE_COOKIE_MAX_AGE_SECS}")));
        }

        let state = AuthQuery::from_url(response.location().unwrap())
            .unwrap()
            .state()
            .unwrap()
            .to_string();
        let jar = response.cookie_jar(Utc::now());
        assert_eq!(jar.get("shopify_app_state"), Some(state.as_str()));
        assert_eq!(
            jar.get("shopify_app_state.sig"),
            Some(hmac_hex("test-secret", &state).as_str())
        );
    }

    #[test]
    fn test_begin_draws_a_new_state_each_time() {
        let config = create_test_config();
        let first = begin(&config, &shop(), "/cb", false).unwrap();
        let second = begin(&config, &shop(), "/cb", false).unwrap();
        assert_ne!(first.location(), second.location());
    }

    #[test]
    fn test_authorization_url_encodes_redirect_uri() {
        let state = StateParam::from_raw("123");
        let url = authorization_url(&create_test_config(), &shop(), "/auth/callback", &state, true);
        assert!(url.contains("redirect_uri=https%3A%2F%2Fmyapp.example.com%2Fauth%2Fcallback"));
        assert!(url.contains("grant_options%5B%5D=per-user"));
        assert!(url.contains("scope=read_products%2Cwrite_orders"));
    }
}
