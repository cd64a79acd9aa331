//! OAuth callback validation, code exchange and session construction.
//!
//! # Overview
//!
//! When the merchant approves the app, Shopify redirects the browser to the
//! callback path. [`callback`] then:
//!
//! 1. Parses the query parameters
//! 2. Verifies the signed state cookie
//! 3. Verifies the timestamp and the `hmac` signature of the query
//! 4. Compares the `state` parameter with the cookie in constant time
//! 5. Exchanges the authorization code for an access token
//! 6. Builds the [`Session`]
//!
//! Any failed check aborts the handshake with its own [`OAuthError`]
//! variant. The code is never exchanged for a request that did not pass
//! every check.
//!
//! [`complete_callback`] additionally hands the session to a
//! [`SessionStore`] and produces the redirect to the app's landing page.

use std::time::Duration;

use chrono::Utc;

use crate::auth::oauth::cookie::{clear_signed_cookie, STATE_COOKIE_NAME};
use crate::auth::oauth::hmac::{safe_compare, verify_hmac, HmacSignator};
use crate::auth::oauth::token_exchange::exchange_code;
use crate::auth::oauth::{OAuthError, QueryValue};
use crate::auth::{Session, SessionStore};
use crate::config::{AppConfig, ShopDomain};
use crate::http::{AuthRequest, AuthResponse};

/// Per-request settings for [`callback`] and [`complete_callback`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use shopify_oauth::auth::oauth::CallbackOptions;
///
/// let options = CallbackOptions::new()
///     .online(true)
///     .timeout(Duration::from_secs(3))
///     .landing_path("/dashboard");
///
/// assert!(options.is_online);
/// assert_eq!(options.landing_path, "/dashboard");
/// ```
#[derive(Clone, Debug)]
pub struct CallbackOptions {
    /// Whether the handshake requested an online (per-user) token.
    pub is_online: bool,
    /// Deadline for the token exchange; `None` uses the configured default.
    pub timeout: Option<Duration>,
    /// Where [`complete_callback`] sends the browser afterwards.
    pub landing_path: String,
}

impl Default for CallbackOptions {
    fn default() -> Self {
        Self {
            is_online: false,
            timeout: None,
            landing_path: "/".to_string(),
        }
    }
}

impl CallbackOptions {
    /// Creates options for an offline handshake with the configured timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the access mode.
    #[must_use]
    pub const fn online(mut self, is_online: bool) -> Self {
        self.is_online = is_online;
        self
    }

    /// Overrides the token exchange deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the post-authentication landing path.
    #[must_use]
    pub fn landing_path(mut self, path: impl Into<String>) -> Self {
        self.landing_path = path.into();
        self
    }
}

fn rejected(shop: &str, check: &'static str, error: OAuthError) -> OAuthError {
    tracing::warn!(shop, check, error = %error, "Rejected OAuth callback");
    error
}

/// Validates an OAuth callback and exchanges its code for a session.
///
/// # Errors
///
/// - [`OAuthError::InvalidCallback`]: unparsable URL, missing timestamp,
///   code or shop, or an invalid shop domain
/// - [`OAuthError::MissingCookie`], [`OAuthError::MissingSignature`],
///   [`OAuthError::ExpiredCookie`], [`OAuthError::SignatureMismatch`]:
///   the state cookie failed verification
/// - [`OAuthError::TimestampOutOfTolerance`]: the callback is stale
/// - [`OAuthError::InvalidHmac`]: the query signature does not match
/// - [`OAuthError::TypeMismatch`]: `state` was sent more than once
/// - [`OAuthError::StateMismatch`]: `state` does not match the cookie
/// - [`OAuthError::TokenExchangeFailed`], [`OAuthError::TokenExchangeTimeout`],
///   [`OAuthError::TokenExchangeTransport`]: the code exchange failed
pub async fn callback(
    config: &AppConfig,
    request: &AuthRequest,
    options: &CallbackOptions,
) -> Result<Session, OAuthError> {
    let query = request.query()?;
    let raw_shop = query.shop().unwrap_or_default().to_string();

    tracing::info!(shop = %raw_shop, is_online = options.is_online, "Completing OAuth");

    let secret = config.api_secret_key();
    let cookies = request.cookies();
    let state = cookies
        .verify_signed(secret, STATE_COOKIE_NAME, Utc::now())
        .map_err(|e| rejected(&raw_shop, "state_cookie", e))?;

    let hmac_valid = verify_hmac(secret, &query, HmacSignator::Admin)
        .map_err(|e| rejected(&raw_shop, "timestamp", e))?;
    if !hmac_valid {
        return Err(rejected(
            &raw_shop,
            "hmac",
            OAuthError::InvalidHmac {
                shop: raw_shop.clone(),
            },
        ));
    }

    let state_mismatch = || OAuthError::StateMismatch {
        shop: raw_shop.clone(),
    };
    let received_state = query.get("state").ok_or_else(state_mismatch);
    let state_matches = received_state
        .and_then(|received| safe_compare(received, &QueryValue::from(state)))
        .map_err(|e| rejected(&raw_shop, "state", e))?;
    if !state_matches {
        return Err(rejected(&raw_shop, "state", state_mismatch()));
    }

    let shop = ShopDomain::new(raw_shop.as_str()).map_err(|_| {
        rejected(
            &raw_shop,
            "shop",
            OAuthError::InvalidCallback {
                reason: format!("Invalid shop domain: {raw_shop}"),
            },
        )
    })?;
    let code = query.code().ok_or_else(|| {
        rejected(
            &raw_shop,
            "code",
            OAuthError::InvalidCallback {
                reason: "Missing code parameter".to_string(),
            },
        )
    })?;

    tracing::debug!(shop = %shop, "OAuth request is valid, requesting access token");

    let timeout = options
        .timeout
        .unwrap_or_else(|| config.token_exchange_timeout());
    let token_response = exchange_code(config, &shop, code, timeout)
        .await
        .map_err(|e| {
            tracing::error!(shop = %shop, error = %e, "Failed to get access token");
            e
        })?;

    let session = Session::from_access_token_response(shop, options.is_online, &token_response);

    if !session.scope.covers(config.scopes()) {
        tracing::warn!(
            shop = %session.shop,
            requested = %config.scopes(),
            granted = %session.scope,
            "Granted scopes do not cover the requested scopes"
        );
    }

    tracing::info!(shop = %session.shop, is_online = session.is_online, "OAuth completed");

    Ok(session)
}

/// A finished handshake: the stored session and the redirect to send.
#[derive(Clone, Debug)]
pub struct CompletedAuth {
    /// The session that was stored.
    pub session: Session,
    /// `302` to the landing path, clearing the state cookies.
    pub response: AuthResponse,
}

/// Runs [`callback`], stores the session and builds the landing redirect.
///
/// The redirect clears both state cookies so the state cannot be replayed
/// from the browser.
///
/// # Errors
///
/// Every error of [`callback`], plus [`OAuthError::SessionStorage`] if the
/// store fails and [`OAuthError::InvalidHeader`] for an unencodable landing
/// path.
pub async fn complete_callback<S>(
    config: &AppConfig,
    request: &AuthRequest,
    options: &CallbackOptions,
    store: &S,
) -> Result<CompletedAuth, OAuthError>
where
    S: SessionStore + ?Sized,
{
    let session = callback(config, request, options).await?;

    store.save(session.clone()).await.map_err(|e| {
        tracing::error!(shop = %session.shop, error = %e, "Failed to store session");
        e
    })?;

    let mut response = AuthResponse::redirect(&options.landing_path)?;
    for cookie in clear_signed_cookie(STATE_COOKIE_NAME) {
        response.add_cookie(&cookie)?;
    }

    Ok(CompletedAuth { session, response })
}
