//! Authorization code exchange.
//!
//! After a callback passes verification, its `code` is traded for an access
//! token at `POST https://{shop}/admin/oauth/access_token`. The request is
//! bounded by a deadline and never retried.

use std::time::Duration;

use reqwest::header::{ACCEPT, HOST, USER_AGENT};
use serde::Serialize;

use crate::auth::oauth::OAuthError;
use crate::auth::AccessTokenResponse;
use crate::config::{AppConfig, ShopDomain};

/// Crate version sent in the `User-Agent` header.
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Request body for the code exchange.
#[derive(Serialize)]
struct AccessTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// Returns the token endpoint for `shop`.
///
/// Goes to `config.api_host()` when one is configured, otherwise straight to
/// the shop.
#[must_use]
pub fn access_token_url(config: &AppConfig, shop: &ShopDomain) -> String {
    let base = config
        .api_host()
        .map_or_else(|| format!("https://{}", shop.as_ref()), ToString::to_string);
    format!("{base}/admin/oauth/access_token")
}

fn user_agent(config: &AppConfig) -> String {
    let prefix = config
        .user_agent_prefix()
        .map_or(String::new(), |prefix| format!("{prefix} | "));
    format!("{prefix}Shopify OAuth Library v{LIBRARY_VERSION}")
}

/// Exchanges an authorization code for an access token.
///
/// The whole exchange, from connecting to reading the body, must finish
/// within `timeout`. Dropping the returned future cancels the request.
///
/// # Errors
///
/// - [`OAuthError::TokenExchangeTimeout`]: the deadline elapsed
/// - [`OAuthError::TokenExchangeTransport`]: no HTTP response was received
/// - [`OAuthError::TokenExchangeFailed`]: a non-2xx status or an unreadable body
pub async fn exchange_code(
    config: &AppConfig,
    shop: &ShopDomain,
    code: &str,
    timeout: Duration,
) -> Result<AccessTokenResponse, OAuthError> {
    let url = access_token_url(config, shop);
    let body = AccessTokenRequest {
        client_id: config.api_key().as_ref(),
        client_secret: config.api_secret_key().as_ref(),
        code,
    };

    let transport = |source: reqwest::Error| OAuthError::TokenExchangeTransport {
        shop: shop.to_string(),
        source,
    };

    let client = reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(timeout)
        .build()
        .map_err(transport)?;

    let mut request = client
        .post(&url)
        .header(USER_AGENT, user_agent(config))
        .header(ACCEPT, "application/json")
        .json(&body);

    // Proxy scenario
    if config.api_host().is_some() {
        request = request.header(HOST, shop.as_ref());
    }

    tracing::debug!(shop = %shop, "Requesting access token");

    let exchange = async {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();

        if !status.is_success() {
            let message = match response.text().await {
                Ok(body) => body,
                Err(e) => format!("Failed to read error response body: {e}"),
            };
            return Err(OAuthError::TokenExchangeFailed {
                shop: shop.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<AccessTokenResponse>()
            .await
            .map_err(|e| OAuthError::TokenExchangeFailed {
                shop: shop.to_string(),
                status: status.as_u16(),
                message: format!("Failed to parse token response: {e}"),
            })
    };

    match tokio::time::timeout(timeout, exchange).await {
        Ok(Err(OAuthError::TokenExchangeTransport { source, .. })) if source.is_timeout() => {
            Err(OAuthError::TokenExchangeTimeout {
                shop: shop.to_string(),
                timeout,
            })
        }
        Ok(result) => result,
        Err(_) => Err(OAuthError::TokenExchangeTimeout {
            shop: shop.to_string(),
            timeout,
        }),
    }
}
