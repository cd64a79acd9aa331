//! Sessions produced by a completed OAuth handshake.
//!
//! This module provides the [`Session`] value returned by
//! [`callback`](crate::auth::oauth::callback) and the
//! [`AccessTokenResponse`] it is built from.

use crate::auth::{AssociatedUser, AuthScopes};
use crate::config::ShopDomain;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The JSON body returned by `POST https://{shop}/admin/oauth/access_token`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AccessTokenResponse {
    /// The access token.
    pub access_token: String,

    /// The comma-separated scopes that were granted.
    pub scope: String,

    /// Seconds until an online token expires.
    #[serde(default)]
    pub expires_in: Option<i64>,

    /// Scopes available to the associated user (online tokens only).
    #[serde(default)]
    pub associated_user_scope: Option<String>,

    /// The user who approved an online token.
    #[serde(default)]
    pub associated_user: Option<AssociatedUser>,
}

/// An authenticated session for one shop.
///
/// Created only after the callback passed every verification step and the
/// token exchange succeeded. This crate does not keep it; ownership passes
/// to the caller, typically into a [`SessionStore`](crate::auth::SessionStore).
///
/// `Debug` output masks the access token.
///
/// ```rust
/// use shopify_oauth::{Session, ShopDomain};
///
/// let shop = ShopDomain::new("test").unwrap();
/// let session = Session::new(
///     Session::generate_offline_id(&shop),
///     shop,
///     "shpat_abc".to_string(),
///     "read_orders".parse().unwrap(),
///     false,
/// );
///
/// assert_eq!(session.id, "offline_test.myshopify.com");
/// assert!(session.is_active());
/// assert!(!format!("{session:?}").contains("shpat_abc"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Identifier derived from the shop and access mode.
    pub id: String,

    /// The shop this session is for.
    pub shop: ShopDomain,

    /// The access token for API authentication.
    pub access_token: String,

    /// The scopes Shopify granted.
    pub scope: AuthScopes,

    /// Whether this is an online (user-specific) session.
    pub is_online: bool,

    /// When an online session expires.
    pub expires: Option<DateTime<Utc>>,

    /// The user behind an online session.
    pub associated_user: Option<AssociatedUser>,
}

impl Session {
    /// Creates a new session with no expiry or associated user.
    #[must_use]
    pub const fn new(
        id: String,
        shop: ShopDomain,
        access_token: String,
        scope: AuthScopes,
        is_online: bool,
    ) -> Self {
        Self {
            id,
            shop,
            access_token,
            scope,
            is_online,
            expires: None,
            associated_user: None,
        }
    }

    /// Returns the id of the offline session for `shop`: `offline_{shop}`.
    #[must_use]
    pub fn generate_offline_id(shop: &ShopDomain) -> String {
        format!("offline_{}", shop.as_ref())
    }

    /// Returns the id of an online session for `shop` and a Shopify user.
    #[must_use]
    pub fn generate_online_id(shop: &ShopDomain, user_id: u64) -> String {
        format!("{}_{user_id}", shop.as_ref())
    }

    /// Builds a session from a token endpoint response.
    ///
    /// Offline sessions get the deterministic `offline_{shop}` id. Online
    /// sessions use `{shop}_{user_id}` when Shopify reports the user, and
    /// fall back to `online_{shop}` otherwise. The state nonce is never kept.
    #[must_use]
    pub fn from_access_token_response(
        shop: ShopDomain,
        is_online: bool,
        response: &AccessTokenResponse,
    ) -> Self {
        let id = if !is_online {
            Self::generate_offline_id(&shop)
        } else if let Some(user) = &response.associated_user {
            Self::generate_online_id(&shop, user.id)
        } else {
            format!("online_{}", shop.as_ref())
        };

        let expires = response
            .expires_in
            .filter(|_| is_online)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));

        Self {
            id,
            shop,
            access_token: response.access_token.clone(),
            scope: AuthScopes::from(
                response
                    .scope
                    .split(',')
                    .map(ToString::to_string)
                    .collect::<Vec<_>>(),
            ),
            is_online,
            expires,
            associated_user: response.associated_user.clone().filter(|_| is_online),
        }
    }

    /// Returns `true` if this session has expired.
    ///
    /// Sessions without an expiration time never expire.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.expires.is_some_and(|expires| Utc::now() > expires)
    }

    /// Returns `true` if this session has an access token and has not expired.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.access_token.is_empty() && !self.expired()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("shop", &self.shop)
            .field("access_token", &"*****")
            .field("scope", &self.scope)
            .field("is_online", &self.is_online)
            .field("expires", &self.expires)
            .field("associated_user", &self.associated_user)
            .finish_non_exhaustive()
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};
