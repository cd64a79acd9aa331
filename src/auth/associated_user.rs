//! The Shopify staff member behind an online access token.

use serde::{Deserialize, Serialize};

/// The Shopify user who approved an online (per-user) access token.
///
/// Shopify includes this object in the token response when `begin` was
/// called with `is_online = true`. Offline tokens never carry one.
///
/// Only `id` is guaranteed by the token endpoint; the remaining fields
/// default when absent.
///
/// ```rust
/// use shopify_oauth::AssociatedUser;
///
/// let user: AssociatedUser = serde_json::from_str(r#"{"id": 902541635, "email": "jane@example.com"}"#).unwrap();
/// assert_eq!(user.id, 902541635);
/// assert_eq!(user.email, "jane@example.com");
/// assert!(!user.account_owner);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedUser {
    /// The Shopify user ID.
    pub id: u64,

    /// The user's first name.
    #[serde(default)]
    pub first_name: String,

    /// The user's last name.
    #[serde(default)]
    pub last_name: String,

    /// The user's email address.
    #[serde(default)]
    pub email: String,

    /// Whether the user's email has been verified.
    #[serde(default)]
    pub email_verified: bool,

    /// Whether the user owns the shop.
    #[serde(default)]
    pub account_owner: bool,

    /// The user's locale preference (e.g., "en").
    #[serde(default)]
    pub locale: String,

    /// Whether the user is a collaborator.
    #[serde(default)]
    pub collaborator: bool,
}

// Verify AssociatedUser is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AssociatedUser>();
};
