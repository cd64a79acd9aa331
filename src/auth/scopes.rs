//! OAuth scope handling.
//!
//! This module provides the [`AuthScopes`] type: the ordered list of scopes an
//! app requests in `begin`, and the list Shopify reports as granted in the
//! token response.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An ordered, de-duplicated list of OAuth scopes.
///
/// Order is preserved because the scopes are sent to Shopify comma-joined
/// exactly as configured, and the granted scope string is reported back
/// the same way.
///
/// # Serialization
///
/// `AuthScopes` serializes to and deserializes from a comma-separated string.
///
/// # Example
///
/// ```rust
/// use shopify_oauth::AuthScopes;
///
/// let scopes: AuthScopes = "write_products, read_orders, write_products".parse().unwrap();
/// assert_eq!(scopes.to_string(), "write_products,read_orders");
///
/// // write_products implies read_products when checking coverage
/// let required: AuthScopes = "read_products".parse().unwrap();
/// assert!(scopes.covers(&required));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthScopes {
    scopes: Vec<String>,
}

impl AuthScopes {
    /// Creates an empty scope list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns the number of scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns an iterator over the scopes in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    /// Returns `true` if every scope in `other` is granted by this list.
    ///
    /// `write_foo` implies `read_foo`, and `unauthenticated_write_foo`
    /// implies `unauthenticated_read_foo`.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        other.iter().all(|wanted| {
            self.iter()
                .any(|held| held == wanted || Self::implied_scope(held).as_deref() == Some(wanted))
        })
    }

    fn implied_scope(scope: &str) -> Option<String> {
        scope
            .strip_prefix("unauthenticated_write_")
            .map(|rest| format!("unauthenticated_read_{rest}"))
            .or_else(|| {
                scope
                    .strip_prefix("write_")
                    .map(|rest| format!("read_{rest}"))
            })
    }

    fn push_unique(&mut self, scope: &str) {
        if !self.scopes.iter().any(|s| s == scope) {
            self.scopes.push(scope.to_string());
        }
    }
}

impl FromStr for AuthScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = Self::new();

        for scope in s.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("Invalid characters in scope: '{scope}'"),
                });
            }
            scopes.push_unique(scope);
        }

        Ok(scopes)
    }
}

impl From<Vec<String>> for AuthScopes {
    fn from(scopes: Vec<String>) -> Self {
        let mut result = Self::new();
        for scope in scopes.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            result.push_unique(scope);
        }
        result
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scopes.join(","))
    }
}

impl Serialize for AuthScopes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AuthScopes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
