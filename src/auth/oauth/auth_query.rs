//! Parsed query parameters of an OAuth callback.
//!
//! Shopify calls back with `shop`, `code`, `state`, `timestamp` and an
//! `hmac` signature (or `signature` for app proxy requests), plus any extra
//! parameters it chooses to add. [`AuthQuery`] keeps every parameter because
//! the signature covers all of them.
//!
//! Keys are stored in a `BTreeMap`, so iteration is always in byte order of
//! the key regardless of the order the parameters arrived in.
//!
//! # Example
//!
//! ```rust
//! use shopify_oauth::auth::oauth::{AuthQuery, QueryValue};
//!
//! let query = AuthQuery::from_query_str("shop=test.myshopify.com&code=abc&ids=1&ids=2");
//! assert_eq!(query.shop(), Some("test.myshopify.com"));
//! assert_eq!(query.get("ids"), Some(&QueryValue::Multi(vec!["1".into(), "2".into()])));
//! ```

use std::collections::btree_map::{self, BTreeMap};
use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::auth::oauth::OAuthError;

/// A single query parameter value: one string, or several for a repeated key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    /// A key that appeared once.
    Single(String),
    /// A key that appeared more than once, in arrival order.
    Multi(Vec<String>),
}

impl QueryValue {
    /// Returns the shape name used in type-mismatch errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Single(_) => "string",
            Self::Multi(_) => "array",
        }
    }

    /// Returns the value if it is a single string.
    #[must_use]
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multi(_) => None,
        }
    }

    /// Returns the value with array entries joined by commas.
    #[must_use]
    pub fn joined(&self) -> Cow<'_, str> {
        match self {
            Self::Single(value) => Cow::Borrowed(value),
            Self::Multi(values) => Cow::Owned(values.join(",")),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            Self::Single(first) => {
                let first = std::mem::take(first);
                *self = Self::Multi(vec![first, value]);
            }
            Self::Multi(values) => values.push(value),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}

/// Query parameters from an OAuth callback or app proxy request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthQuery {
    params: BTreeMap<String, QueryValue>,
}

impl AuthQuery {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a form-encoded query string, with or without a leading `?`.
    ///
    /// Repeated keys collapse into a [`QueryValue::Multi`].
    #[must_use]
    pub fn from_query_str(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params: BTreeMap<String, QueryValue> = BTreeMap::new();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match params.entry(key.into_owned()) {
                btree_map::Entry::Vacant(entry) => {
                    entry.insert(QueryValue::Single(value.into_owned()));
                }
                btree_map::Entry::Occupied(mut entry) => entry.get_mut().push(value.into_owned()),
            }
        }

        Self { params }
    }

    /// Parses the query component of an absolute URL or an origin-relative
    /// request target such as `/auth/callback?shop=...`.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidCallback`] if an absolute URL cannot be parsed.
    pub fn from_url(target: &str) -> Result<Self, OAuthError> {
        if target.starts_with('/') {
            let without_fragment = target.split('#').next().unwrap_or_default();
            let query = without_fragment
                .split_once('?')
                .map_or("", |(_, query)| query);
            return Ok(Self::from_query_str(query));
        }

        let url = url::Url::parse(target).map_err(|e| OAuthError::InvalidCallback {
            reason: format!("Unparsable callback URL: {e}"),
        })?;
        Ok(Self::from_query_str(url.query().unwrap_or_default()))
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.params.insert(key.into(), value.into());
    }

    /// Builder-style variant of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        self.params.remove(key)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.params.get(key)
    }

    /// Returns the value under `key` if it is a single non-empty string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(QueryValue::as_single)
            .filter(|value| !value.is_empty())
    }

    /// Returns the `shop` parameter.
    #[must_use]
    pub fn shop(&self) -> Option<&str> {
        self.get_str("shop")
    }

    /// Returns the `code` parameter.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.get_str("code")
    }

    /// Returns the `state` parameter.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.get_str("state")
    }

    /// Returns the `timestamp` parameter as Unix seconds.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidCallback`] if the parameter is missing or
    /// not an integer.
    pub fn timestamp(&self) -> Result<i64, OAuthError> {
        let raw = self
            .get_str("timestamp")
            .ok_or_else(|| OAuthError::InvalidCallback {
                reason: "Missing timestamp parameter".to_string(),
            })?;
        raw.trim().parse().map_err(|_| OAuthError::InvalidCallback {
            reason: format!("Invalid timestamp parameter: {raw}"),
        })
    }

    /// Iterates parameters in byte order of the key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.params.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for AuthQuery
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
