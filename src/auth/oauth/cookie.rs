//! Signed cookies carrying the OAuth state between `begin` and `callback`.
//!
//! A signed cookie is a pair: `name` holds the value and `name.sig` holds
//! `hmac_hex(secret, value)`. The value is trusted only after the signature
//! verifies. Both cookies live for [`STATE_COOKIE_MAX_AGE_SECS`] seconds.
//!
//! # Example
//!
//! ```rust
//! use shopify_oauth::auth::oauth::cookie::{signed_cookie, CookieJar, STATE_COOKIE_NAME};
//! use shopify_oauth::ApiSecretKey;
//!
//! let secret = ApiSecretKey::new("secret").unwrap();
//! let [value, signature] = signed_cookie(&secret, STATE_COOKIE_NAME, "123456789012345");
//!
//! let mut jar = CookieJar::new();
//! jar.insert(value.name, value.value);
//! jar.insert(signature.name, signature.value);
//!
//! let state = jar.verify_signed(&secret, STATE_COOKIE_NAME, chrono::Utc::now()).unwrap();
//! assert_eq!(state, "123456789012345");
//! ```

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, COOKIE, SET_COOKIE};

use crate::auth::oauth::hmac::{constant_time_compare, hmac_hex};
use crate::auth::oauth::OAuthError;
use crate::config::ApiSecretKey;

/// Name of the cookie holding the OAuth state nonce.
pub const STATE_COOKIE_NAME: &str = "shopify_app_state";

/// Suffix appended to a cookie name to form its signature cookie.
pub const SIGNATURE_SUFFIX: &str = ".sig";

/// Lifetime of the state cookie pair, in seconds.
pub const STATE_COOKIE_MAX_AGE_SECS: i64 = 600;

/// Returns the name of the signature cookie for `name`.
#[must_use]
pub fn signature_cookie_name(name: &str) -> String {
    format!("{name}{SIGNATURE_SUFFIX}")
}

/// A cookie to be sent in a `Set-Cookie` response header.
///
/// Always rendered with `Path=/`, `Secure`, `HttpOnly` and `SameSite=Lax`.
#[derive(Clone, PartialEq, Eq)]
pub struct SetCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// `Max-Age` in seconds. Zero tells the browser to delete the cookie.
    pub max_age: i64,
}

impl SetCookie {
    /// Creates a cookie with the state cookie lifetime.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: STATE_COOKIE_MAX_AGE_SECS,
        }
    }

    /// Creates a cookie that deletes `name` from the browser.
    #[must_use]
    pub fn removal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            max_age: 0,
        }
    }

    /// Renders the `Set-Cookie` header value.
    #[must_use]
    pub fn to_header_value(&self) -> String {
        format!(
            "{}={}; Max-Age={}; Path=/; Secure; HttpOnly; SameSite=Lax",
            self.name, self.value, self.max_age
        )
    }
}

impl fmt::Debug for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetCookie")
            .field("name", &self.name)
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

/// Builds the value cookie and its signature cookie.
#[must_use]
pub fn signed_cookie(secret: &ApiSecretKey, name: &str, value: &str) -> [SetCookie; 2] {
    [
        SetCookie::new(name, value),
        SetCookie::new(signature_cookie_name(name), hmac_hex(secret.as_ref(), value)),
    ]
}

/// Builds the pair of cookies that deletes a signed cookie.
#[must_use]
pub fn clear_signed_cookie(name: &str) -> [SetCookie; 2] {
    [
        SetCookie::removal(name),
        SetCookie::removal(signature_cookie_name(name)),
    ]
}

#[derive(Clone, PartialEq, Eq)]
struct CookieEntry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

/// Cookies visible to the callback.
///
/// Built from the `Cookie` headers of a browser request, or from the
/// `Set-Cookie` headers of an earlier response. The latter keeps each
/// cookie's `Max-Age` as an absolute expiry so an outlived cookie is
/// reported as expired instead of silently used.
#[derive(Clone, Default)]
pub struct CookieJar {
    cookies: HashMap<String, CookieEntry>,
}

impl CookieJar {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every `Cookie` request header. Later duplicates win.
    #[must_use]
    pub fn from_request_headers(headers: &HeaderMap) -> Self {
        let mut jar = Self::new();
        for header in headers.get_all(COOKIE) {
            // Neighbouring cookies may carry raw UTF-8; keep the other pairs
            let header = String::from_utf8_lossy(header.as_bytes());
            for pair in header.split(';') {
                if let Some((name, value)) = pair.trim().split_once('=') {
                    jar.insert(name.trim(), value.trim());
                }
            }
        }
        jar
    }

    /// Reads every `Set-Cookie` response header, as a browser receiving them
    /// at `received_at` would.
    ///
    /// `Max-Age` becomes an absolute expiry; a non-positive `Max-Age` removes
    /// the cookie.
    #[must_use]
    pub fn from_set_cookie_headers(headers: &HeaderMap, received_at: DateTime<Utc>) -> Self {
        let mut jar = Self::new();
        for header in headers.get_all(SET_COOKIE) {
            let header = String::from_utf8_lossy(header.as_bytes());
            let mut parts = header.split(';');
            let Some((name, value)) = parts.next().and_then(|pair| pair.trim().split_once('='))
            else {
                continue;
            };

            let max_age = parts.find_map(|attribute| {
                let (key, value) = attribute.trim().split_once('=')?;
                if key.eq_ignore_ascii_case("max-age") {
                    value.trim().parse::<i64>().ok()
                } else {
                    None
                }
            });

            match max_age {
                Some(secs) if secs <= 0 => {
                    jar.cookies.remove(name.trim());
                }
                Some(secs) => {
                    let expires_at = Duration::try_seconds(secs)
                        .and_then(|lifetime| received_at.checked_add_signed(lifetime));
                    jar.insert_with_expiry(name.trim(), value.trim(), expires_at);
                }
                None => jar.insert(name.trim(), value.trim()),
            }
        }
        jar
    }

    /// Adds a cookie with no known expiry.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.insert_with_expiry(name, value, None);
    }

    /// Adds a cookie that expires at `expires_at`.
    pub fn insert_with_expiry(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) {
        self.cookies.insert(
            name.into(),
            CookieEntry {
                value: value.into(),
                expires_at,
            },
        );
    }

    /// Returns the value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|entry| entry.value.as_str())
    }

    /// Returns `true` if the jar holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Renders the jar as a single `Cookie` request header value.
    #[must_use]
    pub fn to_cookie_header(&self) -> String {
        let mut pairs: Vec<String> = self
            .cookies
            .iter()
            .map(|(name, entry)| format!("{name}={}", entry.value))
            .collect();
        pairs.sort();
        pairs.join("; ")
    }

    /// Returns the value of signed cookie `name` once its signature verifies.
    ///
    /// # Errors
    ///
    /// - [`OAuthError::MissingCookie`]: `name` is absent or empty
    /// - [`OAuthError::MissingSignature`]: `name.sig` is absent or empty
    /// - [`OAuthError::ExpiredCookie`]: either cookie expired before `now`
    /// - [`OAuthError::SignatureMismatch`]: the signature does not match
    pub fn verify_signed(
        &self,
        secret: &ApiSecretKey,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<&str, OAuthError> {
        let value = self
            .cookies
            .get(name)
            .filter(|entry| !entry.value.is_empty())
            .ok_or_else(|| OAuthError::MissingCookie {
                name: name.to_string(),
            })?;

        let signature = self
            .cookies
            .get(&signature_cookie_name(name))
            .filter(|entry| !entry.value.is_empty())
            .ok_or_else(|| OAuthError::MissingSignature {
                name: name.to_string(),
            })?;

        let expired = |entry: &CookieEntry| entry.expires_at.is_some_and(|at| now >= at);
        if expired(value) || expired(signature) {
            return Err(OAuthError::ExpiredCookie {
                name: name.to_string(),
            });
        }

        let expected = hmac_hex(secret.as_ref(), &value.value);
        if !constant_time_compare(&expected, &signature.value) {
            return Err(OAuthError::SignatureMismatch {
                name: name.to_string(),
            });
        }

        Ok(&value.value)
    }
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.cookies.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("CookieJar").field("names", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn secret() -> ApiSecretKey {
        ApiSecretKey::new("test-secret").unwrap()
    }

    fn set_cookie_headers(cookies: &[SetCookie]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(
                SET_COOKIE,
                HeaderValue::from_str(&cookie.to_header_value()).unwrap(),
            );
        }
        headers
    }

    #[test]
    fn test_set_cookie_header_attributes() {
        let cookie = SetCookie::new(STATE_COOKIE_NAME, "123");
        assert_eq!(
            cookie.to_header_value(),
            "shopify_app_state=123; Max-Age=600; Path=/; Secure; HttpOnly; SameSite=Lax"
        );
        assert!(SetCookie::removal("x").to_header_value().starts_with("x=; Max-Age=0;"));
    }

    #[test]
    fn test_signed_cookie_signature_is_hmac_of_value() {
        let [value, signature] = signed_cookie(&secret(), STATE_COOKIE_NAME, "123456789012345");
        assert_eq!(value.name, "shopify_app_state");
        assert_eq!(signature.name, "shopify_app_state.sig");
        assert_eq!(signature.value, hmac_hex("test-secret", "123456789012345"));
        assert_eq!(signature.max_age, 600);
    }

    #[test]
    fn test_request_headers_parse_multiple_pairs() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1; shopify_app_state=42"));
        headers.append(COOKIE, HeaderValue::from_static("b=2"));

        let jar = CookieJar::from_request_headers(&headers);
        assert_eq!(jar.get("a"), Some("1"));
        assert_eq!(jar.get("shopify_app_state"), Some("42"));
        assert_eq!(jar.get("b"), Some("2"));
        assert_eq!(jar.to_cookie_header(), "a=1; b=2; shopify_app_state=42");
    }

    #[test]
    fn test_non_ascii_neighbour_cookie_keeps_state_pair() {
        let header = format!(
            "theme=café; {STATE_COOKIE_NAME}=987; {STATE_COOKIE_NAME}.sig={}",
            hmac_hex("test-secret", "987")
        );
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_bytes(header.as_bytes()).unwrap());

        let jar = CookieJar::from_request_headers(&headers);
        assert_eq!(jar.get("theme"), Some("café"));
        assert_eq!(
            jar.verify_signed(&secret(), STATE_COOKIE_NAME, Utc::now()).unwrap(),
            "987"
        );
    }

    #[test]
    fn test_non_ascii_set_cookie_is_still_read() {
        let mut headers = set_cookie_headers(&signed_cookie(&secret(), STATE_COOKIE_NAME, "987"));
        headers.append(
            SET_COOKIE,
            HeaderValue::from_bytes("theme=café; Max-Age=600".as_bytes()).unwrap(),
        );

        let now = Utc::now();
        let jar = CookieJar::from_set_cookie_headers(&headers, now);
        assert_eq!(jar.verify_signed(&secret(), STATE_COOKIE_NAME, now).unwrap(), "987");
        assert_eq!(jar.get("theme"), Some("café"));
    }

    #[test]
    fn test_verify_signed_accepts_valid_pair() {
        let now = Utc::now();
        let headers = set_cookie_headers(&signed_cookie(&secret(), STATE_COOKIE_NAME, "987"));
        let jar = CookieJar::from_set_cookie_headers(&headers, now);

        assert_eq!(jar.verify_signed(&secret(), STATE_COOKIE_NAME, now).unwrap(), "987");
    }

    #[test]
    fn test_verify_signed_reports_each_failure_distinctly() {
        let now = Utc::now();

        let empty = CookieJar::new();
        assert!(matches!(
            empty.verify_signed(&secret(), STATE_COOKIE_NAME, now),
            Err(OAuthError::MissingCookie { .. })
        ));

        let mut unsigned = CookieJar::new();
        unsigned.insert(STATE_COOKIE_NAME, "987");
        assert!(matches!(
            unsigned.verify_signed(&secret(), STATE_COOKIE_NAME, now),
            Err(OAuthError::MissingSignature { .. })
        ));

        let mut forged = unsigned.clone();
        forged.insert("shopify_app_state.sig", hmac_hex("wrong-secret", "987"));
        assert!(matches!(
            forged.verify_signed(&secret(), STATE_COOKIE_NAME, now),
            Err(OAuthError::SignatureMismatch { .. })
        ));
    }

    #[test]
    fn test_verify_signed_rejects_expired_pair() {
        let issued = Utc::now();
        let headers = set_cookie_headers(&signed_cookie(&secret(), STATE_COOKIE_NAME, "987"));
        let jar = CookieJar::from_set_cookie_headers(&headers, issued);

        let just_before = issued + Duration::seconds(599);
        assert!(jar.verify_signed(&secret(), STATE_COOKIE_NAME, just_before).is_ok());

        let after = issued + Duration::seconds(601);
        assert!(matches!(
            jar.verify_signed(&secret(), STATE_COOKIE_NAME, after),
            Err(OAuthError::ExpiredCookie { .. })
        ));
    }

    #[test]
    fn test_removal_cookies_clear_the_jar() {
        let now = Utc::now();
        let mut cookies = signed_cookie(&secret(), STATE_COOKIE_NAME, "987").to_vec();
        cookies.extend(clear_signed_cookie(STATE_COOKIE_NAME));

        let jar = CookieJar::from_set_cookie_headers(&set_cookie_headers(&cookies), now);
        assert!(jar.is_empty());
    }

    #[test]
    fn test_debug_does_not_print_values() {
        let mut jar = CookieJar::new();
        jar.insert(STATE_COOKIE_NAME, "123456789012345");
        let debug = format!("{jar:?}");
        assert!(debug.contains("shopify_app_state"));
        assert!(!debug.contains("123456789012345"));
    }
}
