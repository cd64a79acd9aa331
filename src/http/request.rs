//! The inbound request handed to `callback`.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};

use crate::auth::oauth::cookie::CookieJar;
use crate::auth::oauth::{AuthQuery, OAuthError};

/// An inbound request, reduced to what the handshake reads.
///
/// `url` may be absolute or an origin-relative request target such as
/// `/auth/callback?shop=...`.
///
/// # Example
///
/// ```rust
/// use shopify_oauth::http::AuthRequest;
///
/// let request = AuthRequest::new("/auth/callback?shop=test.myshopify.com")
///     .with_cookie_header("shopify_app_state=123")
///     .unwrap();
///
/// assert_eq!(request.query().unwrap().shop(), Some("test.myshopify.com"));
/// assert_eq!(request.cookies().get("shopify_app_state"), Some("123"));
/// ```
#[derive(Clone, Debug)]
pub struct AuthRequest {
    /// The request URL or request target.
    pub url: String,
    /// The request headers.
    pub headers: HeaderMap,
}

impl AuthRequest {
    /// Creates a request with no headers.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Creates a request from a URL and existing headers.
    #[must_use]
    pub fn from_parts(url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            url: url.into(),
            headers,
        }
    }

    /// Appends a header.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidHeader`] if the value contains bytes not
    /// allowed in a header.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Result<Self, OAuthError> {
        let value = HeaderValue::from_str(value).map_err(|_| OAuthError::InvalidHeader {
            name: static_name(&name),
        })?;
        self.headers.append(name, value);
        Ok(self)
    }

    /// Appends a `Cookie` header.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidHeader`] if the value is not a valid header.
    pub fn with_cookie_header(self, value: &str) -> Result<Self, OAuthError> {
        self.with_header(COOKIE, value)
    }

    /// Parses the query parameters of the request URL.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidCallback`] if the URL cannot be parsed.
    pub fn query(&self) -> Result<AuthQuery, OAuthError> {
        AuthQuery::from_url(&self.url)
    }

    /// Returns the cookies sent with the request.
    #[must_use]
    pub fn cookies(&self) -> CookieJar {
        CookieJar::from_request_headers(&self.headers)
    }
}

fn static_name(name: &HeaderName) -> &'static str {
    if *name == COOKIE {
        "Cookie"
    } else {
        "request header"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_header_value() {
        let result = AuthRequest::new("/").with_cookie_header("a=1\nb=2");
        assert!(matches!(result, Err(OAuthError::InvalidHeader { name: "Cookie" })));
    }

    #[test]
    fn test_from_parts_keeps_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("x=1"));
        let request = AuthRequest::from_parts("https://app.example.com/auth/callback?code=c", headers);

        assert_eq!(request.cookies().get("x"), Some("1"));
        assert_eq!(request.query().unwrap().code(), Some("c"));
    }
}
