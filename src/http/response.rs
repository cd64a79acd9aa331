//! The response produced by `begin` and `complete_callback`.

use reqwest::header::{HeaderMap, HeaderValue, LOCATION, SET_COOKIE};
use reqwest::StatusCode;

use crate::auth::oauth::cookie::{CookieJar, SetCookie};
use crate::auth::oauth::OAuthError;
use crate::http::AuthRequest;

/// A response for the router to send: status, headers and optional body.
#[derive(Clone, Debug)]
pub struct AuthResponse {
    /// The HTTP status.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The response body, if any.
    pub body: Option<String>,
}

impl AuthResponse {
    /// Creates a `302 Found` redirect to `location`.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidHeader`] if `location` is not a valid
    /// header value.
    pub fn redirect(location: &str) -> Result<Self, OAuthError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            LOCATION,
            HeaderValue::from_str(location)
                .map_err(|_| OAuthError::InvalidHeader { name: "Location" })?,
        );
        Ok(Self {
            status: StatusCode::FOUND,
            headers,
            body: None,
        })
    }

    /// Appends a `Set-Cookie` header.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidHeader`] if the cookie renders to an
    /// invalid header value.
    pub fn add_cookie(&mut self, cookie: &SetCookie) -> Result<(), OAuthError> {
        let value = HeaderValue::from_str(&cookie.to_header_value())
            .map_err(|_| OAuthError::InvalidHeader { name: "Set-Cookie" })?;
        self.headers.append(SET_COOKIE, value);
        Ok(())
    }

    /// Returns the `Location` header.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    /// Returns every `Set-Cookie` header value.
    #[must_use]
    pub fn set_cookies(&self) -> Vec<&str> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Returns the cookies a browser would hold after receiving this
    /// response at `received_at`.
    #[must_use]
    pub fn cookie_jar(&self, received_at: chrono::DateTime<chrono::Utc>) -> CookieJar {
        CookieJar::from_set_cookie_headers(&self.headers, received_at)
    }

    /// Builds the request a browser sends when following the redirect to
    /// `url`, carrying this response's cookies.
    ///
    /// Useful for driving a handshake end to end in tests.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidHeader`] if the cookies cannot be encoded.
    pub fn follow_with_cookies(&self, url: impl Into<String>) -> Result<AuthRequest, OAuthError> {
        let jar = self.cookie_jar(chrono::Utc::now());
        let request = AuthRequest::new(url);
        if jar.is_empty() {
            return Ok(request);
        }
        request.with_cookie_header(&jar.to_cookie_header())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_sets_status_and_location() {
        let response = AuthResponse::redirect("https://example.com/next").unwrap();
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.location(), Some("https://example.com/next"));
        assert!(response.body.is_none());
        assert!(response.set_cookies().is_empty());
    }

    #[test]
    fn test_redirect_rejects_control_characters() {
        let result = AuthResponse::redirect("https://example.com/\r\nSet-Cookie: x=1");
        assert!(matches!(result, Err(OAuthError::InvalidHeader { name: "Location" })));
    }

    #[test]
    fn test_cookies_round_trip_into_follow_up_request() {
        let mut response = AuthResponse::redirect("/").unwrap();
        response.add_cookie(&SetCookie::new("a", "1")).unwrap();
        response.add_cookie(&SetCookie::new("b", "2")).unwrap();
        assert_eq!(response.set_cookies().len(), 2);

        let request = response.follow_with_cookies("/auth/callback").unwrap();
        let jar = request.cookies();
        assert_eq!(jar.get("a"), Some("1"));
        assert_eq!(jar.get("b"), Some("2"));
    }
}
