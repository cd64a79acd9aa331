//! Validated newtype wrappers for configuration values.
//!
//! Each wrapper checks its contents on construction, so a handshake never
//! starts with an empty credential or a host that cannot form a redirect URI.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A validated Shopify API key (the OAuth `client_id`).
///
/// # Example
///
/// ```rust
/// use shopify_oauth::ApiKey;
///
/// let key = ApiKey::new("my-api-key").unwrap();
/// assert_eq!(key.as_ref(), "my-api-key");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new validated API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated Shopify API secret key.
///
/// The secret signs the state cookie and verifies callback HMACs. Its
/// `Debug` output is masked so it cannot leak through logs or error chains.
///
/// ```rust
/// use shopify_oauth::ApiSecretKey;
///
/// let secret = ApiSecretKey::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "ApiSecretKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSecretKey(String);

impl ApiSecretKey {
    /// Creates a new validated API secret key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiSecretKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiSecretKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiSecretKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiSecretKey(*****)")
    }
}

/// A validated Shopify shop domain.
///
/// Short names are normalized to the full `shop.myshopify.com` form, which is
/// what the authorize and token endpoints are built from.
///
/// ```rust
/// use shopify_oauth::ShopDomain;
///
/// let domain = ShopDomain::new("my-store").unwrap();
/// assert_eq!(domain.as_ref(), "my-store.myshopify.com");
/// assert_eq!(domain.shop_name(), "my-store");
///
/// let json = serde_json::to_string(&domain).unwrap();
/// assert_eq!(json, r#""my-store.myshopify.com""#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShopDomain {
    full_domain: String,
    shop_name_end: usize,
}

impl ShopDomain {
    const SUFFIX: &'static str = ".myshopify.com";

    /// Creates a new validated shop domain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] if the domain is invalid.
    pub fn new(domain: impl Into<String>) -> Result<Self, ConfigError> {
        let domain = domain.into().trim().to_lowercase();

        let (shop_name, full_domain) = if let Some(name) = domain.strip_suffix(Self::SUFFIX) {
            (name.to_string(), domain)
        } else if domain.contains('.') {
            return Err(ConfigError::InvalidShopDomain { domain });
        } else {
            (domain.clone(), format!("{domain}{}", Self::SUFFIX))
        };

        if !Self::is_valid_shop_name(&shop_name) {
            return Err(ConfigError::InvalidShopDomain {
                domain: full_domain,
            });
        }

        Ok(Self {
            shop_name_end: shop_name.len(),
            full_domain,
        })
    }

    /// Returns the shop name portion of the domain.
    #[must_use]
    pub fn shop_name(&self) -> &str {
        &self.full_domain[..self.shop_name_end]
    }

    // Lowercase letters, digits and inner hyphens only.
    fn is_valid_shop_name(name: &str) -> bool {
        !name.is_empty()
            && !name.starts_with('-')
            && !name.ends_with('-')
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.full_domain
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_domain)
    }
}

impl Serialize for ShopDomain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.full_domain)
    }
}

impl<'de> Deserialize<'de> for ShopDomain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// The public host name of the app, optionally with a port.
///
/// Combined with a [`HostScheme`] and a callback path it forms the OAuth
/// `redirect_uri`, so it must not carry a scheme, path or query of its own.
///
/// ```rust
/// use shopify_oauth::HostName;
///
/// assert!(HostName::new("myapp.example.com").is_ok());
/// assert!(HostName::new("localhost:3000").is_ok());
/// assert!(HostName::new("https://myapp.example.com").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostName(String);

impl HostName {
    /// Creates a new validated host name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHostName`] if the value is empty or
    /// contains a scheme, path, query, fragment or whitespace.
    pub fn new(host: impl Into<String>) -> Result<Self, ConfigError> {
        let host = host.into().trim().to_string();

        let invalid = host.is_empty()
            || host.contains("://")
            || host
                .chars()
                .any(|c| matches!(c, '/' | '?' | '#' | '@') || c.is_whitespace());
        if invalid {
            return Err(ConfigError::InvalidHostName { host });
        }

        Ok(Self(host))
    }
}

impl AsRef<str> for HostName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The scheme the app is served over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HostScheme {
    /// Plain HTTP, for local development tunnels.
    Http,
    /// HTTPS.
    #[default]
    Https,
}

impl HostScheme {
    /// Returns the scheme as it appears in a URL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for HostScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            _ => Err(ConfigError::InvalidHostScheme {
                scheme: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_rejects_empty_string() {
        assert!(matches!(ApiKey::new(""), Err(ConfigError::EmptyApiKey)));
        assert!(matches!(ApiKey::new("   "), Err(ConfigError::EmptyApiKey)));
    }

    #[test]
    fn test_api_secret_key_masks_value_in_debug() {
        let secret = ApiSecretKey::new("super-secret-key").unwrap();
        let debug_output = format!("{secret:?}");
        assert_eq!(debug_output, "ApiSecretKey(*****)");
        assert!(!debug_output.contains("super-secret-key"));
    }

    #[test]
    fn test_api_secret_key_rejects_empty_string() {
        assert!(matches!(
            ApiSecretKey::new(""),
            Err(ConfigError::EmptyApiSecretKey)
        ));
    }

    #[test]
    fn test_shop_domain_normalizes_short_format() {
        let domain = ShopDomain::new("my-store").unwrap();
        assert_eq!(domain.as_ref(), "my-store.myshopify.com");
        assert_eq!(domain.shop_name(), "my-store");
    }

    #[test]
    fn test_shop_domain_accepts_full_format() {
        let domain = ShopDomain::new("test.myshopify.com").unwrap();
        assert_eq!(domain.as_ref(), "test.myshopify.com");
        assert_eq!(domain.shop_name(), "test");
        assert_eq!(domain.to_string(), "test.myshopify.com");
    }

    #[test]
    fn test_shop_domain_rejects_invalid_domains() {
        assert!(ShopDomain::new("").is_err());
        assert!(ShopDomain::new("my store").is_err());
        assert!(ShopDomain::new("my_store").is_err());
        assert!(ShopDomain::new("MY-STORE").is_ok());
        assert!(ShopDomain::new("-my-store").is_err());
        assert!(ShopDomain::new("my-store-").is_err());
        assert!(ShopDomain::new("my-store.otherdomain.com").is_err());
        assert!(ShopDomain::new("evil.com/.myshopify.com").is_err());
    }

    #[test]
    fn test_shop_domain_deserialization_validates() {
        let domain: ShopDomain = serde_json::from_str(r#""test-shop.myshopify.com""#).unwrap();
        assert_eq!(domain.shop_name(), "test-shop");

        let result: Result<ShopDomain, _> = serde_json::from_str(r#""not a shop""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_host_name_accepts_host_and_port() {
        assert_eq!(
            HostName::new(" myapp.example.com ").unwrap().as_ref(),
            "myapp.example.com"
        );
        assert_eq!(
            HostName::new("localhost:3000").unwrap().as_ref(),
            "localhost:3000"
        );
    }

    #[test]
    fn test_host_name_rejects_urls_and_paths() {
        assert!(HostName::new("").is_err());
        assert!(HostName::new("https://myapp.example.com").is_err());
        assert!(HostName::new("myapp.example.com/auth").is_err());
        assert!(HostName::new("myapp.example.com?x=1").is_err());
        assert!(HostName::new("my app.example.com").is_err());
    }

    #[test]
    fn test_host_scheme_parses_http_and_https_only() {
        assert_eq!("http".parse::<HostScheme>().unwrap(), HostScheme::Http);
        assert_eq!("HTTPS".parse::<HostScheme>().unwrap(), HostScheme::Https);
        assert!(matches!(
            "ftp".parse::<HostScheme>(),
            Err(ConfigError::InvalidHostScheme { .. })
        ));
        assert_eq!(HostScheme::default(), HostScheme::Https);
        assert_eq!(HostScheme::Http.to_string(), "http");
    }
}
