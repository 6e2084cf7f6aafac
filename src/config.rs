//! Pinterest client configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{SlideshowError, SlideshowResult};

pub const ACCESS_TOKEN_VAR: &str = "PINTEREST_ACCESS_TOKEN";
pub const DEFAULT_API_BASE_URL: &str = "https://api.pinterest.com/v5";
pub const DEFAULT_CACHE_DIR: &str = "cache/images";

/// Settings for talking to the Pinterest API, passed explicitly into the
/// remote pipeline.
#[derive(Clone)]
pub struct PinterestConfig {
    /// Bearer token for the v5 API
    pub access_token: String,
    /// API root, without trailing slash
    pub api_base_url: String,
    /// Where downloaded pins are written
    pub cache_dir: PathBuf,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl std::fmt::Debug for PinterestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinterestConfig")
            .field("access_token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("cache_dir", &self.cache_dir)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl PinterestConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Create config from environment variables.
    ///
    /// Only the access token is required; a missing token is a configuration
    /// error reported before any network traffic.
    pub fn from_env() -> SlideshowResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SlideshowResult<Self> {
        let access_token = lookup(ACCESS_TOKEN_VAR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SlideshowError::CredentialNotFound(ACCESS_TOKEN_VAR.to_string()))?;

        let mut config = Self::new(access_token);
        if let Some(url) = lookup("PINTEREST_API_BASE_URL").filter(|s| !s.is_empty()) {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(dir) = lookup("PINTEREST_CACHE_DIR").filter(|s| !s.is_empty()) {
            config.cache_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup("PINTEREST_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            config.request_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_token_is_a_not_found_error() {
        let err = PinterestConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains(ACCESS_TOKEN_VAR));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let err = PinterestConfig::from_lookup(lookup(&[(ACCESS_TOKEN_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, SlideshowError::CredentialNotFound(_)));
    }

    #[test]
    fn defaults_apply_when_only_token_is_set() {
        let config = PinterestConfig::from_lookup(lookup(&[(ACCESS_TOKEN_VAR, "abc")])).unwrap();
        assert_eq!(config.access_token, "abc");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.cache_dir, PathBuf::from(DEFAULT_CACHE_DIR));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_read() {
        let config = PinterestConfig::from_lookup(lookup(&[
            (ACCESS_TOKEN_VAR, "abc"),
            ("PINTEREST_API_BASE_URL", "http://localhost:9000/v5/"),
            ("PINTEREST_CACHE_DIR", "/tmp/pins"),
            ("PINTEREST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "http://localhost:9000/v5");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/pins"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn debug_output_hides_token() {
        let config = PinterestConfig::new("secret-token");
        assert!(!format!("{config:?}").contains("secret-token"));
    }
}
