//! Config file parsing and validation.

use crate::api_defaults;
use crate::cache::filesystem::is_valid_cache_name;
use crate::error::SWError;
use crate::http::{resolve_url, Request};
use crate::time::Seconds;
use crate::Result;
use crate::log_debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub trait ConfigProperties {
    /// Origin the front-end is served from, e.g. `http://localhost:3000`.
    fn origin(&self) -> &str;
    fn cache_name(&self) -> &str {
        api_defaults::CACHE_NAME
    }
    fn offline_url(&self) -> &str {
        api_defaults::OFFLINE_URL
    }
    fn manifest(&self) -> Vec<String> {
        api_defaults::SEED_MANIFEST
            .iter()
            .map(|url| url.to_string())
            .collect()
    }
    fn cache_location(&self) -> Option<&str> {
        None
    }
    fn fetch_timeout(&self) -> Seconds {
        Seconds::try_from(api_defaults::DEFAULT_FETCH_TIMEOUT).unwrap_or_default()
    }
    fn notification_title(&self) -> &str {
        api_defaults::NOTIFICATION_TITLE
    }
    fn skip_waiting(&self) -> bool {
        true
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    origin: String,
    cache_name: String,
    offline_url: String,
    manifest: Vec<String>,
    cache_location: Option<String>,
    fetch_timeout: String,
    notification_title: String,
    skip_waiting: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            origin: api_defaults::DEFAULT_ORIGIN.to_string(),
            cache_name: api_defaults::CACHE_NAME.to_string(),
            offline_url: api_defaults::OFFLINE_URL.to_string(),
            manifest: api_defaults::SEED_MANIFEST
                .iter()
                .map(|url| url.to_string())
                .collect(),
            cache_location: None,
            fetch_timeout: api_defaults::DEFAULT_FETCH_TIMEOUT.to_string(),
            notification_title: api_defaults::NOTIFICATION_TITLE.to_string(),
            skip_waiting: true,
        }
    }
}

impl Config {
    pub fn new<T: Read>(mut reader: T) -> Result<Self> {
        let mut config_data = String::new();
        reader.read_to_string(&mut config_data)?;
        let config: Config = toml::from_str(&config_data)
            .map_err(|err| SWError::ConfigurationError(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config file at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log_debug!("Config file {} not found, using defaults", path.display());
            return Ok(Config::default());
        }
        let f = File::open(path)?;
        Config::new(f)
    }

    pub fn with_origin(self, origin: &str) -> Self {
        Config {
            origin: origin.to_string(),
            ..self
        }
    }

    pub fn with_cache_location(self, location: &str) -> Self {
        Config {
            cache_location: Some(location.to_string()),
            ..self
        }
    }

    fn validate(&self) -> Result<()> {
        if !Request::get(&self.origin).is_http() {
            return Err(SWError::UnsupportedScheme(format!(
                "origin must be an http(s) URL, got {}",
                self.origin
            ))
            .into());
        }
        if self.cache_name.trim().is_empty() {
            return Err(SWError::ConfigurationError("cache_name cannot be empty".to_string()).into());
        }
        if !is_valid_cache_name(&self.cache_name) {
            return Err(SWError::ConfigurationError(format!(
                "cache_name must be a plain directory name, got {:?}",
                self.cache_name
            ))
            .into());
        }
        if self.manifest.iter().any(|url| url.trim().is_empty()) {
            return Err(SWError::ConfigurationError(
                "manifest cannot contain empty URLs".to_string(),
            )
            .into());
        }
        // The offline page can only be served if install pre-caches it.
        let offline_url = resolve_url(&self.origin, &self.offline_url);
        if !self
            .manifest
            .iter()
            .any(|url| resolve_url(&self.origin, url) == offline_url)
        {
            return Err(SWError::ConfigurationError(format!(
                "offline_url {} must be listed in manifest",
                self.offline_url
            ))
            .into());
        }
        Seconds::try_from(self.fetch_timeout.as_str())?;
        Ok(())
    }
}

impl ConfigProperties for Config {
    fn origin(&self) -> &str {
        &self.origin
    }

    fn cache_name(&self) -> &str {
        &self.cache_name
    }

    fn offline_url(&self) -> &str {
        &self.offline_url
    }

    fn manifest(&self) -> Vec<String> {
        self.manifest.clone()
    }

    fn cache_location(&self) -> Option<&str> {
        self.cache_location.as_deref()
    }

    fn fetch_timeout(&self) -> Seconds {
        Seconds::try_from(self.fetch_timeout.as_str()).unwrap_or_default()
    }

    fn notification_title(&self) -> &str {
        &self.notification_title
    }

    fn skip_waiting(&self) -> bool {
        self.skip_waiting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_when_file_is_empty() {
        let config = Config::new("".as_bytes()).unwrap();
        assert_eq!("http://localhost:3000", config.origin());
        assert_eq!("ipstream-cache-v1", config.cache_name());
        assert_eq!("/offline.html", config.offline_url());
        assert_eq!(
            vec![
                "/offline.html",
                "/manifest.json",
                "/assets/js/config.js",
                "/config/config.json"
            ],
            config.manifest()
        );
        assert_eq!(None, config.cache_location());
        assert_eq!(Seconds::new(10), config.fetch_timeout());
        assert_eq!("IPStream Radio", config.notification_title());
        assert!(config.skip_waiting());
    }

    #[test]
    fn test_config_overrides() {
        let config_data = r#"
        origin = "https://radio.example.com"
        cache_name = "ipstream-cache-v2"
        cache_location = "/var/cache/ipso"
        fetch_timeout = "2m"
        manifest = ["/offline.html", "/manifest.json"]
        skip_waiting = false
        "#;
        let config = Config::new(config_data.as_bytes()).unwrap();
        assert_eq!("https://radio.example.com", config.origin());
        assert_eq!("ipstream-cache-v2", config.cache_name());
        assert_eq!(Some("/var/cache/ipso"), config.cache_location());
        assert_eq!(Seconds::new(120), config.fetch_timeout());
        assert_eq!(vec!["/offline.html", "/manifest.json"], config.manifest());
        assert!(!config.skip_waiting());
    }

    #[test]
    fn test_config_zero_timeout_disables_it() {
        let config = Config::new("fetch_timeout = \"0\"".as_bytes()).unwrap();
        assert_eq!(None, config.fetch_timeout().as_timeout());
    }

    #[test]
    fn test_config_invalid_origin_scheme_is_error() {
        let err = Config::new("origin = \"ftp://radio.example.com\"".as_bytes()).unwrap_err();
        match err.downcast_ref::<SWError>() {
            Some(SWError::UnsupportedScheme(_)) => (),
            _ => panic!("Expected UnsupportedScheme"),
        }
    }

    #[test]
    fn test_config_invalid_timeout_is_error() {
        let err = Config::new("fetch_timeout = \"10x\"".as_bytes()).unwrap_err();
        match err.downcast_ref::<SWError>() {
            Some(SWError::TimeConversionError(_)) => (),
            _ => panic!("Expected TimeConversionError"),
        }
    }

    #[test]
    fn test_config_malformed_toml_is_configuration_error() {
        let err = Config::new("origin = ".as_bytes()).unwrap_err();
        match err.downcast_ref::<SWError>() {
            Some(SWError::ConfigurationError(_)) => (),
            _ => panic!("Expected ConfigurationError"),
        }
    }

    #[test]
    fn test_config_empty_cache_name_is_error() {
        assert!(Config::new("cache_name = \"  \"".as_bytes()).is_err());
    }

    #[test]
    fn test_config_cache_name_must_be_a_directory_name() {
        for name in ["..", ".hidden", "caches/v1", "caches\\v1"] {
            let config_data = format!("cache_name = {name:?}");
            let err = Config::new(config_data.as_bytes()).unwrap_err();
            match err.downcast_ref::<SWError>() {
                Some(SWError::ConfigurationError(_)) => (),
                _ => panic!("Expected ConfigurationError for {name:?}"),
            }
        }
    }

    #[test]
    fn test_config_offline_url_must_be_in_manifest() {
        let config_data = r#"
        offline_url = "/sin-conexion.html"
        manifest = ["/offline.html", "/manifest.json"]
        "#;
        let err = Config::new(config_data.as_bytes()).unwrap_err();
        match err.downcast_ref::<SWError>() {
            Some(SWError::ConfigurationError(msg)) => assert!(msg.contains("/sin-conexion.html")),
            _ => panic!("Expected ConfigurationError"),
        }
    }

    #[test]
    fn test_config_offline_url_matches_absolute_manifest_entry() {
        let config_data = r#"
        origin = "https://radio.example.com"
        manifest = ["https://radio.example.com/offline.html"]
        "#;
        assert!(Config::new(config_data.as_bytes()).is_ok());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load(Path::new("/nonexistent/ipso/config.toml")).unwrap();
        assert_eq!("ipstream-cache-v1", config.cache_name());
    }
}
