//! Engine configuration.
//!
//! Built once at startup and passed by reference to every request. Holds the
//! internal authentication secret and the tire fitment catalog; neither is
//! mutated afterwards.

use tracing::info;

use crate::errors::CalcResult;
use crate::fitment::FitmentCatalog;

/// Environment variable holding the shared internal key
pub const INTERNAL_KEY_ENV: &str = "PTP_INTERNAL_KEY";

/// Environment variable pointing at a replacement fitment catalog (TOML)
pub const CATALOG_PATH_ENV: &str = "PTP_TIRES_CATALOG";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Expected internal key. `None` means authentication is misconfigured and
    /// every authenticated route fails.
    pub internal_key: Option<String>,
    pub catalog: FitmentCatalog,
}

impl EngineConfig {
    pub fn new(internal_key: Option<String>, catalog: FitmentCatalog) -> Self {
        EngineConfig {
            internal_key: internal_key.filter(|k| !k.is_empty()),
            catalog,
        }
    }

    /// Configuration from the process environment
    pub fn from_env() -> CalcResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CalcResult<Self> {
        let catalog = match lookup(CATALOG_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            Some(path) => {
                info!(path = %path, "loading fitment catalog from file");
                FitmentCatalog::from_path(path.trim())?
            }
            None => FitmentCatalog::builtin()?,
        };

        let config = Self::new(lookup(INTERNAL_KEY_ENV), catalog);
        info!(
            internal_key_configured = config.internal_key.is_some(),
            vehicles = config.catalog.vehicles().count(),
            "engine configuration loaded"
        );
        Ok(config)
    }

    /// Same configuration with a different internal key
    pub fn with_internal_key(mut self, key: impl Into<String>) -> Self {
        self.internal_key = Some(key.into()).filter(|k| !k.is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_with_key_and_builtin_catalog() {
        let config = EngineConfig::from_lookup(|name| (name == INTERNAL_KEY_ENV).then(|| "secret".to_string())).unwrap();
        assert_eq!(config.internal_key.as_deref(), Some("secret"));
        assert_eq!(config.catalog, FitmentCatalog::builtin().unwrap());
    }

    #[test]
    fn test_empty_key_is_unset() {
        let config = EngineConfig::from_lookup(|_| Some(String::new())).unwrap();
        assert_eq!(config.internal_key, None);
    }

    #[test]
    fn test_missing_catalog_file_fails() {
        let err = EngineConfig::from_lookup(|name| {
            (name == CATALOG_PATH_ENV).then(|| "/nonexistent/catalog.toml".to_string())
        })
        .unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_with_internal_key() {
        let config = EngineConfig::new(None, FitmentCatalog::builtin().unwrap()).with_internal_key("k");
        assert_eq!(config.internal_key.as_deref(), Some("k"));
    }
}
