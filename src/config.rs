use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::locale::Locale;
use crate::media::MAX_IMAGES;

/// Configuration for the reel client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote API settings
    pub api: ApiConfig,

    /// Status polling settings
    pub polling: PollingConfig,

    /// Presentation settings
    pub ui: UiConfig,

    /// Optional form features
    pub features: FeatureConfig,

    /// Image intake limits
    pub media: MediaConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the generation service
    pub base_url: String,

    /// Endpoint layout the service speaks
    pub profile: ApiProfile,

    /// Per-request timeout in seconds (none by default)
    pub request_timeout_seconds: Option<u64>,
}

/// Endpoint layouts the service has exposed over time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiProfile {
    /// `POST /api/reels/website`, `GET /api/jobs/{id}`
    Legacy,
    /// `POST /api/website`, `GET /jobs/{id}`
    #[default]
    Website,
}

impl ApiProfile {
    pub fn create_path(self) -> &'static str {
        match self {
            ApiProfile::Legacy => "/api/reels/website",
            ApiProfile::Website => "/api/website",
        }
    }

    pub fn status_path(self, job_id: &str) -> String {
        let id = urlencoding::encode(job_id);
        match self {
            ApiProfile::Legacy => format!("/api/jobs/{}", id),
            ApiProfile::Website => format!("/jobs/{}", id),
        }
    }
}

impl std::str::FromStr for ApiProfile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(ApiProfile::Legacy),
            "website" => Ok(ApiProfile::Website),
            other => Err(format!("unknown API profile: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay between status requests in milliseconds
    pub interval_ms: u64,

    /// Status requests before giving up
    pub max_attempts: u32,
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Interface language
    pub locale: Locale,

    /// Content language sent when the form leaves it empty
    pub default_language: Option<String>,

    /// Origin the demo-site shortcuts are resolved against
    pub demo_origin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Accept images for the `media` field
    pub file_upload: bool,

    /// Accept a logo
    pub logo_upload: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Maximum images per submission
    pub max_images: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when RUST_LOG is unset
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://instagramreelposter-production.up.railway.app".to_string(),
            profile: ApiProfile::Website,
            request_timeout_seconds: None,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 3000, // 3 seconds
            max_attempts: 120, // 6 minutes max
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            locale: Locale::En,
            default_language: None,
            demo_origin: "https://reelberlin-demo-production.up.railway.app".to_string(),
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            file_upload: true,
            logo_upload: true,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self { max_images: MAX_IMAGES }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            polling: PollingConfig::default(),
            ui: UiConfig::default(),
            features: FeatureConfig::default(),
            media: MediaConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, then the environment
    pub fn load() -> Result<Self> {
        let mut config_paths = vec![
            PathBuf::from("reel-client.toml"),
            PathBuf::from("config/reel-client.toml"),
        ];
        if let Ok(home) = std::env::var("HOME") {
            config_paths.push(PathBuf::from(home).join(".config/reel-client/config.toml"));
        }

        Self::load_first(&config_paths)
    }

    /// Load the first readable file of `config_paths`, then the environment.
    ///
    /// Files that fail to parse are reported and skipped.
    pub fn load_first(config_paths: &[PathBuf]) -> Result<Self> {
        for path in config_paths {
            if !path.exists() {
                continue;
            }
            match Self::load_from(path) {
                Ok(config) => {
                    tracing::info!("📄 Loaded configuration from: {}", path.display());
                    return Ok(config.with_env_overrides());
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from a specific TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::default().with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = std::env::var("REEL_CLIENT_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(profile) = std::env::var("REEL_CLIENT_PROFILE") {
            match profile.parse() {
                Ok(profile) => self.api.profile = profile,
                Err(e) => tracing::warn!("Ignoring REEL_CLIENT_PROFILE: {}", e),
            }
        }

        if let Ok(locale) = std::env::var("REEL_CLIENT_LOCALE") {
            match locale.parse() {
                Ok(locale) => self.ui.locale = locale,
                Err(e) => tracing::warn!("Ignoring REEL_CLIENT_LOCALE: {}", e),
            }
        }

        if let Ok(interval) = std::env::var("REEL_CLIENT_POLL_INTERVAL_MS") {
            self.polling.interval_ms = interval.parse().unwrap_or(3000);
        }

        if let Ok(attempts) = std::env::var("REEL_CLIENT_MAX_ATTEMPTS") {
            self.polling.max_attempts = attempts.parse().unwrap_or(120);
        }

        if let Ok(log_level) = std::env::var("REEL_CLIENT_LOG_LEVEL") {
            self.logging.log_level = log_level;
        }

        self
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.api.base_url)
            .map_err(|e| anyhow!("Invalid api.base_url {}: {}", self.api.base_url, e))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(anyhow!("api.base_url must be http or https"));
        }

        Url::parse(&self.ui.demo_origin)
            .map_err(|e| anyhow!("Invalid ui.demo_origin {}: {}", self.ui.demo_origin, e))?;

        if self.polling.max_attempts == 0 {
            return Err(anyhow!("max_attempts must be greater than 0"));
        }

        if self.media.max_images == 0 {
            return Err(anyhow!("max_images must be greater than 0"));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Polling ceiling: interval times attempts
    pub fn poll_ceiling(&self) -> Duration {
        self.polling.interval() * self.polling.max_attempts
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Reel Client Configuration:\n\
            - API: {} ({:?})\n\
            - Poll interval: {}ms x {} attempts\n\
            - Locale: {}\n\
            - Image upload: {} (max {})\n\
            - Logo upload: {}",
            self.api.base_url,
            self.api.profile,
            self.polling.interval_ms,
            self.polling.max_attempts,
            self.ui.locale,
            self.features.file_upload,
            self.media.max_images,
            self.features.logo_upload
        )
    }

    /// Join a demo-site path onto the configured demo origin
    pub fn demo_url(&self, path: &str) -> Result<String> {
        let origin = Url::parse(&self.ui.demo_origin)?;
        Ok(origin.join(path)?.to_string())
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.api.base_url = base_url.into();
        self
    }

    pub fn with_profile(mut self, profile: ApiProfile) -> Self {
        self.config.api.profile = profile;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.polling.interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.config.polling.max_attempts = attempts;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.config.ui.locale = locale;
        self
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.config.ui.default_language = Some(language.into());
        self
    }

    pub fn enable_file_upload(mut self, enable: bool) -> Self {
        self.config.features.file_upload = enable;
        self
    }

    pub fn enable_logo_upload(mut self, enable: bool) -> Self {
        self.config.features.logo_upload = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.polling.interval_ms, 3000);
        assert_eq!(config.polling.max_attempts, 120);
        assert_eq!(config.poll_ceiling(), Duration::from_secs(360));
        assert_eq!(config.media.max_images, 5);
        assert_eq!(config.api.profile, ApiProfile::Website);
        assert!(config.api.request_timeout_seconds.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_base_url("http://127.0.0.1:8080")
            .with_profile(ApiProfile::Legacy)
            .with_poll_interval(Duration::from_millis(10))
            .with_locale(Locale::De)
            .enable_logo_upload(false)
            .build();

        assert_eq!(config.api.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.api.profile, ApiProfile::Legacy);
        assert_eq!(config.polling.interval_ms, 10);
        assert_eq!(config.ui.locale, Locale::De);
        assert!(config.features.file_upload);
        assert!(!config.features.logo_upload);
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());

        let config = ConfigBuilder::new().with_base_url("not a url").build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new().with_base_url("ftp://example.com").build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new().with_max_attempts(0).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            profile = "legacy"

            [ui]
            locale = "de"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.profile, ApiProfile::Legacy);
        assert_eq!(config.ui.locale, Locale::De);
        assert_eq!(config.polling.max_attempts, 120);
        assert!(config.api.base_url.starts_with("https://"));
    }

    #[test]
    fn test_save_and_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("reel-client.toml");
        let config = ConfigBuilder::new().with_default_language("de").build();

        config.save(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded.ui.default_language.as_deref(), Some("de"));
    }

    #[test]
    fn test_load_first_skips_unparseable_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[polling]\nmax_attempts = \"lots\"\n").unwrap();
        let good = dir.path().join("good.toml");
        ConfigBuilder::new().with_default_language("fr").build().save(&good).unwrap();

        let missing = dir.path().join("missing.toml");
        let config = Config::load_first(&[missing, broken, good]).unwrap();

        assert_eq!(config.ui.default_language.as_deref(), Some("fr"));
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(ApiProfile::Legacy.create_path(), "/api/reels/website");
        assert_eq!(ApiProfile::Legacy.status_path("abc"), "/api/jobs/abc");
        assert_eq!(ApiProfile::Website.create_path(), "/api/website");
        assert_eq!(ApiProfile::Website.status_path("a b/c"), "/jobs/a%20b%2Fc");
    }

    #[test]
    fn test_demo_url() {
        let config = Config::default();
        assert_eq!(
            config.demo_url("/demos/cafe.html").unwrap(),
            "https://reelberlin-demo-production.up.railway.app/demos/cafe.html"
        );
    }
}
