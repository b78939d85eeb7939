//! Configuration management for kdocs.
//!
//! Parses `kdocs.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `analytics.tracking_id`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override analytics tracking ID.
    pub tracking_id: Option<String>,
    /// Override project directory (where consent state is stored).
    pub project_dir: Option<PathBuf>,
    /// Override analytics enabled flag.
    pub analytics_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "kdocs.toml";

/// Browsers cap cookie lifetimes at 400 days.
const MAX_AGE_DAYS_LIMIT: u32 = 400;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Analytics configuration.
    pub analytics: AnalyticsConfig,
    /// Consent persistence configuration.
    pub consent: ConsentConfig,
    /// Consent banner text and placement.
    pub banner: BannerConfig,

    /// Project directory for kdocs data (.kdocs/), set after loading.
    #[serde(skip)]
    pub project_dir: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Analytics configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Whether analytics may be bootstrapped at all.
    pub enabled: bool,
    /// Google Analytics measurement ID (e.g. `G-J507K728FR`).
    pub tracking_id: Option<String>,
    /// Send a consent event right after bootstrapping.
    pub send_consent_event: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tracking_id: None,
            send_consent_event: true,
        }
    }
}

/// Consent persistence configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ConsentConfig {
    /// Key (cookie name) holding the consent record.
    pub storage_key: String,
    /// Cookie path attribute.
    pub cookie_path: String,
    /// Lifetime of a recorded decision in days.
    pub max_age_days: u32,
    /// Cookie `SameSite` attribute (`Lax`, `Strict`, or `None`).
    pub same_site: String,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            storage_key: "CookieConsent".to_owned(),
            cookie_path: "/".to_owned(),
            max_age_days: 365,
            same_site: "Lax".to_owned(),
        }
    }
}

impl ConsentConfig {
    /// Decision lifetime in seconds.
    #[must_use]
    pub fn max_age_secs(&self) -> u64 {
        u64::from(self.max_age_days) * 24 * 60 * 60
    }
}

/// Consent banner configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    /// Banner message.
    pub message: String,
    /// Accept button label.
    pub accept_text: String,
    /// Decline button label.
    pub decline_text: String,
    /// Footer link label that reopens the banner.
    pub reset_text: String,
    /// Banner placement (`top` or `bottom`).
    pub location: String,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            message: "This website uses cookies for analytics to enhance your experience. \
                      Click \u{2018}Accept\u{2019} to consent to Google Analytics."
                .to_owned(),
            accept_text: "Accept".to_owned(),
            decline_text: "Decline".to_owned(),
            reset_text: "Analytics Consent".to_owned(),
            location: "bottom".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`analytics.tracking_id`").
        field: String,
        /// Error message (e.g., "${`GA_ID`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a field to be one of the allowed values (case-insensitive).
fn require_one_of(value: &str, allowed: &[&str], field: &str) -> Result<(), ConfigError> {
    if allowed.iter().any(|a| a.eq_ignore_ascii_case(value)) {
        return Ok(());
    }
    Err(ConfigError::Validation(format!(
        "{field} must be one of: {}",
        allowed.join(", ")
    )))
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `kdocs.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values. The merged result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(tracking_id) = &settings.tracking_id {
            self.analytics.tracking_id = Some(tracking_id.clone());
        }
        if let Some(project_dir) = &settings.project_dir {
            self.project_dir.clone_from(project_dir);
        }
        if let Some(enabled) = settings.analytics_enabled {
            self.analytics.enabled = enabled;
        }
    }

    /// Directory holding persisted consent records (.kdocs/consent/).
    #[must_use]
    pub fn consent_dir(&self) -> PathBuf {
        self.project_dir.join("consent")
    }

    /// Tracking ID to bootstrap, if analytics is enabled and configured.
    #[must_use]
    pub fn active_tracking_id(&self) -> Option<&str> {
        if self.analytics.enabled {
            self.analytics.tracking_id.as_deref()
        } else {
            None
        }
    }

    /// Get the tracking ID for commands that need analytics.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if analytics is disabled or no
    /// tracking ID is configured.
    pub fn require_tracking_id(&self) -> Result<&str, ConfigError> {
        if !self.analytics.enabled {
            return Err(ConfigError::Validation(
                "analytics is disabled (analytics.enabled = false)".to_owned(),
            ));
        }
        self.analytics.tracking_id.as_deref().ok_or_else(|| {
            ConfigError::Validation("analytics.tracking_id required in config".to_owned())
        })
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            analytics: AnalyticsConfig::default(),
            consent: ConsentConfig::default(),
            banner: BannerConfig::default(),
            project_dir: base.join(".kdocs"),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before validation
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.project_dir = config_dir.join(".kdocs");
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_analytics()?;
        self.validate_consent()?;
        self.validate_banner()?;
        Ok(())
    }

    /// Validate analytics configuration.
    fn validate_analytics(&self) -> Result<(), ConfigError> {
        if let Some(ref tracking_id) = self.analytics.tracking_id {
            require_non_empty(tracking_id, "analytics.tracking_id")?;
            if !tracking_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
            {
                return Err(ConfigError::Validation(
                    "analytics.tracking_id may only contain letters, digits, and '-'".to_owned(),
                ));
            }
        }
        Ok(())
    }

    /// Validate consent configuration.
    fn validate_consent(&self) -> Result<(), ConfigError> {
        let consent = &self.consent;

        require_non_empty(&consent.storage_key, "consent.storage_key")?;
        if !consent
            .storage_key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            || consent.storage_key.starts_with('.')
        {
            return Err(ConfigError::Validation(
                "consent.storage_key may only contain letters, digits, '_', '-', and '.'"
                    .to_owned(),
            ));
        }

        if !consent.cookie_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "consent.cookie_path must start with /".to_owned(),
            ));
        }
        // RFC 6265 path-value: any CHAR except CTLs or ';'
        if consent
            .cookie_path
            .chars()
            .any(|c| c == ';' || c.is_ascii_control() || !c.is_ascii())
        {
            return Err(ConfigError::Validation(
                "consent.cookie_path must be printable ASCII without ';'".to_owned(),
            ));
        }

        if consent.max_age_days == 0 {
            return Err(ConfigError::Validation(
                "consent.max_age_days must be greater than 0".to_owned(),
            ));
        }
        if consent.max_age_days > MAX_AGE_DAYS_LIMIT {
            return Err(ConfigError::Validation(format!(
                "consent.max_age_days cannot exceed {MAX_AGE_DAYS_LIMIT}"
            )));
        }

        require_one_of(
            &consent.same_site,
            &["Lax", "Strict", "None"],
            "consent.same_site",
        )
    }

    /// Validate banner configuration.
    fn validate_banner(&self) -> Result<(), ConfigError> {
        let banner = &self.banner;
        require_non_empty(&banner.message, "banner.message")?;
        require_non_empty(&banner.accept_text, "banner.accept_text")?;
        require_non_empty(&banner.decline_text, "banner.decline_text")?;
        require_non_empty(&banner.reset_text, "banner.reset_text")?;
        if !matches!(banner.location.as_str(), "top" | "bottom") {
            return Err(ConfigError::Validation(
                "banner.location must be \"top\" or \"bottom\"".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref tracking_id) = self.analytics.tracking_id {
            self.analytics.tracking_id =
                Some(expand::expand_env(tracking_id, "analytics.tracking_id")?);
        }
        Ok(())
    }
}
