//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with FSTOP_)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! Secrets like SMTP passwords and the signing key belong in environment
//! variables, not in the config file.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Global application configuration
pub static APP_CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    RwLock::new(AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config file, using defaults: {}", e);
        AppConfig::default()
    }))
});

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub base_url: String,
    /// Users registering with this email receive the Admin role.
    pub admin_email: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "fstop".to_string(),
            base_url: "http://localhost:8080".to_string(),
            admin_email: "admin@example.com".to_string(),
        }
    }
}

/// Upload and image variant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory where photos and their resized variants are stored
    pub path: String,
    /// Maximum upload size in MB
    pub max_upload_size_mb: u32,
    /// Width of the small variant in pixels
    pub small_width: u32,
    /// Width of the medium variant in pixels
    pub medium_width: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            path: "./uploads".to_string(),
            max_upload_size_mb: 3,
            small_width: 400,
            medium_width: 800,
        }
    }
}

/// Pagination limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub photos_per_page: u64,
    pub users_per_page: u64,
    pub comments_per_page: u64,
    pub notifications_per_page: u64,
    pub search_results_per_page: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            photos_per_page: 12,
            users_per_page: 20,
            comments_per_page: 15,
            notifications_per_page: 20,
            search_results_per_page: 20,
        }
    }
}

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// SMTP server host
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// Use TLS for SMTP
    pub smtp_tls: bool,
    /// SMTP username (if required)
    pub smtp_username: String,
    /// SMTP password (should be in env var FSTOP_EMAIL_SMTP_PASSWORD)
    #[serde(default)]
    pub smtp_password: String,
    /// From address for emails
    pub from_address: String,
    /// From name for emails
    pub from_name: String,
    /// Log emails instead of sending them
    pub mock: bool,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_tls: true,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: "noreply@localhost".to_string(),
            from_name: "fstop".to_string(),
            mock: false,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub uploads: UploadConfig,
    pub limits: LimitsConfig,
    pub email: EmailConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        let config = Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file (optional)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // Override with environment variables (FSTOP_ prefix)
            // e.g., FSTOP_SITE_ADMIN_EMAIL, FSTOP_UPLOADS_PATH
            .add_source(
                Environment::with_prefix("FSTOP")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

/// Initialize application configuration
///
/// Triggers the lazy loading of the config file and logs the result.
/// Should be called early in application startup.
pub fn init() {
    let config = APP_CONFIG.read().unwrap();
    log::info!("Configuration loaded: site.name = {}", config.site.name);
}

// Convenience functions for accessing global config

/// Get the current application configuration
pub fn get_config() -> AppConfig {
    APP_CONFIG.read().map(|c| c.clone()).unwrap_or_default()
}

/// Get site configuration
pub fn site() -> SiteConfig {
    get_config().site
}

/// Get upload configuration
pub fn uploads() -> UploadConfig {
    get_config().uploads
}

/// Get limits configuration
pub fn limits() -> LimitsConfig {
    get_config().limits
}

/// Get email configuration
pub fn email() -> EmailConfig {
    get_config().email
}
