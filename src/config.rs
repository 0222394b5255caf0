//! Configuration management for the Barbershop
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (barber.toml)
//! - Environment variables (BARBER__*)
//!
//! ## Example config file (barber.toml):
//! ```toml
//! [barbershop]
//! default_locale = "en-US"
//!
//! [render]
//! escape = "html"
//! strict = false
//!
//! [templates]
//! dir = "./templates"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine::EscapeMode;
use crate::error::Result;
use crate::locale::Locale;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BarberConfig {
    /// Registry settings
    #[serde(default)]
    pub barbershop: ShopConfig,

    /// Template execution settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Where template manifests live
    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Locale used when a requested locale has no template
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

/// Template execution configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RenderConfig {
    /// Escaping applied to substituted values
    #[serde(default)]
    pub escape: EscapeMode,

    /// Fail rendering when a referenced value is missing from the data
    #[serde(default)]
    pub strict: bool,
}

/// Template manifest location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesConfig {
    #[serde(default = "default_templates_dir")]
    pub dir: PathBuf,
}

fn default_locale() -> String {
    Locale::default().to_string()
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
        }
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: default_templates_dir(),
        }
    }
}

impl BarberConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["barber.toml", ".barber.toml", "config/barber.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "barber") {
            let xdg_config = config_dir.config_dir().join("barber.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("BARBER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// The configured default locale, parsed
    pub fn default_locale(&self) -> Result<Locale> {
        Locale::parse(&self.barbershop.default_locale)
    }

    /// Get the templates directory (resolves relative paths)
    pub fn templates_dir(&self) -> PathBuf {
        if self.templates.dir.is_absolute() {
            self.templates.dir.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.templates.dir)
        }
    }
}
