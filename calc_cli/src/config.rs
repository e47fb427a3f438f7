//! Layered configuration for the `reckon` command.
//!
//! Sources, lowest precedence first:
//! - Built-in defaults
//! - `reckon.toml` in the working directory, or the file given with `--config`
//! - `RECKON_` environment variables
//! - Command-line flags (applied by the caller)
//!
//! # Environment Variables
//!
//! Double underscores separate nested levels:
//! - `RECKON_OUTPUT__LOCALE=de` sets `output.locale`
//! - `RECKON_CALCULATORS__ROOFING__BUNDLES_PER_SQUARE=4` sets
//!   `calculators.roofing.bundles_per_square`
//!
//! # Example
//!
//! ```toml
//! [logging]
//! default = "info"
//!
//! [output]
//! locale = "es"
//! currency = "MXN"
//!
//! [calculators.tile]
//! grout_bag_price = 18.0
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use calc_core::{CalculatorSettings, Locale};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "reckon.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "RECKON_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub output: OutputConfig,
    pub calculators: CalculatorSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level: error, warn, info, debug, trace
    pub default: String,

    /// Per-target overrides, e.g. `calc_core = "debug"`
    pub modules: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            default: "warn".to_string(),
            modules: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Locale used when neither the flag nor the input file names one
    pub locale: Locale,

    /// Currency code applied when the input has no `currency` value
    pub currency: Option<String>,

    /// Name written into worksheet lock files
    pub user: Option<String>,
}

impl Config {
    /// Load from defaults, the config file and the environment.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<figment::Error>> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let config: Config = Self::figment(&path).extract().map_err(Box::new)?;
        Ok(config.sanitized())
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().replace("__", ".").into()))
    }

    /// Clamp non-physical calculator overrides back to their defaults.
    pub fn sanitized(mut self) -> Self {
        self.calculators = self.calculators.sanitized();
        self
    }

    /// User recorded in worksheet locks.
    pub fn lock_user(&self) -> String {
        self.output
            .user
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_else(|| "reckon".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("reckon_config_{}_{}.toml", name, std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let missing = std::env::temp_dir().join("reckon_config_does_not_exist.toml");
        let config = Config::load(Some(&missing)).unwrap();
        assert_eq!(config.logging.default, "warn");
        assert_eq!(config.output.locale, Locale::En);
        assert_eq!(config.calculators, CalculatorSettings::default());
    }

    #[test]
    fn test_file_overrides_sections() {
        let path = temp_config(
            "sections",
            r#"
                [logging]
                default = "debug"

                [output]
                locale = "de"
                currency = "EUR"

                [calculators.tile]
                grout_bag_price = 18.0
            "#,
        );
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.logging.default, "debug");
        assert_eq!(config.output.locale, Locale::De);
        assert_eq!(config.output.currency.as_deref(), Some("EUR"));
        assert_eq!(config.calculators.tile.grout_bag_price, 18.0);
        assert_eq!(config.calculators.tile.grout_bag_lb, 25.0);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_nonsense_settings_are_clamped() {
        let path = temp_config(
            "clamp",
            r#"
                [calculators.roofing]
                square_sqft = 0.0
            "#,
        );
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.calculators.roofing.square_sqft, 100.0);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = temp_config("malformed", "[output]\nlocale = \"klingon\"\n");
        assert!(Config::load(Some(&path)).is_err());
        let _ = fs::remove_file(&path);
    }
}
