use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use validator::Validate;

const ENV_PREFIX: &str = "EXMATCH";

/// Errors that can occur while loading runtime settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid settings: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct Settings {
    #[serde(default)]
    #[validate(nested)]
    pub input: InputSettings,
    #[serde(default)]
    #[validate(nested)]
    pub output: OutputSettings,
    #[serde(default)]
    #[validate(nested)]
    pub rules: RulesSettings,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub mail: MailSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InputSettings {
    #[serde(default = "default_domestic_path")]
    #[validate(length(min = 1))]
    pub domestic: String,
    #[serde(default = "default_incoming_path")]
    #[validate(length(min = 1))]
    pub incoming: String,
    /// Rows right after the header that hold question titles, not answers.
    #[serde(default = "default_title_rows")]
    pub title_rows: usize,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            domestic: default_domestic_path(),
            incoming: default_incoming_path(),
            title_rows: default_title_rows(),
        }
    }
}

fn default_domestic_path() -> String { "data/french.csv".to_string() }
fn default_incoming_path() -> String { "data/exchange.csv".to_string() }
fn default_title_rows() -> usize { 2 }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OutputSettings {
    #[serde(default = "default_output_dir")]
    #[validate(length(min = 1))]
    pub directory: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { directory: default_output_dir() }
    }
}

impl OutputSettings {
    /// Path of a run output file inside the output directory.
    pub fn file(&self, name: &str) -> PathBuf {
        Path::new(&self.directory).join(name)
    }
}

fn default_output_dir() -> String { "output".to_string() }

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RulesSettings {
    #[serde(default = "default_rules_path")]
    #[validate(length(min = 1))]
    pub path: String,
}

impl Default for RulesSettings {
    fn default() -> Self {
        Self { path: default_rules_path() }
    }
}

fn default_rules_path() -> String { "config/rules.json".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Build cost matrix rows on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { parallel: default_parallel() }
    }
}

fn default_parallel() -> bool { true }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailSettings {
    /// Transliterate rendered subjects and bodies to plain ASCII.
    #[serde(default)]
    pub ascii_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> LogFormat { LogFormat::Compact }

/// Values given on the command line; each one set wins over every other source.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub domestic: Option<String>,
    pub incoming: Option<String>,
    pub rules: Option<String>,
    pub output: Option<String>,
    pub parallel: Option<bool>,
    pub ascii_mail: Option<bool>,
}

impl SettingsOverrides {
    fn apply(
        &self,
        mut builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        let paths = [
            ("input.domestic", &self.domestic),
            ("input.incoming", &self.incoming),
            ("rules.path", &self.rules),
            ("output.directory", &self.output),
        ];
        for (key, value) in paths {
            if let Some(value) = value {
                builder = builder.set_override(key, value.as_str())?;
            }
        }
        if let Some(parallel) = self.parallel {
            builder = builder.set_override("engine.parallel", parallel)?;
        }
        if let Some(ascii) = self.ascii_mail {
            builder = builder.set_override("mail.ascii_only", ascii)?;
        }
        Ok(builder)
    }
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with EXMATCH__)
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_with(None, &SettingsOverrides::default())
    }

    /// Load configuration from a custom path instead of the config/ directory
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        Self::load_with(Some(path.as_ref()), &SettingsOverrides::default())
    }

    pub fn load_with(path: Option<&Path>, overrides: &SettingsOverrides) -> Result<Self, SettingsError> {
        let builder = match path {
            Some(path) => Config::builder().add_source(File::from(path)),
            None => Config::builder()
                .add_source(File::with_name("config/default").required(false))
                .add_source(File::with_name("config/local").required(false)),
        };

        // e.g., EXMATCH__ENGINE__PARALLEL -> engine.parallel
        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = overrides.apply(builder)?.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.input.title_rows, 2);
        assert_eq!(settings.rules.path, "config/rules.json");
        assert!(settings.engine.parallel);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_load_from_file_with_overrides() {
        let dir = std::env::temp_dir().join(format!("exmatch-settings-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[input]\ntitle_rows = 0\n\n[logging]\nformat = \"json\"").unwrap();

        let overrides = SettingsOverrides {
            output: Some("elsewhere".to_string()),
            parallel: Some(false),
            ascii_mail: Some(true),
            ..Default::default()
        };
        let settings = Settings::load_with(Some(&path), &overrides).unwrap();
        assert!(settings.mail.ascii_only);
        assert_eq!(settings.input.title_rows, 0);
        assert_eq!(settings.input.domestic, "data/french.csv");
        assert_eq!(settings.output.directory, "elsewhere");
        assert_eq!(
            settings.output.file(crate::services::export::OUTBOX_FILE),
            Path::new("elsewhere").join("outbox.json")
        );
        assert!(!settings.engine.parallel);
        assert_eq!(settings.logging.format, LogFormat::Json);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let overrides = SettingsOverrides {
            rules: Some(String::new()),
            ..Default::default()
        };
        let dir = std::env::temp_dir().join(format!("exmatch-settings-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(&path, "").unwrap();

        let err = Settings::load_with(Some(&path), &overrides).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        std::fs::remove_dir_all(&dir).ok();
    }
}
