use std::str::FromStr;

use serde::Deserialize;
use serde_with::serde_as;
use strum::{Display, EnumString};
use thiserror::Error;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub store: StoreSettings,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub port: u16,
    pub host: String,
    pub app_url: String,
    /// Fallback filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Seeded in-memory data, for local runs and demos.
    #[default]
    Memory,
    Restbase,
}

#[derive(Deserialize, Clone)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
}

impl std::fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSettings")
            .field("backend", &self.backend)
            .field("url", &self.url)
            .field("api_key", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to determine the current directory: {0}")]
    CurrentDir(#[from] std::io::Error),
    #[error("failed to parse APP_ENVIRONMENT: {0}")]
    Environment(#[from] strum::ParseError),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

pub fn read_config() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir()?;
    let config_directory = base_path.join("config");

    let environment = Environment::from_str(
        std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .as_str(),
    )?;
    let environment_filename = format!("{}.yaml", environment);

    let settings = config::Config::builder()
        .add_source(config::File::from(config_directory.join("base.yaml")))
        .add_source(config::File::from(
            config_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("ENGBOARD")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<Settings>()?)
}

#[derive(Display, Debug, EnumString)]
pub enum Environment {
    #[strum(ascii_case_insensitive, serialize = "local")]
    Local,
    #[strum(ascii_case_insensitive, serialize = "production")]
    Production,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_names_are_case_insensitive() {
        assert!(matches!(
            Environment::from_str("Production"),
            Ok(Environment::Production)
        ));
        assert_eq!(Environment::Local.to_string(), "local");
        assert!(Environment::from_str("staging").is_err());
    }

    #[test]
    fn settings_deserialize_from_yaml() {
        let yaml = r#"
application:
  port: "8080"
  host: 127.0.0.1
  app_url: http://localhost:5173
store:
  backend: restbase
  url: https://example.test
  api_key: anon
"#;
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.application.port, 8080);
        assert_eq!(settings.application.log_level, "info");
        assert_eq!(settings.store.backend, StoreBackend::Restbase);
        assert!(!format!("{:?}", settings.store).contains("anon"));
    }
}
