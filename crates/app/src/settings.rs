//! Settings of the binary, layered as: optional TOML file, `GASTOS__*`
//! environment variables, command line overrides.
//!
//! ```toml
//! level = "debug"
//! username = "alice"
//! password = "secret"
//! database = { sqlite = "gastos.db" }
//! ```
use serde::Deserialize;

use crate::{cli::Cli, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/gastos.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub level: String,
    pub database: Database,
    pub username: String,
    pub password: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            database: Database::Sqlite("gastos.db".to_string()),
            username: String::new(),
            password: String::new(),
        }
    }
}

pub fn load(cli: &Cli) -> Result<Settings> {
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let builder = config::Config::builder()
        .add_source(config::File::with_name(config_path).required(false))
        .add_source(config::Environment::with_prefix("GASTOS").separator("__"));
    let mut settings: Settings = builder.build()?.try_deserialize()?;

    if let Some(level) = &cli.level {
        settings.level = level.clone();
    }
    if let Some(path) = &cli.sqlite {
        settings.database = Database::Sqlite(path.clone());
    }
    if let Some(username) = &cli.username {
        settings.username = username.clone();
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn missing_file_yields_defaults_and_cli_overrides() {
        let cli = Cli::try_parse_from([
            "gastos",
            "--config",
            "does/not/exist.toml",
            "--sqlite",
            "other.db",
            "--username",
            "bob",
            "list",
            "places",
        ])
        .unwrap();
        let settings = load(&cli).unwrap();
        assert_eq!(settings.database, Database::Sqlite("other.db".to_string()));
        assert_eq!(settings.username, "bob");
    }

    #[test]
    fn database_variants_deserialize_from_toml() {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from_str(
                "level = \"debug\"\ndatabase = \"memory\"",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.level, "debug");
        assert_eq!(settings.database, Database::Memory);

        let settings: Settings = config::Config::builder()
            .add_source(config::File::from_str(
                "database = { sqlite = \"data/gastos.db\" }",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(
            settings.database,
            Database::Sqlite("data/gastos.db".to_string())
        );
    }
}
