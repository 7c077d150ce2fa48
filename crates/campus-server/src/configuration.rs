use std::net::IpAddr;
use std::path::Path;

use campus_store::DocumentStore;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use tracing::{error, warn};

pub const CONFIG_DIR: &str = "configuration";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const DATABASE_NAME_VAR: &str = "DATABASE_NAME";

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub app_settings: ApplicationSettings,
    pub db_settings: DatabaseSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApplicationSettings {
    pub name: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: IpAddr,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub name: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub pool_size: usize,
}

impl DatabaseSettings {
    /// Opens the document store when both the url and the database name are set.
    ///
    /// A missing variable or a failed open is logged and yields `None`: the
    /// service still starts and reports the problem through `/test`.
    pub fn connect(&self) -> Option<DocumentStore> {
        let (Some(url), Some(name)) = (non_empty(&self.url), non_empty(&self.name)) else {
            warn!(
                "{DATABASE_URL_VAR} and {DATABASE_NAME_VAR} must both be set, running without a database"
            );
            return None;
        };

        match DocumentStore::open(url, name, self.pool_size) {
            Ok(store) => Some(store),
            Err(err) => {
                error!("Could not open the document store at {url}: {err}");
                None
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Loads settings from defaults, then `configuration/config.yml` if present,
/// then the `PORT`, `DATABASE_URL`, `DATABASE_NAME` and `DATABASE_POOL_SIZE`
/// environment variables.
///
/// # Errors
/// Fails when a source can't be parsed or a value has the wrong type.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|err| config::ConfigError::Message(format!("No current directory: {err}")))?;
    load_from(&base_path.join(CONFIG_DIR))
}

pub(crate) fn load_from(config_dir: &Path) -> Result<Settings, config::ConfigError> {
    let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

    config::Config::builder()
        .set_default("app_settings.name", "University Website Backend")?
        .set_default("app_settings.host", "0.0.0.0")?
        .set_default("app_settings.port", 8000)?
        .set_default("db_settings.pool_size", 4)?
        .add_source(config::File::from(config_dir.join("config")).required(false))
        .set_override_option("app_settings.port", env("PORT"))?
        .set_override_option("db_settings.url", env(DATABASE_URL_VAR))?
        .set_override_option("db_settings.name", env(DATABASE_NAME_VAR))?
        .set_override_option("db_settings.pool_size", env("DATABASE_POOL_SIZE"))?
        .build()?
        .try_deserialize()
}
