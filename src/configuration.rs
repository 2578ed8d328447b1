use crate::errors::ConfigurationError;
use config::{Config, FileFormat};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use std::env::var;
use std::path::PathBuf;
use std::time::Duration;

pub const BOT_TOKEN_VAR: &str = "BOT_TOKEN";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Settings {
    pub application: Application,
    pub storage: StorageSettings,
    pub scheduler: SchedulerSettings,
    pub catalog: CatalogSettings,
    pub telegram: TelegramSettings,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Application {
    pub host: String,
    pub port: u16,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StorageSettings {
    pub preferences_path: PathBuf,
    pub snapshot_path: PathBuf,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SchedulerSettings {
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "poll_interval_secs")]
    pub poll_interval: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "fetch_timeout_secs")]
    pub fetch_timeout: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "send_timeout_secs")]
    pub send_timeout: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "shutdown_grace_secs")]
    pub shutdown_grace: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(600),
            fetch_timeout: Duration::from_secs(30),
            send_timeout: Duration::from_secs(10),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

/// Selectors and limits for the bestsellers page the reference catalog source scrapes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CatalogSettings {
    pub store_name: String,
    pub url: String,
    pub base_url: String,
    pub max_products: usize,
    pub item_lookup: String,
    pub title_lookup: String,
    pub link_lookup: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            store_name: "Amazon".to_string(),
            url: "https://www.amazon.es/gp/bestsellers/".to_string(),
            base_url: "https://www.amazon.es".to_string(),
            max_products: 5,
            item_lookup: ".zg-item-immersion".to_string(),
            title_lookup: ".p13n-sc-truncate".to_string(),
            link_lookup: "a.a-link-normal".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TelegramSettings {
    pub api_url: String,
    pub long_poll_secs: u64,
}

impl Settings {
    pub fn check_if_valid(&self) -> Result<(), ConfigurationError> {
        if self.scheduler.poll_interval.is_zero() {
            return Err(ConfigurationError::InvalidPollInterval);
        }
        if self.catalog.max_products == 0 {
            return Err(ConfigurationError::InvalidSnapshotSize);
        }
        Ok(())
    }
}

/// The possible runtime environment for our application.
#[derive(Debug, Eq, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = ConfigurationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            other => Err(ConfigurationError::UnknownEnvironment(other.to_string())),
        }
    }
}

pub fn get_env() -> Result<Environment, ConfigurationError> {
    var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "dev".into())
        .try_into()
}

pub fn get_configuration() -> Result<Settings, ConfigurationError> {
    let environment = get_env()?;
    let second_source = format!("configuration/{}", environment.as_str());
    let settings = Config::builder()
        .add_source(config::File::new("configuration/base", FileFormat::Yaml))
        .add_source(config::File::new(&second_source, FileFormat::Yaml).required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize::<Settings>()?;
    settings.check_if_valid()?;
    Ok(settings)
}

/// Reads the messaging transport secret; a blank value counts as missing.
pub fn bot_token() -> Result<String, ConfigurationError> {
    match var(BOT_TOKEN_VAR) {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(ConfigurationError::MissingBotToken),
    }
}
