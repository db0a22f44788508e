use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

const CONFIG_PATH_ENV: &str = "REALTY_CONFIG";
const API_URL_ENV: &str = "REALTY_API_URL";
const AUTH_TOKEN_ENV: &str = "REALTY_AUTH_TOKEN";
const TIMEOUT_ENV: &str = "REALTY_TIMEOUT_SECS";
const SETTINGS_PATH_ENV: &str = "REALTY_SETTINGS_PATH";

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// Backend base URL, e.g. `http://localhost:5000/api`
    pub api_base_url: String,
    pub auth_token: Option<String>,
    pub request_timeout_secs: u64,
    /// JSON file holding the persisted demo-mode flag
    pub settings_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            auth_token: None,
            request_timeout_secs: 30,
            settings_path: PathBuf::from("realty-settings.json"),
        }
    }
}

impl Config {
    /// Load `.env`, the optional TOML file named by `REALTY_CONFIG`, then env overrides
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let mut config = match env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {path}"))?;
                Self::from_toml(&raw).with_context(|| format!("Failed to parse config file {path}"))?
            }
            Err(_) => Self::default(),
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(API_URL_ENV) {
            self.api_base_url = url;
        }
        if let Some(token) = lookup(AUTH_TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
            self.auth_token = Some(token);
        }
        if let Some(secs) = lookup(TIMEOUT_ENV) {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{TIMEOUT_ENV} must be a whole number of seconds"))?;
        }
        if let Some(path) = lookup(SETTINGS_PATH_ENV) {
            self.settings_path = PathBuf::from(path);
        }
        Ok(())
    }
}
