use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{AdminError, Result};

/// Environment variable that overrides `server.base_url`
pub const URL_ENV: &str = "BOOKING_ADMIN_URL";

/// Settings read from `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,  // Where the booking backend lives
    #[serde(default)]
    pub client: ClientConfig,  // Console paging and logging
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,   // Prefix for every resource path
    pub timeout_secs: u64,  // Per-request timeout for the HTTP client
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub flight_page_size: usize,
    pub passenger_page_size: usize,
    pub detail_page_size: usize,  // Passengers shown per page under a flight
    pub log_dir: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            flight_page_size: 3,
            passenger_page_size: 5,
            detail_page_size: 5,
            log_dir: "logs".to_string(),
        }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory, falling back to
    /// defaults when the file is absent, then applies `.env` overrides
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let config_text = fs::read_to_string(path)?;
            Self::parse(&config_text)?
        } else {
            Config::default()
        };

        // a missing .env file is fine
        let _ = dotenvy::dotenv();
        if let Ok(url) = std::env::var(URL_ENV) {
            config.server.base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).map_err(|e| AdminError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server.base_url.trim().is_empty() {
            return Err(AdminError::Config("server.base_url must not be empty".to_string()));
        }
        for (name, size) in [
            ("flight_page_size", self.client.flight_page_size),
            ("passenger_page_size", self.client.passenger_page_size),
            ("detail_page_size", self.client.detail_page_size),
        ] {
            if size == 0 {
                return Err(AdminError::Config(format!("client.{} must be at least 1", name)));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs)
    }
}
