use std::fmt;
use tracing::debug;

use crate::error::{EtlError, Result};
use crate::utils::constants::OPEN_WEATHER_API_KEY_VAR;
use crate::utils::mask_secret;

/// Credentials read from the environment (or a `.env` file); never logged in clear
#[derive(Clone)]
pub struct Secrets {
    open_weather_api_key: String,
}

impl Secrets {
    /// Load `.env` if present, then read every required secret
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let open_weather_api_key = lookup(OPEN_WEATHER_API_KEY_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(EtlError::MissingSecret(OPEN_WEATHER_API_KEY_VAR))?;

        Ok(Self {
            open_weather_api_key,
        })
    }

    pub fn open_weather_api_key(&self) -> &str {
        &self.open_weather_api_key
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("open_weather_api_key", &mask_secret(&self.open_weather_api_key))
            .finish()
    }
}
