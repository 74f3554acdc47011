use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::{FetchOutcome, Fetcher};
use crate::config::{PipelineSettings, Secrets, SourceSettings};
use crate::error::Result;
use crate::models::Dataset;
use crate::utils::{redact, validate_coordinates};

/// Blocking OpenWeather client for one endpoint (current weather or air pollution)
pub struct OpenWeatherFetcher {
    client: Client,
    source: SourceSettings,
    api_key: String,
}

impl OpenWeatherFetcher {
    pub fn new(source: SourceSettings, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            source,
            api_key: api_key.into(),
        })
    }

    /// One fetcher per configured source, in configuration order
    pub fn from_settings(settings: &PipelineSettings, secrets: &Secrets) -> Result<Vec<Self>> {
        let timeout = Duration::from_secs(settings.request_timeout_secs);
        settings
            .sources()
            .iter()
            .map(|source| Self::new(source.clone(), secrets.open_weather_api_key(), timeout))
            .collect()
    }

    /// Query string for a coordinate; the key goes last
    fn query(&self, latitude: f64, longitude: f64) -> Vec<(String, String)> {
        let mut query = vec![
            ("lat".to_string(), latitude.to_string()),
            ("lon".to_string(), longitude.to_string()),
        ];
        query.extend(
            self.source
                .params
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        query.push(("appid".to_string(), self.api_key.clone()));
        query
    }

    fn request(&self, latitude: f64, longitude: f64) -> reqwest::Result<Value> {
        self.client
            .get(&self.source.base_url)
            .query(&self.query(latitude, longitude))
            .send()?
            .error_for_status()?
            .json::<Value>()
    }
}

impl Fetcher for OpenWeatherFetcher {
    fn dataset(&self) -> Dataset {
        self.source.dataset
    }

    fn fetch(&self, latitude: f64, longitude: f64) -> FetchOutcome {
        if let Err(e) = validate_coordinates(latitude, longitude) {
            warn!(dataset = %self.source.dataset, "Skipping fetch: {}", e);
            return FetchOutcome::Failed;
        }

        match self.request(latitude, longitude) {
            Ok(data) => {
                debug!(dataset = %self.source.dataset, latitude, longitude, "Fetched payload");
                FetchOutcome::Success(data)
            }
            Err(e) => {
                let status = e.status().map(|s| s.as_u16());
                let message = redact(&e.without_url().to_string(), &self.api_key);
                warn!(
                    dataset = %self.source.dataset,
                    latitude,
                    longitude,
                    ?status,
                    "Fetch failed: {}",
                    message
                );
                FetchOutcome::Failed
            }
        }
    }
}

impl std::fmt::Debug for OpenWeatherFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherFetcher")
            .field("source", &self.source)
            .field("api_key", &crate::utils::mask_secret(&self.api_key))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(base_url: &str) -> OpenWeatherFetcher {
        let mut source = SourceSettings::open_weather_weather();
        source.base_url = base_url.to_string();
        OpenWeatherFetcher::new(source, "secret-key-1234", Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_query_carries_coordinate_params_and_key() {
        let fetcher = fetcher("http://localhost");
        let query = fetcher.query(19.5, -99.1);

        assert_eq!(query[0], ("lat".to_string(), "19.5".to_string()));
        assert_eq!(query[1], ("lon".to_string(), "-99.1".to_string()));
        assert!(query.contains(&("units".to_string(), "metric".to_string())));
        assert_eq!(query.last().unwrap().0, "appid");
    }

    #[test]
    fn test_out_of_range_coordinate_fails_without_request() {
        let fetcher = fetcher("http://localhost");
        assert_eq!(fetcher.fetch(95.0, -99.1), FetchOutcome::Failed);
        assert_eq!(fetcher.fetch(19.5, f64::NAN), FetchOutcome::Failed);
    }

    #[test]
    fn test_unreachable_endpoint_is_a_failed_outcome() {
        let fetcher = fetcher("http://127.0.0.1:1/data/2.5/weather");
        assert_eq!(fetcher.fetch(19.5, -99.1), FetchOutcome::Failed);
    }

    #[test]
    fn test_debug_masks_key() {
        let debug = format!("{:?}", fetcher("http://localhost"));
        assert!(!debug.contains("secret-key-1234"));
        assert!(debug.contains("****1234"));
    }

    #[test]
    fn test_from_settings_builds_one_per_source() {
        let settings = PipelineSettings::default();
        let secrets = Secrets::from_lookup(|_| Some("abc".to_string())).unwrap();
        let fetchers = OpenWeatherFetcher::from_settings(&settings, &secrets).unwrap();

        let datasets: Vec<_> = fetchers.iter().map(|f| f.dataset()).collect();
        assert_eq!(datasets, vec![Dataset::Weather, Dataset::AirQuality]);
    }
}
