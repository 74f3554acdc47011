use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EtlError;
use crate::utils::constants::{AIR_QUALITY_KEY, WEATHER_KEY};

/// A provider dataset; doubles as the target table selector
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Dataset {
    Weather,
    AirQuality,
}

impl Dataset {
    pub const ALL: [Dataset; 2] = [Dataset::Weather, Dataset::AirQuality];

    /// Key of this dataset's payload inside `RawSample::data`
    pub fn source_key(&self) -> &'static str {
        match self {
            Dataset::Weather => WEATHER_KEY,
            Dataset::AirQuality => AIR_QUALITY_KEY,
        }
    }

    pub fn table_name(&self) -> &'static str {
        self.source_key()
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

impl FromStr for Dataset {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            WEATHER_KEY => Ok(Dataset::Weather),
            AIR_QUALITY_KEY | "air-quality" => Ok(Dataset::AirQuality),
            other => Err(EtlError::Config(format!(
                "Unknown target table '{}', expected '{}' or '{}'",
                other, WEATHER_KEY, AIR_QUALITY_KEY
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_table() {
        assert_eq!("weather".parse::<Dataset>().unwrap(), Dataset::Weather);
        assert_eq!(" AIR_QUALITY ".parse::<Dataset>().unwrap(), Dataset::AirQuality);
        assert!("forecast".parse::<Dataset>().is_err());
    }

    #[test]
    fn test_serde_names_match_table_names() {
        for dataset in Dataset::ALL {
            let json = serde_json::to_string(&dataset).unwrap();
            assert_eq!(json, format!("\"{}\"", dataset.table_name()));
        }
    }
}
