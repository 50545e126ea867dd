extern crate anyhow;
extern crate chrono_tz;
extern crate serde_json;

use anyhow::Context;
use crate::result;
use crate::structs::Station;

pub const DEFAULT_API_BASE_URL: &str = "https://ttc-api-rjis.onrender.com";
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 30000;
pub const DEFAULT_BLUR_GRACE_MS: u64 = 200;
pub const DEFAULT_TIMEZONE: &str = "America/Toronto";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub refresh_interval_ms: u64,
    pub blur_grace_ms: u64,
    pub timezone: String,
    pub stations: Vec<Station>,
}

impl Default for Config {
    fn default() -> Config {
        return Config {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            blur_grace_ms: DEFAULT_BLUR_GRACE_MS,
            timezone: DEFAULT_TIMEZONE.to_string(),
            stations: default_stations(),
        };
    }
}

fn default_stations() -> Vec<Station> {
    return vec![
        Station::new("1", "St. George Station"),
        Station::new("2", "Bloor-Yonge Station"),
        Station::new("3", "Union Station"),
        Station::new("4", "Spadina Station"),
        Station::new("5", "Kennedy Station"),
        Station::new("6", "Kipling Station"),
        Station::new("7", "Finch Station"),
        Station::new("8", "Sheppard-Yonge Station"),
        Station::new("9", "Don Mills Station"),
    ];
}

impl Config {
    pub fn refresh_interval(&self) -> std::time::Duration {
        return std::time::Duration::from_millis(self.refresh_interval_ms);
    }

    pub fn blur_grace(&self) -> std::time::Duration {
        return std::time::Duration::from_millis(self.blur_grace_ms);
    }

    pub fn tz(&self) -> result::DashResult<chrono_tz::Tz> {
        return self.timezone.parse::<chrono_tz::Tz>()
            .map_err(|_| result::make_error(&format!("Unknown timezone: {}", self.timezone)));
    }

    pub fn validate(&self) -> result::DashResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(result::make_error("api_base_url must not be empty"));
        }
        if self.refresh_interval_ms == 0 {
            return Err(result::make_error("refresh_interval_ms must be positive"));
        }
        if self.stations.is_empty() {
            return Err(result::make_error("No stations configured"));
        }

        let mut seen = std::collections::HashSet::new();
        for station in &self.stations {
            if !seen.insert(station.id.as_str()) {
                return Err(result::make_error(&format!(
                    "Duplicate station id: {}", station.id)));
            }
        }

        self.tz()?;
        return Ok(());
    }
}

pub fn config_from_file<P: AsRef<std::path::Path>>(path: P) -> result::DashResult<Config> {
    let debug_path = path.as_ref().to_str().map(|x| x.to_string());
    let file = std::fs::File::open(path)
        .with_context(|| format!("Opening config from '{:?}'", debug_path))?;
    let reader = std::io::BufReader::new(file);
    let config: Config = serde_json::from_reader(reader)
        .with_context(|| format!("while parsing config {:?}", debug_path))?;
    return Ok(config);
}
