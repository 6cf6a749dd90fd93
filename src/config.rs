use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;

use crate::cli::Args;
use crate::geo::DEFAULT_IP_ENDPOINT;
use crate::owm::DEFAULT_ENDPOINT;
use crate::weather::Coordinates;

const APP_DIR: &str = "wxnow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationProvider {
    #[default]
    Ip,
    Fixed,
    Off,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub provider: LocationProvider,

    /// Used by the `fixed` provider
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Lookup URL for the `ip` provider
    pub endpoint: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            provider: LocationProvider::default(),
            latitude: None,
            longitude: None,
            endpoint: DEFAULT_IP_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,

    /// OpenWeatherMap current weather URL
    pub endpoint: String,

    /// Per request, for both the weather and the position lookup
    pub timeout_secs: u64,

    pub log_file: Option<PathBuf>,

    pub location: LocationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 10,
            log_file: None,
            location: LocationConfig::default(),
        }
    }
}

impl Config {
    /// `<config dir>/wxnow/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Reads `path`, or the default location when `path` is `None`.
    ///
    /// An explicitly named file must exist; a missing default file just
    /// means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Command line flags win over the file.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(key) = &args.api_key {
            self.api_key = Some(key.clone());
        }
        if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
            self.location.provider = LocationProvider::Fixed;
            self.location.latitude = Some(lat);
            self.location.longitude = Some(lon);
        }
        if args.no_locate {
            self.location.provider = LocationProvider::Off;
        }
        if let Some(path) = &args.log_file {
            self.log_file = Some(path.clone());
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {}
            _ => bail!(
                "No OpenWeatherMap API key. Pass --api-key, set OPENWEATHER_API_KEY, \
                 or add api_key to the config file"
            ),
        }

        Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid endpoint: {}", self.endpoint))?;

        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than 0");
        }

        match self.location.provider {
            LocationProvider::Ip => {
                Url::parse(&self.location.endpoint).with_context(|| {
                    format!("Invalid location endpoint: {}", self.location.endpoint)
                })?;
            }
            LocationProvider::Fixed => {
                self.fixed_position()?;
            }
            LocationProvider::Off => {}
        }

        Ok(())
    }

    pub fn fixed_position(&self) -> Result<Coordinates> {
        let (Some(lat), Some(lon)) = (self.location.latitude, self.location.longitude) else {
            bail!("The fixed location provider needs both latitude and longitude");
        };
        if !(-90.0..=90.0).contains(&lat) {
            bail!("Latitude {lat} is out of range (-90..=90)");
        }
        if !(-180.0..=180.0).contains(&lon) {
            bail!("Longitude {lon} is out of range (-180..=180)");
        }
        Ok(Coordinates::new(lat, lon))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Explicit log file, else `<cache dir>/wxnow/wxnow.log`.
    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("wxnow.log")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn with_key() -> Config {
        Config {
            api_key: Some("secret".into()),
            ..Config::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.location.provider, LocationProvider::Ip);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
api_key = "abc"
timeout_secs = 3

[location]
provider = "fixed"
latitude = 59.91
longitude = 10.75
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.location.provider, LocationProvider::Fixed);
        assert_eq!(
            config.fixed_position().unwrap(),
            Coordinates::new(59.91, 10.75)
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(dir.path().join("nope.toml").as_path())).is_err());
    }

    #[test]
    fn test_load_bad_toml_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs = \"soon\"").unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_args_override_file() {
        let mut config = Config {
            api_key: Some("from-file".into()),
            ..Config::default()
        };
        let args = Args {
            api_key: Some("from-flag".into()),
            lat: Some(1.5),
            lon: Some(-2.5),
            ..Args::default()
        };

        config.apply_args(&args);

        assert_eq!(config.api_key.as_deref(), Some("from-flag"));
        assert_eq!(config.location.provider, LocationProvider::Fixed);
        assert_eq!(config.fixed_position().unwrap(), Coordinates::new(1.5, -2.5));
    }

    #[test]
    fn test_no_locate_turns_location_off() {
        let mut config = with_key();
        config.apply_args(&Args {
            no_locate: true,
            ..Args::default()
        });
        assert_eq!(config.location.provider, LocationProvider::Off);
    }

    #[test]
    fn test_validate() {
        with_key().validate().unwrap();

        assert!(Config::default().validate().is_err());
        assert!(Config {
            api_key: Some("  ".into()),
            ..Config::default()
        }
        .validate()
        .is_err());

        let mut config = with_key();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = with_key();
        config.endpoint = "not a url".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_fixed_position() {
        let mut config = with_key();
        config.location.provider = LocationProvider::Fixed;
        config.location.latitude = Some(95.0);
        config.location.longitude = Some(0.0);
        assert!(config.validate().is_err());

        config.location.latitude = Some(45.0);
        config.location.longitude = None;
        assert!(config.validate().is_err());

        config.location.longitude = Some(-181.0);
        assert!(config.validate().is_err());

        config.location.longitude = Some(7.0);
        config.validate().unwrap();
    }

    #[test]
    fn test_log_path_override() {
        let config = Config {
            log_file: Some(PathBuf::from("/tmp/wx.log")),
            ..Config::default()
        };
        assert_eq!(config.log_path(), PathBuf::from("/tmp/wx.log"));
    }
}
