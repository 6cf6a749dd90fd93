use chrono::{DateTime, FixedOffset, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A latitude/longitude pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Snapshot of current conditions as returned by OpenWeatherMap.
///
/// Every field is optional and decoded leniently: a value of the wrong type
/// is treated as missing instead of rejecting the whole body.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct WeatherRecord {
    #[serde(deserialize_with = "text")]
    pub name: Option<String>,

    #[serde(deserialize_with = "lenient")]
    pub coord: Option<Coord>,

    #[serde(deserialize_with = "lenient")]
    pub weather: Vec<Condition>,

    #[serde(deserialize_with = "lenient")]
    pub main: Main,

    #[serde(deserialize_with = "number")]
    pub visibility: Option<f64>,

    #[serde(deserialize_with = "lenient")]
    pub wind: Wind,

    #[serde(deserialize_with = "lenient")]
    pub clouds: Clouds,

    #[serde(deserialize_with = "lenient")]
    pub sys: Sys,

    /// Shift in seconds from UTC for the place.
    #[serde(deserialize_with = "integer")]
    pub timezone: Option<i64>,
}

impl WeatherRecord {
    /// Coordinate echo, when the response carried a usable one.
    pub fn coordinates(&self) -> Option<Coordinates> {
        let coord = self.coord.as_ref()?;
        match (coord.lat, coord.lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Coordinates::new(lat, lon))
            }
            _ => None,
        }
    }

    /// Primary condition text, e.g. "Clouds".
    pub fn condition(&self) -> Option<&str> {
        self.weather.first().and_then(|c| c.main.as_deref())
    }

    /// Longer condition text, e.g. "broken clouds".
    pub fn description(&self) -> Option<&str> {
        self.weather.first().and_then(|c| c.description.as_deref())
    }

    pub fn sunrise(&self) -> Option<DateTime<FixedOffset>> {
        self.local_time(self.sys.sunrise?)
    }

    pub fn sunset(&self) -> Option<DateTime<FixedOffset>> {
        self.local_time(self.sys.sunset?)
    }

    fn local_time(&self, unix: i64) -> Option<DateTime<FixedOffset>> {
        let seconds = i32::try_from(self.timezone.unwrap_or(0)).ok()?;
        let offset = FixedOffset::east_opt(seconds)?;
        Some(DateTime::<Utc>::from_timestamp(unix, 0)?.with_timezone(&offset))
    }
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Coord {
    #[serde(deserialize_with = "number")]
    pub lat: Option<f64>,
    #[serde(deserialize_with = "number")]
    pub lon: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Condition {
    #[serde(deserialize_with = "text")]
    pub main: Option<String>,
    #[serde(deserialize_with = "text")]
    pub description: Option<String>,
}

/// Temperatures are in Kelvin.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Main {
    #[serde(deserialize_with = "number")]
    pub temp: Option<f64>,
    #[serde(deserialize_with = "number")]
    pub feels_like: Option<f64>,
    #[serde(deserialize_with = "number")]
    pub temp_min: Option<f64>,
    #[serde(deserialize_with = "number")]
    pub temp_max: Option<f64>,
    #[serde(deserialize_with = "number")]
    pub pressure: Option<f64>,
    #[serde(deserialize_with = "number")]
    pub humidity: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Wind {
    #[serde(deserialize_with = "number")]
    pub speed: Option<f64>,
    #[serde(deserialize_with = "number")]
    pub deg: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Clouds {
    #[serde(deserialize_with = "number")]
    pub all: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Sys {
    #[serde(deserialize_with = "integer")]
    pub sunrise: Option<i64>,
    #[serde(deserialize_with = "integer")]
    pub sunset: Option<i64>,
}

/// Falls back to the default when the value has an unexpected shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Numbers, including numbers sent as strings.
fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const LONDON: &str = r#"{
        "coord": {"lon": -0.1257, "lat": 51.5085},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
        "base": "stations",
        "main": {"temp": 300.0, "feels_like": 299.5, "temp_min": 298.0, "temp_max": 301.2,
                 "pressure": 1012, "humidity": 48, "sea_level": 1012, "grnd_level": 1008},
        "visibility": 10000,
        "wind": {"speed": 4.12, "deg": 250},
        "clouds": {"all": 75},
        "dt": 1718000000,
        "sys": {"type": 2, "id": 2075535, "country": "GB", "sunrise": 1717991000, "sunset": 1718050800},
        "timezone": 3600,
        "id": 2643743,
        "name": "London",
        "cod": 200
    }"#;

    pub(crate) fn london() -> WeatherRecord {
        serde_json::from_str(LONDON).unwrap()
    }

    #[test]
    fn test_parse_full_response() {
        let record = london();
        assert_eq!(record.name.as_deref(), Some("London"));
        assert_eq!(record.coordinates(), Some(Coordinates::new(51.5085, -0.1257)));
        assert_eq!(record.condition(), Some("Clouds"));
        assert_eq!(record.description(), Some("broken clouds"));
        assert_eq!(record.main.temp, Some(300.0));
        assert_eq!(record.main.pressure, Some(1012.0));
        assert_eq!(record.main.humidity, Some(48.0));
        assert_eq!(record.visibility, Some(10000.0));
        assert_eq!(record.wind.deg, Some(250.0));
        assert_eq!(record.clouds.all, Some(75.0));
    }

    #[test]
    fn test_parse_partial_response() {
        let record: WeatherRecord = serde_json::from_str(r#"{"name": "Nowhere"}"#).unwrap();
        assert_eq!(record.name.as_deref(), Some("Nowhere"));
        assert_eq!(record.coordinates(), None);
        assert_eq!(record.condition(), None);
        assert_eq!(record.main.temp, None);
    }

    #[test]
    fn test_coordinates_need_both_halves() {
        let record: WeatherRecord = serde_json::from_str(r#"{"coord": {"lat": 10.0}}"#).unwrap();
        assert_eq!(record.coordinates(), None);
    }

    #[test]
    fn test_parse_tolerates_wrong_types() {
        let record: WeatherRecord = serde_json::from_str(
            r#"{"name": "X", "coord": {"lat": 1, "lon": 2}, "visibility": "10000",
                "main": {"temp": "n/a", "humidity": true}, "wind": [], "weather": "sunny",
                "timezone": null}"#,
        )
        .unwrap();
        assert_eq!(record.name.as_deref(), Some("X"));
        assert_eq!(record.coordinates(), Some(Coordinates::new(1.0, 2.0)));
        assert_eq!(record.visibility, Some(10000.0));
        assert_eq!(record.main.temp, None);
        assert_eq!(record.main.humidity, None);
        assert_eq!(record.wind, Wind::default());
        assert_eq!(record.condition(), None);
        assert_eq!(record.timezone, None);
    }

    #[test]
    fn test_sunrise_uses_place_offset() {
        let record = london();
        let sunrise = record.sunrise().unwrap();
        assert_eq!(sunrise.offset().local_minus_utc(), 3600);
        assert_eq!(sunrise.timestamp(), 1717991000);
        assert_eq!(sunrise.format("%H:%M").to_string(), "04:43");
    }
}
