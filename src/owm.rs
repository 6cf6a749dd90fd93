use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::weather::{Coordinates, WeatherRecord};

pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";

/// What to ask the API for.
#[derive(Clone, Debug, PartialEq)]
pub enum Query {
    Place(String),
    Coordinates(Coordinates),
}

/// Picks the query for a fetch: typed text wins over a located position.
pub fn select_query(search: &str, coordinates: Option<Coordinates>) -> Option<Query> {
    let search = search.trim();
    if !search.is_empty() {
        Some(Query::Place(search.to_string()))
    } else {
        coordinates.map(Query::Coordinates)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Non-success HTTP status, carrying its reason phrase.
    #[error("{0}")]
    Status(String),

    #[error("An error occurred while fetching weather data.")]
    Network(String),

    #[error("An error occurred while fetching weather data.")]
    Decode(String),
}

impl FetchError {
    fn from_status(status: StatusCode) -> Self {
        let text = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_str().to_string());
        FetchError::Status(text)
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl WeatherClient {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self, FetchError> {
        let endpoint = Url::parse(endpoint).map_err(|e| FetchError::Network(e.to_string()))?;
        let http = Client::builder()
            .user_agent(concat!("wxnow/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint,
            api_key: api_key.to_string(),
        })
    }

    pub fn url(&self, query: &Query) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            match query {
                Query::Place(name) => {
                    pairs.append_pair("q", name);
                }
                Query::Coordinates(c) => {
                    pairs
                        .append_pair("lat", &c.latitude.to_string())
                        .append_pair("lon", &c.longitude.to_string());
                }
            }
            pairs.append_pair("appid", &self.api_key);
        }
        url
    }

    /// One GET, no retry.
    pub fn fetch(&self, query: &Query) -> Result<WeatherRecord, FetchError> {
        info!(?query, "fetching weather");
        let response = self.http.get(self.url(query)).send().map_err(|e| {
            warn!(error = %e, "weather request failed");
            FetchError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "weather request rejected");
            return Err(FetchError::from_status(status));
        }

        let body = response.text()?;
        debug!(%body, "weather response");
        decode(&body)
    }
}

fn decode(body: &str) -> Result<WeatherRecord, FetchError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "weather response is not JSON");
        FetchError::Decode(e.to_string())
    })?;
    if !value.is_object() {
        warn!("weather response is not a JSON object");
        return Err(FetchError::Decode("expected a JSON object".to_string()));
    }
    WeatherRecord::deserialize(value).map_err(|e| FetchError::Decode(e.to_string()))
}
