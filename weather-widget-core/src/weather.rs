use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    error::WeatherError,
    model::{Condition, Coordinate, WeatherQuery, WeatherRecord},
    resolver::PlaceQuery,
};

pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org";

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";
const UNITS: &str = "metric";

/// Source of current weather.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_by_coordinate(&self, coordinate: Coordinate) -> Result<WeatherRecord, WeatherError>;

    async fn fetch_by_query(&self, query: &PlaceQuery) -> Result<WeatherRecord, WeatherError>;

    /// Dispatch to the by-coordinate or by-name lookup.
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherRecord, WeatherError> {
        tracing::debug!(?query, "fetching weather");

        match query {
            WeatherQuery::ByCoordinate(coordinate) => self.fetch_by_coordinate(*coordinate).await,
            WeatherQuery::ByPlace(place) => self.fetch_by_query(place).await,
        }
    }
}

/// OpenWeather current-weather client. One GET per call, no retries.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_WEATHER_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn get_current(&self, params: &[(&str, String)]) -> Result<WeatherRecord, WeatherError> {
        let url = format!("{}{}", self.base_url, CURRENT_WEATHER_PATH);

        tracing::debug!(?params, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str()), ("units", UNITS)])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(WeatherError::Status { status: status.as_u16(), body: truncate_body(&body) });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        parsed.into_record()
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch_by_coordinate(&self, coordinate: Coordinate) -> Result<WeatherRecord, WeatherError> {
        self.get_current(&[
            ("lat", coordinate.latitude.to_string()),
            ("lon", coordinate.longitude.to_string()),
        ])
        .await
    }

    async fn fetch_by_query(&self, query: &PlaceQuery) -> Result<WeatherRecord, WeatherError> {
        self.get_current(&[("q", query.to_query_param())]).await
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_max: f64,
    temp_min: f64,
    feels_like: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: Option<i64>,
    main: OwMain,
    weather: Vec<OwWeather>,
}

impl OwCurrentResponse {
    fn into_record(self) -> Result<WeatherRecord, WeatherError> {
        if self.weather.is_empty() {
            return Err(WeatherError::NoConditions);
        }

        let conditions = self
            .weather
            .into_iter()
            .map(|w| Condition { description: w.description, icon: w.icon })
            .collect();

        Ok(WeatherRecord {
            location_name: self.name,
            temperature: self.main.temp,
            max_temperature: self.main.temp_max,
            min_temperature: self.main.temp_min,
            feels_like: self.main.feels_like,
            conditions,
            observed_at: self.dt.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
