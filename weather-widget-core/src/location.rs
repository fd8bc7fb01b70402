//! Device location.
//!
//! A terminal has no browser geolocation prompt, so the current position
//! comes from IP geolocation (ip-api.com) or from coordinates the user
//! passes in. There is no fallback coordinate: a failed lookup is an error.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{error::LocationError, model::Coordinate};

pub const DEFAULT_LOCATION_URL: &str = "http://ip-api.com";

#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinate, LocationError>;
}

#[derive(Debug, Clone)]
pub struct IpLocator {
    base_url: String,
    http: Client,
}

impl IpLocator {
    pub fn new(base_url: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), http: Client::new() }
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new(DEFAULT_LOCATION_URL)
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
}

#[async_trait]
impl LocationProvider for IpLocator {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        let url = format!("{}/json", self.base_url);
        tracing::debug!(%url, "requesting IP geolocation");

        let body: IpApiResponse = self
            .http
            .get(&url)
            .query(&[("fields", "status,message,lat,lon,city")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if body.status != "success" {
            return Err(LocationError::Lookup(
                body.message.unwrap_or_else(|| format!("status {}", body.status)),
            ));
        }

        let (Some(lat), Some(lon)) = (body.lat, body.lon) else {
            return Err(LocationError::Lookup("response has no coordinates".to_string()));
        };

        let coordinate = Coordinate::new(lat, lon)?;
        tracing::info!(
            lat,
            lon,
            city = body.city.as_deref().unwrap_or_default(),
            "geolocation resolved"
        );

        Ok(coordinate)
    }
}

/// A position supplied up front, e.g. from `--lat/--lon`.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinate);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_location_returns_its_coordinate() {
        let c = Coordinate::new(30.27, -97.74).unwrap();
        assert_eq!(FixedLocation(c).current_position().await.unwrap(), c);
    }
}
