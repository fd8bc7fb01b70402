//! Predictive place search.
//!
//! A predictor never fails: anything that goes wrong while asking the
//! provider is logged and reported as "no suggestions".

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{
    fmt::Debug,
    sync::{Arc, OnceLock},
};

use crate::{config::PlacesConfig, model::PlaceSuggestion};

pub const DEFAULT_PLACES_URL: &str = "https://maps.googleapis.com";

const AUTOCOMPLETE_PATH: &str = "/maps/api/place/autocomplete/json";

#[async_trait]
pub trait PlacePredictor: Send + Sync + Debug {
    /// Suggestions for partial input, in provider relevance order.
    async fn predict(&self, input: &str) -> Vec<PlaceSuggestion>;
}

/// Google Places Autocomplete web service.
#[derive(Debug, Clone)]
pub struct GooglePlacesPredictor {
    api_key: String,
    base_url: String,
    http: Client,
}

impl GooglePlacesPredictor {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_PLACES_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn request(&self, input: &str) -> Result<AutocompleteResponse, reqwest::Error> {
        let url = format!("{}{}", self.base_url, AUTOCOMPLETE_PATH);

        self.http
            .get(&url)
            .query(&[("input", input), ("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json::<AutocompleteResponse>()
            .await
    }
}

#[async_trait]
impl PlacePredictor for GooglePlacesPredictor {
    async fn predict(&self, input: &str) -> Vec<PlaceSuggestion> {
        let response = match self.request(input).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "place prediction request failed");
                return Vec::new();
            }
        };

        match response.status.as_str() {
            "OK" => {
                tracing::debug!(input, count = response.predictions.len(), "place predictions received");
                response.predictions
            }
            "ZERO_RESULTS" => Vec::new(),
            status => {
                tracing::warn!(
                    status,
                    message = response.error_message.as_deref().unwrap_or_default(),
                    "place prediction rejected"
                );
                Vec::new()
            }
        }
    }
}

/// Stand-in when no places API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailablePredictor;

#[async_trait]
impl PlacePredictor for UnavailablePredictor {
    async fn predict(&self, _input: &str) -> Vec<PlaceSuggestion> {
        Vec::new()
    }
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: String,
    #[serde(default)]
    predictions: Vec<PlaceSuggestion>,
    error_message: Option<String>,
}

type PredictorFactory = Box<dyn Fn() -> Arc<dyn PlacePredictor> + Send + Sync>;

/// Process-wide owner of the place predictor.
///
/// The predictor is built on first use and exactly once; every later
/// caller gets the same shared instance.
pub struct PredictorContext {
    factory: PredictorFactory,
    predictor: OnceLock<Arc<dyn PlacePredictor>>,
}

impl PredictorContext {
    pub fn from_config(config: &PlacesConfig) -> Self {
        let api_key = config.api_key.clone();
        let base_url = config.base_url.clone();

        Self::with_factory(move || -> Arc<dyn PlacePredictor> {
            match &api_key {
                Some(key) => Arc::new(GooglePlacesPredictor::with_base_url(key.clone(), &base_url)),
                None => {
                    tracing::warn!("no places API key configured; search will return no suggestions");
                    Arc::new(UnavailablePredictor)
                }
            }
        })
    }

    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<dyn PlacePredictor> + Send + Sync + 'static,
    {
        Self { factory: Box::new(factory), predictor: OnceLock::new() }
    }

    pub fn predictor(&self) -> Arc<dyn PlacePredictor> {
        self.predictor
            .get_or_init(|| {
                tracing::debug!("initializing place predictor");
                (self.factory)()
            })
            .clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.predictor.get().is_some()
    }
}

impl Debug for PredictorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictorContext")
            .field("predictor", &self.predictor.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn predictor_is_built_lazily_and_once() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let ctx = PredictorContext::with_factory(move || -> Arc<dyn PlacePredictor> {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(UnavailablePredictor)
        });

        assert!(!ctx.is_initialized());
        assert_eq!(builds.load(Ordering::SeqCst), 0);

        let first = ctx.predictor();
        let second = ctx.predictor();

        assert!(ctx.is_initialized());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_api_key_yields_no_suggestions() {
        let ctx = PredictorContext::from_config(&PlacesConfig::default());
        assert!(ctx.predictor().predict("Par").await.is_empty());
    }
}
