//! The widget's top-level state.
//!
//! Every weather fetch runs on its own task and reports back over a
//! channel with the sequence number it was issued under. Only the newest
//! issued fetch may replace the displayed record, whatever order the
//! responses arrive in. Failed fetches are logged and leave the record as
//! it was. A fetch task that dies without answering counts as a failure.

use std::{future::Future, sync::Arc};

use tokio::sync::mpsc;

use crate::{
    autocomplete::AutocompleteController,
    error::{LocationError, WeatherError},
    location::LocationProvider,
    model::{Coordinate, PlaceSuggestion, ThemeMode, WeatherQuery, WeatherRecord},
    places::PredictorContext,
    resolver::LocationResolver,
    weather::WeatherSource,
};

#[derive(Debug)]
pub struct WeatherUpdate {
    sequence: u64,
    result: Result<WeatherRecord, WeatherError>,
}

/// What happened to one fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    /// A newer fetch was issued after this one.
    Superseded,
    Failed,
}

#[derive(Debug)]
pub struct WeatherPresenter {
    weather: Arc<dyn WeatherSource>,
    locator: Arc<dyn LocationProvider>,
    resolver: LocationResolver,
    autocomplete: AutocompleteController,
    coordinate: Option<Coordinate>,
    record: Option<WeatherRecord>,
    theme: ThemeMode,
    issued: u64,
    in_flight: usize,
    tx: mpsc::UnboundedSender<WeatherUpdate>,
    rx: mpsc::UnboundedReceiver<WeatherUpdate>,
}

impl WeatherPresenter {
    pub fn new(
        weather: Arc<dyn WeatherSource>,
        locator: Arc<dyn LocationProvider>,
        predictors: &PredictorContext,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            resolver: LocationResolver::new(Arc::clone(&weather)),
            autocomplete: AutocompleteController::new(predictors),
            weather,
            locator,
            coordinate: None,
            record: None,
            theme: ThemeMode::default(),
            issued: 0,
            in_flight: 0,
            tx,
            rx,
        }
    }

    pub fn with_theme(mut self, theme: ThemeMode) -> Self {
        self.theme = theme;
        self
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    pub fn record(&self) -> Option<&WeatherRecord> {
        self.record.as_ref()
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    pub fn autocomplete(&self) -> &AutocompleteController {
        &self.autocomplete
    }

    pub fn autocomplete_mut(&mut self) -> &mut AutocompleteController {
        &mut self.autocomplete
    }

    /// Ask for the current position once and fetch its weather.
    ///
    /// A location failure is returned as is; nothing is fetched.
    pub async fn mount(&mut self) -> Result<u64, LocationError> {
        let coordinate = self.locator.current_position().await?;
        self.coordinate = Some(coordinate);

        Ok(self.fetch_coordinate(coordinate))
    }

    /// Fetch again for the last known position, if there is one.
    pub fn locate_me(&mut self) -> Option<u64> {
        let coordinate = self.coordinate?;
        Some(self.fetch_coordinate(coordinate))
    }

    /// Forward a pick to the search box and look up the picked place.
    pub fn choose_place(&mut self, choice: Option<PlaceSuggestion>) -> Option<u64> {
        let picked = self.autocomplete.select(choice)?;
        let resolver = self.resolver.clone();

        Some(self.spawn_fetch(async move { resolver.resolve(&picked).await }))
    }

    pub fn toggle_theme(&mut self) -> ThemeMode {
        self.theme = self.theme.toggle();
        self.theme
    }

    /// Wait for the next fetch result and apply it.
    ///
    /// Returns `None` when no fetch is outstanding.
    pub async fn next_update(&mut self) -> Option<UpdateOutcome> {
        if self.in_flight == 0 {
            return None;
        }

        let update = self.rx.recv().await?;
        Some(self.apply(update))
    }

    /// Drain every outstanding fetch; returns the outcome of the last one to arrive.
    pub async fn settle(&mut self) -> Option<UpdateOutcome> {
        let mut last = None;
        while let Some(outcome) = self.next_update().await {
            last = Some(outcome);
        }
        last
    }

    fn fetch_coordinate(&mut self, coordinate: Coordinate) -> u64 {
        let weather = Arc::clone(&self.weather);
        let query = WeatherQuery::ByCoordinate(coordinate);
        self.spawn_fetch(async move { weather.fetch(&query).await })
    }

    fn spawn_fetch<F>(&mut self, fetch: F) -> u64
    where
        F: Future<Output = Result<WeatherRecord, WeatherError>> + Send + 'static,
    {
        self.issued += 1;
        self.in_flight += 1;

        let sequence = self.issued;
        let reply = FetchReply { tx: Some(self.tx.clone()), sequence };
        tracing::debug!(sequence, "issuing weather fetch");

        tokio::spawn(async move {
            let result = fetch.await;
            reply.send(result);
        });

        sequence
    }

    fn apply(&mut self, update: WeatherUpdate) -> UpdateOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);

        match update.result {
            Err(e) => {
                tracing::warn!(sequence = update.sequence, error = %e, "weather fetch failed");
                UpdateOutcome::Failed
            }
            Ok(_) if update.sequence != self.issued => {
                tracing::debug!(
                    sequence = update.sequence,
                    latest = self.issued,
                    "ignoring superseded weather response"
                );
                UpdateOutcome::Superseded
            }
            Ok(record) => {
                tracing::debug!(sequence = update.sequence, location = %record.location_name, "weather updated");
                self.record = Some(record);
                UpdateOutcome::Applied
            }
        }
    }
}

/// Reports a fetch's result exactly once; a task that ends without one
/// reports [`WeatherError::Interrupted`] on drop.
struct FetchReply {
    tx: Option<mpsc::UnboundedSender<WeatherUpdate>>,
    sequence: u64,
}

impl FetchReply {
    fn send(mut self, result: Result<WeatherRecord, WeatherError>) {
        self.deliver(result);
    }

    fn deliver(&mut self, result: Result<WeatherRecord, WeatherError>) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(WeatherUpdate { sequence: self.sequence, result });
        }
    }
}

impl Drop for FetchReply {
    fn drop(&mut self) {
        self.deliver(Err(WeatherError::Interrupted));
    }
}
