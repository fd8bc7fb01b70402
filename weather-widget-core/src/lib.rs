//! Core library for the `weather-widget` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and the place autocomplete predictor
//! - The debounced autocomplete controller and place-to-query resolution
//! - The presenter that ties location, search and weather state together
//!
//! It is used by `weather-widget-cli`, but can also be reused by other front ends.

pub mod autocomplete;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod places;
pub mod presenter;
pub mod resolver;
pub mod weather;

pub use autocomplete::{AutocompleteController, SelectionState};
pub use config::Config;
pub use error::{LocationError, WeatherError};
pub use location::{FixedLocation, IpLocator, LocationProvider};
pub use model::{Coordinate, PlaceSuggestion, ThemeMode, WeatherQuery, WeatherRecord};
pub use places::{GooglePlacesPredictor, PlacePredictor, PredictorContext};
pub use presenter::{UpdateOutcome, WeatherPresenter};
pub use resolver::{LocationResolver, PlaceQuery};
pub use weather::{OpenWeatherClient, WeatherSource};
