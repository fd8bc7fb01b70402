use std::{fmt, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use weather_widget_core::{
    Config, Coordinate, FixedLocation, IpLocator, LocationProvider, OpenWeatherClient,
    PlaceSuggestion, PredictorContext, ThemeMode, UpdateOutcome, WeatherPresenter,
};

use crate::display;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-widget", version, about = "Current weather for where you are, or anywhere you search")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Colour theme: "light" or "dark".
    #[arg(long, global = true, default_value = "light")]
    pub theme: String,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store API keys for OpenWeather and the place search.
    Configure,

    /// Show weather for the current position.
    Here {
        /// Latitude to use instead of IP geolocation.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude to use instead of IP geolocation.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Search for a place, pick one and show its weather.
    Search {
        /// Partial place name, e.g. "Aus".
        text: String,
    },

    /// Interactive widget: current position first, then search, locate me or toggle theme.
    Widget {
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let theme = ThemeMode::try_from(self.theme.as_str())?;

        match self.command {
            Command::Configure => configure(),
            Command::Here { lat, lon } => {
                let config = Config::load()?;
                let predictors = PredictorContext::from_config(&config.places);
                let mut presenter = build_presenter(&config, &predictors, lat, lon, theme)?;

                presenter.mount().await.context("Error getting location")?;
                report(presenter.settle().await);
                render(&presenter);
                Ok(())
            }
            Command::Search { text } => {
                let config = Config::load()?;
                let predictors = PredictorContext::from_config(&config.places);
                let mut presenter = build_presenter(&config, &predictors, None, None, theme)?;

                search(&mut presenter, text).await?;
                render(&presenter);
                Ok(())
            }
            Command::Widget { lat, lon } => {
                let config = Config::load()?;
                let predictors = PredictorContext::from_config(&config.places);
                let mut presenter = build_presenter(&config, &predictors, lat, lon, theme)?;

                widget(&mut presenter).await
            }
        }
    }
}

fn build_presenter(
    config: &Config,
    predictors: &PredictorContext,
    lat: Option<f64>,
    lon: Option<f64>,
    theme: ThemeMode,
) -> anyhow::Result<WeatherPresenter> {
    let api_key = config.weather_api_key()?.to_string();
    let weather = Arc::new(OpenWeatherClient::with_base_url(api_key, &config.weather.base_url));

    let locator: Arc<dyn LocationProvider> = match (lat, lon) {
        (Some(lat), Some(lon)) => Arc::new(FixedLocation(Coordinate::new(lat, lon)?)),
        _ => Arc::new(IpLocator::new(&config.location.base_url)),
    };

    Ok(WeatherPresenter::new(weather, locator, predictors).with_theme(theme))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let weather_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;
    if !weather_key.trim().is_empty() {
        config.set_weather_api_key(weather_key.trim().to_string());
    }

    let places_key = Password::new("Google Maps (Places) API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key; without one, search finds nothing")
        .prompt()?;
    if !places_key.trim().is_empty() {
        config.set_places_api_key(places_key.trim().to_string());
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

/// A place option rendered with its matched text highlighted.
struct Choice {
    place: PlaceSuggestion,
    label: String,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

async fn search(presenter: &mut WeatherPresenter, text: String) -> anyhow::Result<()> {
    let theme = presenter.theme();
    let autocomplete = presenter.autocomplete_mut();

    autocomplete.input_changed(text);
    autocomplete.next_batch().await;

    let choices: Vec<Choice> = autocomplete
        .options()
        .iter()
        .map(|place| Choice { place: place.clone(), label: display::suggestion(place, theme) })
        .collect();

    if choices.is_empty() {
        println!("No locations");
        return Ok(());
    }

    let picked = Select::new("Location", choices).prompt_skippable()?;

    if presenter.choose_place(picked.map(|c| c.place)).is_some() {
        report(presenter.settle().await);
    }

    Ok(())
}

async fn widget(presenter: &mut WeatherPresenter) -> anyhow::Result<()> {
    const SEARCH: &str = "Search location";
    const LOCATE: &str = "Locate me";
    const THEME: &str = "Toggle theme";
    const QUIT: &str = "Quit";

    presenter.mount().await.context("Error getting location")?;
    report(presenter.settle().await);

    loop {
        render(presenter);

        let action = Select::new("", vec![SEARCH, LOCATE, THEME, QUIT]).prompt_skippable()?;

        match action {
            Some(SEARCH) => {
                let text = Text::new("Location:").prompt()?;
                search(presenter, text).await?;
            }
            Some(LOCATE) => {
                if presenter.locate_me().is_some() {
                    report(presenter.settle().await);
                }
            }
            Some(THEME) => {
                presenter.toggle_theme();
            }
            _ => return Ok(()),
        }
    }
}

fn report(outcome: Option<UpdateOutcome>) {
    if outcome == Some(UpdateOutcome::Failed) {
        tracing::info!("keeping previous weather after a failed refresh");
    }
}

fn render(presenter: &WeatherPresenter) {
    let theme = presenter.theme();

    println!("{}", display::header(theme));
    match presenter.record() {
        Some(record) => println!("{}", display::weather(record, theme)),
        None => println!("{}", display::no_data(theme)),
    }
}
