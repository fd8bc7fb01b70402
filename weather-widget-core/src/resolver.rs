//! Turns a picked place suggestion into a weather-by-name lookup.
//!
//! The provider's descriptions look like `"City, State, USA"` for US
//! places and `"City, Country"` elsewhere. Parsing is positional: the
//! first token is the city, the last is the country, and only for `USA`
//! the first token in between is the state.

use std::sync::Arc;

use crate::{
    error::WeatherError,
    model::{PlaceSuggestion, WeatherQuery, WeatherRecord},
    weather::WeatherSource,
};

const STATE_COUNTRY: &str = "USA";

/// City, optional state and country as sent in OpenWeather's `q` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaceQuery {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl PlaceQuery {
    pub fn from_description(description: &str) -> Self {
        let mut tokens: Vec<&str> = description.split(',').map(str::trim).collect();

        let city = if tokens.is_empty() { "" } else { tokens.remove(0) };
        let country = tokens.pop().unwrap_or_default();

        let state = if country == STATE_COUNTRY {
            tokens.first().copied().unwrap_or_default()
        } else {
            ""
        };

        Self { city: city.to_string(), state: state.to_string(), country: country.to_string() }
    }

    /// `city,state,country` with empty parts left out.
    pub fn to_query_param(&self) -> String {
        [self.city.as_str(), self.state.as_str(), self.country.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl std::fmt::Display for PlaceQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_query_param())
    }
}

#[derive(Debug, Clone)]
pub struct LocationResolver {
    weather: Arc<dyn WeatherSource>,
}

impl LocationResolver {
    pub fn new(weather: Arc<dyn WeatherSource>) -> Self {
        Self { weather }
    }

    /// Look up the weather for a picked suggestion with one by-name request.
    pub async fn resolve(&self, selection: &PlaceSuggestion) -> Result<WeatherRecord, WeatherError> {
        let query = PlaceQuery::from_description(&selection.description);
        tracing::info!(
            description = %selection.description,
            city = %query.city,
            state = %query.state,
            country = %query.country,
            "resolved place selection"
        );

        self.weather.fetch(&WeatherQuery::ByPlace(query)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> (String, String, String) {
        let q = PlaceQuery::from_description(s);
        (q.city, q.state, q.country)
    }

    #[test]
    fn city_and_country() {
        assert_eq!(parse("Paris, France"), ("Paris".into(), "".into(), "France".into()));
    }

    #[test]
    fn us_place_gets_state() {
        assert_eq!(parse("Austin, TX, USA"), ("Austin".into(), "TX".into(), "USA".into()));
    }

    #[test]
    fn non_us_middle_tokens_are_ignored() {
        assert_eq!(
            parse("Toronto, ON, Canada"),
            ("Toronto".into(), "".into(), "Canada".into())
        );
    }

    #[test]
    fn us_with_extra_tokens_takes_first_middle() {
        assert_eq!(
            parse("Brooklyn, NY, Kings County, USA"),
            ("Brooklyn".into(), "NY".into(), "USA".into())
        );
    }

    #[test]
    fn us_without_middle_has_empty_state() {
        assert_eq!(parse("Texas, USA"), ("Texas".into(), "".into(), "USA".into()));
    }

    #[test]
    fn single_token_has_no_country() {
        assert_eq!(parse("Atlantis"), ("Atlantis".into(), "".into(), "".into()));
    }

    #[test]
    fn country_match_is_case_sensitive() {
        assert_eq!(parse("Austin, TX, usa").1, "");
    }

    #[test]
    fn query_param_skips_empty_state() {
        assert_eq!(PlaceQuery::from_description("Paris, France").to_query_param(), "Paris,France");
        assert_eq!(
            PlaceQuery::from_description(" Austin ,TX ,  USA ").to_query_param(),
            "Austin,TX,USA"
        );
    }
}
