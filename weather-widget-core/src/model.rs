use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LocationError;
use crate::resolver::PlaceQuery;

/// A point on Earth in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        let valid = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(LocationError::InvalidCoordinate { latitude, longitude });
        }

        Ok(Self { latitude, longitude })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedSubstring {
    pub offset: usize,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredFormatting {
    pub main_text: String,
    #[serde(default)]
    pub secondary_text: String,
    #[serde(default)]
    pub main_text_matched_substrings: Vec<MatchedSubstring>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceTerm {
    pub offset: usize,
    pub value: String,
}

/// A candidate place returned by predictive search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub description: String,
    pub structured_formatting: StructuredFormatting,
    #[serde(default)]
    pub terms: Vec<PlaceTerm>,
    #[serde(default)]
    pub place_id: Option<String>,
}

/// One run of `main_text`, either inside a matched range or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightPart {
    pub text: String,
    pub highlight: bool,
}

impl PlaceSuggestion {
    /// Split `main_text` into plain and highlighted runs.
    ///
    /// Offsets count characters. Ranges past the end are clamped and
    /// overlapping or touching ranges are merged into one run.
    pub fn highlighted_parts(&self) -> Vec<HighlightPart> {
        let chars: Vec<char> = self.structured_formatting.main_text.chars().collect();
        let len = chars.len();

        let mut ranges: Vec<(usize, usize)> = self
            .structured_formatting
            .main_text_matched_substrings
            .iter()
            .map(|m| (m.offset.min(len), m.offset.saturating_add(m.length).min(len)))
            .filter(|(start, end)| start < end)
            .collect();
        ranges.sort_unstable();

        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
        for (start, end) in ranges {
            match merged.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }

        let mut parts = Vec::new();
        let mut cursor = 0;
        for (start, end) in merged {
            if cursor < start {
                parts.push(HighlightPart { text: chars[cursor..start].iter().collect(), highlight: false });
            }
            parts.push(HighlightPart { text: chars[start..end].iter().collect(), highlight: true });
            cursor = end;
        }
        if cursor < len {
            parts.push(HighlightPart { text: chars[cursor..].iter().collect(), highlight: false });
        }

        parts
    }
}

impl std::fmt::Display for PlaceSuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub description: String,
    pub icon: String,
}

impl Condition {
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }
}

/// Current conditions for one place. Temperatures are Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub location_name: String,
    pub temperature: f64,
    pub max_temperature: f64,
    pub min_temperature: f64,
    pub feels_like: f64,
    /// Never empty.
    pub conditions: Vec<Condition>,
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherRecord {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    ByCoordinate(Coordinate),
    ByPlace(PlaceQuery),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggle(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ThemeMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            _ => Err(anyhow::anyhow!("Unknown theme '{value}'. Supported themes: light, dark.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(main_text: &str, matches: &[(usize, usize)]) -> PlaceSuggestion {
        PlaceSuggestion {
            description: main_text.to_string(),
            structured_formatting: StructuredFormatting {
                main_text: main_text.to_string(),
                secondary_text: String::new(),
                main_text_matched_substrings: matches
                    .iter()
                    .map(|&(offset, length)| MatchedSubstring { offset, length })
                    .collect(),
            },
            terms: Vec::new(),
            place_id: None,
        }
    }

    fn texts(parts: &[HighlightPart]) -> Vec<(&str, bool)> {
        parts.iter().map(|p| (p.text.as_str(), p.highlight)).collect()
    }

    #[test]
    fn highlight_prefix_match() {
        let parts = suggestion("Paris", &[(0, 3)]).highlighted_parts();
        assert_eq!(texts(&parts), vec![("Par", true), ("is", false)]);
    }

    #[test]
    fn highlight_without_matches_is_single_plain_part() {
        let parts = suggestion("Austin", &[]).highlighted_parts();
        assert_eq!(texts(&parts), vec![("Austin", false)]);
    }

    #[test]
    fn highlight_merges_overlaps_and_clamps() {
        let parts = suggestion("San Jose", &[(4, 10), (0, 2), (1, 2)]).highlighted_parts();
        assert_eq!(texts(&parts), vec![("San", true), (" ", false), ("Jose", true)]);
    }

    #[test]
    fn highlight_counts_characters_not_bytes() {
        let parts = suggestion("Zürich", &[(0, 2)]).highlighted_parts();
        assert_eq!(texts(&parts), vec![("Zü", true), ("rich", false)]);
    }

    #[test]
    fn coordinate_rejects_out_of_range() {
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, -181.0).is_err());
        assert!(Coordinate::new(48.85, 2.35).is_ok());
    }

    #[test]
    fn theme_toggle_and_parse() {
        assert_eq!(ThemeMode::Light.toggle(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.toggle(), ThemeMode::Light);
        assert_eq!(ThemeMode::try_from("DARK").unwrap(), ThemeMode::Dark);
        assert!(ThemeMode::try_from("sepia").is_err());
    }

    #[test]
    fn suggestion_deserializes_from_places_payload() {
        let json = serde_json::json!({
            "description": "Paris, France",
            "place_id": "abc",
            "structured_formatting": {
                "main_text": "Paris",
                "main_text_matched_substrings": [{ "offset": 0, "length": 2 }],
                "secondary_text": "France"
            },
            "terms": [{ "offset": 0, "value": "Paris" }, { "offset": 7, "value": "France" }],
            "types": ["locality", "political"]
        });

        let s: PlaceSuggestion = serde_json::from_value(json).unwrap();
        assert_eq!(s.description, "Paris, France");
        assert_eq!(s.terms.len(), 2);
        assert_eq!(s.place_id.as_deref(), Some("abc"));
        assert_eq!(s.structured_formatting.main_text_matched_substrings[0].length, 2);
    }
}
