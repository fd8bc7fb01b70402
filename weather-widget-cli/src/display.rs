use chrono::Local;
use weather_widget_core::{PlaceSuggestion, ThemeMode, WeatherRecord};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

struct Palette {
    title: &'static str,
    text: &'static str,
    muted: &'static str,
}

fn palette(theme: ThemeMode) -> Palette {
    match theme {
        ThemeMode::Light => Palette { title: "\x1b[34m", text: "\x1b[30m", muted: "\x1b[90m" },
        ThemeMode::Dark => Palette { title: "\x1b[96m", text: "\x1b[97m", muted: "\x1b[37m" },
    }
}

/// Whole degrees, halves rounded up (-2.5 shows as -2).
fn celsius(value: f64) -> String {
    format!("{} °C", (value + 0.5).floor() as i64)
}

pub fn header(theme: ThemeMode) -> String {
    let p = palette(theme);
    format!("{BOLD}{}WEATHER APP{RESET}", p.title)
}

pub fn weather(record: &WeatherRecord, theme: ThemeMode) -> String {
    let p = palette(theme);
    let mut lines = vec![
        format!(
            "{}{}{RESET}  {}{}{RESET}",
            p.title,
            record.location_name.to_uppercase(),
            p.text,
            celsius(record.temperature)
        ),
        format!(
            "{}MAX: {}  MIN: {}{RESET}",
            p.text,
            celsius(record.max_temperature),
            celsius(record.min_temperature)
        ),
        format!("{}FEELS LIKE: {}{RESET}", p.text, celsius(record.feels_like)),
    ];

    if let Some(condition) = record.primary_condition() {
        lines.push(format!(
            "{}{}{RESET}  {}{}{RESET}",
            p.text,
            condition.description.to_uppercase(),
            p.muted,
            condition.icon_url()
        ));
    }

    if let Some(observed) = record.observed_at {
        lines.push(format!(
            "{}observed {}{RESET}",
            p.muted,
            observed.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ));
    }

    lines.join("\n")
}

/// One option line: matched part of the main text in bold, secondary text muted.
pub fn suggestion(place: &PlaceSuggestion, theme: ThemeMode) -> String {
    let p = palette(theme);
    let mut out = String::new();

    for part in place.highlighted_parts() {
        if part.highlight {
            out.push_str(&format!("{BOLD}{}{}{RESET}", p.text, part.text));
        } else {
            out.push_str(&format!("{}{}{RESET}", p.text, part.text));
        }
    }

    let secondary = &place.structured_formatting.secondary_text;
    if !secondary.is_empty() {
        out.push_str(&format!(" {}{secondary}{RESET}", p.muted));
    }

    out
}

pub fn no_data(theme: ThemeMode) -> String {
    let p = palette(theme);
    format!("{}No weather data{RESET}", p.muted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_widget_core::model::{Condition, MatchedSubstring, StructuredFormatting};

    fn record() -> WeatherRecord {
        WeatherRecord {
            location_name: "Paris".into(),
            temperature: 18.6,
            max_temperature: 19.4,
            min_temperature: 16.5,
            feels_like: -0.4,
            conditions: vec![Condition { description: "clear sky".into(), icon: "01d".into() }],
            observed_at: None,
        }
    }

    #[test]
    fn weather_rounds_and_uppercases() {
        let out = weather(&record(), ThemeMode::Light);

        assert!(out.contains("PARIS"));
        assert!(out.contains("19 °C"));
        assert!(out.contains("MAX: 19 °C"));
        assert!(out.contains("MIN: 17 °C"));
        assert!(out.contains("FEELS LIKE: 0 °C"));
        assert!(out.contains("CLEAR SKY"));
        assert!(out.contains("https://openweathermap.org/img/wn/01d@2x.png"));
    }

    #[test]
    fn celsius_rounds_halves_up() {
        assert_eq!(celsius(-2.5), "-2 °C");
        assert_eq!(celsius(2.5), "3 °C");
        assert_eq!(celsius(-0.4), "0 °C");
    }

    #[test]
    fn themes_use_different_colours() {
        assert_ne!(weather(&record(), ThemeMode::Light), weather(&record(), ThemeMode::Dark));
    }

    #[test]
    fn suggestion_bolds_matched_text() {
        let place = PlaceSuggestion {
            description: "Paris, France".into(),
            structured_formatting: StructuredFormatting {
                main_text: "Paris".into(),
                secondary_text: "France".into(),
                main_text_matched_substrings: vec![MatchedSubstring { offset: 0, length: 3 }],
            },
            terms: Vec::new(),
            place_id: None,
        };

        let out = suggestion(&place, ThemeMode::Dark);
        assert!(out.contains(&format!("{BOLD}\x1b[97mPar{RESET}")));
        assert!(out.contains("is"));
        assert!(out.contains("France"));
    }
}
