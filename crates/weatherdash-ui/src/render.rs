//! Text rendering of the weather form.

use weatherdash_weather::WeatherResult;

use crate::models::FormState;

const INPUT_PLACEHOLDER: &str = "Location";

/// Display strings for the weather card
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherCard {
    pub city_name: String,
    pub icon_url: Option<String>,
    /// Value with its unit label, e.g. `72.3 °F`
    pub temperature: String,
    pub condition: String,
}

impl WeatherCard {
    pub fn from_result(result: &WeatherResult) -> Self {
        let temperature = match result.temperature {
            Some(temp) => format!("{} {}", temp, result.units.symbol()),
            None => "--".to_string(),
        };

        Self {
            city_name: result.city_name.clone(),
            icon_url: result.icon_url(),
            temperature,
            condition: result.description.clone().unwrap_or_default(),
        }
    }

    /// Card for the current state; `None` until a lookup has succeeded
    pub fn from_state(state: &FormState) -> Option<Self> {
        state.weather.as_ref().map(Self::from_result)
    }
}

/// Render the whole form as plain text, one line per element.
pub fn render(state: &FormState) -> String {
    let input = if state.location_text.is_empty() {
        format!("<{}>", INPUT_PLACEHOLDER)
    } else {
        state.location_text.clone()
    };

    let mut lines = vec![format!("Location: [{}]  [Submit]", input)];

    if !state.status.is_empty() {
        lines.push(state.status.clone());
    }

    if let Some(card) = WeatherCard::from_state(state) {
        lines.push(format!("Weather Data for {}", card.city_name));
        if let Some(icon_url) = &card.icon_url {
            lines.push(format!("  Icon: {}", icon_url));
        }
        lines.push(format!("  Temperature: {}", card.temperature));
        lines.push(format!("  Condition: {}", card.condition));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use weatherdash_weather::Units;

    fn marietta(units: Units) -> WeatherResult {
        WeatherResult {
            city_name: "Marietta".to_string(),
            temperature: Some(72.3),
            description: Some("clear sky".to_string()),
            icon: Some("01d".to_string()),
            units,
        }
    }

    #[test]
    fn test_card_matches_provider_fields() {
        let card = WeatherCard::from_result(&marietta(Units::Imperial));
        assert_eq!(card.city_name, "Marietta");
        assert_eq!(card.temperature, "72.3 °F");
        assert_eq!(card.condition, "clear sky");
        assert_eq!(
            card.icon_url.as_deref(),
            Some("https://openweathermap.org/img/wn/01d@2x.png")
        );
    }

    #[test]
    fn test_card_metric_label() {
        let card = WeatherCard::from_result(&marietta(Units::Metric));
        assert_eq!(card.temperature, "72.3 °C");
    }

    #[test]
    fn test_no_card_without_result() {
        let state = FormState {
            location_text: String::new(),
            status: "Detecting your location...".to_string(),
            weather: None,
        };
        assert!(WeatherCard::from_state(&state).is_none());

        let text = render(&state);
        assert_eq!(
            text,
            "Location: [<Location>]  [Submit]\nDetecting your location...\n"
        );
    }

    #[test]
    fn test_render_with_result() {
        let state = FormState {
            location_text: "Marietta".to_string(),
            status: "Saved!".to_string(),
            weather: Some(marietta(Units::Metric)),
        };

        let text = render(&state);
        assert_eq!(
            text,
            "Location: [Marietta]  [Submit]\n\
             Saved!\n\
             Weather Data for Marietta\n  \
             Icon: https://openweathermap.org/img/wn/01d@2x.png\n  \
             Temperature: 72.3 °C\n  \
             Condition: clear sky\n"
        );
    }

    #[test]
    fn test_render_missing_icon_and_temperature() {
        let state = FormState {
            location_text: "Fogtown".to_string(),
            status: String::new(),
            weather: Some(WeatherResult {
                city_name: "Fogtown".to_string(),
                temperature: None,
                description: Some("mist".to_string()),
                icon: None,
                units: Units::Metric,
            }),
        };

        let text = render(&state);
        assert!(!text.contains("Icon:"));
        assert!(text.contains("Temperature: --"));
    }
}
