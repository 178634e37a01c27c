use serde::{Deserialize, Serialize};

/// Forecast API response; only the fields rainylight reads are typed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    pub title: Option<String>,
    /// 0: today, 1: tomorrow, 2: the day after. Kept untyped so a bad later
    /// day cannot spoil today.
    #[serde(default)]
    pub forecasts: Vec<serde_json::Value>,
}

impl ForecastResponse {
    /// Parse today's entry; the other days are never looked at.
    pub fn today(&self) -> Result<DailyForecast, WeatherError> {
        let entry = self
            .forecasts
            .first()
            .ok_or_else(|| WeatherError::Parse("Forecast has no entry for today".to_string()))?;

        DailyForecast::deserialize(entry)
            .map_err(|e| WeatherError::Parse(format!("Today's forecast: {}", e)))
    }
}

/// One day's forecast
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub date: Option<String>,
    /// e.g. "今日"
    pub date_label: Option<String>,
    /// Short summary, e.g. "晴のち雨"
    pub telop: Option<String>,
    pub chance_of_rain: ChanceOfRain,
}

/// Chance of rain per six-hour window, as percentage strings like "20%" or "--%"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChanceOfRain {
    #[serde(rename = "T00_06", default)]
    pub t00_06: String,
    #[serde(rename = "T06_12", default)]
    pub t06_12: String,
    #[serde(rename = "T12_18")]
    pub t12_18: String,
    #[serde(rename = "T18_24")]
    pub t18_24: String,
}

/// Today's afternoon and evening chance of rain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// 12:00-18:00
    pub afternoon: u8,
    /// 18:00-24:00
    pub evening: u8,
}

impl ForecastSample {
    /// The worse of the two windows
    pub fn rain_level(&self) -> RainLevel {
        RainLevel::new(self.afternoon.max(self.evening))
    }
}

/// Rain level for the rest of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RainLevel {
    /// 0..=100
    Percent(u8),
    /// The forecast could not be read
    Unknown,
}

impl RainLevel {
    /// Clamps to 100
    pub fn new(percent: u8) -> Self {
        Self::Percent(percent.min(100))
    }

    pub fn percent(&self) -> Option<u8> {
        match self {
            Self::Percent(p) => Some(*p),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for RainLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percent(p) => write!(f, "{}%", p),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Forecast errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Forecast API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid request: {0}")]
    Request(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rain_level_is_max_of_windows() {
        let sample = ForecastSample {
            afternoon: 20,
            evening: 65,
        };
        assert_eq!(sample.rain_level(), RainLevel::Percent(65));

        let dry = ForecastSample {
            afternoon: 0,
            evening: 0,
        };
        assert_eq!(dry.rain_level(), RainLevel::Percent(0));

        let wet_afternoon = ForecastSample {
            afternoon: 80,
            evening: 10,
        };
        assert_eq!(wet_afternoon.rain_level(), RainLevel::Percent(80));
    }

    #[test]
    fn test_rain_level_clamps() {
        assert_eq!(RainLevel::new(250), RainLevel::Percent(100));
        assert_eq!(RainLevel::Unknown.percent(), None);
    }

    #[test]
    fn test_rain_level_display() {
        assert_eq!(RainLevel::new(30).to_string(), "30%");
        assert_eq!(RainLevel::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "title": "東京都 東京 の天気",
            "forecasts": [
                {
                    "date": "2024-06-01",
                    "dateLabel": "今日",
                    "telop": "曇のち雨",
                    "chanceOfRain": {"T00_06": "--%", "T06_12": "--%", "T12_18": "30%", "T18_24": "60%"}
                },
                {
                    "date": "2024-06-02",
                    "dateLabel": "明日",
                    "telop": "晴",
                    "chanceOfRain": {"T00_06": "0%", "T06_12": "0%", "T12_18": "0%", "T18_24": "10%"}
                }
            ]
        }"#;
        let resp: ForecastResponse = serde_json::from_str(json).unwrap();
        let today = resp.today().unwrap();
        assert_eq!(today.date.as_deref(), Some("2024-06-01"));
        assert_eq!(today.date_label.as_deref(), Some("今日"));
        assert_eq!(today.chance_of_rain.t12_18, "30%");
        assert_eq!(today.chance_of_rain.t18_24, "60%");
        assert_eq!(resp.forecasts.len(), 2);
    }

    #[test]
    fn test_missing_window_is_parse_failure() {
        let json = r#"{"forecasts": [{"chanceOfRain": {"T12_18": "10%"}}]}"#;
        let resp: ForecastResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(resp.today(), Err(WeatherError::Parse(_))));
    }

    #[test]
    fn test_no_days_is_parse_failure() {
        let resp: ForecastResponse = serde_json::from_str(r#"{"forecasts": []}"#).unwrap();
        assert!(matches!(resp.today(), Err(WeatherError::Parse(_))));
    }

    #[test]
    fn test_later_days_are_not_parsed() {
        let json = r#"{
            "forecasts": [
                {"chanceOfRain": {"T12_18": "30%", "T18_24": "60%"}},
                {"date": "2024-06-02", "chanceOfRain": null},
                "garbage"
            ]
        }"#;
        let resp: ForecastResponse = serde_json::from_str(json).unwrap();
        let today = resp.today().unwrap();
        assert_eq!(today.chance_of_rain.t12_18, "30%");
        assert_eq!(today.chance_of_rain.t18_24, "60%");
    }
}
