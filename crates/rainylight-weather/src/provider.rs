use crate::types::{ForecastResponse, ForecastSample, RainLevel, WeatherError};
use rainylight_core::{HttpConfig, WeatherConfig};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

const FORECAST_PATH: &str = "api/forecast/city";

/// Reads today's rain chance for a city.
#[derive(Debug, Clone)]
pub struct ForecastReader {
    client: Arc<Client>,
    base_url: String,
}

impl ForecastReader {
    pub fn new(config: &WeatherConfig, http: &HttpConfig) -> Result<Self, WeatherError> {
        Self::with_base_url(&config.api_base_url, http.timeout())
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the full three-day forecast.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_forecast(&self, city_code: &str) -> Result<ForecastResponse, WeatherError> {
        if city_code.is_empty() || !city_code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(WeatherError::Request(format!(
                "Invalid city code: {:?}",
                city_code
            )));
        }

        let url = format!(
            "{}/{}/{}",
            self.base_url,
            FORECAST_PATH,
            urlencoding::encode(city_code)
        );
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        tracing::debug!("Forecast API returned {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| WeatherError::Parse(e.to_string()))
    }

    /// Today's afternoon and evening chance of rain.
    pub async fn fetch_rain_sample(&self, city_code: &str) -> Result<ForecastSample, WeatherError> {
        let forecast = self.fetch_forecast(city_code).await?;

        let today = forecast.today()?;

        let rain = &today.chance_of_rain;
        tracing::info!(
            "Chance of rain: T12_18={} T18_24={}",
            rain.t12_18,
            rain.t18_24
        );

        Ok(ForecastSample {
            afternoon: parse_percent(&rain.t12_18),
            evening: parse_percent(&rain.t18_24),
        })
    }

    /// Worst-case rain level for the rest of today.
    ///
    /// Never fails: any error is logged and reported as `RainLevel::Unknown`.
    #[instrument(skip(self), level = "info")]
    pub async fn get_rain_percent(&self, city_code: &str) -> RainLevel {
        match self.fetch_rain_sample(city_code).await {
            Ok(sample) => {
                let level = sample.rain_level();
                tracing::info!("Rain level for {}: {}", city_code, level);
                level
            }
            Err(e) => {
                tracing::error!("Failed to read forecast for {}: {}", city_code, e);
                RainLevel::Unknown
            }
        }
    }
}

/// Extract the integer from a percentage string such as "20%".
///
/// Non-digits are dropped; no digits yields 0; values saturate at 100.
pub fn parse_percent(raw: &str) -> u8 {
    let value = raw
        .chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add(d));

    value.min(100) as u8
}
