use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_SWITCHBOT_API_URL: &str = "https://api.switch-bot.com";
pub const DEFAULT_WEATHER_API_URL: &str = "https://weather.tsukumijima.net";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BRIGHTNESS: u8 = 100;

pub const ENV_ACCESS_TOKEN: &str = "SWITCHBOT_ACCESS_TOKEN";
pub const ENV_SECRET: &str = "SWITCHBOT_SECRET";
pub const ENV_DEVICE_ID: &str = "SWITCHBOT_DEVICE_ID";
pub const ENV_SWITCHBOT_API_URL: &str = "SWITCHBOT_API_BASE_URL";
pub const ENV_CITY_CODE: &str = "WEATHER_CITY_CODE";
pub const ENV_WEATHER_API_URL: &str = "WEATHER_API_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "RAINYLIGHT_HTTP_TIMEOUT_SECS";
pub const ENV_COLOR_POLICY: &str = "RAINYLIGHT_COLOR_POLICY";
pub const ENV_BRIGHTNESS: &str = "RAINYLIGHT_BRIGHTNESS";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Joins all errors into a single line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Device-cloud API credentials.
///
/// Read once at startup and never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Which rain-to-color table the light uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorPolicy {
    /// Inclusive upper-bound bands covering 0..=100
    #[default]
    Banded,
    /// Exact multiples of ten only; anything else shows the error color
    Exact,
}

impl FromStr for ColorPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "banded" | "bands" => Ok(Self::Banded),
            "exact" => Ok(Self::Exact),
            other => Err(ConfigError::Invalid(format!(
                "{}: expected 'banded' or 'exact', got '{}'",
                ENV_COLOR_POLICY, other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SwitchBotConfig {
    pub credentials: Credentials,
    /// Target light; only the devices utility runs without one
    pub device_id: Option<String>,
    pub api_base_url: String,
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub city_code: Option<String>,
    pub api_base_url: String,
}

#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LightConfig {
    pub color_policy: ColorPolicy,
    pub brightness: u8,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color_policy: ColorPolicy::default(),
            brightness: DEFAULT_BRIGHTNESS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub switchbot: SwitchBotConfig,
    pub weather: WeatherConfig,
    pub http: HttpConfig,
    pub light: LightConfig,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from the environment and validate.
    pub fn from_env_validated(require_target: bool) -> Result<Self, ConfigError> {
        Self::from_env()?.into_validated(require_target)
    }

    /// Warnings are logged; errors fail with a summary.
    pub fn into_validated(self, require_target: bool) -> Result<Self, ConfigError> {
        let validation = self.validate(require_target);

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "validation failed: {}",
                validation.error_summary()
            )));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(self)
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Values are trimmed; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require =
            |key: &str| get(key).ok_or_else(|| ConfigError::MissingSetting(key.to_string()));

        let credentials = Credentials::new(require(ENV_ACCESS_TOKEN)?, require(ENV_SECRET)?);

        let timeout_secs = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                ConfigError::Invalid(format!("{}: {} ({})", ENV_TIMEOUT_SECS, raw, e))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let brightness = match get(ENV_BRIGHTNESS) {
            Some(raw) => raw.trim().parse::<u8>().map_err(|e| {
                ConfigError::Invalid(format!("{}: {} ({})", ENV_BRIGHTNESS, raw, e))
            })?,
            None => DEFAULT_BRIGHTNESS,
        };

        let color_policy = match get(ENV_COLOR_POLICY) {
            Some(raw) => raw.parse()?,
            None => ColorPolicy::default(),
        };

        Ok(Self {
            switchbot: SwitchBotConfig {
                credentials,
                device_id: get(ENV_DEVICE_ID),
                api_base_url: get(ENV_SWITCHBOT_API_URL)
                    .unwrap_or_else(|| DEFAULT_SWITCHBOT_API_URL.to_string()),
            },
            weather: WeatherConfig {
                city_code: get(ENV_CITY_CODE),
                api_base_url: get(ENV_WEATHER_API_URL)
                    .unwrap_or_else(|| DEFAULT_WEATHER_API_URL.to_string()),
            },
            http: HttpConfig { timeout_secs },
            light: LightConfig {
                color_policy,
                brightness,
            },
        })
    }

    /// Validate the configuration.
    ///
    /// `require_target` demands a device id and city code, which the scheduled
    /// run needs and the device listing does not.
    pub fn validate(&self, require_target: bool) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(
            &self.switchbot.api_base_url,
            ENV_SWITCHBOT_API_URL,
            &mut result,
        );
        self.validate_url(&self.weather.api_base_url, ENV_WEATHER_API_URL, &mut result);

        if require_target {
            if self.switchbot.device_id.is_none() {
                result.add_error(ENV_DEVICE_ID, "A target device id is required");
            }
            if self.weather.city_code.is_none() {
                result.add_error(ENV_CITY_CODE, "A forecast city code is required");
            }
        }

        if let Some(city) = &self.weather.city_code {
            if !city.chars().all(|c| c.is_ascii_alphanumeric()) {
                result.add_error(
                    ENV_CITY_CODE,
                    format!("City code must be letters and digits, got: {:?}", city),
                );
            } else if !city.chars().all(|c| c.is_ascii_digit()) {
                result.add_warning(
                    ENV_CITY_CODE,
                    format!("City code is usually numeric, got: {}", city),
                );
            }
        }

        if self.http.timeout_secs == 0 {
            result.add_error(ENV_TIMEOUT_SECS, "Timeout must be greater than 0");
        } else if self.http.timeout_secs > 60 {
            result.add_warning(
                ENV_TIMEOUT_SECS,
                "Timeout is longer than a minute; a scheduled run may overlap the next",
            );
        }

        if self.light.brightness > 100 {
            result.add_error(ENV_BRIGHTNESS, "Brightness must be between 0 and 100");
        } else if self.light.brightness == 0 {
            result.add_warning(ENV_BRIGHTNESS, "Brightness 0 leaves the light dark");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                } else if url.scheme() == "http" {
                    result.add_warning(field_name, "URL is not using https");
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }
}
