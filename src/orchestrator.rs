//! One scheduled run: forecast, color, three device commands.
//!
//! The run never aborts. A forecast failure shows the error color, and a
//! failed command does not stop the ones after it, so the light can end up
//! partially updated. Every step's outcome is kept in the `RunReport`.

use rainylight_core::config::{ENV_CITY_CODE, ENV_DEVICE_ID};
use rainylight_core::{AppError, ColorPolicy, Config, ConfigError};
use rainylight_switchbot::{CommandAck, DeviceClient, DeviceCommand, RemoteCommandError};
use rainylight_weather::{ForecastReader, RainLevel};

use crate::color::ColorCommand;
use crate::error;

/// What a run targets and how it colors the light.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub device_id: String,
    pub city_code: String,
    pub color_policy: ColorPolicy,
    pub brightness: u8,
}

impl RunSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let device_id = config
            .switchbot
            .device_id
            .clone()
            .ok_or_else(|| ConfigError::MissingSetting(ENV_DEVICE_ID.to_string()))?;
        let city_code = config
            .weather
            .city_code
            .clone()
            .ok_or_else(|| ConfigError::MissingSetting(ENV_CITY_CODE.to_string()))?;

        Ok(Self {
            device_id,
            city_code,
            color_policy: config.light.color_policy,
            brightness: config.light.brightness,
        })
    }
}

/// A command and what became of it.
#[derive(Debug)]
pub struct CommandStep {
    pub command: DeviceCommand,
    pub outcome: Result<CommandAck, RemoteCommandError>,
}

impl CommandStep {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Outcome of one run.
#[derive(Debug)]
pub struct RunReport {
    pub rain: RainLevel,
    pub color: ColorCommand,
    /// setBrightness, setColor, turnOn
    pub steps: [CommandStep; 3],
}

impl RunReport {
    pub fn all_commands_ok(&self) -> bool {
        self.steps.iter().all(CommandStep::is_ok)
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &CommandStep> {
        self.steps.iter().filter(|s| !s.is_ok())
    }

    /// One log line per step plus a summary.
    pub fn log_summary(&self) {
        for step in &self.steps {
            match &step.outcome {
                Ok(ack) => tracing::info!(
                    "{}({}): ok ({})",
                    step.command.command,
                    step.command.parameter,
                    ack.status
                ),
                Err(e) => tracing::error!(
                    "{}({}): {}",
                    step.command.command,
                    step.command.parameter,
                    e
                ),
            }
        }

        let failed = self.failed_steps().count();
        if failed == 0 {
            tracing::info!("Light set to {} for rain {}", self.color.color, self.rain);
        } else {
            tracing::warn!(
                "Light may be partially updated: {} of {} commands failed (rain {})",
                failed,
                self.steps.len(),
                self.rain
            );
        }
    }
}

pub struct Orchestrator {
    forecast: ForecastReader,
    devices: DeviceClient,
    settings: RunSettings,
}

impl Orchestrator {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let settings = RunSettings::from_config(config)?;
        let forecast =
            ForecastReader::new(&config.weather, &config.http).map_err(error::from_forecast)?;
        let devices =
            DeviceClient::new(&config.switchbot, &config.http).map_err(error::from_device)?;

        Ok(Self::from_parts(forecast, devices, settings))
    }

    pub fn from_parts(
        forecast: ForecastReader,
        devices: DeviceClient,
        settings: RunSettings,
    ) -> Self {
        Self {
            forecast,
            devices,
            settings,
        }
    }

    /// The color and command triplet for a rain level.
    pub fn plan(&self, rain: RainLevel) -> (ColorCommand, [DeviceCommand; 3]) {
        let color = ColorCommand::new(self.settings.color_policy, rain, self.settings.brightness);
        let device_id = &self.settings.device_id;

        let commands = [
            DeviceCommand::set_brightness(device_id.as_str(), color.brightness),
            DeviceCommand::set_color(device_id.as_str(), color.color),
            DeviceCommand::turn_on(device_id.as_str()),
        ];

        (color, commands)
    }

    /// Run once. Carries no state into the next run.
    pub async fn run(&self) -> RunReport {
        let rain = self.forecast.get_rain_percent(&self.settings.city_code).await;
        let (color, [brightness, set_color, turn_on]) = self.plan(rain);

        tracing::info!(
            "Rain {} -> color {} at brightness {}",
            rain,
            color.color,
            color.brightness
        );

        // Strictly in order; a failure does not skip the rest
        let steps = [
            self.send(brightness).await,
            self.send(set_color).await,
            self.send(turn_on).await,
        ];

        RunReport { rain, color, steps }
    }

    async fn send(&self, command: DeviceCommand) -> CommandStep {
        let outcome = match self.devices.post_command(&command).await {
            Ok(raw) => raw.into_ack(),
            Err(e) => Err(RemoteCommandError::from(e)),
        };

        CommandStep { command, outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[test]
    fn test_settings_from_config() {
        let config = config(&[
            ("SWITCHBOT_ACCESS_TOKEN", "t"),
            ("SWITCHBOT_SECRET", "s"),
            ("SWITCHBOT_DEVICE_ID", "LIGHT"),
            ("WEATHER_CITY_CODE", "130010"),
            ("RAINYLIGHT_COLOR_POLICY", "exact"),
            ("RAINYLIGHT_BRIGHTNESS", "80"),
        ]);
        let settings = RunSettings::from_config(&config).unwrap();

        assert_eq!(settings.device_id, "LIGHT");
        assert_eq!(settings.city_code, "130010");
        assert_eq!(settings.color_policy, ColorPolicy::Exact);
        assert_eq!(settings.brightness, 80);
    }

    #[test]
    fn test_settings_need_device_id() {
        let config = config(&[
            ("SWITCHBOT_ACCESS_TOKEN", "t"),
            ("SWITCHBOT_SECRET", "s"),
            ("WEATHER_CITY_CODE", "130010"),
        ]);
        let err = RunSettings::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSetting(ref k) if k == ENV_DEVICE_ID));
    }

    #[test]
    fn test_orchestrator_new_builds_from_config() {
        let config = config(&[
            ("SWITCHBOT_ACCESS_TOKEN", "t"),
            ("SWITCHBOT_SECRET", "s"),
            ("SWITCHBOT_DEVICE_ID", "LIGHT"),
            ("WEATHER_CITY_CODE", "130010"),
        ]);
        let orchestrator = Orchestrator::new(&config).unwrap();
        let (color, commands) = orchestrator.plan(RainLevel::Percent(100));

        assert_eq!(color.brightness, 100);
        assert_eq!(commands[0].parameter, "100");
        assert_eq!(commands[1].parameter, "0:0:255");
    }
}
