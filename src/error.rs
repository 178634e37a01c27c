//! Mapping integration errors onto `AppError`.

use rainylight_core::{AppError, NetworkError, ReqwestErrorExt};
use rainylight_switchbot::SwitchBotError;
use rainylight_weather::WeatherError;

pub fn from_device(err: SwitchBotError) -> AppError {
    match err {
        SwitchBotError::Network(e) => AppError::Network(e.into_network_error()),
        SwitchBotError::RemoteApi { status, body } => AppError::Network(NetworkError::ServerError {
            status,
            message: body,
        }),
        other => AppError::Device(other.to_string()),
    }
}

/// Log the operator-facing line for a fatal error and hand it to `anyhow`.
pub fn report(err: AppError) -> anyhow::Error {
    tracing::error!("{}", err.user_message());
    err.into()
}

pub fn from_forecast(err: WeatherError) -> AppError {
    match err {
        WeatherError::Network(e) => AppError::Network(e.into_network_error()),
        WeatherError::Status { status, body } => AppError::Network(NetworkError::ServerError {
            status,
            message: body,
        }),
        other => AppError::Forecast(other.to_string()),
    }
}
