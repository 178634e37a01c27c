//! Forecast reader for rainylight
//!
//! Reads today's chance of rain from the livedoor-compatible forecast API
//! (weather.tsukumijima.net) and reduces it to a single rain level.

pub mod provider;
pub mod types;

pub use provider::{parse_percent, ForecastReader};
pub use types::*;
