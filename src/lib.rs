//! Rainylight: sets a SwitchBot color light from today's chance of rain.
//!
//! One run reads the forecast, picks a color, and sends brightness, color and
//! power-on commands to the configured light, in that order.

pub mod color;
pub mod error;
pub mod orchestrator;

pub use color::{color_for, ColorCommand, BANDED_TABLE, ERROR_COLOR, EXACT_TABLE};
pub use orchestrator::{CommandStep, Orchestrator, RunReport, RunSettings};
