//! Rain level to light color.

use rainylight_core::ColorPolicy;
use rainylight_switchbot::Rgb;
use rainylight_weather::RainLevel;

/// Shown when the forecast is unavailable or has no table entry.
pub const ERROR_COLOR: Rgb = Rgb::new(255, 0, 0);

/// Inclusive upper bound of each band and its color, ascending.
pub const BANDED_TABLE: [(u8, Rgb); 6] = [
    (0, Rgb::new(255, 127, 0)),
    (20, Rgb::new(255, 255, 0)),
    (40, Rgb::new(127, 255, 0)),
    (60, Rgb::new(0, 255, 255)),
    (80, Rgb::new(0, 127, 255)),
    (100, Rgb::new(0, 0, 255)),
];

/// Exact rain percentages and their colors.
pub const EXACT_TABLE: [(u8, Rgb); 11] = [
    (0, Rgb::new(255, 128, 0)),
    (10, Rgb::new(210, 148, 0)),
    (20, Rgb::new(190, 200, 0)),
    (30, Rgb::new(170, 255, 0)),
    (40, Rgb::new(153, 204, 255)),
    (50, Rgb::new(102, 178, 255)),
    (60, Rgb::new(51, 153, 255)),
    (70, Rgb::new(0, 128, 255)),
    (80, Rgb::new(0, 0, 255)),
    (90, Rgb::new(0, 0, 204)),
    (100, Rgb::new(0, 0, 153)),
];

/// Color and brightness for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCommand {
    pub color: Rgb,
    /// 0..=100
    pub brightness: u8,
}

impl ColorCommand {
    pub fn new(policy: ColorPolicy, level: RainLevel, brightness: u8) -> Self {
        Self {
            color: color_for(policy, level),
            brightness: brightness.min(100),
        }
    }
}

/// Look up the color for a rain level under the given policy.
pub fn color_for(policy: ColorPolicy, level: RainLevel) -> Rgb {
    let Some(percent) = level.percent() else {
        return ERROR_COLOR;
    };

    let found = match policy {
        ColorPolicy::Banded => BANDED_TABLE.iter().find(|(upper, _)| percent <= *upper),
        ColorPolicy::Exact => EXACT_TABLE.iter().find(|(key, _)| percent == *key),
    };

    found.map(|(_, rgb)| *rgb).unwrap_or(ERROR_COLOR)
}
