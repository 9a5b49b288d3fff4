//! Aspect ratio constraints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use snapcrop_common::error::SnapError;

/// Two ratios closer than this are treated as equal.
pub const RATIO_EPSILON: f64 = 0.01;

/// A positive width/height ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRatio(f64);

impl AspectRatio {
    pub const SQUARE: AspectRatio = AspectRatio(1.0);
    pub const FOUR_THREE: AspectRatio = AspectRatio(4.0 / 3.0);
    pub const SIXTEEN_NINE: AspectRatio = AspectRatio(16.0 / 9.0);
    pub const NINE_SIXTEEN: AspectRatio = AspectRatio(9.0 / 16.0);

    /// `None` unless `ratio` is finite and positive.
    pub fn new(ratio: f64) -> Option<Self> {
        (ratio.is_finite() && ratio > 0.0).then_some(Self(ratio))
    }

    pub fn from_parts(width: f64, height: f64) -> Option<Self> {
        if height == 0.0 {
            return None;
        }
        Self::new(width / height)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn matches(&self, ratio: f64) -> bool {
        (ratio - self.0).abs() < RATIO_EPSILON
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match AspectPreset::ALL
            .iter()
            .find(|preset| preset.ratio() == Some(*self))
        {
            Some(preset) => f.write_str(preset.label()),
            None => write!(f, "{:.3}", self.0),
        }
    }
}

impl FromStr for AspectRatio {
    type Err = SnapError;

    /// Parses `W:H` (for example `16:9`) or a bare ratio (`1.5`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.split_once(':') {
            Some((w, h)) => match (w.trim().parse::<f64>(), h.trim().parse::<f64>()) {
                (Ok(w), Ok(h)) => Self::from_parts(w, h),
                _ => None,
            },
            None => s.parse::<f64>().ok().and_then(Self::new),
        };
        parsed.ok_or_else(|| SnapError::config(format!("Invalid aspect ratio: {s:?}")))
    }
}

/// The ratios offered in the editor toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectPreset {
    Free,
    Square,
    FourThree,
    SixteenNine,
    NineSixteen,
}

impl AspectPreset {
    pub const ALL: [AspectPreset; 5] = [
        AspectPreset::Free,
        AspectPreset::Square,
        AspectPreset::FourThree,
        AspectPreset::SixteenNine,
        AspectPreset::NineSixteen,
    ];

    pub fn ratio(&self) -> Option<AspectRatio> {
        match self {
            AspectPreset::Free => None,
            AspectPreset::Square => Some(AspectRatio::SQUARE),
            AspectPreset::FourThree => Some(AspectRatio::FOUR_THREE),
            AspectPreset::SixteenNine => Some(AspectRatio::SIXTEEN_NINE),
            AspectPreset::NineSixteen => Some(AspectRatio::NINE_SIXTEEN),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AspectPreset::Free => "free",
            AspectPreset::Square => "1:1",
            AspectPreset::FourThree => "4:3",
            AspectPreset::SixteenNine => "16:9",
            AspectPreset::NineSixteen => "9:16",
        }
    }
}

/// Parse a command-line aspect choice: `free` or anything [`AspectRatio`] accepts.
pub fn parse_aspect(s: &str) -> Result<Option<AspectRatio>, SnapError> {
    if s.trim().eq_ignore_ascii_case("free") {
        return Ok(None);
    }
    s.parse().map(Some)
}
