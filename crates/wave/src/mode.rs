//! Convectively coupled equatorial wave modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WaveError;

/// An equatorial wave type with a characteristic spatial pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum WaveMode {
    /// Kelvin wave.
    Kelvin,
    /// Madden-Julian oscillation.
    Mjo,
    /// n = 1 equatorial Rossby wave.
    EquatorialRossby,
    /// Mixed Rossby-gravity wave.
    MixedRossbyGravity,
    /// Eastward inertio-gravity wave of meridional mode `n`.
    EastwardInertioGravity(u8),
    /// Westward inertio-gravity wave of meridional mode `n`.
    WestwardInertioGravity(u8),
    /// Tropical depression-type disturbances.
    TropicalDepression,
}

impl fmt::Display for WaveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveMode::Kelvin => write!(f, "kelvin"),
            WaveMode::Mjo => write!(f, "mjo"),
            WaveMode::EquatorialRossby => write!(f, "er"),
            WaveMode::MixedRossbyGravity => write!(f, "mrg"),
            WaveMode::EastwardInertioGravity(n) => write!(f, "eig{n}"),
            WaveMode::WestwardInertioGravity(n) => write!(f, "wig{n}"),
            WaveMode::TropicalDepression => write!(f, "td"),
        }
    }
}

impl FromStr for WaveMode {
    type Err = WaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let mode = match lower.as_str() {
            "kelvin" => WaveMode::Kelvin,
            "mjo" => WaveMode::Mjo,
            "er" => WaveMode::EquatorialRossby,
            "mrg" => WaveMode::MixedRossbyGravity,
            "td" => WaveMode::TropicalDepression,
            other => {
                let parse_n = |rest: &str| rest.parse::<u8>().map_err(|_| WaveError::ParseMode(s.to_string()));
                if let Some(rest) = other.strip_prefix("eig") {
                    WaveMode::EastwardInertioGravity(parse_n(rest)?)
                } else if let Some(rest) = other.strip_prefix("wig") {
                    WaveMode::WestwardInertioGravity(parse_n(rest)?)
                } else {
                    return Err(WaveError::ParseMode(s.to_string()));
                }
            }
        };
        Ok(mode)
    }
}

impl From<WaveMode> for String {
    fn from(mode: WaveMode) -> Self {
        mode.to_string()
    }
}

impl TryFrom<String> for WaveMode {
    type Error = WaveError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
