//! Resolution presets and dimension validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Named constants
-------------------------------------------------------------------------- */

/// Preset name: 1280x720.
pub const PRESET_720P: &str = "720p";

/// Preset name: 1920x1080.
pub const PRESET_1080P: &str = "1080p";

/// All recognized preset names.
pub const ALL_PRESET_NAMES: &[&str] = &[PRESET_720P, PRESET_1080P];

/// Maximum dimension (width or height) accepted before submission.
const MAX_DIMENSION: u32 = 7680;

/* --------------------------------------------------------------------------
Presets
-------------------------------------------------------------------------- */

/// Output resolution preset understood by the generation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResolutionPreset {
    #[default]
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "1080p")]
    Hd1080,
}

impl ResolutionPreset {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hd720 => PRESET_720P,
            Self::Hd1080 => PRESET_1080P,
        }
    }

    /// `(width, height)` in pixels for this preset.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Hd720 => (1280, 720),
            Self::Hd1080 => (1920, 1080),
        }
    }
}

impl fmt::Display for ResolutionPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionPreset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            PRESET_720P => Ok(Self::Hd720),
            PRESET_1080P => Ok(Self::Hd1080),
            other => Err(CoreError::Validation(format!(
                "Unknown resolution preset: '{}'. Valid presets: {}",
                other,
                ALL_PRESET_NAMES.join(", ")
            ))),
        }
    }
}

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate that width and height are positive and within bounds.
pub fn validate_dimensions(width: u32, height: u32) -> Result<(), CoreError> {
    if width == 0 || height == 0 {
        return Err(CoreError::Validation(
            "Width and height must be greater than 0".to_string(),
        ));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(CoreError::Validation(format!(
            "Dimensions must not exceed {MAX_DIMENSION}px (got {width}x{height})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn preset_dimensions() {
        assert_eq!(ResolutionPreset::Hd720.dimensions(), (1280, 720));
        assert_eq!(ResolutionPreset::Hd1080.dimensions(), (1920, 1080));
    }

    #[test]
    fn default_preset_is_720p() {
        assert_eq!(ResolutionPreset::default(), ResolutionPreset::Hd720);
    }

    #[test]
    fn parse_known_presets() {
        assert_eq!("720p".parse::<ResolutionPreset>().unwrap(), ResolutionPreset::Hd720);
        assert_eq!("1080P".parse::<ResolutionPreset>().unwrap(), ResolutionPreset::Hd1080);
    }

    #[test]
    fn parse_unknown_preset_fails() {
        assert_matches!("4k".parse::<ResolutionPreset>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn preset_serializes_as_wire_name() {
        assert_eq!(
            serde_json::to_string(&ResolutionPreset::Hd1080).unwrap(),
            "\"1080p\""
        );
    }

    #[test]
    fn dimensions_must_be_positive_and_bounded() {
        assert!(validate_dimensions(1280, 720).is_ok());
        assert!(validate_dimensions(0, 720).is_err());
        assert!(validate_dimensions(8000, 720).is_err());
    }
}
