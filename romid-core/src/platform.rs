use serde::{Deserialize, Serialize};

/// Platform identifiers for every supported system.
///
/// Short names double as the per-platform reference table directory names,
/// so they must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Nes,
    Snes,
    Gba,
    #[serde(rename = "nds")]
    Ds,
    #[serde(rename = "3ds")]
    N3ds,
    Switch,
}

/// All platform variants in registration order.
const ALL_PLATFORMS: &[Platform] = &[
    Platform::Nes,
    Platform::Snes,
    Platform::Gba,
    Platform::Ds,
    Platform::N3ds,
    Platform::Switch,
];

impl Platform {
    /// Canonical short name used for CLI arguments and table directories.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Nes => "nes",
            Self::Snes => "snes",
            Self::Gba => "gba",
            Self::Ds => "nds",
            Self::N3ds => "3ds",
            Self::Switch => "switch",
        }
    }

    /// Full display name for the platform.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Nes => "Nintendo Entertainment System",
            Self::Snes => "Super Nintendo Entertainment System",
            Self::Gba => "Game Boy Advance",
            Self::Ds => "Nintendo DS",
            Self::N3ds => "Nintendo 3DS",
            Self::Switch => "Nintendo Switch",
        }
    }

    /// All accepted names for this platform (case-insensitive matching).
    ///
    /// The canonical short name is always first.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Nes => &["nes", "famicom", "fc"],
            Self::Snes => &["snes", "sfc", "super famicom", "super nintendo"],
            Self::Gba => &["gba", "game boy advance", "gameboy advance"],
            Self::Ds => &["nds", "ds", "nintendo ds"],
            Self::N3ds => &["3ds", "nintendo 3ds", "n3ds"],
            Self::Switch => &["switch", "ns", "nx", "nintendo switch"],
        }
    }

    pub fn all() -> &'static [Platform] {
        ALL_PLATFORMS
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Error returned when a string cannot be parsed into a `Platform`.
#[derive(Debug, Clone)]
pub struct PlatformParseError(pub String);

impl std::fmt::Display for PlatformParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown platform: '{}'", self.0)
    }
}

impl std::error::Error for PlatformParseError {}

impl std::str::FromStr for Platform {
    type Err = PlatformParseError;

    /// Parse a platform from any recognized name (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ALL_PLATFORMS
            .iter()
            .copied()
            .find(|p| p.aliases().contains(&lower.as_str()))
            .ok_or_else(|| PlatformParseError(s.to_string()))
    }
}

#[cfg(test)]
#[path = "tests/platform_tests.rs"]
mod tests;
