use serde::{Deserialize, Serialize};
use std::io::{Read, Seek};
use std::path::Path;

pub mod checksum;
pub mod error;
pub mod name_tags;
pub mod platform;
pub mod region;
pub mod repair;
pub mod util;

pub use error::{AnalysisError, recognized};
pub use platform::{Platform, PlatformParseError};
pub use region::Region;
pub use repair::BackupPolicy;

/// A reader that implements both Read and Seek.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Options that control a single identification call.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Allow in-place header repair when a repaired header would match a
    /// reference entry. When false the match is still reported but the file
    /// is left alone.
    pub allow_repair: bool,

    /// The file is a disposable scratch copy (e.g. extracted from an
    /// archive). Repairs write without creating a `.bak` sibling.
    pub scratch_copy: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            allow_repair: true,
            scratch_copy: false,
        }
    }
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_repair(mut self, allow: bool) -> Self {
        self.allow_repair = allow;
        self
    }

    pub fn scratch_copy(mut self, scratch: bool) -> Self {
        self.scratch_copy = scratch;
        self
    }

    pub fn backup_policy(&self) -> BackupPolicy {
        if self.scratch_copy {
            BackupPolicy::ScratchCopy
        } else {
            BackupPolicy::Backup
        }
    }
}

/// Content classification of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Base,
    Update,
    Dlc,
    #[default]
    Unknown,
}

impl FileType {
    /// Classify a 16-hex-digit title ID by its last three digits.
    ///
    /// `000` is a base title, `800` an update, `001..=7FF` DLC. Anything else,
    /// including malformed IDs, is `Unknown`.
    pub fn from_title_id(title_id: &str) -> Self {
        if !util::is_hex_of_len(title_id, 16) {
            return Self::Unknown;
        }
        match u16::from_str_radix(&title_id[13..], 16) {
            Ok(0x000) => Self::Base,
            Ok(0x800) => Self::Update,
            Ok(0x001..=0x7FF) => Self::Dlc,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Update => "update",
            Self::Dlc => "dlc",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container sub-format a record was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Plain cartridge dump (NES, SNES, GBA, NDS, homebrew).
    #[default]
    Raw,
    Nsp,
    Xci,
    Cia,
    #[serde(rename = "3ds")]
    Cart3ds,
    Cxi,
    App,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Nsp => "nsp",
            Self::Xci => "xci",
            Self::Cia => "cia",
            Self::Cart3ds => "3ds",
            Self::Cxi => "cxi",
            Self::App => "app",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn unmatched_reference_id() -> i64 {
    -1
}

/// Platform-agnostic identification record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomInfo {
    pub title_id: String,
    pub title_name: String,
    pub title_name_en: String,
    pub title_name_ja: String,
    pub title_name_zh: String,
    pub publisher: String,
    pub version: String,
    pub file_type: FileType,
    pub content_type: ContentType,
    pub region: String,
    pub languages: Vec<String>,
    /// CRC32 values of the reference entry this file matched. Empty unless a
    /// reference table confirmed the match.
    pub reference_crc32: Vec<String>,
    /// Numeric id from the official table, -1 when unmatched.
    #[serde(default = "unmatched_reference_id")]
    pub reference_id: i64,
}

impl Default for RomInfo {
    fn default() -> Self {
        Self {
            title_id: String::new(),
            title_name: String::new(),
            title_name_en: String::new(),
            title_name_ja: String::new(),
            title_name_zh: String::new(),
            publisher: String::new(),
            version: String::new(),
            file_type: FileType::Unknown,
            content_type: ContentType::Raw,
            region: String::new(),
            languages: Vec::new(),
            reference_crc32: Vec::new(),
            reference_id: -1,
        }
    }
}

impl RomInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed reference match.
    pub fn set_reference(&mut self, crc32: Vec<String>, numeric_id: Option<i64>) {
        self.reference_crc32 = crc32;
        self.reference_id = numeric_id.unwrap_or(-1);
    }

    pub fn has_reference(&self) -> bool {
        !self.reference_crc32.is_empty()
    }
}

/// Platform ids used by metadata services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScraperIds {
    pub igdb: u32,
    pub screenscraper: u32,
}

/// The capability every platform implements.
///
/// Callers only ever see this trait; the registry in `romid-lib` maps
/// platforms, short names and extensions to implementations.
pub trait GamePlugin: Send + Sync {
    /// Returns the platform this plugin handles.
    fn platform(&self) -> Platform;

    /// Returns the full name of the platform.
    fn display_name(&self) -> &'static str {
        self.platform().display_name()
    }

    /// Returns the short name used for CLI arguments and table directories.
    fn short_name(&self) -> &'static str {
        self.platform().short_name()
    }

    /// Lowercase file extensions (without the dot) this platform accepts.
    fn list_extensions(&self) -> &'static [&'static str];

    /// True if `ext` (any case, with or without a dot) belongs to this platform.
    fn handles_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.').to_lowercase();
        self.list_extensions().contains(&ext.as_str())
    }

    /// Parse the file and resolve it against the reference tables.
    ///
    /// Returns `Ok(None)` when the file is not in this platform's format.
    /// Only I/O and repair-write failures are errors.
    fn parse_header_info(
        &self,
        path: &Path,
        options: &AnalysisOptions,
    ) -> Result<Option<RomInfo>, AnalysisError>;

    /// A deterministic identifier for the file. Never fails; the filename
    /// stem is the last resort.
    fn extract_canonical_id(&self, path: &Path) -> String;

    /// Classify the file as base/update/dlc. Platforms without a scheme
    /// return `Unknown`.
    fn classify(&self, _path: &Path) -> FileType {
        FileType::Unknown
    }

    /// Display name for a canonical id from the platform's name table.
    fn resolve_game_name(&self, _game_id: &str) -> Option<String> {
        None
    }

    /// Metadata-service platform ids.
    fn scraper_ids(&self) -> ScraperIds;
}
