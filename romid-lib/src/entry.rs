//! The record produced for each identified file.

use std::path::PathBuf;

use romid_core::{Platform, RomInfo};
use serde::{Deserialize, Serialize};

/// One identified file, ready to hand to a catalog.
///
/// For ROMs inside an archive, `path` and `file_size` describe the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedEntry {
    pub path: PathBuf,
    pub platform: Platform,
    /// Canonical game id (title id, serial or CRC32, per platform).
    pub game_id: String,
    /// Best display title: the record's title, else the display-name table.
    pub display_name: String,
    pub file_size: u64,
    /// Reference CRC32 when the file matched a table, else the file's own.
    pub hash_crc32: String,
    /// `None` when the plugin did not recognize the bytes.
    pub rom_info: Option<RomInfo>,
}

impl IdentifiedEntry {
    /// True when the record was confirmed against a reference table.
    pub fn is_verified(&self) -> bool {
        self.rom_info.as_ref().is_some_and(RomInfo::has_reference)
    }
}
