//! Nintendo DS ROM identification.
//!
//! Supports NDS (.nds, .srl), DSi-enhanced and DSi-exclusive images
//! (.dsi, .ids). The official table is keyed by serial for this platform,
//! so the game code is the primary lookup once the custom table misses.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use romid_core::checksum::{NDS_LIMIT, crc32_file};
use romid_core::util::{file_stem, read_ascii};
use romid_core::{
    AnalysisError, AnalysisOptions, ContentType, FileType, GamePlugin, Platform, ReadSeek,
    RomInfo, ScraperIds, recognized,
};
use romid_dat::TableProvider;

use crate::common::{read_block, read_u32_le};
use crate::licensee::publisher_for_maker;
use crate::resolve::{match_custom, match_serial};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const HEADER_SIZE: usize = 0x200;

/// Serial prefix ("Nitro", the DS codename).
const SERIAL_PREFIX: &str = "NTR";

/// Base unit for the device-capacity byte.
const CAPACITY_UNIT: u64 = 128 * 1024;

// ---------------------------------------------------------------------------
// Header struct
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdsHeader {
    pub title: String,
    pub game_code: String,
    pub maker_code: String,
    pub unit_code: u8,
    pub capacity: u8,
    pub version: u8,
    pub has_banner: bool,
}

impl NdsHeader {
    /// "NDS", "NDS+DSi" or "DSi" from the unit code.
    pub fn device_type(&self) -> &'static str {
        match self.unit_code {
            0x02 => "NDS+DSi",
            0x03 => "DSi",
            _ => "NDS",
        }
    }

    /// Chip capacity: `128 KiB << capacity`.
    pub fn rom_size(&self) -> Option<u64> {
        (self.capacity < 16).then(|| CAPACITY_UNIT << self.capacity)
    }

    pub fn region(&self) -> &'static str {
        self.game_code
            .chars()
            .nth(3)
            .map(region_from_code_letter)
            .unwrap_or_default()
    }

    pub fn version_string(&self) -> String {
        format!("1.{}", self.version)
    }

    /// `NTR-XXXX`, or `None` without a game code.
    pub fn serial(&self) -> Option<String> {
        (!self.game_code.is_empty()).then(|| format!("{}-{}", SERIAL_PREFIX, self.game_code))
    }
}

fn region_from_code_letter(c: char) -> &'static str {
    match c {
        'J' => "Japan",
        'E' => "USA",
        'P' => "Europe",
        'O' => "International",
        'K' => "Korea",
        'W' => "Europe (alt)",
        'D' => "Germany",
        'F' => "France",
        'S' => "Spain",
        'I' => "Italy",
        'U' => "Australia",
        'C' => "China",
        _ => "",
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse the 512-byte header. Only a short file is rejected; a malformed
/// game code is logged and kept.
pub fn parse_header(reader: &mut dyn ReadSeek) -> Result<NdsHeader, AnalysisError> {
    let buf: [u8; HEADER_SIZE] = read_block(reader, 0)?;

    let game_code = read_ascii(&buf[0x0C..0x10]).trim().to_string();
    if game_code.len() != 4 {
        log::debug!("NDS header: unusual game code {:?}", game_code);
    }

    Ok(NdsHeader {
        title: read_ascii(&buf[0x00..0x0C]).trim().to_string(),
        game_code,
        maker_code: read_ascii(&buf[0x10..0x12]).trim().to_string(),
        unit_code: buf[0x12],
        capacity: buf[0x14],
        version: buf[0x1E],
        has_banner: read_u32_le(&buf, 0x68) != 0,
    })
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct DsPlugin {
    tables: Arc<TableProvider>,
}

impl DsPlugin {
    pub fn new(tables: Arc<TableProvider>) -> Self {
        Self { tables }
    }

    pub fn read_header(&self, path: &Path) -> Result<Option<NdsHeader>, AnalysisError> {
        let mut file = File::open(path)?;
        recognized(parse_header(&mut file))
    }
}

impl GamePlugin for DsPlugin {
    fn platform(&self) -> Platform {
        Platform::Ds
    }

    fn list_extensions(&self) -> &'static [&'static str] {
        &["nds", "dsi", "ids", "srl"]
    }

    fn parse_header_info(
        &self,
        path: &Path,
        _options: &AnalysisOptions,
    ) -> Result<Option<RomInfo>, AnalysisError> {
        let Some(header) = self.read_header(path)? else {
            return Ok(None);
        };
        let tables = self.tables.tables(Platform::Ds);
        let stem = file_stem(path);
        let serial = header.serial();

        let mut info = RomInfo::new();
        info.content_type = ContentType::Raw;
        info.file_type = FileType::Base;
        info.region = header.region().to_string();
        info.publisher = publisher_for_maker(&header.maker_code);
        info.version = header.version_string();

        let crc = crc32_file(path, NDS_LIMIT);
        let hit = crc
            .as_deref()
            .and_then(|c| match_custom(tables, c))
            .or_else(|| {
                match_serial(
                    tables,
                    &[header.game_code.as_str(), serial.as_deref().unwrap_or_default()],
                )
            });
        if let Some(hit) = hit {
            hit.apply(&mut info);
        }

        if info.title_name.is_empty() {
            info.title_name = if header.title.is_empty() {
                stem.clone()
            } else {
                header.title.clone()
            };
        }
        info.title_id = serial.or(crc).unwrap_or(stem);
        Ok(Some(info))
    }

    fn extract_canonical_id(&self, path: &Path) -> String {
        self.read_header(path)
            .ok()
            .flatten()
            .and_then(|h| h.serial())
            .or_else(|| crc32_file(path, NDS_LIMIT))
            .unwrap_or_else(|| file_stem(path))
    }

    fn resolve_game_name(&self, game_id: &str) -> Option<String> {
        self.tables.tables(Platform::Ds).display_name(game_id)
    }

    fn scraper_ids(&self) -> ScraperIds {
        ScraperIds {
            igdb: 20,
            screenscraper: 15,
        }
    }
}

#[cfg(test)]
#[path = "tests/ds_tests.rs"]
mod tests;
