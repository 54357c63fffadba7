//! Game Boy Advance ROM identification.
//!
//! Supports:
//! - GBA ROMs (.gba, .agb)
//! - Multiboot images (.mb)

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use romid_core::checksum::{CARTRIDGE_LIMIT, crc32_file};
use romid_core::name_tags::region_from_filename;
use romid_core::util::{file_stem, read_ascii};
use romid_core::{
    AnalysisError, AnalysisOptions, ContentType, FileType, GamePlugin, Platform, ReadSeek,
    RomInfo, ScraperIds, recognized,
};
use romid_dat::TableProvider;

use crate::common::read_block;
use crate::licensee::publisher_for_maker;
use crate::resolve::match_crc32;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const HEADER_SIZE: usize = 0xC0;

/// Fixed value expected at 0xB2.
const FIXED_VALUE: u8 = 0x96;

/// Serial prefix for GBA game codes.
const SERIAL_PREFIX: &str = "AGB";

// ---------------------------------------------------------------------------
// Header struct
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GbaHeader {
    pub title: String,
    pub game_code: String,
    pub maker_code: String,
    pub version: u8,
    pub header_checksum: u8,
    pub valid_checksum: bool,
    pub fixed_value_ok: bool,
}

impl GbaHeader {
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

    /// `AGB-XXXX`, or `None` without a game code.
    pub fn serial(&self) -> Option<String> {
        (!self.game_code.is_empty()).then(|| format!("{}-{}", SERIAL_PREFIX, self.game_code))
    }
}

fn region_from_code_letter(c: char) -> &'static str {
    match c {
        'J' => "Japan",
        'E' => "USA",
        'P' | 'X' => "Europe",
        'D' => "Germany",
        'F' => "France",
        'S' => "Spain",
        'I' => "Italy",
        'H' => "Netherlands",
        'U' => "Australia",
        'K' => "Korea",
        'C' => "China",
        _ => "",
    }
}

/// Header complement: `-(sum(0xA0..=0xBC) + 0x19)` truncated to a byte.
pub(crate) fn header_complement(buf: &[u8]) -> u8 {
    let sum = buf[0xA0..0xBD]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b));
    0u8.wrapping_sub(sum.wrapping_add(0x19))
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

pub fn parse_header(reader: &mut dyn ReadSeek) -> Result<GbaHeader, AnalysisError> {
    let buf: [u8; HEADER_SIZE] = read_block(reader, 0)?;

    let fixed_value_ok = buf[0xB2] == FIXED_VALUE;
    if !fixed_value_ok {
        log::debug!("GBA fixed byte is 0x{:02X}, expected 0x96", buf[0xB2]);
    }
    let expected = header_complement(&buf);
    let valid_checksum = buf[0xBD] == expected;
    if !valid_checksum {
        log::debug!(
            "GBA header checksum mismatch: stored 0x{:02X}, computed 0x{:02X}",
            buf[0xBD],
            expected
        );
    }

    Ok(GbaHeader {
        title: read_ascii(&buf[0xA0..0xAC]).trim().to_string(),
        game_code: read_ascii(&buf[0xAC..0xB0]),
        maker_code: read_ascii(&buf[0xB0..0xB2]),
        version: buf[0xBC],
        header_checksum: buf[0xBD],
        valid_checksum,
        fixed_value_ok,
    })
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct GbaPlugin {
    tables: Arc<TableProvider>,
}

impl GbaPlugin {
    pub fn new(tables: Arc<TableProvider>) -> Self {
        Self { tables }
    }

    pub fn read_header(&self, path: &Path) -> Result<Option<GbaHeader>, AnalysisError> {
        let mut file = File::open(path)?;
        recognized(parse_header(&mut file))
    }
}

impl GamePlugin for GbaPlugin {
    fn platform(&self) -> Platform {
        Platform::Gba
    }

    fn list_extensions(&self) -> &'static [&'static str] {
        &["gba", "agb", "mb"]
    }

    fn parse_header_info(
        &self,
        path: &Path,
        _options: &AnalysisOptions,
    ) -> Result<Option<RomInfo>, AnalysisError> {
        let Some(header) = self.read_header(path)? else {
            return Ok(None);
        };
        let stem = file_stem(path);

        let mut info = RomInfo::new();
        info.content_type = ContentType::Raw;
        info.file_type = FileType::Base;
        info.publisher = publisher_for_maker(&header.maker_code);
        info.version = header.version_string();
        info.region = header.region().to_string();
        if info.region.is_empty() {
            info.region = region_from_filename(&stem);
        }

        let crc = crc32_file(path, CARTRIDGE_LIMIT);
        if let Some(hit) = crc
            .as_deref()
            .and_then(|c| match_crc32(self.tables.tables(Platform::Gba), c))
        {
            hit.apply(&mut info);
        }
        if info.title_name.is_empty() {
            info.title_name = if header.title.is_empty() {
                stem.clone()
            } else {
                header.title.clone()
            };
        }
        info.title_id = header.serial().or(crc).unwrap_or(stem);
        Ok(Some(info))
    }

    fn extract_canonical_id(&self, path: &Path) -> String {
        self.read_header(path)
            .ok()
            .flatten()
            .and_then(|h| h.serial())
            .or_else(|| crc32_file(path, CARTRIDGE_LIMIT))
            .unwrap_or_else(|| file_stem(path))
    }

    fn resolve_game_name(&self, game_id: &str) -> Option<String> {
        self.tables.tables(Platform::Gba).display_name(game_id)
    }

    fn scraper_ids(&self) -> ScraperIds {
        ScraperIds {
            igdb: 24,
            screenscraper: 12,
        }
    }
}

#[cfg(test)]
#[path = "tests/gba_tests.rs"]
mod tests;
