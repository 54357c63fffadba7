//! Super Nintendo / Super Famicom ROM identification.
//!
//! Supports:
//! - LoROM and HiROM internal headers
//! - Dumps with a 512-byte copier header (.smc, .fig, .swc)
//!
//! The internal header has no magic, so a candidate base is accepted only
//! when its checksum/complement pair is consistent and the title is not
//! blank. Identification checks the reference tables with the checksum of
//! the whole file and, for copier dumps, of the file without the preamble.

use std::fs::File;
use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;

use romid_core::checksum::{CARTRIDGE_LIMIT, crc32_file, crc32_file_from};
use romid_core::util::{file_stem, read_ascii_fixed};
use romid_core::{
    AnalysisError, AnalysisOptions, ContentType, FileType, GamePlugin, Platform, ReadSeek,
    RomInfo, ScraperIds, recognized,
};
use romid_dat::TableProvider;

use crate::common::{read_u16_le, read_up_to};
use crate::licensee::{maker_code_name, old_licensee_name};
use crate::resolve::match_crc32;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Smallest file that can hold a LoROM header.
const MIN_ROM_SIZE: usize = 0x8000;

/// Enough to cover the HiROM header behind a copier preamble.
const MAX_HEADER_READ: usize = 0x10200;

const COPIER_HEADER_SIZE: u64 = 0x200;

const LOROM_BASE: usize = 0x7FB0;
const HIROM_BASE: usize = 0xFFB0;

/// Bytes from a base to the end of the checksum field.
const BASE_SPAN: usize = 0x30;

const TITLE_OFFSET: usize = 0x10;
const TITLE_LEN: usize = 21;

/// Licensee byte meaning "see the extended maker code".
const EXTENDED_LICENSEE: u8 = 0x33;

// ---------------------------------------------------------------------------
// Header struct
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnesHeader {
    pub title: String,
    pub map_mode: u8,
    pub rom_type: u8,
    pub rom_size: Option<u64>,
    pub ram_size: Option<u64>,
    pub country: u8,
    pub licensee: u8,
    pub maker_code: Option<String>,
    pub game_code: Option<String>,
    pub version: u8,
    pub checksum: u16,
    pub complement: u16,
    pub has_copier_header: bool,
    /// Absolute file offset of the accepted base.
    pub header_offset: u64,
}

impl SnesHeader {
    pub fn mapping_mode(&self) -> &'static str {
        if self.map_mode & 0x01 != 0 {
            "HiROM"
        } else {
            "LoROM"
        }
    }

    pub fn has_battery(&self) -> bool {
        self.rom_type & 0x02 != 0
    }

    pub fn region(&self) -> &'static str {
        country_name(self.country)
    }

    pub fn version_string(&self) -> String {
        format!("1.{}", self.version)
    }

    /// Maker-code name when the extended header has one, else the licensee name.
    pub fn publisher(&self) -> String {
        self.maker_code
            .as_deref()
            .and_then(maker_code_name)
            .or_else(|| old_licensee_name(self.licensee))
            .unwrap_or_default()
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// Lookup functions
// ---------------------------------------------------------------------------

fn country_name(code: u8) -> &'static str {
    match code {
        0x00 => "Japan",
        0x01 => "USA",
        0x02 => "Europe",
        0x03 => "Sweden",
        0x04 => "Finland",
        0x05 => "Denmark",
        0x06 => "France",
        0x07 => "Netherlands",
        0x08 => "Spain",
        0x09 => "Germany",
        0x0A => "Italy",
        0x0B => "China",
        0x0C => "Indonesia",
        0x0D => "Korea",
        0x0F => "Canada",
        0x10 => "Brazil",
        0x11 => "Australia",
        _ => "",
    }
}

/// `1 KiB << b`, or `None` for out-of-range values.
fn size_from_exponent(b: u8) -> Option<u64> {
    (b < 16).then(|| 1024u64 << b)
}

fn is_blank_title(raw: &[u8]) -> bool {
    raw.iter().all(|&b| matches!(b, 0x00 | 0xFF | 0x20))
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn parse_at(data: &[u8], base: usize, copier: bool) -> Option<SnesHeader> {
    let off = base + if copier { COPIER_HEADER_SIZE as usize } else { 0 };
    if off + BASE_SPAN > data.len() {
        return None;
    }
    let h = &data[off..off + BASE_SPAN];

    let complement = read_u16_le(h, 0x2C);
    let checksum = read_u16_le(h, 0x2E);
    if checksum ^ complement != 0xFFFF {
        return None;
    }
    let raw_title = &h[TITLE_OFFSET..TITLE_OFFSET + TITLE_LEN];
    if is_blank_title(raw_title) {
        return None;
    }

    let licensee = h[0x2A];
    let (maker_code, game_code) = if licensee == EXTENDED_LICENSEE {
        (
            Some(read_ascii_fixed(&h[0x00..0x02])),
            Some(read_ascii_fixed(&h[0x02..0x06])),
        )
    } else {
        (None, None)
    };
    let ram = h[0x28];

    Some(SnesHeader {
        title: read_ascii_fixed(raw_title),
        map_mode: h[0x25],
        rom_type: h[0x26],
        rom_size: size_from_exponent(h[0x27]),
        ram_size: if ram > 0 { size_from_exponent(ram) } else { None },
        country: h[0x29],
        licensee,
        maker_code,
        game_code,
        version: h[0x2B],
        checksum,
        complement,
        has_copier_header: copier,
        header_offset: off as u64,
    })
}

/// Locate and parse the internal header, LoROM first.
pub fn parse_header(reader: &mut dyn ReadSeek) -> Result<SnesHeader, AnalysisError> {
    let file_size = reader.seek(SeekFrom::End(0))?;
    let data = read_up_to(reader, 0, MAX_HEADER_READ)?;
    if data.len() < MIN_ROM_SIZE {
        return Err(AnalysisError::TooSmall {
            expected: MIN_ROM_SIZE as u64,
            actual: file_size,
        });
    }
    let copier = file_size % 1024 == COPIER_HEADER_SIZE;

    [LOROM_BASE, HIROM_BASE]
        .into_iter()
        .find_map(|base| parse_at(&data, base, copier))
        .ok_or_else(|| AnalysisError::invalid_format("No valid SNES internal header"))
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SnesPlugin {
    tables: Arc<TableProvider>,
}

impl SnesPlugin {
    pub fn new(tables: Arc<TableProvider>) -> Self {
        Self { tables }
    }

    pub fn read_header(&self, path: &Path) -> Result<Option<SnesHeader>, AnalysisError> {
        let mut file = File::open(path)?;
        recognized(parse_header(&mut file))
    }

    /// Whole-file CRC32 and, for copier dumps, the CRC32 without the preamble.
    fn checksums(path: &Path, copier: bool) -> (Option<String>, Option<String>) {
        let full = crc32_file(path, CARTRIDGE_LIMIT);
        let headerless = if copier {
            crc32_file_from(path, COPIER_HEADER_SIZE, CARTRIDGE_LIMIT)
        } else {
            None
        };
        (full, headerless)
    }

    fn copier_guess(path: &Path, header: Option<&SnesHeader>) -> bool {
        match header {
            Some(h) => h.has_copier_header,
            None => std::fs::metadata(path)
                .map(|m| m.len() % 1024 == COPIER_HEADER_SIZE)
                .unwrap_or(false),
        }
    }
}

impl GamePlugin for SnesPlugin {
    fn platform(&self) -> Platform {
        Platform::Snes
    }

    fn list_extensions(&self) -> &'static [&'static str] {
        &["sfc", "smc", "fig", "swc"]
    }

    fn parse_header_info(
        &self,
        path: &Path,
        _options: &AnalysisOptions,
    ) -> Result<Option<RomInfo>, AnalysisError> {
        let header = self.read_header(path)?;
        let (full, headerless) =
            Self::checksums(path, Self::copier_guess(path, header.as_ref()));
        let tables = self.tables.tables(Platform::Snes);

        let mut info = RomInfo::new();
        info.content_type = ContentType::Raw;
        info.file_type = FileType::Base;
        info.version = "1.0".into();
        if let Some(h) = &header {
            info.region = h.region().to_string();
            info.publisher = h.publisher();
            info.version = h.version_string();
        }

        let mut matched = None;
        for crc in [&full, &headerless].into_iter().flatten() {
            if let Some(hit) = match_crc32(tables, crc) {
                hit.apply(&mut info);
                matched = Some(crc.clone());
                break;
            }
        }

        if header.is_none() && matched.is_none() {
            log::debug!(
                "{}: no SNES header and no reference match, using the filename",
                path.display()
            );
        }

        let stem = file_stem(path);
        if info.title_name.is_empty() {
            info.title_name = header
                .as_ref()
                .map(|h| h.title.clone())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| stem.clone());
        }
        info.title_id = matched.or(full).unwrap_or(stem);
        Ok(Some(info))
    }

    fn extract_canonical_id(&self, path: &Path) -> String {
        let header = self.read_header(path).ok().flatten();
        let (full, headerless) =
            Self::checksums(path, Self::copier_guess(path, header.as_ref()));
        let tables = self.tables.tables(Platform::Snes);
        let known = [&full, &headerless]
            .into_iter()
            .flatten()
            .find(|crc| tables.custom_by_crc32(crc).is_some() || tables.official.contains_crc32(crc))
            .cloned();
        known.or(full).unwrap_or_else(|| file_stem(path))
    }

    fn resolve_game_name(&self, game_id: &str) -> Option<String> {
        self.tables.tables(Platform::Snes).display_name(game_id)
    }

    fn scraper_ids(&self) -> ScraperIds {
        ScraperIds {
            igdb: 19,
            screenscraper: 4,
        }
    }
}

#[cfg(test)]
#[path = "tests/snes_tests.rs"]
mod tests;
