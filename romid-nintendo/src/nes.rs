//! NES (Famicom) ROM identification.
//!
//! Supports iNES and NES 2.0 headers. NES carts have no embedded title or
//! serial, so identification is checksum driven. When the checksum misses
//! the reference tables, the file may still be a known dump carrying a
//! different header encoding; the header pool is tried against the body and
//! a match repairs the header in place.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use romid_core::checksum::{CARTRIDGE_LIMIT, crc32_file};
use romid_core::name_tags::{region_from_first_group, version_from_filename};
use romid_core::repair::{HeaderLayout, stage_header_repair};
use romid_core::util::file_stem;
use romid_core::{
    AnalysisError, AnalysisOptions, ContentType, FileType, GamePlugin, Platform, ReadSeek,
    RomInfo, ScraperIds, recognized,
};
use romid_dat::TableProvider;

use crate::common::read_block;
use crate::resolve::match_crc32;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// iNES magic: "NES" followed by MS-DOS EOF.
const INES_MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

const HEADER_SIZE: usize = 16;

const PRG_BANK_SIZE: u64 = 16 * 1024;
const CHR_BANK_SIZE: u64 = 8 * 1024;

/// Layout the header repair engine works on.
pub const NES_HEADER_LAYOUT: HeaderLayout<'static> = HeaderLayout {
    header_len: HEADER_SIZE,
    magic: &INES_MAGIC,
    size_limit: CARTRIDGE_LIMIT,
};

// ---------------------------------------------------------------------------
// Header struct
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
}

/// Parsed iNES / NES 2.0 header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NesHeader {
    pub prg_rom_size: u64,
    pub chr_rom_size: u64,
    pub mapper: u16,
    pub mirroring: Mirroring,
    pub has_battery: bool,
    pub has_trainer: bool,
    pub is_nes2: bool,
    pub is_pal: bool,
}

impl NesHeader {
    /// "Europe" for PAL carts, otherwise unknown.
    pub fn region(&self) -> &'static str {
        if self.is_pal { "Europe" } else { "" }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

pub fn parse_header(reader: &mut dyn ReadSeek) -> Result<NesHeader, AnalysisError> {
    let buf: [u8; HEADER_SIZE] = read_block(reader, 0)?;
    if buf[0..4] != INES_MAGIC {
        return Err(AnalysisError::invalid_format("Missing iNES magic"));
    }

    let flags6 = buf[6];
    let flags7 = buf[7];
    let mirroring = if flags6 & 0x08 != 0 {
        Mirroring::FourScreen
    } else if flags6 & 0x01 != 0 {
        Mirroring::Vertical
    } else {
        Mirroring::Horizontal
    };

    Ok(NesHeader {
        prg_rom_size: buf[4] as u64 * PRG_BANK_SIZE,
        chr_rom_size: buf[5] as u64 * CHR_BANK_SIZE,
        mapper: ((flags6 >> 4) | (flags7 & 0xF0)) as u16,
        mirroring,
        has_battery: flags6 & 0x02 != 0,
        has_trainer: flags6 & 0x04 != 0,
        is_nes2: flags7 & 0x0C == 0x08,
        is_pal: buf[9] & 0x01 != 0,
    })
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct NesPlugin {
    tables: Arc<TableProvider>,
}

impl NesPlugin {
    pub fn new(tables: Arc<TableProvider>) -> Self {
        Self { tables }
    }

    pub fn read_header(&self, path: &Path) -> Result<Option<NesHeader>, AnalysisError> {
        let mut file = File::open(path)?;
        recognized(parse_header(&mut file))
    }

    /// Header-pool step of the resolver. Returns the matched CRC32.
    fn repair_header(
        &self,
        path: &Path,
        options: &AnalysisOptions,
        info: &mut RomInfo,
    ) -> Result<Option<String>, AnalysisError> {
        let tables = self.tables.tables(Platform::Nes);
        if tables.header_pool.is_empty() {
            return Ok(None);
        }
        let is_reference = |crc: &str| tables.official.contains_crc32(crc);
        let Some(staged) =
            stage_header_repair(path, &NES_HEADER_LAYOUT, &tables.header_pool, &is_reference)?
        else {
            return Ok(None);
        };

        if options.allow_repair {
            staged.commit(options.backup_policy())?;
        } else if staged.needs_write() {
            log::info!(
                "Header of {} matches {} after repair (not written)",
                path.display(),
                staged.matched_crc32
            );
        }

        if let Some(entry) = tables.official.by_crc32(&staged.matched_crc32) {
            info.title_name = entry.name.clone();
            info.set_reference(vec![staged.matched_crc32.clone()], entry.numeric_id);
        }
        Ok(Some(staged.matched_crc32))
    }
}

impl GamePlugin for NesPlugin {
    fn platform(&self) -> Platform {
        Platform::Nes
    }

    fn list_extensions(&self) -> &'static [&'static str] {
        &["nes", "unf", "unif", "fds"]
    }

    fn parse_header_info(
        &self,
        path: &Path,
        options: &AnalysisOptions,
    ) -> Result<Option<RomInfo>, AnalysisError> {
        let Some(header) = self.read_header(path)? else {
            return Ok(None);
        };
        let stem = file_stem(path);

        let mut info = RomInfo::new();
        info.content_type = ContentType::Raw;
        info.file_type = FileType::Base;
        info.version = version_from_filename(&stem);
        if info.version.is_empty() {
            info.version = "1.0".into();
        }
        info.region = region_from_first_group(&stem);
        if info.region.is_empty() {
            info.region = header.region().to_string();
        }

        let mut crc = crc32_file(path, CARTRIDGE_LIMIT);
        if let Some(current) = crc.clone() {
            let tables = self.tables.tables(Platform::Nes);
            if let Some(hit) = match_crc32(tables, &current) {
                hit.apply(&mut info);
            } else if let Some(repaired) = self.repair_header(path, options, &mut info)? {
                crc = Some(repaired);
            }
        }

        if info.title_name.is_empty() {
            info.title_name = stem.clone();
        }
        info.title_id = crc.unwrap_or(stem);
        Ok(Some(info))
    }

    fn extract_canonical_id(&self, path: &Path) -> String {
        crc32_file(path, CARTRIDGE_LIMIT).unwrap_or_else(|| file_stem(path))
    }

    fn resolve_game_name(&self, game_id: &str) -> Option<String> {
        self.tables.tables(Platform::Nes).display_name(game_id)
    }

    fn scraper_ids(&self) -> ScraperIds {
        ScraperIds {
            igdb: 18,
            screenscraper: 3,
        }
    }
}

#[cfg(test)]
#[path = "tests/nes_tests.rs"]
mod tests;
