//! Nintendo 3DS identification.
//!
//! Supports:
//! - CCI / NCSD game card images (.3ds)
//! - CIA installable archives (.cia)
//! - Bare NCCH partitions (.cxi, .app)
//!
//! Metadata comes from the NCCH header (product code, maker code, title id,
//! version). CIA files take their title id from the TMD, so encrypted eShop
//! content still identifies.

mod cia;
mod ncch;
mod ncsd;

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use romid_core::checksum::{N3DS_LIMIT, crc32_file};
use romid_core::util::{extension_lower, file_stem};
use romid_core::{
    AnalysisError, AnalysisOptions, ContentType, FileType, GamePlugin, Platform, ReadSeek,
    RomInfo, ScraperIds, recognized,
};
use romid_dat::TableProvider;

use crate::common::format_title_id;
use crate::licensee::publisher_for_maker;
use crate::resolve::match_crc32;
use ncch::NcchHeader;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// 1 media unit = 0x200 bytes.
const MEDIA_UNIT: u64 = 0x200;

/// "NCSD" at 0x100 of a card image.
const NCSD_MAGIC: [u8; 4] = *b"NCSD";

/// "NCCH" at 0x100 of a partition.
const NCCH_MAGIC: [u8; 4] = *b"NCCH";

// ---------------------------------------------------------------------------
// Header struct
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum N3dsContainer {
    Ncsd,
    Cia,
    Ncch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct N3dsHeader {
    pub container: N3dsContainer,
    pub title_id: u64,
    /// e.g. `CTR-P-ABCE`; empty for a CIA whose content is unreadable.
    pub product_code: String,
    pub maker_code: String,
    pub version: u16,
    pub content_size: u64,
}

impl N3dsHeader {
    fn from_ncch(container: N3dsContainer, ncch: &NcchHeader, title_id: u64) -> Self {
        Self {
            container,
            title_id,
            product_code: ncch.product_code.clone(),
            maker_code: ncch.maker_code.clone(),
            version: ncch.version,
            content_size: ncch.content_size,
        }
    }

    fn title_only(container: N3dsContainer, title_id: u64) -> Self {
        Self {
            container,
            title_id,
            product_code: String::new(),
            maker_code: String::new(),
            version: 0,
            content_size: 0,
        }
    }

    /// Title id as 16 uppercase hex characters, `None` when zero.
    pub fn title_id_hex(&self) -> Option<String> {
        (self.title_id != 0).then(|| format_title_id(self.title_id))
    }

    /// Four-character game code: the first four characters of the third
    /// dash-separated part of the product code, or the product code itself.
    pub fn game_code(&self) -> String {
        match self.product_code.split('-').nth(2) {
            Some(part) if !part.is_empty() => part.chars().take(4).collect(),
            _ => self.product_code.clone(),
        }
    }

    pub fn region(&self) -> &'static str {
        self.game_code()
            .chars()
            .nth(3)
            .map(region_from_code_letter)
            .unwrap_or_default()
    }

    pub fn publisher(&self) -> String {
        publisher_for_maker(&self.maker_code)
    }

    /// `major.minor.patch` from the NCCH version word; "1.0" when zero.
    pub fn version_string(&self) -> String {
        let v = self.version;
        if v == 0 {
            return "1.0".to_string();
        }
        format!("{}.{}.{}", v >> 10, (v >> 4) & 0x3F, v & 0xF)
    }

    /// Product code when it is a real `CTR-` code.
    pub fn full_product_code(&self) -> Option<&str> {
        self.product_code
            .starts_with("CTR")
            .then_some(self.product_code.as_str())
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
        'T' => "Taiwan",
        'A' => "Asia",
        'H' => "Netherlands",
        'R' => "Russia",
        _ => "",
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a 3DS image. `extension` (lowercase, no dot) picks the container;
/// anything else tries NCSD, CIA and NCCH in turn.
pub fn parse_header(reader: &mut dyn ReadSeek, extension: &str) -> Result<N3dsHeader, AnalysisError> {
    match extension {
        "3ds" => ncsd::parse_ncsd(reader),
        "cia" => cia::parse_cia(reader),
        "cxi" | "app" => parse_bare_ncch(reader),
        _ => {
            if let Some(header) = recognized(ncsd::parse_ncsd(reader))? {
                return Ok(header);
            }
            if let Some(header) = recognized(cia::parse_cia(reader))? {
                return Ok(header);
            }
            parse_bare_ncch(reader)
        }
    }
}

fn parse_bare_ncch(reader: &mut dyn ReadSeek) -> Result<N3dsHeader, AnalysisError> {
    let ncch = ncch::parse_ncch(reader, 0)?;
    let title_id = ncch.partition_id;
    Ok(N3dsHeader::from_ncch(N3dsContainer::Ncch, &ncch, title_id))
}

fn content_type_for(extension: &str) -> ContentType {
    match extension {
        "cia" => ContentType::Cia,
        "3ds" => ContentType::Cart3ds,
        "cxi" => ContentType::Cxi,
        "app" => ContentType::App,
        _ => ContentType::Raw,
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct N3dsPlugin {
    tables: Arc<TableProvider>,
}

impl N3dsPlugin {
    pub fn new(tables: Arc<TableProvider>) -> Self {
        Self { tables }
    }

    pub fn read_header(&self, path: &Path) -> Result<Option<N3dsHeader>, AnalysisError> {
        let mut file = File::open(path)?;
        recognized(parse_header(&mut file, &extension_lower(path)))
    }
}

impl GamePlugin for N3dsPlugin {
    fn platform(&self) -> Platform {
        Platform::N3ds
    }

    fn list_extensions(&self) -> &'static [&'static str] {
        &["3ds", "cia", "cxi", "app"]
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
        let title_id = header.title_id_hex();

        let mut info = RomInfo::new();
        info.content_type = content_type_for(&extension_lower(path));
        info.file_type = FileType::Base;
        info.region = header.region().to_string();
        info.publisher = header.publisher();
        info.version = header.version_string();

        let crc = crc32_file(path, N3DS_LIMIT);
        if let Some(hit) = crc
            .as_deref()
            .and_then(|c| match_crc32(self.tables.tables(Platform::N3ds), c))
        {
            hit.apply(&mut info);
        }
        if info.title_name.is_empty() {
            info.title_name = if !header.product_code.is_empty() {
                header.product_code.clone()
            } else {
                title_id.clone().unwrap_or_else(|| stem.clone())
            };
        }
        info.title_id = title_id.or(crc).unwrap_or(stem);
        Ok(Some(info))
    }

    fn extract_canonical_id(&self, path: &Path) -> String {
        let header = self.read_header(path).ok().flatten();
        let from_header = header.and_then(|h| {
            h.title_id_hex().or_else(|| {
                h.full_product_code()
                    .map(str::to_string)
                    .or_else(|| (!h.product_code.is_empty()).then(|| h.product_code.clone()))
            })
        });
        from_header
            .or_else(|| crc32_file(path, N3DS_LIMIT))
            .unwrap_or_else(|| file_stem(path))
    }

    fn resolve_game_name(&self, game_id: &str) -> Option<String> {
        self.tables.tables(Platform::N3ds).display_name(game_id)
    }

    fn scraper_ids(&self) -> ScraperIds {
        ScraperIds {
            igdb: 37,
            screenscraper: 17,
        }
    }
}

#[cfg(test)]
#[path = "tests/n3ds_tests.rs"]
mod tests;
