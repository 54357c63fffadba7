//! Nintendo Switch identification.
//!
//! Supports:
//! - NSP / NSZ eShop packages (PFS0)
//! - XCI / XCZ game card images (HFS0)
//! - NRO homebrew (identified from the filename only)
//!
//! NCA content is encrypted, so only what sits in the clear is read: the
//! title id in a meta NCA header, a loose `.cnmt`, or a loose `.nacp`.
//! Everything else comes from the filename (`Title [0100000000010000] (v0)`
//! is the usual scene layout).

mod cnmt;
mod nacp;
mod pfs0;
mod xci;

pub use cnmt::{Cnmt, MetaType};
pub use nacp::Nacp;

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use romid_core::name_tags::{bracket_title_id, region_from_filename, strip_tags, version_from_filename};
use romid_core::util::{extension_lower, file_stem};
use romid_core::{
    AnalysisError, AnalysisOptions, ContentType, FileType, GamePlugin, Platform, ReadSeek,
    RomInfo, ScraperIds, recognized,
};
use romid_dat::TableProvider;

use crate::common::read_up_to;
use pfs0::{PartitionEntry, PartitionKind, read_partition};

// ---------------------------------------------------------------------------
// Header struct
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchContainer {
    Nsp,
    Xci,
    Nro,
}

impl SwitchContainer {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "nsp" | "nsz" => Some(Self::Nsp),
            "xci" | "xcz" => Some(Self::Xci),
            "nro" => Some(Self::Nro),
            _ => None,
        }
    }

    fn content_type(self) -> ContentType {
        match self {
            Self::Nsp => ContentType::Nsp,
            Self::Xci => ContentType::Xci,
            Self::Nro => ContentType::Raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchHeader {
    pub container: SwitchContainer,
    /// Title id found inside the container (16 uppercase hex).
    pub title_id: Option<String>,
    pub nacp: Option<Nacp>,
    pub cnmt: Option<Cnmt>,
}

impl SwitchHeader {
    fn empty(container: SwitchContainer) -> Self {
        Self {
            container,
            title_id: None,
            nacp: None,
            cnmt: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a Switch container. The container kind comes from the extension
/// (lowercase, no dot); unknown extensions are tried as NSP.
pub fn parse_header(reader: &mut dyn ReadSeek, extension: &str) -> Result<SwitchHeader, AnalysisError> {
    let container = SwitchContainer::from_extension(extension).unwrap_or(SwitchContainer::Nsp);
    let entries = match container {
        SwitchContainer::Nsp => read_partition(reader, 0, PartitionKind::Pfs0)?,
        SwitchContainer::Xci => xci::secure_entries(reader)?,
        SwitchContainer::Nro => return Ok(SwitchHeader::empty(container)),
    };
    scan_entries(reader, container, &entries)
}

fn scan_entries(
    reader: &mut dyn ReadSeek,
    container: SwitchContainer,
    entries: &[PartitionEntry],
) -> Result<SwitchHeader, AnalysisError> {
    let mut header = SwitchHeader::empty(container);
    for entry in entries {
        let name = entry.name.to_lowercase();
        if name.ends_with(".cnmt.nca") {
            if header.title_id.is_none() {
                header.title_id = cnmt::nca_title_id(reader, entry.offset)?;
            }
        } else if name.ends_with(".cnmt") {
            let data = read_entry(reader, entry, cnmt::CNMT_HEADER_SIZE)?;
            header.cnmt = header.cnmt.or_else(|| Cnmt::parse(&data));
        } else if name.ends_with(".nacp") && header.nacp.is_none() {
            let data = read_entry(reader, entry, nacp::NACP_SIZE)?;
            header.nacp = Some(Nacp::parse(&data));
        }
    }
    if header.title_id.is_none() {
        header.title_id = header.cnmt.as_ref().map(|c| c.title_id.clone());
    }
    Ok(header)
}

fn read_entry(
    reader: &mut dyn ReadSeek,
    entry: &PartitionEntry,
    max: usize,
) -> Result<Vec<u8>, AnalysisError> {
    let len = entry.size.min(max as u64) as usize;
    read_up_to(reader, entry.offset, len)
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SwitchPlugin {
    tables: Arc<TableProvider>,
}

impl SwitchPlugin {
    pub fn new(tables: Arc<TableProvider>) -> Self {
        Self { tables }
    }

    /// Parse the container, falling back to an empty record when the bytes
    /// are not a recognizable container. Returns `None` only for extensions
    /// this platform does not handle.
    pub fn read_header(&self, path: &Path) -> Result<Option<SwitchHeader>, AnalysisError> {
        let Some(container) = SwitchContainer::from_extension(&extension_lower(path)) else {
            return Ok(None);
        };
        let mut file = File::open(path)?;
        let parsed = recognized(parse_header(&mut file, &extension_lower(path)))?;
        Ok(Some(parsed.unwrap_or_else(|| {
            log::debug!(
                "{}: container not readable, using the filename",
                path.display()
            );
            SwitchHeader::empty(container)
        })))
    }
}

impl GamePlugin for SwitchPlugin {
    fn platform(&self) -> Platform {
        Platform::Switch
    }

    fn list_extensions(&self) -> &'static [&'static str] {
        &["nsp", "xci", "nsz", "xcz", "nro"]
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
        info.content_type = header.container.content_type();
        info.region = region_from_filename(&stem);

        if header.container == SwitchContainer::Nro {
            info.title_name = strip_tags(&stem);
            info.file_type = FileType::Base;
            info.version = version_from_filename(&stem);
            return Ok(Some(info));
        }

        info.title_id = header
            .title_id
            .clone()
            .or_else(|| bracket_title_id(&stem))
            .unwrap_or_default();
        info.file_type = FileType::from_title_id(&info.title_id);

        if let Some(nacp) = &header.nacp {
            info.title_name_zh = nacp.title("zh_CN").unwrap_or_default().to_string();
            info.title_name_en = nacp.title("en_US").unwrap_or_default().to_string();
            info.title_name_ja = nacp.title("ja").unwrap_or_default().to_string();
            info.title_name = [&info.title_name_zh, &info.title_name_en, &info.title_name_ja]
                .into_iter()
                .find(|name| !name.is_empty())
                .cloned()
                .unwrap_or_default();
            info.publisher = nacp.publisher.clone();
            info.version = nacp.version.clone();
        }
        if info.version.is_empty() {
            info.version = header
                .cnmt
                .as_ref()
                .map(Cnmt::version_string)
                .unwrap_or_else(|| version_from_filename(&stem));
        }
        if info.title_name.is_empty() {
            info.title_name = strip_tags(&stem);
        }
        Ok(Some(info))
    }

    fn extract_canonical_id(&self, path: &Path) -> String {
        let stem = file_stem(path);
        self.read_header(path)
            .ok()
            .flatten()
            .and_then(|h| h.title_id)
            .or_else(|| bracket_title_id(&stem))
            .unwrap_or(stem)
    }

    fn classify(&self, path: &Path) -> FileType {
        FileType::from_title_id(&self.extract_canonical_id(path))
    }

    fn resolve_game_name(&self, game_id: &str) -> Option<String> {
        self.tables.tables(Platform::Switch).display_name(game_id)
    }

    fn scraper_ids(&self) -> ScraperIds {
        ScraperIds {
            igdb: 130,
            screenscraper: 225,
        }
    }
}

#[cfg(test)]
#[path = "tests/switch_tests.rs"]
mod tests;
