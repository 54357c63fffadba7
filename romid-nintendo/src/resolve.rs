//! Reference-table lookups shared by every plugin.
//!
//! Each plugin walks its own priority chain, but the first two links are
//! always the same: the custom table keyed by CRC32, then the official
//! table. A hit is captured as a [`ReferenceMatch`] and applied to the
//! record in one place so every platform fills the reference fields alike.

use romid_core::RomInfo;
use romid_dat::{PlatformTables, ReferenceEntry};

/// Which table produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSource {
    Custom,
    Official,
}

/// A confirmed reference-table hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMatch {
    pub source: ReferenceSource,
    pub name: String,
    /// Region override carried by custom entries.
    pub region: Option<String>,
    pub crc32: Vec<String>,
    pub numeric_id: Option<i64>,
}

impl ReferenceMatch {
    fn official(entry: &ReferenceEntry, crc32: Vec<String>) -> Self {
        Self {
            source: ReferenceSource::Official,
            name: entry.name.clone(),
            region: None,
            crc32,
            numeric_id: entry.numeric_id,
        }
    }

    /// Copy name, region override and reference fields into `info`.
    pub fn apply(&self, info: &mut RomInfo) {
        info.title_name = self.name.clone();
        if let Some(region) = self.region.as_ref().filter(|r| !r.is_empty()) {
            info.region = region.clone();
        }
        info.set_reference(self.crc32.clone(), self.numeric_id);
    }
}

pub fn match_custom(tables: &PlatformTables, crc32: &str) -> Option<ReferenceMatch> {
    let entry = tables.custom_by_crc32(crc32)?;
    if entry.name.trim().is_empty() {
        return None;
    }
    Some(ReferenceMatch {
        source: ReferenceSource::Custom,
        name: entry.name.clone(),
        region: entry.region.clone(),
        crc32: vec![crc32.to_uppercase()],
        numeric_id: None,
    })
}

pub fn match_official(tables: &PlatformTables, crc32: &str) -> Option<ReferenceMatch> {
    let entry = tables.official.by_crc32(crc32)?;
    if entry.name.trim().is_empty() {
        return None;
    }
    Some(ReferenceMatch::official(entry, vec![crc32.to_uppercase()]))
}

/// Custom first, then official, for a single CRC32.
pub fn match_crc32(tables: &PlatformTables, crc32: &str) -> Option<ReferenceMatch> {
    match_custom(tables, crc32).or_else(|| match_official(tables, crc32))
}

/// Official lookup through the serial index. The reported CRC32 list is the
/// entry's own, since the file's checksum was not what matched.
pub fn match_serial(tables: &PlatformTables, serials: &[&str]) -> Option<ReferenceMatch> {
    serials
        .iter()
        .filter(|s| !s.is_empty())
        .find_map(|s| tables.official.by_serial(s))
        .filter(|entry| !entry.name.trim().is_empty())
        .map(|entry| ReferenceMatch::official(entry, entry.crc32.clone()))
}

#[cfg(test)]
#[path = "tests/resolve_tests.rs"]
mod tests;
