use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use romid_core::Platform;

use crate::table::PlatformTables;

const PLATFORM_COUNT: usize = 6;

/// Lazily loaded, read-only reference tables for every platform.
///
/// Each platform's tables are read from `<root>/<short_name>/` on first use
/// and shared afterwards. Population goes through `OnceLock`, so concurrent
/// first use is safe and loads at most once.
#[derive(Debug)]
pub struct TableProvider {
    root: Option<PathBuf>,
    slots: [OnceLock<PlatformTables>; PLATFORM_COUNT],
}

fn slot(platform: Platform) -> usize {
    match platform {
        Platform::Nes => 0,
        Platform::Snes => 1,
        Platform::Gba => 2,
        Platform::Ds => 3,
        Platform::N3ds => 4,
        Platform::Switch => 5,
    }
}

impl TableProvider {
    /// Provider reading tables below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            slots: std::array::from_fn(|_| OnceLock::new()),
        }
    }

    /// Provider with no table directory; every platform has empty tables
    /// unless seeded with [`with_tables`](Self::with_tables).
    pub fn empty() -> Self {
        Self {
            root: None,
            slots: std::array::from_fn(|_| OnceLock::new()),
        }
    }

    /// Seed a platform's tables in memory instead of loading them from disk.
    pub fn with_tables(self, platform: Platform, tables: PlatformTables) -> Self {
        if self.slots[slot(platform)].set(tables).is_err() {
            log::warn!("Tables for {} were already loaded", platform.short_name());
        }
        self
    }

    /// Default tables root: `<data dir>/romid/tables`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("romid").join("tables"))
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Directory holding `platform`'s table files.
    pub fn platform_dir(&self, platform: Platform) -> Option<PathBuf> {
        self.root.as_ref().map(|r| r.join(platform.short_name()))
    }

    /// The platform's tables, loading them on first use.
    pub fn tables(&self, platform: Platform) -> &PlatformTables {
        self.slots[slot(platform)].get_or_init(|| match self.platform_dir(platform) {
            Some(dir) => PlatformTables::load(&dir),
            None => PlatformTables::default(),
        })
    }
}

#[cfg(test)]
#[path = "tests/provider_tests.rs"]
mod tests;
