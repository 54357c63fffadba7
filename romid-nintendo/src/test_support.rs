//! Fixture builders for plugin tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use romid_core::Platform;
use romid_dat::{CustomEntry, PlatformTables, ReferenceEntry, TableProvider};

pub(crate) fn official_entry(name: &str, id: Option<i64>) -> ReferenceEntry {
    ReferenceEntry {
        name: name.to_string(),
        numeric_id: id,
        crc32: Vec::new(),
        serial: None,
    }
}

pub(crate) fn with_official(mut tables: PlatformTables, crc32: &str, name: &str) -> PlatformTables {
    tables.official.insert(crc32, official_entry(name, Some(7)));
    tables
}

pub(crate) fn with_custom(
    mut tables: PlatformTables,
    crc32: &str,
    name: &str,
    region: Option<&str>,
) -> PlatformTables {
    tables.custom.insert(
        crc32.to_uppercase(),
        CustomEntry {
            name: name.to_string(),
            region: region.map(str::to_string),
        },
    );
    tables
}

pub(crate) fn provider(platform: Platform, tables: PlatformTables) -> Arc<TableProvider> {
    Arc::new(TableProvider::empty().with_tables(platform, tables))
}

pub(crate) fn write_rom(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
