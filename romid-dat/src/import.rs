//! Table generation from No-Intro DATs, and custom-entry maintenance.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use romid_core::Platform;
use romid_core::checksum::crc32_file;

use crate::dat::{DatFile, parse_dat_file};
use crate::error::DatError;
use crate::table::{
    CUSTOM_TABLE_FILE, CustomEntry, HEADER_POOL_FILE, OFFICIAL_TABLE_FILE, OfficialRecord,
};

/// Region recorded for custom entries when none is given.
pub const DEFAULT_CUSTOM_REGION: &str = "China";

/// DAT name keyword → platform. More specific keywords come first.
const DAT_PLATFORM_KEYWORDS: &[(&str, Platform)] = &[
    ("Super Nintendo Entertainment System", Platform::Snes),
    ("Nintendo Entertainment System", Platform::Nes),
    ("Game Boy Advance", Platform::Gba),
    ("Nintendo 3DS", Platform::N3ds),
    ("Nintendo DS", Platform::Ds),
];

/// Result of importing one DAT.
#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub platform: Platform,
    pub games: usize,
    pub entries: usize,
    pub headers: usize,
    pub official_path: PathBuf,
    pub header_pool_path: Option<PathBuf>,
}

/// Guess the platform from a DAT file name.
pub fn guess_platform(dat_name: &str) -> Option<Platform> {
    DAT_PLATFORM_KEYWORDS
        .iter()
        .find(|(keyword, _)| dat_name.contains(keyword))
        .map(|&(_, platform)| platform)
}

/// Strip region/language/revision tags: everything from the first `(`.
///
/// `"Pocket Monsters - Ruby (Japan)"` → `"Pocket Monsters - Ruby"`.
pub fn clean_game_name(raw_name: &str) -> String {
    let cleaned = match raw_name.find('(') {
        Some(pos) => raw_name[..pos].trim(),
        None => raw_name.trim(),
    };
    if cleaned.is_empty() {
        raw_name.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Build the official table and the deduplicated header pool from a DAT.
///
/// BIOS entries and games without a numeric id are skipped. The first game
/// listing a CRC32 wins.
pub fn build_tables(dat: &DatFile) -> (BTreeMap<String, OfficialRecord>, Vec<String>) {
    let mut entries = BTreeMap::new();
    let mut headers = BTreeSet::new();

    for game in &dat.games {
        if game.name.is_empty() || game.name.starts_with("[BIOS]") {
            continue;
        }
        let Some(id) = game
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|id| id.parse::<i64>().ok())
        else {
            continue;
        };
        let name = clean_game_name(&game.name);

        for rom in &game.roms {
            if let Some(header) = rom.header.as_deref() {
                let compact: String = header.split_whitespace().collect();
                if !compact.is_empty() {
                    headers.insert(compact.to_uppercase());
                }
            }
            if !rom.crc.is_empty() && !entries.contains_key(&rom.crc) {
                entries.insert(
                    rom.crc.clone(),
                    OfficialRecord {
                        name: name.clone(),
                        id: Some(id),
                        serial: rom.serial.clone().filter(|s| !s.trim().is_empty()),
                    },
                );
            }
        }
    }

    (entries, headers.into_iter().collect())
}

/// Import a DAT into `<tables_root>/<platform>/`.
///
/// The platform is guessed from the DAT file name when not given.
pub fn import_dat(
    dat_path: &Path,
    platform: Option<Platform>,
    tables_root: &Path,
) -> Result<ImportSummary, DatError> {
    let file_name = dat_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let platform = platform
        .or_else(|| guess_platform(&file_name))
        .ok_or_else(|| DatError::UnknownPlatform(file_name.clone()))?;

    log::info!("Parsing {} → {}", file_name, platform.short_name());
    let dat = parse_dat_file(dat_path)?;
    let (entries, headers) = build_tables(&dat);

    let dir = tables_root.join(platform.short_name());
    fs::create_dir_all(&dir)?;

    let official_path = dir.join(OFFICIAL_TABLE_FILE);
    write_json_atomic(&official_path, &entries)?;
    log::info!("Wrote {} entries to {}", entries.len(), official_path.display());

    let header_pool_path = if headers.is_empty() {
        None
    } else {
        let path = dir.join(HEADER_POOL_FILE);
        write_json_atomic(&path, &headers)?;
        log::info!("Wrote {} unique headers to {}", headers.len(), path.display());
        Some(path)
    };

    Ok(ImportSummary {
        platform,
        games: dat.games.len(),
        entries: entries.len(),
        headers: headers.len(),
        official_path,
        header_pool_path,
    })
}

/// Checksum `rom_path` and record it in the platform's custom table.
///
/// Existing entries for the same CRC32 are replaced. Returns the CRC32.
pub fn add_custom_entry(
    platform_dir: &Path,
    rom_path: &Path,
    name: &str,
    region: Option<&str>,
) -> Result<String, DatError> {
    let crc = crc32_file(rom_path, u64::MAX)
        .ok_or_else(|| DatError::table(format!("Cannot checksum {}", rom_path.display())))?;

    fs::create_dir_all(platform_dir)?;
    let path = platform_dir.join(CUSTOM_TABLE_FILE);
    let mut table: BTreeMap<String, CustomEntry> = match fs::read_to_string(&path) {
        Ok(text) => serde_json::from_str(&text)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(e) => return Err(e.into()),
    };

    table.insert(
        crc.clone(),
        CustomEntry {
            name: name.to_string(),
            region: Some(region.unwrap_or(DEFAULT_CUSTOM_REGION).to_string()),
        },
    );
    write_json_atomic(&path, &table)?;
    log::info!("Added custom entry {crc} → {name}");
    Ok(crc)
}

/// Write JSON via a temp file and rename.
fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DatError> {
    let tmp = path.with_extension("json.tmp");
    let text = serde_json::to_string_pretty(value)?;
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/import_tests.rs"]
mod tests;
