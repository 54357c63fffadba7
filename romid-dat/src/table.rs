//! Reference tables and their on-disk JSON shapes.
//!
//! Every platform directory may contain:
//! - `official_table.json`: `key → "name" | { name, id, crc32, serial }`
//! - `custom_table.json`: `CRC32 → { name, region }`
//! - `header_pool.json`: `["4E45531A...", ...]`
//! - `game_names.json`: `game_id → { zh_CN, en_US, ja_JP }`
//!
//! Official tables are keyed by CRC32. Older tables keyed by serial are
//! accepted too: their entries are indexed by serial and by every CRC32 they
//! list, so lookups always go through the same two indexes.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use romid_core::util::{decode_hex, is_hex_of_len};

use crate::error::DatError;

pub const OFFICIAL_TABLE_FILE: &str = "official_table.json";
pub const CUSTOM_TABLE_FILE: &str = "custom_table.json";
pub const HEADER_POOL_FILE: &str = "header_pool.json";
pub const GAME_NAMES_FILE: &str = "game_names.json";

/// One entry of the official table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub name: String,
    pub numeric_id: Option<i64>,
    /// Uppercase CRC32 values this entry is known under.
    pub crc32: Vec<String>,
    pub serial: Option<String>,
}

/// A user-maintained override entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Localized display names for a canonical game id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayNames {
    #[serde(rename = "zh_CN", default)]
    pub zh_cn: String,
    #[serde(rename = "en_US", default)]
    pub en_us: String,
    #[serde(rename = "ja_JP", default)]
    pub ja_jp: String,
}

impl DisplayNames {
    /// First non-empty name in zh_CN, en_US, ja_JP order.
    pub fn preferred(&self) -> Option<&str> {
        [&self.zh_cn, &self.en_us, &self.ja_jp]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

/// Record shape written by the import tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficialRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
}

// ---------------------------------------------------------------------------
// Raw JSON shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOfficial {
    Name(String),
    Entry(RawOfficialEntry),
}

#[derive(Deserialize)]
struct RawOfficialEntry {
    #[serde(default)]
    name: String,
    #[serde(default, alias = "numeric_id")]
    id: Option<RawId>,
    #[serde(default)]
    crc32: Option<OneOrMany>,
    #[serde(default)]
    serial: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

impl RawId {
    fn value(&self) -> Option<i64> {
        match self {
            RawId::Int(n) => Some(*n),
            RawId::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

// ---------------------------------------------------------------------------
// Official table
// ---------------------------------------------------------------------------

/// Official reference table with CRC32 and serial indexes.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    entries: Vec<ReferenceEntry>,
    by_crc32: HashMap<String, usize>,
    by_serial: HashMap<String, usize>,
}

fn normalize_serial(serial: &str) -> String {
    serial.trim().to_uppercase()
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON text of an `official_table.json`.
    pub fn from_json_str(text: &str) -> Result<Self, DatError> {
        let raw: HashMap<String, RawOfficial> = serde_json::from_str(text)?;
        let mut keys: Vec<_> = raw.into_iter().collect();
        // deterministic index order regardless of map iteration
        keys.sort_by(|a, b| a.0.cmp(&b.0));

        let mut table = Self::new();
        for (key, value) in keys {
            let entry = match value {
                RawOfficial::Name(name) => ReferenceEntry {
                    name,
                    numeric_id: None,
                    crc32: Vec::new(),
                    serial: None,
                },
                RawOfficial::Entry(e) => ReferenceEntry {
                    name: e.name,
                    numeric_id: e.id.and_then(|id| id.value()),
                    crc32: e.crc32.map(OneOrMany::into_vec).unwrap_or_default(),
                    serial: e.serial,
                },
            };
            table.insert(&key, entry);
        }
        Ok(table)
    }

    /// Add an entry under `key` (a CRC32 or a serial).
    pub fn insert(&mut self, key: &str, mut entry: ReferenceEntry) {
        let key = key.trim();
        let mut crcs: Vec<String> = Vec::new();
        if is_hex_of_len(key, 8) {
            crcs.push(key.to_uppercase());
        } else if entry.serial.is_none() {
            entry.serial = Some(key.to_string());
        }
        for crc in entry.crc32.drain(..) {
            let crc = crc.trim().to_uppercase();
            if is_hex_of_len(&crc, 8) && !crcs.contains(&crc) {
                crcs.push(crc);
            }
        }
        entry.crc32 = crcs;

        let index = self.entries.len();
        for crc in &entry.crc32 {
            self.by_crc32.entry(crc.clone()).or_insert(index);
        }
        if let Some(serial) = &entry.serial {
            self.by_serial
                .entry(normalize_serial(serial))
                .or_insert(index);
        }
        self.entries.push(entry);
    }

    pub fn by_crc32(&self, crc32: &str) -> Option<&ReferenceEntry> {
        self.by_crc32
            .get(&crc32.to_uppercase())
            .map(|&i| &self.entries[i])
    }

    pub fn by_serial(&self, serial: &str) -> Option<&ReferenceEntry> {
        self.by_serial
            .get(&normalize_serial(serial))
            .map(|&i| &self.entries[i])
    }

    pub fn contains_crc32(&self, crc32: &str) -> bool {
        self.by_crc32.contains_key(&crc32.to_uppercase())
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Per-platform bundle
// ---------------------------------------------------------------------------

/// All reference data for one platform.
#[derive(Debug, Clone, Default)]
pub struct PlatformTables {
    pub official: ReferenceTable,
    /// Custom overrides keyed by uppercase CRC32.
    pub custom: HashMap<String, CustomEntry>,
    /// Deduplicated known-good header variants.
    pub header_pool: Vec<Vec<u8>>,
    pub display_names: HashMap<String, DisplayNames>,
}

impl PlatformTables {
    /// Load every table file in `dir`. Missing files are empty tables;
    /// malformed files are logged and treated as empty.
    pub fn load(dir: &Path) -> Self {
        let official = match fs::read_to_string(dir.join(OFFICIAL_TABLE_FILE)) {
            Ok(text) => ReferenceTable::from_json_str(&text).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed {}: {e}", dir.join(OFFICIAL_TABLE_FILE).display());
                ReferenceTable::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ReferenceTable::new(),
            Err(e) => {
                log::warn!("Cannot read {}: {e}", dir.join(OFFICIAL_TABLE_FILE).display());
                ReferenceTable::new()
            }
        };

        let custom: HashMap<String, CustomEntry> = read_json_or_default(&dir.join(CUSTOM_TABLE_FILE));
        let custom = custom
            .into_iter()
            .map(|(k, v)| (k.trim().to_uppercase(), v))
            .collect();

        let pool: Vec<String> = read_json_or_default(&dir.join(HEADER_POOL_FILE));
        let header_pool = decode_header_pool(&pool);

        let display_names = read_json_or_default(&dir.join(GAME_NAMES_FILE));

        let tables = Self {
            official,
            custom,
            header_pool,
            display_names,
        };
        log::debug!(
            "Loaded tables from {}: {} official, {} custom, {} headers",
            dir.display(),
            tables.official.len(),
            tables.custom.len(),
            tables.header_pool.len()
        );
        tables
    }

    pub fn custom_by_crc32(&self, crc32: &str) -> Option<&CustomEntry> {
        self.custom.get(&crc32.to_uppercase())
    }

    /// Preferred display name for a canonical game id.
    pub fn display_name(&self, game_id: &str) -> Option<String> {
        self.display_names
            .get(game_id)
            .and_then(|names| names.preferred())
            .map(str::to_string)
    }
}

/// Decode hex header strings, dropping malformed and duplicate entries.
pub fn decode_header_pool(pool: &[String]) -> Vec<Vec<u8>> {
    let mut headers: Vec<Vec<u8>> = Vec::with_capacity(pool.len());
    for hex in pool {
        match decode_hex(hex) {
            Some(bytes) if !headers.contains(&bytes) => headers.push(bytes),
            Some(_) => {}
            None => log::warn!("Ignoring malformed header pool entry: {hex}"),
        }
    }
    headers
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed {}: {e}", path.display());
            T::default()
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => T::default(),
        Err(e) => {
            log::warn!("Cannot read {}: {e}", path.display());
            T::default()
        }
    }
}

#[cfg(test)]
#[path = "tests/table_tests.rs"]
mod tests;
