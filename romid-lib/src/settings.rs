//! Shared settings (reference table location, config file location).
//!
//! The settings file is `<config dir>/romid/settings.toml`:
//!
//! ```toml
//! [tables]
//! root = "/path/to/tables"
//! ```

use std::path::{Path, PathBuf};

use romid_dat::TableProvider;

use crate::error::IdentifyError;

/// Environment variable overriding the tables root.
pub const TABLES_ENV: &str = "ROMID_TABLES";

/// Canonical path to the settings file.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("romid").join("settings.toml")
}

/// Resolve the reference tables root using a priority chain:
///
/// 1. CLI override (if `Some`)
/// 2. `ROMID_TABLES` environment variable
/// 3. Saved `tables.root` in `settings.toml`
/// 4. `<data dir>/romid/tables`
pub fn resolve_tables_root(cli_override: Option<PathBuf>) -> Option<PathBuf> {
    resolve_tables_root_with(
        cli_override,
        std::env::var_os(TABLES_ENV).map(PathBuf::from),
        &settings_path(),
    )
}

pub(crate) fn resolve_tables_root_with(
    cli_override: Option<PathBuf>,
    env: Option<PathBuf>,
    settings: &Path,
) -> Option<PathBuf> {
    cli_override
        .or(env.filter(|p| !p.as_os_str().is_empty()))
        .or_else(|| load_tables_root_from(settings))
        .or_else(TableProvider::default_root)
}

/// Read `tables.root` from `settings.toml`, if set.
pub fn load_tables_root() -> Option<PathBuf> {
    load_tables_root_from(&settings_path())
}

pub fn load_tables_root_from(settings: &Path) -> Option<PathBuf> {
    let contents = std::fs::read_to_string(settings).ok()?;
    let doc: toml::Value = match contents.parse() {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("Ignoring malformed {}: {}", settings.display(), e);
            return None;
        }
    };
    let root = doc.get("tables")?.get("root")?.as_str()?;
    if root.is_empty() {
        None
    } else {
        Some(PathBuf::from(root))
    }
}

/// Save (or clear) the tables root in `settings.toml`.
pub fn save_tables_root(root: Option<&Path>) -> Result<(), IdentifyError> {
    save_tables_root_to(&settings_path(), root)
}

/// Update `tables.root` in place, keeping any other keys, and write the
/// file atomically.
pub fn save_tables_root_to(settings: &Path, root: Option<&Path>) -> Result<(), IdentifyError> {
    let mut doc: toml::Value = match std::fs::read_to_string(settings) {
        Ok(contents) => contents
            .parse()
            .unwrap_or_else(|_| toml::Value::Table(Default::default())),
        Err(_) => toml::Value::Table(Default::default()),
    };

    let table = doc
        .as_table_mut()
        .ok_or_else(|| IdentifyError::settings("settings.toml root is not a table"))?;
    let tables = table
        .entry("tables")
        .or_insert_with(|| toml::Value::Table(Default::default()));
    let tables = tables
        .as_table_mut()
        .ok_or_else(|| IdentifyError::settings("[tables] is not a table"))?;

    match root {
        Some(p) => {
            tables.insert(
                "root".to_string(),
                toml::Value::String(p.to_string_lossy().into_owned()),
            );
        }
        None => {
            tables.remove("root");
        }
    }

    // Write atomically
    if let Some(parent) = settings.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized =
        toml::to_string_pretty(&doc).map_err(|e| IdentifyError::settings(e.to_string()))?;
    let tmp = settings.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, settings)?;
    Ok(())
}

/// The full settings file as pretty-printed TOML, for display.
pub fn load_settings_string() -> Option<String> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    toml::to_string_pretty(&doc).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("romid").join("settings.toml");
        save_tables_root_to(&settings, Some(Path::new("/data/tables"))).unwrap();
        assert_eq!(
            load_tables_root_from(&settings),
            Some(PathBuf::from("/data/tables"))
        );
        assert!(!settings.with_extension("toml.tmp").exists());

        save_tables_root_to(&settings, None).unwrap();
        assert_eq!(load_tables_root_from(&settings), None);
    }

    #[test]
    fn save_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("settings.toml");
        std::fs::write(&settings, "[ui]\ncolor = false\n").unwrap();
        save_tables_root_to(&settings, Some(Path::new("/t"))).unwrap();

        let text = std::fs::read_to_string(&settings).unwrap();
        let doc: toml::Value = text.parse().unwrap();
        assert_eq!(doc["ui"]["color"].as_bool(), Some(false));
        assert_eq!(doc["tables"]["root"].as_str(), Some("/t"));
    }

    #[test]
    fn resolution_order() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("settings.toml");
        save_tables_root_to(&settings, Some(Path::new("/from/settings"))).unwrap();

        let cli = Some(PathBuf::from("/from/cli"));
        let env = Some(PathBuf::from("/from/env"));
        assert_eq!(
            resolve_tables_root_with(cli, env.clone(), &settings),
            Some(PathBuf::from("/from/cli"))
        );
        assert_eq!(
            resolve_tables_root_with(None, env, &settings),
            Some(PathBuf::from("/from/env"))
        );
        assert_eq!(
            resolve_tables_root_with(None, Some(PathBuf::new()), &settings),
            Some(PathBuf::from("/from/settings"))
        );
        assert_eq!(
            resolve_tables_root_with(None, None, &dir.path().join("missing.toml")),
            TableProvider::default_root()
        );
    }
}
