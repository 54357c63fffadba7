use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romid_core::util::extension_lower;
use romid_dat::import::{add_custom_entry, import_dat};
use romid_lib::settings::resolve_tables_root;
use romid_lib::{Platform, PluginRegistry, TableProvider};

use crate::error::CliError;

fn require_tables_root(tables_override: Option<PathBuf>) -> Result<PathBuf, CliError> {
    resolve_tables_root(tables_override).ok_or_else(|| {
        CliError::config("no tables directory; pass --tables or run 'romid config set-tables <dir>'")
    })
}

/// Import a DAT file into the tables directory.
pub(crate) fn run_import(
    tables_override: Option<PathBuf>,
    dat: &Path,
    platform: Option<Platform>,
) -> Result<(), CliError> {
    let root = require_tables_root(tables_override)?;
    let summary = import_dat(dat, platform, &root)?;

    log::info!(
        "{} {} games from {}",
        "Imported".if_supports_color(Stdout, |t| t.green()),
        summary.games,
        dat.display(),
    );
    log::info!("  Platform: {}", summary.platform.display_name());
    log::info!(
        "  Entries:  {} ({})",
        summary.entries,
        summary.official_path.display()
    );
    match &summary.header_pool_path {
        Some(path) => log::info!("  Headers:  {} ({})", summary.headers, path.display()),
        None => log::info!("  Headers:  none"),
    }
    Ok(())
}

/// Add a ROM to the platform's custom table.
pub(crate) fn run_add_custom(
    tables_override: Option<PathBuf>,
    rom: &Path,
    name: &str,
    region: Option<&str>,
    platform: Option<Platform>,
) -> Result<(), CliError> {
    let platform = match platform {
        Some(p) => p,
        None => {
            let registry = PluginRegistry::with_defaults(TableProvider::empty().into());
            registry
                .plugin_for_extension(&extension_lower(rom))
                .map(|plugin| plugin.platform())
                .ok_or_else(|| {
                    CliError::unknown_platform(format!(
                        "cannot tell the platform of {}; pass --platform",
                        rom.display()
                    ))
                })?
        }
    };

    let root = require_tables_root(tables_override)?;
    let dir = root.join(platform.short_name());
    let crc = add_custom_entry(&dir, rom, name, region)?;
    log::info!(
        "{} {} → {} [{}]",
        "Added".if_supports_color(Stdout, |t| t.green()),
        crc,
        name,
        platform.short_name(),
    );
    Ok(())
}
