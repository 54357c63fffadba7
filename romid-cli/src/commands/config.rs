use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romid_lib::TableProvider;
use romid_lib::settings::{
    TABLES_ENV, load_settings_string, load_tables_root, save_tables_root, settings_path,
};

use crate::error::CliError;

/// Where the effective tables directory came from.
fn tables_source(tables_override: Option<PathBuf>) -> Option<(PathBuf, &'static str)> {
    if let Some(p) = tables_override {
        return Some((p, "--tables"));
    }
    if let Some(p) = std::env::var_os(TABLES_ENV).filter(|v| !v.is_empty()) {
        return Some((PathBuf::from(p), TABLES_ENV));
    }
    if let Some(p) = load_tables_root() {
        return Some((p, "settings file"));
    }
    TableProvider::default_root().map(|p| (p, "default"))
}

/// Show the settings file and the effective tables directory.
pub(crate) fn run_config_show(tables_override: Option<PathBuf>) {
    let path = settings_path();

    log::info!(
        "{}",
        "romid Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    match tables_source(tables_override) {
        Some((root, source)) => {
            let status = if root.is_dir() { "" } else { " (missing)" };
            log::info!(
                "  Tables:        {}{} {}",
                root.display().if_supports_color(Stdout, |t| t.cyan()),
                status,
                format!("[{source}]").if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        None => log::info!(
            "  Tables:        {}",
            "could not determine path".if_supports_color(Stdout, |t| t.red()),
        ),
    }

    if let Some(contents) = load_settings_string() {
        log::info!("");
        for line in contents.lines() {
            log::info!("  {}", line);
        }
    }
}

/// Print the settings file path.
pub(crate) fn run_config_path() {
    println!("{}", settings_path().display());
}

/// Store the tables directory in the settings file.
pub(crate) fn run_config_set_tables(dir: &Path) -> Result<(), CliError> {
    let dir = std::path::absolute(dir)?;
    if !dir.is_dir() {
        log::warn!("{} does not exist yet", dir.display());
    }
    save_tables_root(Some(&dir))?;
    log::info!(
        "Tables directory set to {} in {}",
        dir.display().if_supports_color(Stdout, |t| t.cyan()),
        settings_path().display(),
    );
    Ok(())
}
