use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romid_core::util::format_bytes;
use romid_lib::{IdentifiedEntry, Identifier, Platform};

use crate::error::CliError;

/// Identify each path and print the entries.
///
/// Failures on individual files are reported and counted; the command
/// fails at the end if any file could not be identified.
pub(crate) fn run_identify(
    identifier: &Identifier,
    paths: &[PathBuf],
    platform: Option<Platform>,
    json: bool,
) -> Result<(), CliError> {
    let mut entries = Vec::new();
    let mut failures = 0usize;

    for path in paths {
        match identifier.identify_path(path, platform) {
            Ok(Some(entry)) => {
                if !json {
                    for line in format_entry(&entry) {
                        log::info!("{}", line);
                    }
                }
                entries.push(entry);
            }
            Ok(None) => {
                log::warn!("{}: not a supported ROM", path.display());
                failures += 1;
            }
            Err(e) => {
                log::error!("{}: {}", path.display(), e);
                failures += 1;
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    }
    if failures > 0 {
        return Err(CliError::other(format!(
            "{} of {} file(s) not identified",
            failures,
            paths.len()
        )));
    }
    Ok(())
}

/// Print the canonical game id.
pub(crate) fn run_id(
    identifier: &Identifier,
    path: &Path,
    platform: Option<Platform>,
) -> Result<(), CliError> {
    let plugin = identifier
        .plugin_for(path, platform)?
        .ok_or_else(|| CliError::unknown_platform(path.display().to_string()))?;
    println!("{}", plugin.extract_canonical_id(path));
    Ok(())
}

/// Print the content classification.
pub(crate) fn run_classify(
    identifier: &Identifier,
    path: &Path,
    platform: Option<Platform>,
) -> Result<(), CliError> {
    let plugin = identifier
        .plugin_for(path, platform)?
        .ok_or_else(|| CliError::unknown_platform(path.display().to_string()))?;
    println!("{}", plugin.classify(path));
    Ok(())
}

/// Human-readable lines for one entry. The first line is the header.
pub(crate) fn format_entry(entry: &IdentifiedEntry) -> Vec<String> {
    let file_name = entry
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| entry.path.display().to_string());

    let marker = if entry.is_verified() {
        format!("{}", "\u{2713}".if_supports_color(Stdout, |t| t.green()))
    } else {
        format!("{}", "?".if_supports_color(Stdout, |t| t.yellow()))
    };

    let mut lines = vec![format!(
        "{} {} [{}]",
        marker,
        file_name.if_supports_color(Stdout, |t| t.bold()),
        entry.platform.short_name(),
    )];

    let mut field = |label: &str, value: &str| {
        if !value.is_empty() {
            let label = format!("{label:<10}");
            lines.push(format!(
                "    {} {}",
                label.if_supports_color(Stdout, |t| t.cyan()),
                value
            ));
        }
    };

    field("Name:", &entry.display_name);
    field("Game id:", &entry.game_id);
    field("CRC32:", &entry.hash_crc32);
    field("Size:", &format_bytes(entry.file_size));

    match &entry.rom_info {
        Some(info) => {
            field("Title id:", &info.title_id);
            field("Publisher:", &info.publisher);
            field("Version:", &info.version);
            field("Region:", &info.region);
            field("Type:", info.file_type.as_str());
            field("Content:", info.content_type.as_str());
            if info.reference_id >= 0 {
                field("Ref id:", &info.reference_id.to_string());
            }
        }
        None => field("Note:", "header not recognized"),
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use romid_lib::RomInfo;

    fn entry(rom_info: Option<RomInfo>) -> IdentifiedEntry {
        IdentifiedEntry {
            path: PathBuf::from("/roms/Test Quest (USA).nes"),
            platform: Platform::Nes,
            game_id: "1A2B3C4D".into(),
            display_name: "Test Quest".into(),
            file_size: 40 * 1024,
            hash_crc32: "1A2B3C4D".into(),
            rom_info,
        }
    }

    #[test]
    fn unrecognized_entry_has_note() {
        let lines = format_entry(&entry(None));
        assert!(lines[0].contains("Test Quest (USA).nes"));
        assert!(lines.iter().any(|l| l.contains("header not recognized")));
        assert!(lines.iter().any(|l| l.contains("40 KB")));
    }

    #[test]
    fn empty_fields_are_skipped() {
        let mut info = RomInfo::new();
        info.region = "USA".into();
        let lines = format_entry(&entry(Some(info)));
        assert!(lines.iter().any(|l| l.contains("USA")));
        assert!(!lines.iter().any(|l| l.contains("Publisher")));
        assert!(!lines.iter().any(|l| l.contains("Ref id")));
    }
}
