use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romid_lib::scanner::{candidate_extensions, scan_candidates};
use romid_lib::{Identifier, Platform};

use super::identify::format_entry;
use crate::error::CliError;

/// Identify every candidate file below `dir`.
///
/// Per-file failures are logged and skipped; the scan itself only fails
/// when `dir` cannot be read.
pub(crate) fn run_scan(
    identifier: &Identifier,
    dir: &Path,
    platform: Option<Platform>,
    json: bool,
) -> Result<(), CliError> {
    let extensions = candidate_extensions(identifier.registry(), platform);
    let files = scan_candidates(dir, &extensions)?;
    log::debug!("{} candidate file(s) in {}", files.len(), dir.display());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("  {bar:40.cyan/blue} {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let mut entries = Vec::new();
    let mut skipped = 0usize;
    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        pb.set_message(name);
        match identifier.identify_path(path, platform) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => skipped += 1,
            Err(e) => {
                pb.suspend(|| log::warn!("{}: {}", path.display(), e));
                skipped += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        for line in format_entry(entry) {
            log::info!("{}", line);
        }
    }
    let verified = entries.iter().filter(|e| e.is_verified()).count();
    log::info!("");
    log::info!(
        "{} identified, {} verified, {} skipped",
        entries.len().if_supports_color(Stdout, |t| t.bold()),
        verified.if_supports_color(Stdout, |t| t.green()),
        skipped.if_supports_color(Stdout, |t| t.dimmed()),
    );
    Ok(())
}
