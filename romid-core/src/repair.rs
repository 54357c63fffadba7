//! Header repair by candidate substitution.
//!
//! Some formats have several historically used header encodings for the same
//! payload (e.g. iNES 1.0 vs NES 2.0 headers). Reference tables checksum one
//! specific encoding, so a file carrying another encoding misses the lookup.
//! Repair tries every known header variant against the file body and, on a
//! reference match, rewrites the header in place.
//!
//! The work is split in two phases:
//! - [`stage_header_repair`] reads and computes only. It has no side effects
//!   and can be retried or run speculatively.
//! - [`StagedRepair::commit`] backs up and writes. Callers must serialize
//!   commits per path.

use std::fs;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::checksum::format_crc32;
use crate::error::AnalysisError;

/// Fixed-size header layout the repair engine works on.
#[derive(Debug, Clone, Copy)]
pub struct HeaderLayout<'a> {
    /// Length of the header that gets replaced.
    pub header_len: usize,
    /// Magic bytes the file must start with to be eligible.
    pub magic: &'a [u8],
    /// Files larger than this are never staged.
    pub size_limit: u64,
}

/// How [`StagedRepair::commit`] treats the original file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupPolicy {
    /// Copy the original to a `.bak` sibling (once) before writing.
    Backup,
    /// The file is a disposable scratch copy; write without a backup.
    ScratchCopy,
}

/// A repair that has been computed but not yet written.
#[derive(Debug, Clone)]
pub struct StagedRepair {
    pub path: PathBuf,
    pub header_len: usize,
    pub original_header: Vec<u8>,
    pub replacement: Vec<u8>,
    /// CRC32 of `replacement + body`, a key in the reference table.
    pub matched_crc32: String,
}

/// What a commit actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairOutcome {
    pub written: bool,
    pub backup: Option<PathBuf>,
}

/// Path of the one-time backup for `path`: `game.nes` → `game.nes.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => path.with_extension(format!("{}.bak", ext)),
        None => path.with_extension("bak"),
    }
}

/// Try each candidate header against the body of `path`.
///
/// Returns the first candidate whose `candidate + body` checksum satisfies
/// `is_reference`. Ineligible files (wrong magic, too small, too large) and
/// files with no matching candidate yield `Ok(None)`.
pub fn stage_header_repair(
    path: &Path,
    layout: &HeaderLayout<'_>,
    candidates: &[Vec<u8>],
    is_reference: &dyn Fn(&str) -> bool,
) -> Result<Option<StagedRepair>, AnalysisError> {
    if candidates.is_empty() {
        return Ok(None);
    }
    let size = fs::metadata(path)?.len();
    if size > layout.size_limit || size < layout.header_len as u64 {
        return Ok(None);
    }

    let data = fs::read(path)?;
    if data.len() < layout.header_len || !data.starts_with(layout.magic) {
        return Ok(None);
    }
    let (header, body) = data.split_at(layout.header_len);

    for candidate in candidates {
        if candidate.len() != layout.header_len {
            log::debug!(
                "skipping header candidate of {} bytes (expected {})",
                candidate.len(),
                layout.header_len
            );
            continue;
        }
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(candidate);
        hasher.update(body);
        let crc = format_crc32(hasher.finalize());
        if is_reference(&crc) {
            return Ok(Some(StagedRepair {
                path: path.to_path_buf(),
                header_len: layout.header_len,
                original_header: header.to_vec(),
                replacement: candidate.clone(),
                matched_crc32: crc,
            }));
        }
    }
    Ok(None)
}

impl StagedRepair {
    /// False when the matching candidate is already the file's header.
    pub fn needs_write(&self) -> bool {
        self.original_header != self.replacement
    }

    /// Back up (per `policy`) and rewrite the header.
    ///
    /// The new content goes to a sibling temp file that is renamed over the
    /// original, so a failed write leaves the original untouched. Fails with
    /// `RepairConflict` if the header on disk no longer matches what was
    /// staged.
    pub fn commit(&self, policy: BackupPolicy) -> Result<RepairOutcome, AnalysisError> {
        if !self.needs_write() {
            return Ok(RepairOutcome::default());
        }

        let mut original = fs::File::open(&self.path)?;
        let mut current = vec![0u8; self.header_len];
        original.read_exact(&mut current)?;
        if current != self.original_header {
            return Err(AnalysisError::RepairConflict(format!(
                "{} changed since the repair was staged",
                self.path.display()
            )));
        }

        let mut outcome = RepairOutcome::default();
        if policy == BackupPolicy::Backup {
            let bak = backup_path(&self.path);
            if !bak.exists() {
                fs::copy(&self.path, &bak)?;
                log::info!("Backup: {} → {}", display_name(&self.path), display_name(&bak));
                outcome.backup = Some(bak);
            }
        }

        let tmp_path = temp_sibling(&self.path);
        if let Err(e) = write_replacement(&tmp_path, &self.replacement, &mut original, self.header_len)
        {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        drop(original);
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        log::info!("Fixed header: {}", display_name(&self.path));
        outcome.written = true;
        Ok(outcome)
    }
}

fn write_replacement(
    tmp_path: &Path,
    header: &[u8],
    original: &mut fs::File,
    header_len: usize,
) -> io::Result<()> {
    let mut tmp = fs::File::create(tmp_path)?;
    tmp.write_all(header)?;
    original.seek(SeekFrom::Start(header_len as u64))?;
    io::copy(original, &mut tmp)?;
    tmp.flush()?;
    tmp.sync_all()?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => path.with_extension(format!("{}.repair_tmp", ext)),
        None => path.with_extension("repair_tmp"),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
#[path = "tests/repair_tests.rs"]
mod tests;
