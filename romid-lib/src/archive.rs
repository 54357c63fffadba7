//! ZIP-wrapped ROMs.
//!
//! The first member that belongs to the target platform is extracted to a
//! scratch directory under its own file name and identified there. When the
//! plugin repaired the scratch copy, the repaired bytes are written back
//! into the archive after a one-time `.zip.bak` backup.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use romid_core::name_tags::{region_from_filename, version_from_filename};
use romid_core::repair::backup_path;
use romid_core::util::{extension_lower, file_stem};
use romid_core::{GamePlugin, Platform};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::entry::IdentifiedEntry;
use crate::error::IdentifyError;
use crate::identify::{Identifier, create_entry};

/// A selected archive member.
struct Member {
    index: usize,
    name: String,
    plugin: Arc<dyn GamePlugin>,
}

/// Identify the ROM inside `zip_path`.
///
/// Without a platform the first member with any registered extension picks
/// the plugin. Unreadable archives are "not recognized" (`Ok(None)`).
pub(crate) fn identify_zip(
    identifier: &Identifier,
    zip_path: &Path,
    platform: Option<Platform>,
) -> Result<Option<IdentifiedEntry>, IdentifyError> {
    let mut archive = match ZipArchive::new(File::open(zip_path)?) {
        Ok(archive) => archive,
        Err(ZipError::Io(e)) => return Err(e.into()),
        Err(e) => {
            log::debug!("Cannot open zip '{}': {}", zip_path.display(), e);
            return Ok(None);
        }
    };

    let Some(member) = select_member(identifier, &mut archive, platform)? else {
        return match platform {
            Some(_) => Err(IdentifyError::NoMember(zip_path.to_path_buf())),
            None => {
                log::debug!("No ROM member in '{}'", zip_path.display());
                Ok(None)
            }
        };
    };

    let mut original = Vec::new();
    archive.by_index(member.index)?.read_to_end(&mut original)?;
    drop(archive);

    let scratch = tempfile::tempdir()?;
    let file_name = Path::new(&member.name)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "member".into());
    let scratch_path = scratch.path().join(file_name);
    fs::write(&scratch_path, &original)?;

    let options = identifier.options().clone().scratch_copy(true);
    let mut entry = create_entry(&scratch_path, member.plugin.as_ref(), &options)?;

    let fixed = fs::read(&scratch_path)?;
    if fixed != original {
        rewrite_member(zip_path, member.index, &member.name, &fixed)?;
    }

    entry.path = zip_path.to_path_buf();
    entry.file_size = fs::metadata(zip_path)?.len();

    // No-Intro archives carry the authoritative tags in the archive name
    let stem = file_stem(zip_path);
    if let Some(info) = entry.rom_info.as_mut() {
        let version = version_from_filename(&stem);
        if !version.is_empty() {
            info.version = version;
        }
        let region = region_from_filename(&stem);
        if !region.is_empty() {
            info.region = region;
        }
    }
    Ok(Some(entry))
}

fn select_member(
    identifier: &Identifier,
    archive: &mut ZipArchive<File>,
    platform: Option<Platform>,
) -> Result<Option<Member>, IdentifyError> {
    let requested = match platform {
        Some(p) => Some(
            identifier
                .registry()
                .get_by_platform(p)
                .ok_or_else(|| IdentifyError::no_plugin(p.short_name()))?,
        ),
        None => None,
    };

    for index in 0..archive.len() {
        let file = archive.by_index_raw(index)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let ext = extension_lower(Path::new(&name));
        let plugin = match &requested {
            Some(plugin) => plugin.handles_extension(&ext).then(|| plugin.clone()),
            None => identifier.registry().plugin_for_extension(&ext),
        };
        if let Some(plugin) = plugin {
            return Ok(Some(Member {
                index,
                name,
                plugin,
            }));
        }
    }
    Ok(None)
}

/// Replace one member's content, copying every other entry byte-for-byte.
///
/// The new archive is built next to the original and renamed over it, so a
/// failure leaves the original in place.
fn rewrite_member(
    zip_path: &Path,
    index: usize,
    name: &str,
    content: &[u8],
) -> Result<(), IdentifyError> {
    let bak = backup_path(zip_path);
    if !bak.exists() {
        fs::copy(zip_path, &bak)?;
        log::info!(
            "Backup: {} → {}",
            zip_path.display(),
            bak.display()
        );
    }

    let mut source = ZipArchive::new(File::open(zip_path)?)?;
    let dir = zip_path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = ZipWriter::new(tmp.as_file_mut());
        for i in 0..source.len() {
            if i == index {
                let options =
                    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
                writer.start_file(name, options)?;
                writer.write_all(content)?;
            } else {
                writer.raw_copy_file(source.by_index_raw(i)?)?;
            }
        }
        writer.finish()?;
    }
    drop(source);
    tmp.persist(zip_path).map_err(|e| e.error)?;

    log::info!("Updated ROM in ZIP: {}/{}", zip_path.display(), name);
    Ok(())
}
