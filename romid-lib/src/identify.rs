//! Single-file identification.

use std::path::Path;
use std::sync::Arc;

use romid_core::checksum::{ENTRY_LIMIT, crc32_or_unknown};
use romid_core::util::extension_lower;
use romid_core::{AnalysisOptions, GamePlugin, Platform};

use crate::archive;
use crate::context::PluginRegistry;
use crate::entry::IdentifiedEntry;
use crate::error::IdentifyError;
use crate::locks::PathLocks;

/// Identifies files against a registry, serializing repair-capable calls
/// per path.
pub struct Identifier {
    registry: PluginRegistry,
    locks: PathLocks,
    options: AnalysisOptions,
}

impl Identifier {
    /// Identifier with repair enabled.
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry,
            locks: PathLocks::new(),
            options: AnalysisOptions::new(),
        }
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Resolve the plugin for `path`: the requested platform, or the one
    /// claiming the file's extension.
    pub fn plugin_for(
        &self,
        path: &Path,
        platform: Option<Platform>,
    ) -> Result<Option<Arc<dyn GamePlugin>>, IdentifyError> {
        match platform {
            Some(p) => self
                .registry
                .get_by_platform(p)
                .map(Some)
                .ok_or_else(|| IdentifyError::no_plugin(p.short_name())),
            None => Ok(self.registry.plugin_for_extension(&extension_lower(path))),
        }
    }

    /// Identify a file or ZIP archive.
    ///
    /// Returns `Ok(None)` when auto-detection finds no plugin for the file.
    pub fn identify_path(
        &self,
        path: &Path,
        platform: Option<Platform>,
    ) -> Result<Option<IdentifiedEntry>, IdentifyError> {
        if extension_lower(path) == "zip" {
            return self.locks.with_lock(path, || {
                archive::identify_zip(self, path, platform)
            });
        }
        let Some(plugin) = self.plugin_for(path, platform)? else {
            log::debug!("No plugin for {}", path.display());
            return Ok(None);
        };
        let entry = if self.options.allow_repair {
            self.locks
                .with_lock(path, || create_entry(path, plugin.as_ref(), &self.options))?
        } else {
            create_entry(path, plugin.as_ref(), &self.options)?
        };
        Ok(Some(entry))
    }
}

/// Run one plugin over one file and assemble the entry.
pub(crate) fn create_entry(
    path: &Path,
    plugin: &dyn GamePlugin,
    options: &AnalysisOptions,
) -> Result<IdentifiedEntry, IdentifyError> {
    let rom_info = plugin.parse_header_info(path, options)?;
    let game_id = plugin.extract_canonical_id(path);

    let display_name = rom_info
        .as_ref()
        .map(|info| info.title_name.clone())
        .filter(|name| !name.is_empty())
        .or_else(|| plugin.resolve_game_name(&game_id))
        .unwrap_or_default();

    let hash_crc32 = rom_info
        .as_ref()
        .and_then(|info| info.reference_crc32.first().cloned())
        .unwrap_or_else(|| crc32_or_unknown(path, ENTRY_LIMIT));

    log::debug!("Identified {} → {}", path.display(), game_id);
    Ok(IdentifiedEntry {
        path: path.to_path_buf(),
        platform: plugin.platform(),
        game_id,
        display_name,
        file_size: std::fs::metadata(path)?.len(),
        hash_crc32,
        rom_info,
    })
}
