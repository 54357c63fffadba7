//! Plugin registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use romid_core::{GamePlugin, Platform};
use romid_dat::TableProvider;
use romid_nintendo::{DsPlugin, GbaPlugin, N3dsPlugin, NesPlugin, SnesPlugin, SwitchPlugin};

/// Registered platform plugins, in registration order.
///
/// Lookups by extension return the first plugin that claims it, so
/// registration order is also the auto-detect priority.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn GamePlugin>>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with all six Nintendo plugins sharing `tables`.
    pub fn with_defaults(tables: Arc<TableProvider>) -> Self {
        let mut registry = Self::new();
        registry
            .register(NesPlugin::new(tables.clone()))
            .register(SnesPlugin::new(tables.clone()))
            .register(GbaPlugin::new(tables.clone()))
            .register(DsPlugin::new(tables.clone()))
            .register(N3dsPlugin::new(tables.clone()))
            .register(SwitchPlugin::new(tables));
        registry
    }

    pub fn register<P: GamePlugin + 'static>(&mut self, plugin: P) -> &mut Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    pub fn plugins(&self) -> impl Iterator<Item = &Arc<dyn GamePlugin>> {
        self.plugins.iter()
    }

    pub fn get_by_platform(&self, platform: Platform) -> Option<Arc<dyn GamePlugin>> {
        self.plugins
            .iter()
            .find(|p| p.platform() == platform)
            .cloned()
    }

    /// Get a plugin by short name or alias (case-insensitive).
    pub fn get_by_short_name(&self, name: &str) -> Option<Arc<dyn GamePlugin>> {
        name.parse::<Platform>()
            .ok()
            .and_then(|p| self.get_by_platform(p))
    }

    /// First plugin claiming `ext` (any case, dot optional).
    pub fn plugin_for_extension(&self, ext: &str) -> Option<Arc<dyn GamePlugin>> {
        self.plugins
            .iter()
            .find(|p| p.handles_extension(ext))
            .cloned()
    }

    /// Extension → platform map used for auto-detection.
    pub fn extension_map(&self) -> BTreeMap<&'static str, Platform> {
        let mut map = BTreeMap::new();
        for plugin in &self.plugins {
            for ext in plugin.list_extensions() {
                map.entry(*ext).or_insert(plugin.platform());
            }
        }
        map
    }

    pub fn short_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.short_name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PluginRegistry {
        PluginRegistry::with_defaults(Arc::new(TableProvider::empty()))
    }

    #[test]
    fn defaults_register_every_platform() {
        let registry = registry();
        assert_eq!(
            registry.short_names(),
            vec!["nes", "snes", "gba", "nds", "3ds", "switch"]
        );
        for platform in Platform::all() {
            assert!(registry.get_by_platform(*platform).is_some());
        }
    }

    #[test]
    fn lookup_by_alias_and_extension() {
        let registry = registry();
        let sfc = registry.get_by_short_name("Super Famicom").unwrap();
        assert_eq!(sfc.platform(), Platform::Snes);
        assert!(registry.get_by_short_name("dreamcast").is_none());

        assert_eq!(
            registry.plugin_for_extension(".NDS").unwrap().platform(),
            Platform::Ds
        );
        assert_eq!(
            registry.plugin_for_extension("xcz").unwrap().platform(),
            Platform::Switch
        );
        assert!(registry.plugin_for_extension("iso").is_none());
    }

    #[test]
    fn extension_map_covers_all_extensions() {
        let map = registry().extension_map();
        assert_eq!(map.get("nes"), Some(&Platform::Nes));
        assert_eq!(map.get("cia"), Some(&Platform::N3ds));
        assert_eq!(map.get("mb"), Some(&Platform::Gba));
        assert!(!map.contains_key("zip"));
    }
}
