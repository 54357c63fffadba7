use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use romid_lib::PluginRegistry;

pub(crate) fn run_list(registry: &PluginRegistry) {
    log::info!("Supported platforms:");
    log::info!("");

    for plugin in registry.plugins() {
        let ids = plugin.scraper_ids();
        log::info!(
            "  {} [{}]",
            plugin.short_name().if_supports_color(Stdout, |t| t.bold()),
            plugin.display_name().if_supports_color(Stdout, |t| t.cyan()),
        );
        log::info!("    Extensions: {}", plugin.list_extensions().join(", "));
        log::info!("    Aliases: {}", plugin.platform().aliases().join(", "));
        log::info!(
            "    Scraper ids: igdb {}, screenscraper {}",
            ids.igdb,
            ids.screenscraper
        );
    }
}
