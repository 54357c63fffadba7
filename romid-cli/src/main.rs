//! romid CLI
//!
//! Command-line interface for identifying Nintendo ROMs and game packages.

mod cli_types;
mod commands;
mod error;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use romid_lib::settings::resolve_tables_root;
use romid_lib::{AnalysisOptions, Identifier, PluginRegistry, TableProvider};

use cli_types::{Cli, Commands, ConfigAction, TablesAction};
use error::CliError;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "error:".if_supports_color(Stderr, |t| t.red()), e);
        std::process::exit(1);
    }
}

/// `info` by default, `-v` for debug with targets, `-q` for warnings only.
/// `RUST_LOG` overrides the level.
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if !verbose {
        builder.format(|buf, record| match record.level() {
            log::Level::Error | log::Level::Warn => {
                writeln!(buf, "{}: {}", record.level().as_str().to_lowercase(), record.args())
            }
            _ => writeln!(buf, "{}", record.args()),
        });
    }
    builder.init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let tables_override = cli.tables;
    match cli.command {
        Commands::Identify {
            paths,
            filter,
            json,
            no_repair,
        } => {
            let identifier = create_identifier(tables_override, !no_repair);
            commands::identify::run_identify(&identifier, &paths, filter.platform.platform(), json)
        }
        Commands::Id { path, filter } => {
            let identifier = create_identifier(tables_override, false);
            commands::identify::run_id(&identifier, &path, filter.platform.platform())
        }
        Commands::Classify { path, filter } => {
            let identifier = create_identifier(tables_override, false);
            commands::identify::run_classify(&identifier, &path, filter.platform.platform())
        }
        Commands::Header { path, filter } => {
            let identifier = create_identifier(tables_override, false);
            commands::header::run_header(&identifier, &path, filter.platform.platform())
        }
        Commands::List => {
            let identifier = create_identifier(tables_override, false);
            commands::list::run_list(identifier.registry());
            Ok(())
        }
        Commands::Scan {
            dir,
            filter,
            json,
            no_repair,
        } => {
            let identifier = create_identifier(tables_override, !no_repair);
            commands::scan::run_scan(&identifier, &dir, filter.platform.platform(), json)
        }
        Commands::Tables { action } => match action {
            TablesAction::Import { dat, platform } => {
                commands::tables::run_import(tables_override, &dat, platform)
            }
            TablesAction::AddCustom {
                rom,
                name,
                region,
                platform,
            } => commands::tables::run_add_custom(
                tables_override,
                &rom,
                &name,
                region.as_deref(),
                platform,
            ),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                commands::config::run_config_show(tables_override);
                Ok(())
            }
            ConfigAction::Path => {
                commands::config::run_config_path();
                Ok(())
            }
            ConfigAction::SetTables { dir } => commands::config::run_config_set_tables(&dir),
        },
    }
}

/// Build an identifier with every platform registered, reading tables from
/// the resolved tables directory.
fn create_identifier(tables_override: Option<PathBuf>, allow_repair: bool) -> Identifier {
    let provider = match resolve_tables_root(tables_override) {
        Some(root) => {
            log::debug!("Tables directory: {}", root.display());
            TableProvider::new(root)
        }
        None => {
            log::debug!("No tables directory; identifying from headers only");
            TableProvider::empty()
        }
    };
    let registry = PluginRegistry::with_defaults(Arc::new(provider));
    Identifier::new(registry).with_options(AnalysisOptions::new().allow_repair(allow_repair))
}
