//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

use romid_lib::Platform;

#[derive(Parser)]
#[command(name = "romid")]
#[command(about = "Identify Nintendo ROMs and game packages", long_about = None)]
pub(crate) struct Cli {
    /// Directory holding the reference tables (overrides env and settings)
    #[arg(long, global = true)]
    pub tables: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Platform selection: a platform name or alias, or `auto` to pick by
/// file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum PlatformArg {
    #[default]
    Auto,
    Fixed(Platform),
}

impl PlatformArg {
    pub fn platform(self) -> Option<Platform> {
        match self {
            Self::Auto => None,
            Self::Fixed(p) => Some(p),
        }
    }
}

impl FromStr for PlatformArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse::<Platform>()
            .map(Self::Fixed)
            .map_err(|e| e.to_string())
    }
}

/// Platform selection shared by every command that reads ROM files.
#[derive(Args, Clone, Copy)]
pub(crate) struct PlatformFilter {
    /// Platform name or alias (e.g. nes, sfc, nds, 3ds, nx), or "auto"
    #[arg(short, long, default_value = "auto")]
    pub platform: PlatformArg,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Identify ROM files or ZIP archives
    Identify {
        /// Files to identify
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        filter: PlatformFilter,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,

        /// Never rewrite headers, even when a repaired header would match
        #[arg(long)]
        no_repair: bool,
    },

    /// Print the canonical game id of a file
    Id {
        path: PathBuf,

        #[command(flatten)]
        filter: PlatformFilter,
    },

    /// Print the content classification (base, update, dlc) of a file
    Classify {
        path: PathBuf,

        #[command(flatten)]
        filter: PlatformFilter,
    },

    /// Print the parsed header of a file, without table lookups
    Header {
        path: PathBuf,

        #[command(flatten)]
        filter: PlatformFilter,
    },

    /// List supported platforms
    List,

    /// Identify every candidate file below a directory
    Scan {
        dir: PathBuf,

        #[command(flatten)]
        filter: PlatformFilter,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,

        /// Never rewrite headers, even when a repaired header would match
        #[arg(long)]
        no_repair: bool,
    },

    /// Manage reference tables
    Tables {
        #[command(subcommand)]
        action: TablesAction,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum TablesAction {
    /// Import a Logiqx XML DAT into the tables directory
    Import {
        dat: PathBuf,

        /// Target platform (guessed from the DAT file name when omitted)
        #[arg(short, long)]
        platform: Option<Platform>,
    },

    /// Record a ROM's checksum under a custom name
    AddCustom {
        rom: PathBuf,

        name: String,

        /// Region stored with the entry
        #[arg(short, long)]
        region: Option<String>,

        /// Target platform (from the ROM's extension when omitted)
        #[arg(short, long)]
        platform: Option<Platform>,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the effective settings and where they come from
    Show,

    /// Print the settings file path
    Path,

    /// Store the tables directory in the settings file
    SetTables { dir: PathBuf },
}
