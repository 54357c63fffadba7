//! File-level identification on top of the platform plugins.
//!
//! [`PluginRegistry`] maps platforms and extensions to plugins,
//! [`Identifier`] turns a path (plain file or ZIP) into an
//! [`IdentifiedEntry`], and [`scanner`] walks directories for candidates.

mod archive;
pub mod context;
pub mod entry;
pub mod error;
pub mod identify;
pub mod locks;
pub mod scanner;
pub mod settings;

pub use context::PluginRegistry;
pub use entry::IdentifiedEntry;
pub use error::IdentifyError;
pub use identify::Identifier;
pub use locks::PathLocks;

pub use romid_core::{AnalysisOptions, FileType, GamePlugin, Platform, RomInfo};
pub use romid_dat::TableProvider;
pub use romid_nintendo::{HeaderRecord, parse_header_record};
