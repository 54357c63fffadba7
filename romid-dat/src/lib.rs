pub mod dat;
pub mod error;
pub mod import;
pub mod provider;
pub mod table;

pub use dat::{DatFile, DatGame, DatRom};
pub use error::DatError;
pub use provider::TableProvider;
pub use table::{CustomEntry, DisplayNames, PlatformTables, ReferenceEntry, ReferenceTable};
