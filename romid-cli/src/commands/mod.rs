pub(crate) mod config;
pub(crate) mod header;
pub(crate) mod identify;
pub(crate) mod list;
pub(crate) mod scan;
pub(crate) mod tables;
