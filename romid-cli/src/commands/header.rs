use std::path::Path;

use romid_lib::{HeaderRecord, Identifier, IdentifyError, Platform, parse_header_record};

use crate::error::CliError;

/// Print the parsed header of a file. No reference tables are consulted.
pub(crate) fn run_header(
    identifier: &Identifier,
    path: &Path,
    platform: Option<Platform>,
) -> Result<(), CliError> {
    match read_header_record(identifier, path, platform)? {
        Some(record) => {
            log::debug!("{}: {} header", path.display(), record.platform().short_name());
            println!("{:#?}", record);
            Ok(())
        }
        None => Err(CliError::other(format!(
            "{}: header not recognized",
            path.display()
        ))),
    }
}

/// The header record for `path`, parsed as the selected (or extension-detected)
/// platform.
pub(crate) fn read_header_record(
    identifier: &Identifier,
    path: &Path,
    platform: Option<Platform>,
) -> Result<Option<HeaderRecord>, CliError> {
    let plugin = identifier
        .plugin_for(path, platform)?
        .ok_or_else(|| CliError::unknown_platform(path.display().to_string()))?;
    let record = parse_header_record(plugin.platform(), path).map_err(IdentifyError::from)?;
    Ok(record)
}
