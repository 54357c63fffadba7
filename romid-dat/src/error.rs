/// Errors from reference-table loading and DAT import.
#[derive(Debug, thiserror::Error)]
pub enum DatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Invalid DAT file: {0}")]
    InvalidDat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot determine platform for '{0}'")]
    UnknownPlatform(String),

    #[error("Table error: {0}")]
    Table(String),
}

impl DatError {
    pub fn invalid_dat(msg: impl Into<String>) -> Self {
        Self::InvalidDat(msg.into())
    }

    pub fn table(msg: impl Into<String>) -> Self {
        Self::Table(msg.into())
    }
}
