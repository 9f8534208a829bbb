/// Errors that can occur while rendering a workbook to HTML.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no sheets to convert")]
    NoSheets,

    #[error("failed to read source package")]
    ZipError(#[from] zip::result::ZipError),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("malformed computed-value table: {reason}")]
    MalformedValues { reason: String },
}
