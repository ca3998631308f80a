use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by ingestion functions.
///
/// Errors from the byte source and from the tokenizer/decoder are carried unchanged; nothing is
/// retried or recovered locally.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The file's bytes could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// The spreadsheet decoder rejected the workbook (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// The delimited-text tokenizer rejected the input.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The decoder produced a workbook without any sheet.
    #[error("workbook has no sheets")]
    NoSheets,

    /// A tokenizer option cannot be used as given.
    #[error("invalid options: {message}")]
    InvalidOptions { message: String },

    /// The selected format is not compiled in.
    #[error("format unavailable: {message}")]
    FormatUnavailable { message: String },
}

/// Broad classification of an [`IngestionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reading the source bytes failed.
    Read,
    /// The tokenizer or decoder failed.
    Parse,
    /// The caller's options or build configuration are unusable.
    Config,
}

impl IngestionError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestionError::Io(_) => ErrorKind::Read,
            IngestionError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => ErrorKind::Read,
                _ => ErrorKind::Parse,
            },
            #[cfg(feature = "excel")]
            IngestionError::Excel(calamine::Error::Io(_)) => ErrorKind::Read,
            #[cfg(feature = "excel")]
            IngestionError::Excel(_) => ErrorKind::Parse,
            IngestionError::NoSheets => ErrorKind::Parse,
            IngestionError::InvalidOptions { .. } | IngestionError::FormatUnavailable { .. } => {
                ErrorKind::Config
            }
        }
    }
}
