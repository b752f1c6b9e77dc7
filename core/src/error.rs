use thiserror::Error;

/// Result type for radnorm operations
pub type Result<T> = std::result::Result<T, RadnormError>;

/// Error types for radnorm operations
#[derive(Error, Debug)]
pub enum RadnormError {
    /// DICOM reading error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// Invalid tag value
    #[error("Invalid tag value: {0}")]
    InvalidValue(String),

    /// Generic extraction error
    #[error("Extraction error: {0}")]
    ExtractionError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

// Helper conversions
impl From<String> for RadnormError {
    fn from(s: String) -> Self {
        RadnormError::ExtractionError(s)
    }
}

impl From<&str> for RadnormError {
    fn from(s: &str) -> Self {
        RadnormError::ExtractionError(s.to_string())
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for RadnormError {
    fn from(e: dicom_object::ReadError) -> Self {
        RadnormError::DicomError(format!("{}", e))
    }
}

impl From<dicom_core::value::ConvertValueError> for RadnormError {
    fn from(e: dicom_core::value::ConvertValueError) -> Self {
        RadnormError::InvalidValue(format!("{}", e))
    }
}
