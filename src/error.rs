//! Error types for the media inventory engine

use thiserror::Error;

/// Error kinds that can occur while configuring or starting a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorKind {
    /// Required configuration is missing (media index, media kind, delivery queue)
    Configuration,
    /// Read access to the media index is not granted
    Authorization,
    /// I/O failure while querying a source
    Source,
}

impl ScanErrorKind {
    /// Get string representation of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanErrorKind::Configuration => "configuration",
            ScanErrorKind::Authorization => "authorization",
            ScanErrorKind::Source => "source",
        }
    }
}

/// Represents an error raised before or during a scan pass
#[derive(Debug, Clone, Error)]
#[error("{}: {message}", .kind.as_str())]
pub struct ScanError {
    /// The kind of error
    pub kind: ScanErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl ScanError {
    /// Create a new scan error
    pub fn new(kind: ScanErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ScanErrorKind::Configuration, message)
    }

    /// Create an authorization error
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ScanErrorKind::Authorization, message)
    }

    /// Create a source error
    pub fn source(message: impl Into<String>) -> Self {
        Self::new(ScanErrorKind::Source, message)
    }
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::PermissionDenied => ScanErrorKind::Authorization,
            _ => ScanErrorKind::Source,
        };
        Self::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScanError::configuration("media kind not set");
        assert_eq!(err.to_string(), "configuration: media kind not set");
        assert_eq!(err.kind, ScanErrorKind::Configuration);
    }

    #[test]
    fn test_io_error_mapping() {
        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ScanError = denied.into();
        assert_eq!(err.kind, ScanErrorKind::Authorization);

        let other = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ScanError = other.into();
        assert_eq!(err.kind, ScanErrorKind::Source);
    }
}
