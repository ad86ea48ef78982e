//! Extraction error types
//!
//! Only problems that stop a run before it starts are errors. Short reads
//! and rejected edges are tolerated and show up in
//! [`ExtractionStats`](crate::ExtractionStats) instead.

use std::fmt;
use std::io;

use crate::settings::SettingsError;

/// Error type for extraction operations
#[derive(Debug)]
pub enum ExtractError {
    /// IO error (volume file not found, permission denied, etc.)
    Io(io::Error),
    /// The extraction settings cannot produce a scan
    InvalidSettings(SettingsError),
    /// A dense volume got the wrong number of samples
    VolumeSize { expected: usize, got: usize },
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::Io(err) => write!(f, "Volume IO error: {}", err),
            ExtractError::InvalidSettings(err) => write!(f, "Invalid settings: {}", err),
            ExtractError::VolumeSize { expected, got } => {
                write!(f, "Volume has {} samples, expected {}", got, expected)
            }
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractError::Io(err) => Some(err),
            ExtractError::InvalidSettings(err) => Some(err),
            ExtractError::VolumeSize { .. } => None,
        }
    }
}

impl From<io::Error> for ExtractError {
    fn from(err: io::Error) -> Self {
        ExtractError::Io(err)
    }
}

impl From<SettingsError> for ExtractError {
    fn from(err: SettingsError) -> Self {
        ExtractError::InvalidSettings(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "tsdf.bin missing");
        let err = ExtractError::Io(io_err);
        let msg = format!("{}", err);
        assert!(msg.contains("IO error"));
        assert!(msg.contains("tsdf.bin missing"));
    }

    #[test]
    fn test_settings_error_display() {
        let err = ExtractError::InvalidSettings(SettingsError::ZeroStride);
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid settings"));
        assert!(msg.contains("Stride must be positive"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: ExtractError = io_err.into();
        match err {
            ExtractError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn test_from_settings_error() {
        let err: ExtractError = SettingsError::ZeroDimension.into();
        assert!(matches!(
            err,
            ExtractError::InvalidSettings(SettingsError::ZeroDimension)
        ));
    }

    #[test]
    fn test_error_source() {
        use std::error::Error;

        let io_err = ExtractError::Io(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(io_err.source().is_some());

        let settings_err = ExtractError::InvalidSettings(SettingsError::ZeroStride);
        assert!(settings_err.source().is_some());

        let size_err = ExtractError::VolumeSize {
            expected: 64,
            got: 60,
        };
        assert!(size_err.source().is_none());
    }

    #[test]
    fn test_volume_size_display() {
        let err = ExtractError::VolumeSize {
            expected: 64,
            got: 60,
        };
        assert_eq!(format!("{}", err), "Volume has 60 samples, expected 64");
    }
}
