//! Error handling for the iqflow library
//!
//! This module provides a unified error type for all operations in the
//! pipeline: configuration validation, sample source I/O, and numeric
//! failures during demodulation.

use std::fmt;
use std::io;

/// A specialized Result type for iqflow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for iqflow operations
#[derive(Debug)]
pub enum Error {
    /// Invalid acquisition configuration, detected before the loop starts
    Config(String),

    /// Sample source open or read failure
    Device(String),

    /// Non-finite values produced during filtering or demodulation
    Computation(String),

    /// I/O error (file-based sample sources)
    Io(io::Error),

    /// RTL-SDR specific error (requires "rtlsdr" feature)
    #[cfg(feature = "rtlsdr")]
    RtlSdr(rtl_sdr_rs::error::RtlsdrError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Device(msg) => write!(f, "Device error: {}", msg),
            Error::Computation(msg) => write!(f, "Computation error: {}", msg),
            Error::Io(err) => write!(f, "I/O error: {}", err),
            #[cfg(feature = "rtlsdr")]
            Error::RtlSdr(err) => write!(f, "RTL-SDR error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

// From conversions for common error types

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

#[cfg(feature = "rtlsdr")]
impl From<rtl_sdr_rs::error::RtlsdrError> for Error {
    fn from(err: rtl_sdr_rs::error::RtlsdrError) -> Self {
        Error::RtlSdr(err)
    }
}

// Helper constructors for common error scenarios

impl Error {
    /// Create a configuration error with a custom message
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a device error with a custom message
    pub fn device<S: Into<String>>(msg: S) -> Self {
        Error::Device(msg.into())
    }

    /// Create a computation error with a custom message
    pub fn computation<S: Into<String>>(msg: S) -> Self {
        Error::Computation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_config_error_constructor() {
        let err = Error::config("cutoff above Nyquist");
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_device_error_constructor() {
        let err = Error::device("read failed");
        assert!(matches!(err, Error::Device(_)));
        assert!(err.to_string().contains("Device error"));
    }

    #[test]
    fn test_computation_error_constructor() {
        let err = Error::computation("non-finite samples");
        assert!(matches!(err, Error::Computation(_)));
        assert!(err.to_string().contains("Computation error"));
    }

    #[test]
    fn test_error_display() {
        let err = Error::Device("no dongle attached".to_string());
        assert_eq!(err.to_string(), "Device error: no dongle attached");
    }

    #[test]
    fn test_error_source() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.source().is_some());
        assert!(Error::device("x").source().is_none());
    }
}
