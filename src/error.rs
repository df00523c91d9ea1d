//! Crate-level error type
//!
//! Only two error families are fatal for the process: configuration errors
//! at startup and device errors (nothing can be shown or read). Stream
//! errors stay inside their session and surface as status values, but the
//! variant exists so callers embedding the library can report them.

use crate::device::DeviceError;
use crate::feeds::ConfigError;
use crate::session::StreamError;

/// Top-level error for viewer construction and the run loop
#[derive(Debug)]
pub enum Error {
    /// Feed list or calibration profile is unusable (fatal at startup)
    Config(ConfigError),
    /// Display or touch device failure (fatal)
    Device(DeviceError),
    /// A stream-level failure escaped to the caller (embedding use only)
    Stream(StreamError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "configuration error: {}", e),
            Error::Device(e) => write!(f, "device error: {}", e),
            Error::Stream(e) => write!(f, "stream error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            Error::Device(e) => Some(e),
            Error::Stream(e) => Some(e),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DeviceError> for Error {
    fn from(e: DeviceError) -> Self {
        Error::Device(e)
    }
}

impl From<StreamError> for Error {
    fn from(e: StreamError) -> Self {
        Error::Stream(e)
    }
}
