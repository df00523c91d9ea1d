//! Feed configuration error types

/// Error type for feed list and calibration loading
#[derive(Debug)]
pub enum ConfigError {
    /// The feed list is empty or missing
    NoFeeds,
    /// A feed entry has an unusable stream URL
    InvalidUrl {
        /// Index of the offending entry
        index: usize,
        /// Feed label, for the diagnostic
        name: String,
    },
    /// Configuration file could not be read
    Io(std::io::Error),
    /// Configuration file could not be parsed
    Parse(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoFeeds => write!(f, "no feeds configured"),
            ConfigError::InvalidUrl { index, name } => {
                write!(f, "feed {} ({:?}) has no usable stream url", index, name)
            }
            ConfigError::Io(e) => write!(f, "failed to read configuration: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}
