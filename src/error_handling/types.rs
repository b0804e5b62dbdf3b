use std::fmt;

/// Top-level error reported through the session-start completion callback.
///
/// Every failure of the pipeline is converted to exactly one of these
/// variants. None of them are fatal; the next lifecycle-triggered
/// initiation proceeds independently.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionsError {
    /// No subscriber declared itself as a dependency before the first
    /// session attempt. Settings and the event backend are never touched.
    NoDependencies,
    /// The effective `sessions_enabled` setting is false.
    DisabledViaSettings,
    /// The session was not selected by sampling.
    SessionSampling,
    /// Every registered subscriber has data collection disabled.
    DataCollection,
    /// The installation identity could not be resolved; the event never
    /// reached the logger.
    SessionInstallations(InstallationsError),
    /// The event logger reported failure after the event was submitted.
    DataTransport(TransportError),
}

impl fmt::Display for SessionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionsError::NoDependencies => write!(f, "No dependencies registered"),
            SessionsError::DisabledViaSettings => write!(f, "Sessions disabled via settings"),
            SessionsError::SessionSampling => write!(f, "Session sampled out"),
            SessionsError::DataCollection => {
                write!(f, "Data collection disabled for all subscribers")
            }
            SessionsError::SessionInstallations(e) => write!(f, "Installations error: {}", e),
            SessionsError::DataTransport(e) => write!(f, "Data transport error: {}", e),
        }
    }
}

impl std::error::Error for SessionsError {}

#[derive(Debug, Clone, PartialEq)]
pub enum InstallationsError {
    Unavailable(String),
    TimedOut,
}

impl fmt::Display for InstallationsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallationsError::Unavailable(e) => write!(f, "Installation ID unavailable: {}", e),
            InstallationsError::TimedOut => write!(f, "Installation ID lookup timed out"),
        }
    }
}

impl std::error::Error for InstallationsError {}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    LoggingFailed(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::LoggingFailed(e) => write!(f, "Event logging failed: {}", e),
        }
    }
}

impl std::error::Error for TransportError {}

/// Failure while fetching or parsing remote settings. Never surfaced through
/// the completion callback; a failed fetch simply leaves the cache untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    FetchFailed(String),
    InvalidPayload(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::FetchFailed(e) => write!(f, "Settings fetch failed: {}", e),
            SettingsError::InvalidPayload(e) => write!(f, "Settings payload invalid: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

#[derive(Debug)]
pub enum CacheError {
    IoError(std::io::Error),
    CorruptStore(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::IoError(e) => write!(f, "Cache IO error: {}", e),
            CacheError::CorruptStore(e) => write!(f, "Cache store corrupt: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::IoError(err)
    }
}
