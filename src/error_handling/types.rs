use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    MissingTarget,
    BadUrl(String),
    EmptySelectors(String),
    EmptyProgram,
    EmptyEndpoints,
    NotInRange(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::MissingTarget => write!(f, "No target URL configured"),
            ConfigError::BadUrl(e) => write!(f, "Target URL error: {}", e),
            ConfigError::EmptySelectors(e) => write!(f, "No selectors configured for field: {}", e),
            ConfigError::EmptyProgram => write!(f, "Rotation program name is empty"),
            ConfigError::EmptyEndpoints => write!(f, "No egress lookup endpoints configured"),
            ConfigError::NotInRange(e) => write!(f, "Value out of range: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

#[derive(Debug)]
pub enum RotationError {
    SpawnFailed(String),
    Timeout { program: String, secs: u64 },
    NonZeroExit { code: Option<i32>, stderr: String },
    IoError(std::io::Error),
}

impl fmt::Display for RotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationError::SpawnFailed(e) => write!(f, "Failed to spawn identity command: {}", e),
            RotationError::Timeout { program, secs } => {
                write!(f, "Identity command `{}` timed out after {}s", program, secs)
            }
            RotationError::NonZeroExit { code, stderr } => match code {
                Some(code) => write!(f, "Identity command exited with {}: {}", code, stderr),
                None => write!(f, "Identity command terminated by signal: {}", stderr),
            },
            RotationError::IoError(e) => write!(f, "Identity command IO error: {}", e),
        }
    }
}

impl std::error::Error for RotationError {}

impl From<std::io::Error> for RotationError {
    fn from(err: std::io::Error) -> Self {
        RotationError::IoError(err)
    }
}

#[derive(Debug)]
pub enum SessionError {
    AlreadyOpen(uuid::Uuid),
    StorageSetupFailed(String),
    LaunchFailed(String),
    LaunchTimeout(u64),
    NavigationFailed(String),
    ScriptFailed(String),
    CaptureFailed(String),
    TerminateFailed(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AlreadyOpen(id) => write!(f, "Session {} is still open", id),
            SessionError::StorageSetupFailed(e) => write!(f, "Session storage setup failed: {}", e),
            SessionError::LaunchFailed(e) => write!(f, "Browser launch failed: {}", e),
            SessionError::LaunchTimeout(secs) => write!(f, "Browser launch timed out after {}s", secs),
            SessionError::NavigationFailed(e) => write!(f, "Navigation failed: {}", e),
            SessionError::ScriptFailed(e) => write!(f, "Script execution failed: {}", e),
            SessionError::CaptureFailed(e) => write!(f, "Screenshot capture failed: {}", e),
            SessionError::TerminateFailed(e) => write!(f, "Browser termination failed: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

/// Failures raised by a rendered document while looking up or acting on elements.
#[derive(Debug)]
pub enum DocumentError {
    Query(String),
    Interaction(String),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Query(e) => write!(f, "Element query failed: {}", e),
            DocumentError::Interaction(e) => write!(f, "Element interaction failed: {}", e),
        }
    }
}

impl std::error::Error for DocumentError {}

#[derive(Debug)]
pub enum StorageError {
    WriteFailed(String),
    SerializationFailed(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::WriteFailed(e) => write!(f, "Storage write failed: {}", e),
            StorageError::SerializationFailed(e) => write!(f, "Storage serialization failed: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<csv::Error> for StorageError {
    fn from(err: csv::Error) -> Self {
        StorageError::SerializationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationFailed(err.to_string())
    }
}

#[derive(Debug)]
pub enum ControllerError {
    RotationUnavailable,
    StorageError(StorageError),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::RotationUnavailable => {
                write!(f, "Identity rotation unavailable: the identity source listed nothing")
            }
            ControllerError::StorageError(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<StorageError> for ControllerError {
    fn from(err: StorageError) -> Self {
        ControllerError::StorageError(err)
    }
}
