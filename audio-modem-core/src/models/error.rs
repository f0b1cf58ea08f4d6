use thiserror::Error;

/// Errors that can occur while bridging payloads through audio.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModemError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("device not available")]
    DeviceNotAvailable,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("bridge is not ready")]
    NotReady,

    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    #[error("invalid profile document: {0}")]
    ProfileParse(String),

    #[error("profile fetch failed: {0}")]
    ProfileFetch(String),

    #[error("codec failed: {0}")]
    CodecFailed(String),

    #[error("stream failed: {0}")]
    StreamFailed(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}
