// Error types shared by the collaborators and the refresh worker

use thiserror::Error;

/// Failure talking to the Android bridge (`adb`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("adb is not available")]
    Unavailable,

    #[error("failed to run {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("adb {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("apk not found: {0}")]
    ApkNotFound(String),
}

/// Failure enumerating processes on an instrumentation device.
///
/// The first three variants are the conditions the device layer can tell
/// apart; everything else lands in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumerateError {
    #[error("server not running")]
    ServerNotRunning,

    #[error("transport closed")]
    TransportClosed,

    #[error("timed out")]
    TimedOut,

    #[error("{0}")]
    Other(String),
}

/// A failed refresh run, already reduced to what the user gets to see.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("unable to connect to remote frida server: not started")]
    ServerNotRunning,

    #[error("unable to connect to remote frida server: closed")]
    TransportClosed,

    #[error("unable to connect to remote frida server: timedout")]
    TimedOut,

    #[error("{0}")]
    Bridge(String),

    #[error("something was wrong...")]
    Other,
}

impl From<EnumerateError> for RefreshError {
    fn from(err: EnumerateError) -> Self {
        match err {
            EnumerateError::ServerNotRunning => Self::ServerNotRunning,
            EnumerateError::TransportClosed => Self::TransportClosed,
            EnumerateError::TimedOut => Self::TimedOut,
            EnumerateError::Other(detail) => {
                tracing::debug!(%detail, "unclassified enumeration failure");
                Self::Other
            }
        }
    }
}

impl From<BridgeError> for RefreshError {
    fn from(err: BridgeError) -> Self {
        Self::Bridge(err.to_string())
    }
}
