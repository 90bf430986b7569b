//! Error types.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result alias for override operations.
pub type Result<T> = std::result::Result<T, OverrideError>;

/// Errors returned by override operations.
#[derive(Debug, Error)]
pub enum OverrideError {
    /// Caller input failed validation. Never retried.
    #[error("{0}")]
    Validation(String),

    /// The record is already present in the override file.
    #[error("record already present: {record}")]
    Conflict {
        /// The conflicting record, rendered as `address name`.
        record: String,
    },

    /// The record targeted by a delete is absent.
    #[error("record not found: {record}")]
    NotFound {
        /// The missing record, rendered as `address name`.
        record: String,
    },

    /// Reading, writing or copying the override file or backup failed.
    #[error("cannot access {}", path.display())]
    FileAccess {
        /// The file involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A restore was requested but the backup slot is empty.
    #[error("no backup available at {}", path.display())]
    NoBackup {
        /// The expected backup location.
        path: PathBuf,
    },

    /// The resolver reload command failed.
    #[error(transparent)]
    Reload(#[from] ReloadError),

    /// The API key gate rejected the request.
    #[error("unauthorized: {0}")]
    Unauthorized(AuthFailure),

    /// Invalid configuration values.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Why the resolver reload command did not succeed.
#[derive(Debug, Error)]
pub enum ReloadError {
    /// The shell could not be spawned.
    #[error("failed to spawn resolver reload `{command}`")]
    Spawn {
        /// The configured command string.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Waiting for the child failed.
    #[error("failed to wait for resolver reload `{command}`")]
    Wait {
        /// The configured command string.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The command exited unsuccessfully.
    #[error("resolver reload `{command}` failed ({status}): {output}")]
    Failed {
        /// The configured command string.
        command: String,
        /// Exit status description (`exit status: 1`, `signal: 9`, ...).
        status: String,
        /// Captured stderr, or stdout when stderr was empty.
        output: String,
    },

    /// The command did not finish in time and was killed.
    #[error("resolver reload `{command}` timed out after {timeout:?}")]
    TimedOut {
        /// The configured command string.
        command: String,
        /// The configured bound.
        timeout: Duration,
    },
}

/// Reason the API key gate rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// No key was presented.
    #[error("API key required")]
    Missing,
    /// A key was presented but did not match.
    #[error("invalid API key")]
    Invalid,
}

/// Stable, machine-checkable classification of an [`OverrideError`].
///
/// Transports map these onto their own status codes (400, 409, 404, 500, 401).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input shape or syntax.
    Validation,
    /// Add of an existing record.
    Conflict,
    /// Delete of an absent record.
    NotFound,
    /// File access, reload or configuration failure.
    Internal,
    /// Rejected by the API key gate.
    Unauthorized,
}

impl OverrideError {
    /// Returns the stable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::FileAccess { .. }
            | Self::NoBackup { .. }
            | Self::Reload(_)
            | Self::InvalidConfig(_) => ErrorKind::Internal,
        }
    }

    /// Returns `true` if the underlying I/O error is `PermissionDenied`.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            Self::FileAccess { source, .. } if source.kind() == std::io::ErrorKind::PermissionDenied
        )
    }

    /// Renders the error for a caller.
    ///
    /// With `verbose`, the full `source()` chain is appended. Production
    /// deployments pass `false` so internal detail stays in the logs.
    #[must_use]
    pub fn report(&self, verbose: bool) -> String {
        let mut out = self.to_string();
        if verbose {
            let mut cause = std::error::Error::source(self);
            while let Some(err) = cause {
                let _ = write!(out, "\n  caused by: {err}");
                cause = std::error::Error::source(err);
            }
        }
        out
    }

    pub(crate) fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }
}
