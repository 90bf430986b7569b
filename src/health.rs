//! Health report types.

use std::path::PathBuf;
use std::time::Duration;

/// Overall service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Every check passed.
    Ok,
    /// At least one check failed; mutations may still be attempted.
    Degraded,
}

impl HealthStatus {
    /// Lowercase name as reported to callers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Degraded => "degraded",
        }
    }
}

/// State of the override file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCheck {
    /// Override file path.
    pub path: PathBuf,
    /// Record count when the file is accessible, otherwise the reason it is not.
    pub result: Result<usize, String>,
}

impl FileCheck {
    /// Returns `true` if the file is readable and writable.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Availability of the reload tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverCheck {
    /// The configured reload command.
    pub command: String,
    /// Whether its program was found.
    pub available: bool,
}

/// Snapshot returned by [`OverrideService::health`](crate::OverrideService::health).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    /// `Degraded` if either check failed.
    pub status: HealthStatus,
    /// Override file check.
    pub records: FileCheck,
    /// Reload tool check.
    pub resolver: ResolverCheck,
    /// Time since the service was constructed.
    pub uptime: Duration,
}

impl HealthReport {
    /// Combines the individual checks.
    #[must_use]
    pub fn new(records: FileCheck, resolver: ResolverCheck, uptime: Duration) -> Self {
        let status = if records.is_ok() && resolver.available {
            HealthStatus::Ok
        } else {
            HealthStatus::Degraded
        };
        Self {
            status,
            records,
            resolver,
            uptime,
        }
    }

    /// Returns `true` when every check passed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(result: Result<usize, String>) -> FileCheck {
        FileCheck {
            path: "/etc/pihole/custom.list".into(),
            result,
        }
    }

    fn resolver(available: bool) -> ResolverCheck {
        ResolverCheck {
            command: "pihole restartdns".into(),
            available,
        }
    }

    #[test]
    fn any_failed_check_degrades() {
        let up = Duration::from_secs(1);
        assert!(HealthReport::new(file(Ok(3)), resolver(true), up).is_ok());
        assert_eq!(
            HealthReport::new(file(Err("file not accessible".into())), resolver(true), up).status,
            HealthStatus::Degraded
        );
        assert_eq!(
            HealthReport::new(file(Ok(0)), resolver(false), up).status.as_str(),
            "degraded"
        );
    }
}
