//! Service configuration.

use crate::error::{OverrideError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default override file used by Pi-hole.
pub const DEFAULT_RECORDS_PATH: &str = "/etc/pihole/custom.list";

/// Default single-slot backup location.
pub const DEFAULT_BACKUP_PATH: &str = "/etc/pihole/custom.list.old";

/// Default resolver reload command.
pub const DEFAULT_RELOAD_COMMAND: &str = "pihole restartdns";

/// Default listen port for transports built on this crate.
pub const DEFAULT_PORT: u16 = 3000;

/// Default bound on a single reload invocation.
pub const DEFAULT_RELOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable configuration, built once at startup and passed by reference.
///
/// # Example
///
/// ```
/// use dns_overrides::OverrideConfig;
///
/// let config = OverrideConfig::new("/tmp/custom.list", "/tmp/custom.list.old")
///     .with_reload_command("systemctl reload dnsmasq")
///     .with_api_key("s3cret");
///
/// assert_eq!(config.reload_command, "systemctl reload dnsmasq");
/// assert_eq!(config.api_key.as_deref(), Some("s3cret"));
/// ```
#[derive(Debug, Clone)]
pub struct OverrideConfig {
    /// Override file consumed by the resolver.
    pub records_path: PathBuf,

    /// Backup slot, overwritten before every add.
    pub backup_path: PathBuf,

    /// Shell command that makes the resolver re-read the override file.
    pub reload_command: String,

    /// Upper bound on a reload run; expiry counts as a reload failure.
    pub reload_timeout: Duration,

    /// Listen port for the transport layer.
    pub port: u16,

    /// Key required on every non-health request. `None` disables the check.
    pub api_key: Option<String>,

    /// Hides error source chains from callers when set.
    pub production: bool,
}

impl OverrideConfig {
    /// Creates a config for the given file pair with default reload settings.
    #[must_use]
    pub fn new(records_path: impl Into<PathBuf>, backup_path: impl Into<PathBuf>) -> Self {
        Self {
            records_path: records_path.into(),
            backup_path: backup_path.into(),
            reload_command: DEFAULT_RELOAD_COMMAND.to_string(),
            reload_timeout: DEFAULT_RELOAD_TIMEOUT,
            port: DEFAULT_PORT,
            api_key: None,
            production: false,
        }
    }

    /// Loads configuration from the process environment.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `DNS_FILE_PATH` | `records_path` |
    /// | `DNS_FILE_BACKUP_PATH` | `backup_path` |
    /// | `PIHOLE_RESTART_CMD` | `reload_command` |
    /// | `RELOAD_TIMEOUT_SECS` | `reload_timeout` |
    /// | `PORT` | `port` |
    /// | `API_KEY` | `api_key` (empty means none) |
    /// | `APP_ENV` | `production` when equal to `production` |
    ///
    /// Unset or unparsable values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            records_path: non_empty("DNS_FILE_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_RECORDS_PATH), PathBuf::from),
            backup_path: non_empty("DNS_FILE_BACKUP_PATH")
                .map_or_else(|| PathBuf::from(DEFAULT_BACKUP_PATH), PathBuf::from),
            reload_command: non_empty("PIHOLE_RESTART_CMD")
                .unwrap_or_else(|| DEFAULT_RELOAD_COMMAND.to_string()),
            reload_timeout: non_empty("RELOAD_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map_or(DEFAULT_RELOAD_TIMEOUT, Duration::from_secs),
            port: non_empty("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            api_key: non_empty("API_KEY"),
            production: lookup("APP_ENV").is_some_and(|v| v == "production"),
        }
    }

    /// Overrides the reload command.
    #[must_use]
    pub fn with_reload_command(mut self, command: impl Into<String>) -> Self {
        self.reload_command = command.into();
        self
    }

    /// Overrides the reload timeout.
    #[must_use]
    pub const fn with_reload_timeout(mut self, timeout: Duration) -> Self {
        self.reload_timeout = timeout;
        self
    }

    /// Overrides the listen port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Requires `key` on mutation and list requests.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into()).filter(|k: &String| !k.is_empty());
        self
    }

    /// Toggles production mode.
    #[must_use]
    pub const fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    /// Checks internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`OverrideError::InvalidConfig`] for an empty reload command, a
    /// zero timeout, or a backup path equal to the records path.
    pub fn validate(&self) -> Result<()> {
        if self.reload_command.trim().is_empty() {
            return Err(OverrideError::InvalidConfig(
                "reload command must not be empty".into(),
            ));
        }
        if self.reload_timeout.is_zero() {
            return Err(OverrideError::InvalidConfig(
                "reload timeout must be positive".into(),
            ));
        }
        if self.records_path == self.backup_path {
            return Err(OverrideError::InvalidConfig(format!(
                "backup path must differ from records path ({})",
                self.records_path.display()
            )));
        }
        Ok(())
    }
}

impl Default for OverrideConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RECORDS_PATH, DEFAULT_BACKUP_PATH)
    }
}
