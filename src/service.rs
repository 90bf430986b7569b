//! Externally visible operations: list, add, delete, reset, health.
//!
//! Each mutation runs validate → store → reload to completion. A reload
//! failure after a successful write is reported as an error but the write
//! is not rolled back.

use crate::auth::ApiKeyGate;
use crate::config::OverrideConfig;
use crate::error::{OverrideError, Result};
use crate::health::{FileCheck, HealthReport, ResolverCheck};
use crate::record::Record;
use crate::reload::{ReloadOutput, ResolverReloader};
use crate::store::RecordStore;
use crate::validate::{RecordInput, validate_record_input};
use std::time::Instant;

/// Composes validation, the record store and the resolver reload.
///
/// Holds no state between calls beyond its configuration and start time.
///
/// # Example
///
/// ```rust,ignore
/// use dns_overrides::{OverrideConfig, OverrideService, RecordInput};
///
/// let service = OverrideService::new(&OverrideConfig::from_env())?;
/// service.add(&RecordInput::new("192.168.1.2", "nas.home.lab"))?;
/// for record in service.list()? {
///     println!("{record}");
/// }
/// ```
#[derive(Debug)]
pub struct OverrideService {
    store: RecordStore,
    reloader: ResolverReloader,
    gate: ApiKeyGate,
    production: bool,
    started: Instant,
}

impl OverrideService {
    /// Builds the service from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`OverrideError::InvalidConfig`] if `config` is inconsistent.
    pub fn new(config: &OverrideConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            records = %config.records_path.display(),
            backup = %config.backup_path.display(),
            reload = %config.reload_command,
            auth = config.api_key.is_some(),
            "Override service configured"
        );
        Ok(Self {
            store: RecordStore::from_config(config),
            reloader: ResolverReloader::from_config(config),
            gate: ApiKeyGate::from_config(config),
            production: config.production,
            started: Instant::now(),
        })
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Applies the API key gate. Transports call this before every
    /// operation except [`health`](Self::health).
    ///
    /// # Errors
    ///
    /// Returns [`OverrideError::Unauthorized`] on a missing or wrong key.
    pub fn authorize(&self, header: Option<&str>, query: Option<&str>) -> Result<()> {
        self.gate.check(header, query)
    }

    /// Renders `err` for a caller, with source detail outside production.
    #[must_use]
    pub fn describe_error(&self, err: &OverrideError) -> String {
        err.report(!self.production)
    }

    /// Returns every record in file order.
    ///
    /// # Errors
    ///
    /// Returns [`OverrideError::FileAccess`] if the file cannot be read.
    pub fn list(&self) -> Result<Vec<Record>> {
        self.store.read_records()
    }

    /// Adds a record and reloads the resolver.
    ///
    /// # Errors
    ///
    /// - [`OverrideError::Validation`] for bad input.
    /// - [`OverrideError::Conflict`] if the record is already present.
    /// - [`OverrideError::FileAccess`] if the backup or append fails.
    /// - [`OverrideError::Reload`] if the reload fails; the record stays written.
    pub fn add(&self, input: &RecordInput) -> Result<ReloadOutput> {
        let record = validate_record_input(input)?;
        if self.store.record_exists(record.address(), record.name()) {
            tracing::debug!(record = %record, "Add rejected, record already present");
            return Err(OverrideError::Conflict {
                record: record.to_string(),
            });
        }
        self.store.add_record(record.address(), record.name())?;
        self.reload()
    }

    /// Deletes a record and reloads the resolver.
    ///
    /// # Errors
    ///
    /// - [`OverrideError::Validation`] for bad input.
    /// - [`OverrideError::NotFound`] if the record is absent.
    /// - [`OverrideError::FileAccess`] if the rewrite fails.
    /// - [`OverrideError::Reload`] if the reload fails; the delete stays written.
    pub fn delete(&self, input: &RecordInput) -> Result<ReloadOutput> {
        let record = validate_record_input(input)?;
        if !self.store.record_exists(record.address(), record.name()) {
            tracing::debug!(record = %record, "Delete rejected, record not found");
            return Err(OverrideError::NotFound {
                record: record.to_string(),
            });
        }
        self.store.delete_record(record.address(), record.name())?;
        self.reload()
    }

    /// Restores the backup slot and reloads the resolver.
    ///
    /// # Errors
    ///
    /// Returns [`OverrideError::NoBackup`] or [`OverrideError::FileAccess`]
    /// if the restore fails, or [`OverrideError::Reload`] if the reload fails.
    pub fn reset(&self) -> Result<ReloadOutput> {
        self.store.restore_from_backup()?;
        self.reload()
    }

    /// Reports file and resolver-tool health. Never fails and is never gated.
    #[must_use]
    pub fn health(&self) -> HealthReport {
        let records = FileCheck {
            path: self.store.records_path().to_path_buf(),
            result: if self.store.is_file_accessible() {
                Ok(self.store.record_count())
            } else {
                Err("file not accessible".to_string())
            },
        };
        let resolver = ResolverCheck {
            command: self.reloader.command().to_string(),
            available: self.reloader.is_tool_available(),
        };
        HealthReport::new(records, resolver, self.started.elapsed())
    }

    fn reload(&self) -> Result<ReloadOutput> {
        self.reloader.reload().map_err(|e| {
            tracing::error!(error = %e, "Override file changed but resolver reload failed");
            OverrideError::Reload(e)
        })
    }
}
