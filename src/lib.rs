//! # dns-overrides
//!
//! Maintain the host-override file of a local DNS resolver (Pi-hole's
//! `custom.list` by default) and reload the resolver after every change.
//!
//! The file holds one `address name` pair per line. Before each add the file
//! is copied into a single backup slot, which [`OverrideService::reset`]
//! copies back.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use dns_overrides::{OverrideConfig, OverrideService, RecordInput};
//!
//! let service = OverrideService::new(&OverrideConfig::from_env())?;
//!
//! service.add(&RecordInput::new("192.168.1.2", "nas.home.lab"))?;
//! service.delete(&RecordInput::new("192.168.1.2", "nas.home.lab"))?;
//!
//! // Undo the most recent add.
//! service.reset()?;
//! ```
//!
//! ## Failure model
//!
//! Every error carries an [`ErrorKind`] a transport can map onto a status
//! code. Writes are not rolled back when the reload afterwards fails; the
//! file and the running resolver disagree until the next successful reload.
//!
//! There is no locking. Run a single writer per override file.
//!
//! ## Permissions
//!
//! The default paths under `/etc/pihole/` and `pihole restartdns` usually
//! require root. The caller is responsible for privilege elevation.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod error;
pub mod health;
pub mod record;
pub mod reload;
pub mod service;
pub mod store;
pub mod util;
pub mod validate;

pub use auth::ApiKeyGate;
pub use config::OverrideConfig;
pub use error::{AuthFailure, ErrorKind, OverrideError, ReloadError, Result};
pub use health::{HealthReport, HealthStatus};
pub use record::Record;
pub use reload::{ReloadOutput, ResolverReloader};
pub use service::OverrideService;
pub use store::RecordStore;
pub use validate::RecordInput;
