//! Optional API key gate.
//!
//! With no key configured every request passes. Otherwise a request must
//! present the key in the `x-api-key` header or the `api_key` query
//! parameter. Health checks are never gated.

use crate::config::OverrideConfig;
use crate::error::{AuthFailure, OverrideError, Result};

/// Header carrying the key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Query parameter carrying the key.
pub const API_KEY_QUERY: &str = "api_key";

/// Checks presented credentials against the configured key.
#[derive(Clone, Default)]
pub struct ApiKeyGate {
    key: Option<Vec<u8>>,
}

impl std::fmt::Debug for ApiKeyGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyGate")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl ApiKeyGate {
    /// Creates a gate; `None` or an empty key disables it.
    #[must_use]
    pub fn new(key: Option<&str>) -> Self {
        Self {
            key: key.filter(|k| !k.is_empty()).map(|k| k.as_bytes().to_vec()),
        }
    }

    /// Creates a gate from the configured key.
    #[must_use]
    pub fn from_config(config: &OverrideConfig) -> Self {
        Self::new(config.api_key.as_deref())
    }

    /// Returns `true` if a key is required.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Admits or rejects a request. The header wins over the query value.
    ///
    /// # Errors
    ///
    /// Returns [`OverrideError::Unauthorized`] when the key is missing or does
    /// not match.
    pub fn check(&self, header: Option<&str>, query: Option<&str>) -> Result<()> {
        let Some(expected) = &self.key else {
            return Ok(());
        };
        let Some(provided) = header.or(query) else {
            tracing::warn!("Rejected request without API key");
            return Err(OverrideError::Unauthorized(AuthFailure::Missing));
        };
        if !constant_time_eq(expected, provided.as_bytes()) {
            tracing::warn!("Rejected request with invalid API key");
            return Err(OverrideError::Unauthorized(AuthFailure::Invalid));
        }
        Ok(())
    }
}

/// Compares two byte strings without short-circuiting on the first mismatch.
///
/// Lengths are compared up front; only the key length can leak.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_gate_admits_everything() {
        let gate = ApiKeyGate::new(None);
        assert!(!gate.is_enabled());
        gate.check(None, None).unwrap();
        gate.check(Some("anything"), None).unwrap();
        assert!(!ApiKeyGate::new(Some("")).is_enabled());
    }

    #[test]
    fn missing_key_is_rejected() {
        let gate = ApiKeyGate::new(Some("s3cret"));
        let err = gate.check(None, None).unwrap_err();
        assert!(matches!(err, OverrideError::Unauthorized(AuthFailure::Missing)));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let gate = ApiKeyGate::new(Some("s3cret"));
        for bad in ["s3cres", "s3cret!", "", "S3CRET"] {
            let err = gate.check(Some(bad), None).unwrap_err();
            assert!(matches!(err, OverrideError::Unauthorized(AuthFailure::Invalid)), "{bad}");
        }
    }

    #[test]
    fn header_or_query_accepted() {
        let gate = ApiKeyGate::new(Some("s3cret"));
        gate.check(Some("s3cret"), None).unwrap();
        gate.check(None, Some("s3cret")).unwrap();
        assert!(gate.check(Some("wrong"), Some("s3cret")).is_err());
    }

    #[test]
    fn debug_hides_key() {
        let gate = ApiKeyGate::new(Some("s3cret"));
        assert!(!format!("{gate:?}").contains("s3cret"));
    }
}
