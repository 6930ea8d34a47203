//! Service configuration.
//!
//! Loaded from a JSON file when one is supplied; every field has a
//! default so a partial (or absent) file still yields a working config.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use riskgate_engine::FailPolicy;

use crate::error::ServiceResult;

/// Offset used only when rendering timestamps for operators. Storage and
/// evaluation are always UTC.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Display offset from UTC, in minutes. Defaults to +05:30.
    #[serde(default = "default_utc_offset_minutes")]
    pub processing_utc_offset_minutes: i32,

    /// What to do when an evaluator's backing store read fails.
    #[serde(default)]
    pub fail_policy: FailPolicy,

    /// Where to append audit events. `None` keeps the ledger in memory.
    #[serde(default)]
    pub audit_ledger_path: Option<PathBuf>,
}

fn default_utc_offset_minutes() -> i32 {
    DEFAULT_UTC_OFFSET_MINUTES
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            processing_utc_offset_minutes: default_utc_offset_minutes(),
            fail_policy: FailPolicy::default(),
            audit_ledger_path: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_file(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)
            .map_err(riskgate_store::StoreError::Serialization)?;
        Ok(config)
    }

    /// Shift a stored UTC stamp into the configured display offset.
    /// An out-of-range offset falls back to UTC rather than failing.
    pub fn display_time(&self, timestamp: DateTime<Utc>) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(self.processing_utc_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
        timestamp.with_timezone(&offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.processing_utc_offset_minutes, 330);
        assert_eq!(config.fail_policy, FailPolicy::FailClosed);
        assert!(config.audit_ledger_path.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"fail_policy": "fail_open"}}"#).unwrap();

        let config = ServiceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.fail_policy, FailPolicy::FailOpen);
        assert_eq!(config.processing_utc_offset_minutes, 330);
    }

    #[test]
    fn test_display_time_applies_offset() {
        let config = ServiceConfig::default();
        let utc = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let local = config.display_time(utc);
        assert_eq!(local.to_rfc3339(), "2024-06-01T17:30:00+05:30");
    }

    #[test]
    fn test_display_time_bad_offset_falls_back_to_utc() {
        let config = ServiceConfig {
            processing_utc_offset_minutes: 100_000,
            ..Default::default()
        };
        let utc = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(config.display_time(utc).to_rfc3339(), "2024-06-01T12:00:00+00:00");
    }
}
