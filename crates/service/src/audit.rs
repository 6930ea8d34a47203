//! Audit trail for submissions and retrievals.
//!
//! Events are appended as JSONL, one JSON object per line. The ledger is
//! append-only; nothing in the service ever rewrites a line.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use riskgate_core::{CustomerId, TransactionId, TransactionStatus};

use crate::error::ServiceResult;

/// Events appended to the audit ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A submission passed the pipeline and was persisted.
    TransactionSubmitted {
        id: Uuid,
        transaction_id: TransactionId,
        customer_id: CustomerId,
        risk_score: u32,
        status: TransactionStatus,
        matched_rules: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    /// A decided transaction came in under the review threshold.
    TransactionApproved {
        id: Uuid,
        transaction_id: TransactionId,
        customer_id: CustomerId,
        risk_score: u32,
        timestamp: DateTime<Utc>,
    },

    /// A decided transaction crossed the review threshold.
    TransactionFlagged {
        id: Uuid,
        transaction_id: TransactionId,
        customer_id: CustomerId,
        risk_score: u32,
        matched_rule_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A submission was aborted before persistence.
    SubmissionRejected {
        id: Uuid,
        customer_id: CustomerId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// A stored transaction was read back by id.
    TransactionRetrieved {
        id: Uuid,
        transaction_id: TransactionId,
        timestamp: DateTime<Utc>,
    },
}

impl AuditEvent {
    pub fn id(&self) -> Uuid {
        match self {
            AuditEvent::TransactionSubmitted { id, .. } => *id,
            AuditEvent::TransactionApproved { id, .. } => *id,
            AuditEvent::TransactionFlagged { id, .. } => *id,
            AuditEvent::SubmissionRejected { id, .. } => *id,
            AuditEvent::TransactionRetrieved { id, .. } => *id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            AuditEvent::TransactionSubmitted { timestamp, .. } => *timestamp,
            AuditEvent::TransactionApproved { timestamp, .. } => *timestamp,
            AuditEvent::TransactionFlagged { timestamp, .. } => *timestamp,
            AuditEvent::SubmissionRejected { timestamp, .. } => *timestamp,
            AuditEvent::TransactionRetrieved { timestamp, .. } => *timestamp,
        }
    }

    pub fn transaction_submitted(
        transaction_id: TransactionId,
        customer_id: CustomerId,
        risk_score: u32,
        status: TransactionStatus,
        matched_rules: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        AuditEvent::TransactionSubmitted {
            id: Uuid::new_v4(),
            transaction_id,
            customer_id,
            risk_score,
            status,
            matched_rules,
            timestamp,
        }
    }

    pub fn transaction_approved(
        transaction_id: TransactionId,
        customer_id: CustomerId,
        risk_score: u32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        AuditEvent::TransactionApproved {
            id: Uuid::new_v4(),
            transaction_id,
            customer_id,
            risk_score,
            timestamp,
        }
    }

    pub fn transaction_flagged(
        transaction_id: TransactionId,
        customer_id: CustomerId,
        risk_score: u32,
        matched_rule_count: usize,
        timestamp: DateTime<Utc>,
    ) -> Self {
        AuditEvent::TransactionFlagged {
            id: Uuid::new_v4(),
            transaction_id,
            customer_id,
            risk_score,
            matched_rule_count,
            timestamp,
        }
    }

    pub fn submission_rejected(
        customer_id: CustomerId,
        reason: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        AuditEvent::SubmissionRejected {
            id: Uuid::new_v4(),
            customer_id,
            reason: reason.into(),
            timestamp,
        }
    }

    pub fn transaction_retrieved(transaction_id: TransactionId, timestamp: DateTime<Utc>) -> Self {
        AuditEvent::TransactionRetrieved {
            id: Uuid::new_v4(),
            transaction_id,
            timestamp,
        }
    }
}

/// Append-only JSONL audit ledger.
///
/// In-memory mode keeps recent events in a buffer instead of a file, which
/// is what tests and the default configuration use.
pub struct AuditLedger {
    path: PathBuf,
    file: Option<File>,
    buffer: Vec<AuditEvent>,
}

impl AuditLedger {
    pub fn new(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file: Some(file),
            buffer: Vec::new(),
        })
    }

    /// Ledger that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            file: None,
            buffer: Vec::new(),
        }
    }

    pub fn append(&mut self, event: &AuditEvent) -> ServiceResult<()> {
        if let Some(ref mut file) = self.file {
            let json =
                serde_json::to_string(event).map_err(riskgate_store::StoreError::Serialization)?;
            writeln!(file, "{}", json)?;
            file.flush()?;
        } else {
            self.buffer.push(event.clone());
        }
        Ok(())
    }

    pub fn read_all(&self) -> ServiceResult<Vec<AuditEvent>> {
        if self.file.is_none() {
            return Ok(self.buffer.clone());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut events = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event: AuditEvent = serde_json::from_str(&line)
                .map_err(riskgate_store::StoreError::Serialization)?;
            events.push(event);
        }

        Ok(events)
    }

    pub fn is_in_memory(&self) -> bool {
        self.file.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn submitted() -> AuditEvent {
        AuditEvent::transaction_submitted(
            Uuid::new_v4(),
            Uuid::new_v4(),
            90,
            TransactionStatus::Flagged,
            vec!["High Amount".to_string(), "Gambling Merchant".to_string()],
            Utc::now(),
        )
    }

    #[test]
    fn test_in_memory_ledger_buffers_events() {
        let mut ledger = AuditLedger::in_memory();
        assert!(ledger.is_in_memory());

        let event = submitted();
        ledger.append(&event).unwrap();

        let events = ledger.read_all().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id(), event.id());
    }

    #[test]
    fn test_file_ledger_write_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        let first = submitted();
        let second = AuditEvent::submission_rejected(
            Uuid::new_v4(),
            "Invalid merchant category: casino",
            Utc::now(),
        );

        {
            let mut ledger = AuditLedger::new(&path).unwrap();
            ledger.append(&first).unwrap();
            ledger.append(&second).unwrap();
        }

        let ledger = AuditLedger::new(&path).unwrap();
        let events = ledger.read_all().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id(), first.id());
        assert_eq!(events[1].id(), second.id());
    }

    #[test]
    fn test_event_serialization_tags() {
        let json = serde_json::to_string(&submitted()).unwrap();
        assert!(json.contains("transaction_submitted"));
        assert!(json.contains("FLAGGED"));
        assert!(json.contains("High Amount"));

        let parsed: AuditEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, AuditEvent::TransactionSubmitted { .. }));
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("audit.jsonl");

        let ledger = AuditLedger::new(&path).unwrap();
        assert!(!ledger.is_in_memory());
        assert!(path.parent().unwrap().exists());
    }
}
