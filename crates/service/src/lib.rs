//! Submission orchestration for the RiskGate scoring engine.
//!
//! The pipeline for one submission:
//!
//! ```text
//! input -> validate -> resolve customer -> parse category -> stamp time
//!       -> evaluate rules -> decide -> persist -> audit
//! ```
//!
//! Aborts before persistence: unknown customer, non-positive amount,
//! unrecognized merchant category. Everything past the stamp runs under a
//! per-customer lock so frequency counting and persistence stay ordered.

pub mod audit;
pub mod clock;
pub mod config;
pub mod error;
pub mod seed;
pub mod submit;

pub use audit::{AuditEvent, AuditLedger};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ServiceConfig;
pub use error::{ServiceError, ServiceResult};
pub use seed::{install as install_seed, SeedSummary};
pub use submit::{
    SubmissionOutcome, SubmissionService, TransactionListing, TransactionView,
};
