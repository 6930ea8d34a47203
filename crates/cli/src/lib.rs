//! RiskGate CLI - library surface.

pub mod commands;
pub mod context;

pub use context::AppContext;
