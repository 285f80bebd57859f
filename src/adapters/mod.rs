//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with files and libraries:
//! - `forest`: random forest evaluation behind `RiskClassifier`
//! - `bundle`: model bundle loading and Ed25519 verification
//! - `sanitize`: PII and measurement filtering for logs

pub mod bundle;
pub mod forest;
pub mod sanitize;

// Re-export artifact error for lib.rs
pub use bundle::ArtifactError;
