//! Ports layer: Trait definitions for external collaborators.
//!
//! Following Hexagonal Architecture, the application depends on these traits
//! rather than on a concrete model implementation.

mod classifier;

pub use classifier::{ClassifierError, RiskClassifier};
