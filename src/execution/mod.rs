//! Collaborator interfaces and their in-memory implementations.
//!
//! This module provides:
//! - Traits for the reference price source, reserve view and fee sink
//! - A price source with manual override
//! - Mock implementations for tests and demos

/// Collaborator traits.
pub mod connector;

/// Mock collaborators.
pub mod mock;

/// Reference price source with manual override.
pub mod oracle;

pub use connector::{FeeSink, NoopFeeSink, ReferencePriceSource, ReserveView};
pub use mock::{FeeNotification, MockPriceSource, MockReserves, RecordingFeeSink};
pub use oracle::OverridablePriceSource;
