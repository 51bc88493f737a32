//! Host-facing pricing orchestration.
//!
//! This module provides:
//! - The per-pair pricing engine with mutating and preview quote paths
//! - The configuration authority token
//! - A registry holding one engine per pair

/// Per-pair pricing engine.
pub mod pricing;

/// Registry of engines by pair.
pub mod registry;

pub use pricing::{ConfigAuthority, PricingEngine};
pub use registry::PairRegistry;
