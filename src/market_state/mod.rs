//! Market state module for tracking the reference price.
//!
//! This module provides:
//! - Point-in-time volatility readings
//! - The dual-speed EWMA variance tracker

/// Volatility reading snapshot.
pub mod snapshot;

/// Dual-speed EWMA variance tracker.
pub mod volatility;
