//! Services layer - business operations and utilities.
//!
//! This module contains business logic and operations:
//! - Label-anchored slot substitution
//! - Stats aggregation
//! - Uptime calculation
//! - Text formatting

pub mod stats;
pub mod svg_updater;
pub mod text_ops;
pub mod uptime;
