//! Application layer.
//!
//! # Structure
//!
//! - `domain/` - Core data (StatsRecord, settings, label table, parsed documents)
//! - `services/` - Business operations (slot substitution, aggregation, uptime)
//! - `infrastructure/` - External integrations (GitHub API, environment, files)
//! - `runner.rs` - One end-to-end run

pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod runner;
pub mod services;
