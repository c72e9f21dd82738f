//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - The aggregate StatsRecord
//! - Application settings
//! - The label table driving slot substitution
//! - Parsed text documents

pub mod document;
pub mod labels;
pub mod settings;
pub mod stats;

pub use document::{Slot, TextDocument, TextNode};
pub use labels::{Label, LabelRule, RenderOptions};
pub use settings::{AppSettings, ContributedStrategy, SlotLayout};
pub use stats::StatsRecord;
