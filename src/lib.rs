//! statbadge - keeps the numbers on a pair of SVG profile badges current.
//!
//! One run fetches a [`StatsRecord`] for a GitHub user, then rewrites the
//! value slots that follow known labels ("Repos", "Commits", "Stars", ...)
//! inside each badge document.

pub mod app;

pub use app::domain::{AppSettings, ContributedStrategy, SlotLayout, StatsRecord};
pub use app::error::{AppError, Result};
pub use app::runner::{RunOptions, RunSummary, run};
pub use app::services::svg_updater::DocumentUpdater;
