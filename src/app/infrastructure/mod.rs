//! Infrastructure layer - external integrations and utilities.
//!
//! This module contains code that interfaces with external systems:
//! - GitHub REST API client
//! - Credential lookup from the environment
//! - Target file checks

pub mod credentials;
pub mod files;
pub mod github;

pub use credentials::Credential;
pub use github::{GitHubApi, GitHubClient};
