use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app::error::{AppError, Result};

/// Where value slots sit relative to their label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
pub enum SlotLayout {
    /// Values follow their label directly (`Repos`, value).
    #[default]
    Adjacent,
    /// A style-break run (dot leaders, separators) sits between label and
    /// value. The contributed count is zero-padded in this layout.
    Separated,
}

impl SlotLayout {
    /// Distance from a label slot to its first value slot.
    pub fn value_offset(&self) -> usize {
        match self {
            Self::Adjacent => 1,
            Self::Separated => 2,
        }
    }

    pub fn pads_contributed(&self) -> bool {
        matches!(self, Self::Separated)
    }
}

/// How `contributed_repository_count` is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
pub enum ContributedStrategy {
    /// Distinct repositories that received a push in the user's recent event feed.
    #[default]
    PushEvents,
    /// Distinct repositories in a commit search by author.
    CommitSearch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Subject user. Falls back to the owner of the token.
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default = "default_documents")]
    pub documents: Vec<PathBuf>,

    #[serde(default)]
    pub layout: SlotLayout,

    /// Reference date for the `Uptime` label. Without it the label is ignored.
    #[serde(default)]
    pub uptime_since: Option<NaiveDate>,

    #[serde(default)]
    pub contributed_strategy: ContributedStrategy,

    #[serde(default = "default_include_org_repos")]
    pub include_org_repos: bool,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_documents() -> Vec<PathBuf> {
    vec![
        PathBuf::from("modes/dark_mode.svg"),
        PathBuf::from("modes/light_mode.svg"),
    ]
}

fn default_include_org_repos() -> bool {
    true
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_token_env() -> String {
    "GH_TOKEN".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            username: None,
            documents: default_documents(),
            layout: SlotLayout::default(),
            uptime_since: None,
            contributed_strategy: ContributedStrategy::default(),
            include_org_repos: default_include_org_repos(),
            api_base: default_api_base(),
            token_env: default_token_env(),
        }
    }
}

impl AppSettings {
    /// Load settings from `path`. A missing file yields the defaults; a file
    /// that exists but cannot be read or parsed is a configuration error.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                AppError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(AppError::Configuration(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Save settings to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;

        Ok(())
    }
}
