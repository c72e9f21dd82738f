use std::env;
use std::fmt;

use crate::app::error::{AppError, Result};

/// API token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Read the token from the environment variable `var`.
    pub fn from_env(var: &str) -> Result<Self> {
        Self::from_lookup(var, |name| env::var(name).ok())
    }

    /// Resolve the token through `lookup`; an unset or blank value is a
    /// configuration error.
    pub fn from_lookup<F>(var: &str, lookup: F) -> Result<Self>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        lookup(var)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(Self)
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "GitHub token not found: environment variable {} is not set",
                    var
                ))
            })
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
