// src/config.rs

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// How deposit processing funds a freshly created account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositPolicy {
    /// New accounts start at zero; the deposited amount is not credited.
    #[default]
    ZeroBalance,
    /// New accounts start with the deposited amount.
    CreditAmount,
}

/// How transaction processing treats a receiver without an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverPolicy {
    /// Unknown receivers are rejected; accounts are only minted by deposits.
    #[default]
    RequireExisting,
    /// An unknown receiver gets a new account holding the transferred amount.
    CreateOnTransfer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollupConfig {
    pub log_level: String,
    pub deposit_policy: DepositPolicy,
    pub receiver_policy: ReceiverPolicy,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            deposit_policy: DepositPolicy::default(),
            receiver_policy: ReceiverPolicy::default(),
        }
    }
}

impl RollupConfig {
    /// Loads the configuration from a TOML file. If the file doesn't exist,
    /// it returns the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid rollup configuration")
    }

    /// Saves the current configuration as TOML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string(self).context("Failed to serialize configuration")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }
}
