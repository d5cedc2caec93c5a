//! Configuration management for the wallet transaction layer
//!
//! Loads configuration from TOML files with environment variable substitution.

use crate::chain::{NetworkType, StacksNetwork};
use crate::constants::{API_TIMEOUT_MILLI, XVERSE_API_BASE_URL, XVERSE_SPONSOR_URL};
use crate::tx::FeesMultipliers;

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "STX_WALLET_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

lazy_static! {
    static ref ENV_VAR_PATTERN: Regex = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub network: NetworkConfig,
    #[serde(default)]
    pub fees: FeesMultipliers,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(rename = "type")]
    pub network_type: NetworkType,
    /// Overrides the default core API URL for the network
    pub core_api_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub timeout_ms: u64,
    pub xverse_api_url: String,
    pub sponsor_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            timeout_ms: API_TIMEOUT_MILLI,
            xverse_api_url: XVERSE_API_BASE_URL.to_string(),
            sponsor_url: XVERSE_SPONSOR_URL.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the file named by `STX_WALLET_CONFIG`, or the default path
    pub fn load() -> Result<Self> {
        let config_path = env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        Self::load_from(&config_path)
    }

    /// Load settings from an explicit path
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        Self::from_toml(&config_str)
    }

    /// Parse settings from TOML text
    pub fn from_toml(config_str: &str) -> Result<Self> {
        // Substitute environment variables
        let config_str = substitute_env_vars(config_str);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.network.core_api_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("core_api_url must be an http(s) URL, got {:?}", url);
            }
        }

        if self.api.timeout_ms == 0 {
            anyhow::bail!("api.timeout_ms must be greater than zero");
        }

        let multipliers = [
            ("stxSendTxMultiplier", &self.fees.stx_send_tx_multiplier),
            ("poolStackingTxMultiplier", &self.fees.pool_stacking_tx_multiplier),
            ("otherTxMultiplier", &self.fees.other_tx_multiplier),
        ];
        for (name, multiplier) in multipliers {
            if let Some(m) = multiplier {
                if m.numerator() < m.denominator() {
                    tracing::warn!("Fee multiplier {} is {} - fees will be lowered", name, m);
                }
            }
        }

        Ok(())
    }

    /// Network value handed to the builder and sender
    pub fn stacks_network(&self) -> StacksNetwork {
        let network = StacksNetwork::from_type(self.network.network_type);
        match &self.network.core_api_url {
            Some(url) => network.with_url(url.clone()),
            None => network,
        }
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    let mut result = input.to_string();

    for cap in ENV_VAR_PATTERN.captures_iter(input) {
        let var_name = &cap[1];
        let var_value = env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}
