use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "fhm-migrate.toml";

/// Per-network settings that override the built-in endpoint defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkOverride {
    /// JSON-RPC endpoint. Falls back to the network's default when unset.
    pub rpc_url: Option<String>,
    /// Sender account. When unset the node's first unlocked account is used.
    pub from: Option<String>,
    /// Gas limit attached to each deployment transaction.
    pub gas: Option<u64>,
    /// Gas price in wei.
    pub gas_price: Option<u64>,
}

// ---------------------------------------------------------------------------
// MigrateConfig
// ---------------------------------------------------------------------------

/// Migration runner configuration, read from `fhm-migrate.toml`.
///
/// Every field has a default so a partial (or absent) file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    /// Name of the network to deploy to (`development`, `fantom_testnet`, `fantom`).
    pub network: String,
    /// Directory holding compiled contract artifacts (`<Name>.json`).
    pub artifacts_dir: PathBuf,
    /// JSON file that accumulates deployment records across runs.
    pub deployments_file: PathBuf,
    /// Interval between `eth_getTransactionReceipt` polls.
    pub poll_interval_ms: u64,
    /// How long to wait for a deployment receipt before giving up.
    pub confirmation_timeout_secs: u64,
    pub log_level: String,
    pub networks: BTreeMap<String, NetworkOverride>,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            network: "development".into(),
            artifacts_dir: PathBuf::from("build/contracts"),
            deployments_file: PathBuf::from("deployments.json"),
            poll_interval_ms: 500,
            confirmation_timeout_secs: 750,
            log_level: "info".into(),
            networks: BTreeMap::new(),
        }
    }
}

impl MigrateConfig {
    /// Returns the base state directory: `~/.fhm/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".fhm"))
    }

    /// Returns the logs directory: `~/.fhm/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one, `fhm-migrate.toml` in the
    /// working directory is used if present, otherwise the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => {
                let local = PathBuf::from(CONFIG_FILE_NAME);
                if local.exists() {
                    Self::load_from_path(&local)
                } else {
                    info!("No {CONFIG_FILE_NAME} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load config from a specific file path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Apply `FHM_*` overrides from `lookup`, usually the process
    /// environment.
    ///
    /// `FHM_RPC_URL` and `FHM_FROM` target the selected network, which is
    /// settled first: a `pinned_network` (chosen on the command line) wins
    /// over `FHM_NETWORK`.
    pub fn apply_overrides<F>(&mut self, pinned_network: Option<&str>, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        match pinned_network {
            Some(network) => self.network = network.to_string(),
            None => {
                if let Some(network) = lookup("FHM_NETWORK") {
                    self.network = network;
                }
            }
        }
        if let Some(dir) = lookup("FHM_ARTIFACTS_DIR") {
            self.artifacts_dir = PathBuf::from(dir);
        }
        if let Some(ms) = lookup("FHM_POLL_INTERVAL_MS") {
            self.poll_interval_ms = ms.parse().context("Invalid FHM_POLL_INTERVAL_MS")?;
        }
        if let Some(url) = lookup("FHM_RPC_URL") {
            self.network_override_mut().rpc_url = Some(url);
        }
        if let Some(from) = lookup("FHM_FROM") {
            self.network_override_mut().from = Some(from);
        }
        Ok(())
    }

    /// Overrides for the currently selected network, if any were configured.
    pub fn network_override(&self) -> Option<&NetworkOverride> {
        self.networks.get(&self.network)
    }

    /// Overrides for the selected network, created empty on first access.
    pub fn network_override_mut(&mut self) -> &mut NetworkOverride {
        self.networks.entry(self.network.clone()).or_default()
    }
}
