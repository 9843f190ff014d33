//! Subcommand implementations.

pub mod inspect;
pub mod migrate;

use std::path::PathBuf;

use anyhow::Context;
use fhm_blockchain::Network;
use fhm_core::MigrateConfig;

/// Command-line values that take precedence over the config file and env.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub network: Option<Network>,
    pub artifacts: Option<PathBuf>,
    pub rpc_url: Option<String>,
    pub from: Option<String>,
}

impl CliOverrides {
    /// Layer the process environment, then these values, over `config`.
    pub fn apply(self, config: &mut MigrateConfig) -> anyhow::Result<()> {
        self.apply_with(config, |key| std::env::var(key).ok())
    }

    /// As [`CliOverrides::apply`] with an explicit environment lookup.
    ///
    /// The network is settled before any per-network value is written, so
    /// `FHM_RPC_URL` and `--rpc-url` both land on the network that will be
    /// used.
    pub fn apply_with<F>(self, config: &mut MigrateConfig, env: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        config.apply_overrides(self.network.map(|n| n.key()), env)?;
        if let Some(dir) = self.artifacts {
            config.artifacts_dir = dir;
        }
        if let Some(url) = self.rpc_url {
            config.network_override_mut().rpc_url = Some(url);
        }
        if let Some(from) = self.from {
            config.network_override_mut().from = Some(from);
        }
        Ok(())
    }
}

/// The network named by the config.
pub fn selected_network(config: &MigrateConfig) -> anyhow::Result<Network> {
    config
        .network
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("Invalid network in configuration")
}
