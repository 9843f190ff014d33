use std::collections::HashMap;

use fhm_core::MigrateConfig;

use crate::network::Network;

/// Configuration for a single RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub network: Network,
    pub url: String,
    pub is_custom: bool,
    pub timeout_secs: u64,
}

const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl RpcConfig {
    fn default_for(network: Network) -> Self {
        Self {
            network,
            url: network.default_rpc_url().to_string(),
            is_custom: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Manages per-network RPC endpoint configuration with custom override support.
#[derive(Debug, Clone)]
pub struct RpcConfigStore {
    configs: HashMap<Network, RpcConfig>,
}

impl RpcConfigStore {
    /// Create a store populated with each network's default endpoint.
    pub fn with_defaults() -> Self {
        let configs = Network::ALL
            .into_iter()
            .map(|network| (network, RpcConfig::default_for(network)))
            .collect();

        Self { configs }
    }

    /// Defaults plus every `rpc_url` override found in the migration config.
    ///
    /// Override sections naming an unknown network are rejected.
    pub fn from_config(config: &MigrateConfig) -> anyhow::Result<Self> {
        let mut store = Self::with_defaults();
        for (key, overrides) in &config.networks {
            let network: Network = key.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            if let Some(url) = &overrides.rpc_url {
                store.set_custom_rpc(network, url.clone())?;
            }
        }
        Ok(store)
    }

    /// Get the RPC configuration for a network.
    pub fn get_rpc(&self, network: Network) -> Option<&RpcConfig> {
        self.configs.get(&network)
    }

    /// Override the RPC URL for a network with a custom endpoint.
    ///
    /// Returns `Err` if the URL fails validation.
    pub fn set_custom_rpc(&mut self, network: Network, url: String) -> anyhow::Result<()> {
        if !validate_url(&url) {
            anyhow::bail!("invalid RPC URL: {url}");
        }

        let entry = self
            .configs
            .entry(network)
            .or_insert_with(|| RpcConfig::default_for(network));
        entry.url = url;
        entry.is_custom = true;
        Ok(())
    }

    /// Reset a network's RPC URL back to the built-in default.
    pub fn reset_to_default(&mut self, network: Network) {
        self.configs.insert(network, RpcConfig::default_for(network));
    }
}

impl Default for RpcConfigStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Validate that a URL is well-formed and uses HTTP or HTTPS.
pub fn validate_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            (scheme == "http" || scheme == "https") && parsed.host().is_some()
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhm_core::NetworkOverride;

    #[test]
    fn defaults_cover_all_networks() {
        let store = RpcConfigStore::with_defaults();
        for network in Network::ALL {
            let rpc = store.get_rpc(network).unwrap();
            assert!(!rpc.is_custom);
            assert_eq!(rpc.url, network.default_rpc_url());
        }
    }

    #[test]
    fn set_custom_rpc_marks_as_custom() {
        let mut store = RpcConfigStore::with_defaults();
        store
            .set_custom_rpc(Network::Development, "http://localhost:7545".into())
            .unwrap();

        let rpc = store.get_rpc(Network::Development).unwrap();
        assert!(rpc.is_custom);
        assert_eq!(rpc.url, "http://localhost:7545");
    }

    #[test]
    fn set_custom_rpc_rejects_invalid_url() {
        let mut store = RpcConfigStore::with_defaults();
        assert!(store.set_custom_rpc(Network::Fantom, "not-a-url".into()).is_err());
        assert!(
            store
                .set_custom_rpc(Network::Fantom, "ftp://files.example.com".into())
                .is_err()
        );
    }

    #[test]
    fn reset_to_default_restores_original_url() {
        let mut store = RpcConfigStore::with_defaults();
        store
            .set_custom_rpc(Network::Fantom, "https://custom.example.com".into())
            .unwrap();

        store.reset_to_default(Network::Fantom);
        let after_reset = store.get_rpc(Network::Fantom).unwrap();
        assert_eq!(after_reset.url, Network::Fantom.default_rpc_url());
        assert!(!after_reset.is_custom);
    }

    #[test]
    fn from_config_applies_overrides() {
        let mut config = MigrateConfig::default();
        config.networks.insert(
            "fantom_testnet".into(),
            NetworkOverride {
                rpc_url: Some("https://xapi.testnet.fantom.network/lachesis".into()),
                ..Default::default()
            },
        );

        let store = RpcConfigStore::from_config(&config).unwrap();
        let rpc = store.get_rpc(Network::FantomTestnet).unwrap();
        assert!(rpc.is_custom);
        assert!(!store.get_rpc(Network::Development).unwrap().is_custom);
    }

    #[test]
    fn from_config_rejects_unknown_network() {
        let mut config = MigrateConfig::default();
        config
            .networks
            .insert("ropsten".into(), NetworkOverride::default());
        assert!(RpcConfigStore::from_config(&config).is_err());
    }

    #[test]
    fn validate_url_cases() {
        assert!(validate_url("https://rpc.ftm.tools"));
        assert!(validate_url("http://127.0.0.1:8545"));
        assert!(!validate_url(""));
        assert!(!validate_url("file:///etc/passwd"));
    }
}
