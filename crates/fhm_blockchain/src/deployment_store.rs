use std::collections::BTreeMap;
use std::path::Path;

use alloy::primitives::{Address, TxHash};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::migration::MigrationReport;
use crate::network::Network;

/// One contract instance produced by a migration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub run_id: Uuid,
    pub contract_name: String,
    pub address: Address,
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    pub deployed_at: DateTime<Utc>,
}

/// Deployment history, keyed by network.
///
/// Every run appends; re-running a migration adds new records rather than
/// replacing the earlier ones.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeploymentStore {
    networks: BTreeMap<Network, Vec<DeploymentRecord>>,
}

impl DeploymentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every instance of `report` under `network`.
    pub fn record(&mut self, network: Network, report: &MigrationReport) {
        let records = self.networks.entry(network).or_default();
        records.extend(report.deployed.iter().map(|d| DeploymentRecord {
            run_id: report.run_id,
            contract_name: d.contract_name.clone(),
            address: d.address,
            tx_hash: d.tx_hash,
            block_number: d.block_number,
            gas_used: d.gas_used,
            deployed_at: report.finished_at,
        }));
        info!(
            network = %network,
            run_id = %report.run_id,
            count = report.deployed.len(),
            "deployments recorded"
        );
    }

    /// All records for `network`, oldest first.
    pub fn history(&self, network: Network) -> &[DeploymentRecord] {
        self.networks.get(&network).map(Vec::as_slice).unwrap_or_default()
    }

    /// Most recent address of `contract_name` on `network`.
    pub fn latest(&self, network: Network, contract_name: &str) -> Option<&DeploymentRecord> {
        self.history(network)
            .iter()
            .rev()
            .find(|r| r.contract_name == contract_name)
    }

    /// Total number of records across all networks.
    pub fn len(&self) -> usize {
        self.networks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist the store to a JSON file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json =
            serde_json::to_string_pretty(self).context("failed to serialize deployment store")?;
        std::fs::write(path, json).context("failed to write deployment store file")?;

        // Owner-only on Unix (0o600 = rw-------).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .context("failed to set deployment store file permissions")?;
        }

        info!(path = %path.display(), count = self.len(), "deployment store saved");
        Ok(())
    }

    /// Load a store from a JSON file. Returns an empty store if the file
    /// does not exist.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "deployment store file not found, starting empty");
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path).context("failed to read deployment store file")?;
        let store: Self =
            serde_json::from_str(&json).context("failed to deserialize deployment store")?;
        info!(path = %path.display(), count = store.len(), "deployment store loaded");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evm::DeployedInstance;

    fn report(addresses: &[(&str, u8)]) -> MigrationReport {
        MigrationReport {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            deployed: addresses
                .iter()
                .map(|(name, byte)| DeployedInstance {
                    contract_name: name.to_string(),
                    address: Address::repeat_byte(*byte),
                    tx_hash: TxHash::with_last_byte(*byte),
                    block_number: u64::from(*byte),
                    gas_used: 1_000_000,
                })
                .collect(),
        }
    }

    #[test]
    fn record_appends_per_network() {
        let mut store = DeploymentStore::new();
        store.record(Network::Development, &report(&[("FHM", 1), ("MultiSigSwapWallet", 2)]));
        store.record(Network::Development, &report(&[("FHM", 3), ("MultiSigSwapWallet", 4)]));

        assert_eq!(store.history(Network::Development).len(), 4);
        assert!(store.history(Network::Fantom).is_empty());
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn latest_returns_most_recent_run() {
        let mut store = DeploymentStore::new();
        store.record(Network::Development, &report(&[("FHM", 1)]));
        store.record(Network::Development, &report(&[("FHM", 3)]));

        let latest = store.latest(Network::Development, "FHM").unwrap();
        assert_eq!(latest.address, Address::repeat_byte(3));
        assert!(store.latest(Network::Development, "MultiSigSwapWallet").is_none());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("deployments.json");

        let mut store = DeploymentStore::new();
        store.record(Network::FantomTestnet, &report(&[("FHM", 7)]));
        store.save_to_file(&path).unwrap();

        let loaded = DeploymentStore::load_from_file(&path).unwrap();
        assert_eq!(loaded.history(Network::FantomTestnet), store.history(Network::FantomTestnet));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"fantom_testnet\""));
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        DeploymentStore::new().save_to_file(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeploymentStore::load_from_file(&dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn load_corrupt_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(DeploymentStore::load_from_file(&path).is_err());
    }
}
