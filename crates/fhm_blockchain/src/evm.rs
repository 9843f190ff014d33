use std::time::Duration;

use alloy::network::{ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, TxKind};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::client::RpcClient;
use alloy::rpc::types::{TransactionInput, TransactionReceipt, TransactionRequest};
use alloy::transports::http::{Http, reqwest};
use async_trait::async_trait;
use fhm_core::MigrateConfig;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::abi::AbiValue;
use crate::address::parse_address;
use crate::artifacts::Artifact;
use crate::error::DeployError;
use crate::network::Network;
use crate::rpc_config::RpcConfig;

/// A contract instance confirmed on-ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedInstance {
    pub contract_name: String,
    pub address: Address,
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
}

/// Publishes a compiled contract and waits for confirmation.
#[async_trait]
pub trait Deployer: Send + Sync {
    async fn deploy(
        &self,
        artifact: &Artifact,
        args: &[AbiValue],
    ) -> Result<DeployedInstance, DeployError>;
}

/// Transaction and confirmation settings for [`RpcDeployer`].
#[derive(Debug, Clone)]
pub struct DeployerOptions {
    pub network: Network,
    /// Sender. `None` picks the node's first unlocked account.
    pub from: Option<Address>,
    pub gas: Option<u64>,
    pub gas_price: Option<u64>,
    pub poll_interval: Duration,
    pub receipt_timeout: Duration,
}

impl DeployerOptions {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            from: None,
            gas: None,
            gas_price: None,
            poll_interval: Duration::from_millis(500),
            receipt_timeout: Duration::from_secs(750),
        }
    }

    /// Options for `network` taken from the migration config and its
    /// per-network overrides.
    pub fn from_config(network: Network, config: &MigrateConfig) -> Result<Self, DeployError> {
        let overrides = config.networks.get(network.key()).cloned().unwrap_or_default();
        let from = overrides.from.as_deref().map(parse_address).transpose()?;
        Ok(Self {
            network,
            from,
            gas: overrides.gas,
            gas_price: overrides.gas_price,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            receipt_timeout: Duration::from_secs(config.confirmation_timeout_secs),
        })
    }
}

/// HTTP provider for `rpc` with the endpoint's request timeout.
///
/// No fillers are installed: for `eth_sendTransaction` the node picks the
/// nonce and estimates gas unless the options pin them.
pub fn http_provider(rpc: &RpcConfig) -> Result<DynProvider, DeployError> {
    let url: url::Url = rpc
        .url
        .parse()
        .map_err(|e| DeployError::Transport(format!("invalid RPC URL {}: {e}", rpc.url)))?;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(rpc.timeout_secs))
        .build()
        .map_err(|e| DeployError::Transport(format!("failed to build HTTP client: {e}")))?;

    let client = RpcClient::new(Http::with_client(http, url), rpc.network == Network::Development);
    Ok(ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect_client(client)
        .erased())
}

/// Deploys through a node's `eth_sendTransaction`, signing with an account
/// the node manages.
pub struct RpcDeployer<P> {
    provider: P,
    options: DeployerOptions,
    sender: OnceCell<Address>,
}

impl<P: Provider> RpcDeployer<P> {
    pub fn new(provider: P, options: DeployerOptions) -> Self {
        Self {
            provider,
            options,
            sender: OnceCell::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn options(&self) -> &DeployerOptions {
        &self.options
    }

    /// Fail unless the node serves the configured network.
    pub async fn verify_chain(&self) -> Result<u64, DeployError> {
        let actual = self.provider.get_chain_id().await?;
        let expected = self.options.network.chain_id();
        if actual != expected && !self.options.network.accepts_any_chain() {
            return Err(DeployError::ChainMismatch { expected, actual });
        }
        debug!(chain_id = actual, network = %self.options.network, "chain verified");
        Ok(actual)
    }

    /// The sending account, resolved once per deployer.
    pub async fn sender(&self) -> Result<Address, DeployError> {
        self.sender
            .get_or_try_init(|| self.lookup_sender())
            .await
            .copied()
    }

    async fn lookup_sender(&self) -> Result<Address, DeployError> {
        if let Some(from) = self.options.from {
            return Ok(from);
        }
        let accounts = self.provider.get_accounts().await?;
        accounts.first().copied().ok_or(DeployError::NoAccounts)
    }

    /// The contract-creation transaction for `data`, sent from `from`.
    pub fn creation_request(&self, from: Address, data: Bytes) -> TransactionRequest {
        let mut tx = TransactionRequest::default()
            .with_from(from)
            .with_kind(TxKind::Create);
        // Older nodes read `data`, newer ones `input`.
        tx.input = TransactionInput::both(data);
        if let Some(gas) = self.options.gas {
            tx.set_gas_limit(gas);
        }
        if let Some(price) = self.options.gas_price {
            tx.set_gas_price(u128::from(price));
        }
        tx
    }

    // Receipts are polled here rather than through a pending-transaction
    // watcher so the configured interval and timeout apply.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TransactionReceipt, DeployError> {
        let started = tokio::time::Instant::now();
        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }

            if started.elapsed() >= self.options.receipt_timeout {
                return Err(DeployError::ReceiptTimeout {
                    tx_hash: tx_hash.to_string(),
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }
    }
}

#[async_trait]
impl<P: Provider> Deployer for RpcDeployer<P> {
    async fn deploy(
        &self,
        artifact: &Artifact,
        args: &[AbiValue],
    ) -> Result<DeployedInstance, DeployError> {
        let data = artifact.deploy_data(args)?;
        let data_len = data.len();
        let from = self.sender().await?;

        let tx = self.creation_request(from, data);
        let tx_hash: TxHash = self
            .provider
            .client()
            .request("eth_sendTransaction", (tx,))
            .await?;
        info!(
            contract = %artifact.contract_name,
            %tx_hash,
            from = %from,
            data_len,
            "deployment transaction sent"
        );

        let receipt = self.wait_for_receipt(tx_hash).await?;
        instance_from_receipt(&artifact.contract_name, &receipt)
    }
}

/// Check a creation receipt and extract the deployed instance.
///
/// Pre-Byzantium receipts carry a state root instead of a status and count
/// as successful.
fn instance_from_receipt(
    contract_name: &str,
    receipt: &TransactionReceipt,
) -> Result<DeployedInstance, DeployError> {
    let tx_hash = receipt.transaction_hash;
    if !receipt.status() {
        return Err(DeployError::Reverted {
            tx_hash: tx_hash.to_string(),
        });
    }
    let address = receipt
        .contract_address
        .ok_or_else(|| DeployError::MissingContractAddress {
            tx_hash: tx_hash.to_string(),
        })?;

    Ok(DeployedInstance {
        contract_name: contract_name.to_string(),
        address,
        tx_hash,
        block_number: receipt.block_number.unwrap_or_default(),
        gas_used: receipt.gas_used,
    })
}
