// Fantohm contract deployment: artifacts, ABI encoding, an alloy-backed
// deployer, and the token-then-wallet migration.

pub mod abi;
pub mod address;
pub mod artifacts;
pub mod deployment_store;
pub mod error;
pub mod evm;
pub mod migration;
pub mod network;
pub mod rpc_config;

// Re-export primary types for convenient access.
pub use abi::{AbiValue, encode_constructor};
pub use address::{Address, parse_address};
pub use artifacts::{Artifact, ArtifactResolver, DirArtifactResolver, contract_name};
pub use deployment_store::{DeploymentRecord, DeploymentStore};
pub use error::{DeployError, MigrationError};
pub use evm::{DeployedInstance, Deployer, DeployerOptions, RpcDeployer, http_provider};
pub use migration::{DeployStep, MigrationPlan, MigrationReport, run_migration};
pub use network::Network;
pub use rpc_config::{RpcConfig, RpcConfigStore, validate_url};
