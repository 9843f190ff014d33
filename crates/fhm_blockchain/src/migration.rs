//! The Fantohm deployment sequence.
//!
//! Two contracts are published in a fixed order: the `FHM` token, then the
//! `MultiSigSwapWallet`. Each deployment is confirmed before the next one is
//! issued, and the first failure ends the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use alloy::primitives::{Address, address};

use crate::abi::AbiValue;
use crate::artifacts::{Artifact, ArtifactResolver, contract_name};
use crate::error::MigrationError;
use crate::evm::{DeployedInstance, Deployer};

pub const TOKEN_CONTRACT: &str = "./src/contracts/FHM.sol";
pub const WALLET_CONTRACT: &str = "./src/contracts/MultiSigSwapWallet.sol";

pub const TOKEN_INITIAL_SUPPLY: u128 = 10_000_000;
pub const TOKEN_SYMBOL: &str = "FHM";
pub const TOKEN_NAME: &str = "Fantohm";
pub const TOKEN_DECIMALS: u128 = 18;

/// Wallet owner.
pub const OWNER: Address = address!("13c671CD13C3b645A91b5a7dcbf58C10F4E4Fe6e");

/// Swap fee collector.
pub const COLLECTOR: Address = address!("7dBcb75a8Bc11420d4974AF2C575D4d7cAFdE87C");

/// Second wallet constructor argument, always zero.
pub const WALLET_PARAM: u128 = 0;

/// One contract to publish with its constructor arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployStep {
    /// Artifact reference, either a bare name or a source path.
    pub contract: String,
    pub args: Vec<AbiValue>,
}

impl DeployStep {
    pub fn new(contract: impl Into<String>, args: Vec<AbiValue>) -> Self {
        Self {
            contract: contract.into(),
            args,
        }
    }

    /// Bare contract name of the artifact reference.
    pub fn name(&self) -> &str {
        contract_name(&self.contract)
    }
}

/// An ordered list of deployments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    steps: Vec<DeployStep>,
}

impl MigrationPlan {
    pub fn new(steps: Vec<DeployStep>) -> Self {
        Self { steps }
    }

    /// The token-then-wallet sequence.
    pub fn fantohm() -> Self {
        Self::new(vec![
            DeployStep::new(
                TOKEN_CONTRACT,
                vec![
                    AbiValue::Uint(TOKEN_INITIAL_SUPPLY),
                    AbiValue::string(TOKEN_SYMBOL),
                    AbiValue::string(TOKEN_NAME),
                    AbiValue::Uint(TOKEN_DECIMALS),
                ],
            ),
            DeployStep::new(
                WALLET_CONTRACT,
                vec![
                    AbiValue::Address(OWNER),
                    AbiValue::Uint(WALLET_PARAM),
                    AbiValue::Address(COLLECTOR),
                ],
            ),
        ])
    }

    pub fn steps(&self) -> &[DeployStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Resolve every step's artifact, failing on the first missing one.
    pub fn resolve<R>(&self, resolver: &R) -> Result<Vec<Artifact>, MigrationError>
    where
        R: ArtifactResolver + ?Sized,
    {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                resolver
                    .resolve(&step.contract)
                    .map_err(|source| MigrationError::DeploymentFailed {
                        step: i + 1,
                        contract: step.name().to_string(),
                        source,
                    })
            })
            .collect()
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Instances in deployment order.
    pub deployed: Vec<DeployedInstance>,
}

impl MigrationReport {
    /// Address of the first deployed instance of `contract`.
    pub fn address_of(&self, contract: &str) -> Option<Address> {
        let name = contract_name(contract);
        self.deployed
            .iter()
            .find(|d| d.contract_name == name)
            .map(|d| d.address)
    }
}

/// Run `plan` against `deployer`.
///
/// All artifacts are resolved before anything is sent. Steps then run
/// strictly in order; step `n + 1` is issued only after step `n` has been
/// confirmed. The first error is returned and no later step is attempted.
pub async fn run_migration<R, D>(
    plan: &MigrationPlan,
    resolver: &R,
    deployer: &D,
) -> Result<MigrationReport, MigrationError>
where
    R: ArtifactResolver + ?Sized,
    D: Deployer + ?Sized,
{
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!(%run_id, steps = plan.len(), "migration started");

    let artifacts = plan.resolve(resolver)?;

    let mut deployed = Vec::with_capacity(plan.len());
    for (i, (step, artifact)) in plan.steps().iter().zip(&artifacts).enumerate() {
        let args: Vec<String> = step.args.iter().map(ToString::to_string).collect();
        info!(%run_id, step = i + 1, contract = step.name(), args = ?args, "deploying");

        let instance = deployer.deploy(artifact, &step.args).await.map_err(|source| {
            error!(%run_id, step = i + 1, contract = step.name(), error = %source, "deployment failed");
            MigrationError::DeploymentFailed {
                step: i + 1,
                contract: step.name().to_string(),
                source,
            }
        })?;

        info!(
            %run_id,
            step = i + 1,
            contract = %instance.contract_name,
            address = %instance.address,
            tx_hash = %instance.tx_hash,
            block = instance.block_number,
            "deployed"
        );
        deployed.push(instance);
    }

    let report = MigrationReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        deployed,
    };
    info!(%run_id, deployed = report.deployed.len(), "migration finished");
    Ok(report)
}
