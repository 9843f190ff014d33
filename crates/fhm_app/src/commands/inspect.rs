//! Read-only commands: `plan`, `history` and `networks`.

use anyhow::Result;
use fhm_blockchain::{DeploymentStore, DirArtifactResolver, MigrationPlan, Network, RpcConfigStore};
use fhm_core::MigrateConfig;

use super::selected_network;

/// One resolved step of the plan, as printed by `plan`.
#[derive(Debug, PartialEq, Eq)]
pub struct PlannedStep {
    pub contract: String,
    pub args: Vec<String>,
    pub bytecode_len: usize,
    pub data_len: usize,
}

/// Resolve the artifacts and encode each step without touching the network.
pub fn plan_steps(config: &MigrateConfig) -> Result<Vec<PlannedStep>> {
    let plan = MigrationPlan::fantohm();
    let resolver = DirArtifactResolver::new(&config.artifacts_dir);
    let artifacts = plan.resolve(&resolver)?;

    plan.steps()
        .iter()
        .zip(&artifacts)
        .map(|(step, artifact)| -> Result<PlannedStep> {
            let data = artifact.deploy_data(&step.args)?;
            Ok(PlannedStep {
                contract: artifact.contract_name.clone(),
                args: step.args.iter().map(ToString::to_string).collect(),
                bytecode_len: artifact.bytecode.len(),
                data_len: data.len(),
            })
        })
        .collect()
}

pub fn plan(config: &MigrateConfig) -> Result<()> {
    let steps = plan_steps(config)?;

    println!("Artifacts: {}", config.artifacts_dir.display());
    for (i, step) in steps.iter().enumerate() {
        println!("{}. {}({})", i + 1, step.contract, step.args.join(", "));
        println!(
            "   bytecode {} bytes, creation data {} bytes",
            step.bytecode_len, step.data_len
        );
    }
    Ok(())
}

pub fn history(config: &MigrateConfig) -> Result<()> {
    let network = selected_network(config)?;
    let store = DeploymentStore::load_from_file(&config.deployments_file)?;
    let records = store.history(network);

    if records.is_empty() {
        println!("No deployments recorded for {network}");
        return Ok(());
    }

    println!("Deployments on {}:", network.label());
    for record in records {
        println!(
            "  {}  {:<20} {}  block {}  run {}",
            record.deployed_at.format("%Y-%m-%d %H:%M:%S"),
            record.contract_name,
            record.address,
            record.block_number,
            record.run_id
        );
    }
    Ok(())
}

pub fn networks(config: &MigrateConfig) -> Result<()> {
    let store = RpcConfigStore::from_config(config)?;
    for network in Network::ALL {
        let Some(rpc) = store.get_rpc(network) else {
            continue;
        };
        let marker = if network.key() == config.network { "*" } else { " " };
        let custom = if rpc.is_custom { " (custom)" } else { "" };
        println!(
            "{marker} {:<15} chain {:<5} {}{custom}",
            network.key(),
            network.chain_id(),
            rpc.url
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_artifact(dir: &std::path::Path, name: &str, inputs: serde_json::Value) {
        let json = format!(
            r#"{{"contractName":"{name}","abi":[{{"type":"constructor","inputs":{inputs},"stateMutability":"nonpayable"}}],"bytecode":"0x6080604052"}}"#
        );
        std::fs::write(dir.join(format!("{name}.json")), json).unwrap();
    }

    #[test]
    fn plan_steps_encode_both_contracts() {
        let tmp = tempfile::tempdir().unwrap();
        write_artifact(
            tmp.path(),
            "FHM",
            serde_json::json!([
                { "name": "supply", "type": "uint256", "internalType": "uint256" },
                { "name": "symbol", "type": "string", "internalType": "string" },
                { "name": "name", "type": "string", "internalType": "string" },
                { "name": "decimals", "type": "uint8", "internalType": "uint8" }
            ]),
        );
        write_artifact(
            tmp.path(),
            "MultiSigSwapWallet",
            serde_json::json!([
                { "name": "owner", "type": "address", "internalType": "address" },
                { "name": "param", "type": "uint256", "internalType": "uint256" },
                { "name": "collector", "type": "address", "internalType": "address" }
            ]),
        );

        let config = MigrateConfig {
            artifacts_dir: tmp.path().to_path_buf(),
            ..MigrateConfig::default()
        };
        let steps = plan_steps(&config).unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].contract, "FHM");
        assert_eq!(steps[0].args, ["10000000", "\"FHM\"", "\"Fantohm\"", "18"]);
        assert_eq!(steps[0].data_len, 5 + 8 * 32);
        assert_eq!(steps[1].contract, "MultiSigSwapWallet");
        assert_eq!(steps[1].data_len, 5 + 3 * 32);
    }

    #[test]
    fn plan_steps_fail_on_constructor_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let empty = serde_json::json!([]);
        write_artifact(tmp.path(), "FHM", empty.clone());
        write_artifact(tmp.path(), "MultiSigSwapWallet", empty);

        let config = MigrateConfig {
            artifacts_dir: tmp.path().to_path_buf(),
            ..MigrateConfig::default()
        };
        let err = plan_steps(&config).unwrap_err();
        assert!(err.to_string().contains("constructor takes 0 argument(s), 4 given"));
    }
}
