//! Implementation of the `fhm-migrate migrate` command.

use anyhow::{Context, Result};
use fhm_blockchain::{
    DeployerOptions, DeploymentStore, DirArtifactResolver, MigrationPlan, MigrationReport, Network,
    RpcConfigStore, RpcDeployer, http_provider, run_migration,
};
use fhm_core::MigrateConfig;
use tracing::info;

use super::selected_network;

pub async fn run(config: &MigrateConfig) -> Result<()> {
    let network = selected_network(config)?;

    let rpc_store = RpcConfigStore::from_config(config)?;
    let rpc = rpc_store
        .get_rpc(network)
        .with_context(|| format!("No RPC endpoint configured for {network}"))?;
    info!(network = %network, url = %rpc.url, custom = rpc.is_custom, "connecting");

    let provider = http_provider(rpc)?;
    let options = DeployerOptions::from_config(network, config)?;
    let deployer = RpcDeployer::new(provider, options);
    deployer
        .verify_chain()
        .await
        .with_context(|| format!("Node at {} is not usable for {network}", rpc.url))?;

    let resolver = DirArtifactResolver::new(&config.artifacts_dir);
    let report = run_migration(&MigrationPlan::fantohm(), &resolver, &deployer).await?;

    let mut store = DeploymentStore::load_from_file(&config.deployments_file)?;
    store.record(network, &report);
    store.save_to_file(&config.deployments_file)?;

    print_summary(network, &report);
    Ok(())
}

fn print_summary(network: Network, report: &MigrationReport) {
    println!("Migration {} on {}", report.run_id, network.label());
    for instance in &report.deployed {
        println!(
            "  {:<20} {}  (tx {}, block {}, gas {})",
            instance.contract_name,
            instance.address,
            instance.tx_hash,
            instance.block_number,
            instance.gas_used
        );
        if let Some(explorer) = network.explorer_url() {
            println!("  {:<20} {explorer}/address/{}", "", instance.address);
        }
    }
}
