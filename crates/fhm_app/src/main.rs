//! fhm-migrate: deploy the Fantohm token and multi-sig swap wallet.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fhm_blockchain::Network;
use fhm_core::{MigrateConfig, logging};
use tracing::error;

use commands::CliOverrides;

#[derive(Parser)]
#[command(name = "fhm-migrate")]
#[command(about = "Deploy the Fantohm token and multi-sig swap wallet")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./fhm-migrate.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy FHM, then MultiSigSwapWallet, and record the addresses
    Migrate {
        /// Target network (overrides the config file)
        #[arg(short, long)]
        network: Option<Network>,

        /// Directory of compiled contract artifacts
        #[arg(long)]
        artifacts: Option<PathBuf>,

        /// JSON-RPC endpoint for the target network
        #[arg(long)]
        rpc_url: Option<String>,

        /// Sender account (defaults to the node's first unlocked account)
        #[arg(long)]
        from: Option<String>,
    },

    /// Resolve artifacts and show what would be deployed, without sending anything
    Plan {
        /// Directory of compiled contract artifacts
        #[arg(long)]
        artifacts: Option<PathBuf>,
    },

    /// Show recorded deployments
    History {
        /// Network to show (defaults to the configured network)
        #[arg(short, long)]
        network: Option<Network>,
    },

    /// List known networks and their endpoints
    Networks,
}

impl Commands {
    /// The command-line values this subcommand layers over the config.
    fn overrides(&self) -> CliOverrides {
        match self {
            Self::Migrate {
                network,
                artifacts,
                rpc_url,
                from,
            } => CliOverrides {
                network: *network,
                artifacts: artifacts.clone(),
                rpc_url: rpc_url.clone(),
                from: from.clone(),
            },
            Self::Plan { artifacts } => CliOverrides {
                artifacts: artifacts.clone(),
                ..Default::default()
            },
            Self::History { network } => CliOverrides {
                network: *network,
                ..Default::default()
            },
            Self::Networks => CliOverrides::default(),
        }
    }
}

/// Config file, then `FHM_*` environment, then command-line values.
fn load_config(
    path: Option<&std::path::Path>,
    overrides: CliOverrides,
) -> anyhow::Result<MigrateConfig> {
    let mut config = MigrateConfig::load(path)?;
    overrides.apply(&mut config)?;
    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref(), cli.command.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    // Logging is best-effort; a missing home directory should not block a deploy.
    let guard = match logging::init_logging(&config.log_level) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: file logging disabled: {e:#}");
            None
        }
    };

    let result = match cli.command {
        Commands::Migrate { .. } => commands::migrate::run(&config).await,
        Commands::Plan { .. } => commands::inspect::plan(&config),
        Commands::History { .. } => commands::inspect::history(&config),
        Commands::Networks => commands::inspect::networks(&config),
    };

    if let Err(e) = result {
        error!("{e:#}");
        eprintln!("Error: {e:#}");
        drop(guard);
        std::process::exit(1);
    }
}
