use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Networks the migration knows how to target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Development,
    FantomTestnet,
    Fantom,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Development, Network::FantomTestnet, Network::Fantom];

    /// Config / CLI key for the network.
    pub fn key(&self) -> &'static str {
        match self {
            Network::Development => "development",
            Network::FantomTestnet => "fantom_testnet",
            Network::Fantom => "fantom",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Network::Development => "Local development node",
            Network::FantomTestnet => "Fantom Testnet",
            Network::Fantom => "Fantom Opera",
        }
    }

    /// EVM chain ID the node is expected to report.
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Development => 1337,
            Network::FantomTestnet => 4002,
            Network::Fantom => 250,
        }
    }

    /// Development nodes are accepted whatever chain id they report.
    pub fn accepts_any_chain(&self) -> bool {
        matches!(self, Network::Development)
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Development => "http://127.0.0.1:8545",
            Network::FantomTestnet => "https://rpc.testnet.fantom.network",
            Network::Fantom => "https://rpc.ftm.tools",
        }
    }

    pub fn explorer_url(&self) -> Option<&'static str> {
        match self {
            Network::Development => None,
            Network::FantomTestnet => Some("https://testnet.ftmscan.com"),
            Network::Fantom => Some("https://ftmscan.com"),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::ALL
            .into_iter()
            .find(|n| n.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<_> = Network::ALL.iter().map(|n| n.key()).collect();
                format!("unknown network '{s}' (expected one of: {})", known.join(", "))
            })
    }
}
