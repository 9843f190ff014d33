use std::path::{Path, PathBuf};

use alloy::json_abi::JsonAbi;
use alloy::primitives::{Bytes, hex};
use serde::Deserialize;
use tracing::debug;

use crate::abi::{AbiValue, encode_constructor};
use crate::error::DeployError;

/// A compiled contract: ABI plus creation bytecode.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub contract_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

/// On-disk artifact layout written by the Solidity build step.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
    contract_name: Option<String>,
    abi: serde_json::Value,
    #[serde(default)]
    bytecode: String,
}

impl Artifact {
    /// Parse an artifact JSON document for contract `name`.
    pub fn from_json(name: &str, json: &str) -> Result<Self, DeployError> {
        let file: ArtifactFile = serde_json::from_str(json)
            .map_err(|e| DeployError::artifact(name, format!("malformed artifact JSON: {e}")))?;

        let digits = file.bytecode.trim().trim_start_matches("0x");
        if digits.is_empty() {
            return Err(DeployError::artifact(
                name,
                "no creation bytecode (abstract contract or interface?)",
            ));
        }
        if digits.contains("__") {
            return Err(DeployError::artifact(
                name,
                "bytecode contains unlinked library placeholders",
            ));
        }
        let bytecode = hex::decode(digits)
            .map_err(|e| DeployError::artifact(name, format!("invalid bytecode hex: {e}")))?;

        if !file.abi.is_array() {
            return Err(DeployError::artifact(name, "ABI is not a JSON array"));
        }
        let abi: JsonAbi = serde_json::from_value(file.abi)
            .map_err(|e| DeployError::artifact(name, format!("malformed ABI: {e}")))?;

        Ok(Self {
            contract_name: file.contract_name.unwrap_or_else(|| name.to_string()),
            abi,
            bytecode: bytecode.into(),
        })
    }

    /// Creation transaction payload: bytecode followed by the encoded
    /// constructor arguments.
    pub fn deploy_data(&self, args: &[AbiValue]) -> Result<Bytes, DeployError> {
        let encoded = encode_constructor(&self.abi, args)?;
        let mut data = Vec::with_capacity(self.bytecode.len() + encoded.len());
        data.extend_from_slice(&self.bytecode);
        data.extend_from_slice(&encoded);
        Ok(data.into())
    }
}

/// Maps a symbolic contract name to its compiled artifact.
pub trait ArtifactResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Artifact, DeployError>;
}

/// Reduce a source-style reference (`./src/contracts/FHM.sol`) to the bare
/// contract name (`FHM`).
pub fn contract_name(reference: &str) -> &str {
    let file = reference
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(reference);
    file.strip_suffix(".sol")
        .or_else(|| file.strip_suffix(".json"))
        .unwrap_or(file)
}

/// Resolves artifacts from `<dir>/<Name>.json`.
#[derive(Debug, Clone)]
pub struct DirArtifactResolver {
    dir: PathBuf,
}

impl DirArtifactResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, reference: &str) -> PathBuf {
        self.dir.join(format!("{}.json", contract_name(reference)))
    }
}

impl ArtifactResolver for DirArtifactResolver {
    fn resolve(&self, reference: &str) -> Result<Artifact, DeployError> {
        let name = contract_name(reference);
        let path = self.path_for(reference);
        let json = std::fs::read_to_string(&path)
            .map_err(|e| DeployError::artifact(name, format!("cannot read {}: {e}", path.display())))?;
        let artifact = Artifact::from_json(name, &json)?;
        debug!(
            contract = %artifact.contract_name,
            path = %path.display(),
            bytecode_len = artifact.bytecode.len(),
            "artifact resolved"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn artifact_json(bytecode: &str) -> String {
        json!({
            "contractName": "FHM",
            "abi": [{
                "type": "constructor",
                "inputs": [{ "name": "supply", "type": "uint256", "internalType": "uint256" }],
                "stateMutability": "nonpayable"
            }],
            "bytecode": bytecode,
        })
        .to_string()
    }

    #[test]
    fn contract_name_strips_path_and_extension() {
        assert_eq!(contract_name("./src/contracts/FHM.sol"), "FHM");
        assert_eq!(contract_name("MultiSigSwapWallet"), "MultiSigSwapWallet");
        assert_eq!(contract_name("build\\contracts\\FHM.json"), "FHM");
    }

    #[test]
    fn parses_artifact_and_builds_deploy_data() {
        let artifact = Artifact::from_json("FHM", &artifact_json("0x6080604052")).unwrap();
        assert_eq!(artifact.contract_name, "FHM");
        assert_eq!(&artifact.bytecode[..], [0x60, 0x80, 0x60, 0x40, 0x52]);
        assert_eq!(artifact.abi.constructor().unwrap().inputs.len(), 1);

        let data = artifact.deploy_data(&[AbiValue::Uint(1)]).unwrap();
        assert_eq!(data.len(), 5 + 32);
        assert_eq!(&data[..5], &artifact.bytecode[..]);
        assert_eq!(data[data.len() - 1], 1);
    }

    #[test]
    fn rejects_empty_bytecode() {
        let err = Artifact::from_json("IERC20", &artifact_json("0x")).unwrap_err();
        assert!(err.to_string().contains("no creation bytecode"));
    }

    #[test]
    fn rejects_unlinked_libraries() {
        let err = Artifact::from_json("FHM", &artifact_json("0x6080__SafeMath______73")).unwrap_err();
        assert!(err.to_string().contains("unlinked library"));
    }

    #[test]
    fn rejects_non_array_and_malformed_abi() {
        let not_array = json!({ "contractName": "FHM", "abi": {}, "bytecode": "0x00" }).to_string();
        let err = Artifact::from_json("FHM", &not_array).unwrap_err();
        assert!(err.to_string().contains("ABI is not a JSON array"));

        let bad_item = json!({
            "contractName": "FHM",
            "abi": [{ "type": "constructor", "inputs": "supply" }],
            "bytecode": "0x00",
        })
        .to_string();
        let err = Artifact::from_json("FHM", &bad_item).unwrap_err();
        assert!(err.to_string().contains("malformed ABI"));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Artifact::from_json("FHM", "{ not json").unwrap_err();
        assert!(matches!(err, DeployError::Artifact { .. }));
    }

    #[test]
    fn dir_resolver_reads_by_contract_name() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("FHM.json"), artifact_json("0x00")).unwrap();

        let resolver = DirArtifactResolver::new(tmp.path());
        let artifact = resolver.resolve("./src/contracts/FHM.sol").unwrap();
        assert_eq!(artifact.contract_name, "FHM");
    }

    #[test]
    fn dir_resolver_reports_missing_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let resolver = DirArtifactResolver::new(tmp.path());
        let err = resolver.resolve("MultiSigSwapWallet").unwrap_err();
        match err {
            DeployError::Artifact { contract, reason } => {
                assert_eq!(contract, "MultiSigSwapWallet");
                assert!(reason.contains("cannot read"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
