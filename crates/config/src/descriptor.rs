//! The contract interface descriptor produced by the contract build step.

use crate::error::ConfigError;
use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The subset of a hardhat-style artifact (`artifacts/contracts/<Source>.sol/<Name>.json`) the ATM
/// consumes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Artifact {
    contract_name: String,
    #[serde(default)]
    source_name: Option<String>,
    abi: JsonAbi,
}

/// A remote contract's name, deployed address and interface shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractDescriptor {
    pub name: String,
    pub source: Option<String>,
    pub address: Address,
    pub abi: JsonAbi,
}

impl ContractDescriptor {
    /// Reads the artifact at `path` and binds it to the deployed `address`.
    pub fn load(path: impl AsRef<Path>, address: Address) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        trace!(path = %path.display(), "loading contract artifact");
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::ArtifactIo { path: path.to_path_buf(), source })?;
        Self::from_json(&content, address)
            .map_err(|source| ConfigError::ArtifactJson { path: PathBuf::from(path), source })
    }

    /// Parses an artifact from its JSON representation.
    pub fn from_json(json: &str, address: Address) -> Result<Self, serde_json::Error> {
        let Artifact { contract_name, source_name, abi } = serde_json::from_str(json)?;
        Ok(Self { name: contract_name, source: source_name, address, abi })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const ATM: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

    const ARTIFACT: &str = r#"{
        "_format": "hh-sol-artifact-1",
        "contractName": "Assessment",
        "sourceName": "contracts/Assessment.sol",
        "abi": [
            {
                "inputs": [],
                "name": "getBalance",
                "outputs": [{ "internalType": "uint256", "name": "", "type": "uint256" }],
                "stateMutability": "view",
                "type": "function"
            },
            {
                "inputs": [{ "internalType": "uint256", "name": "_amount", "type": "uint256" }],
                "name": "deposit",
                "outputs": [],
                "stateMutability": "payable",
                "type": "function"
            }
        ],
        "bytecode": "0x",
        "deployedBytecode": "0x",
        "linkReferences": {},
        "deployedLinkReferences": {}
    }"#;

    #[test]
    fn parses_hardhat_artifact() {
        let descriptor = ContractDescriptor::from_json(ARTIFACT, ATM).unwrap();
        assert_eq!(descriptor.name, "Assessment");
        assert_eq!(descriptor.source.as_deref(), Some("contracts/Assessment.sol"));
        assert_eq!(descriptor.address, ATM);
        assert!(descriptor.abi.function("getBalance").is_some());
        assert!(descriptor.abi.function("deposit").is_some());
        assert!(descriptor.abi.function("withdraw").is_none());
    }

    #[test]
    fn load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("Assessment.json");
        let err = ContractDescriptor::load(&missing, ATM).unwrap_err();
        assert!(matches!(err, ConfigError::ArtifactIo { .. }));
        assert!(err.to_string().contains("Assessment.json"), "{err}");

        let broken = dir.path().join("Broken.json");
        std::fs::write(&broken, r#"{ "contractName": "Assessment" }"#).unwrap();
        let err = ContractDescriptor::load(&broken, ATM).unwrap_err();
        assert!(matches!(err, ConfigError::ArtifactJson { .. }));

        let valid = dir.path().join("Valid.json");
        std::fs::write(&valid, ARTIFACT).unwrap();
        let descriptor = ContractDescriptor::load(&valid, ATM).unwrap();
        assert_eq!(descriptor.name, "Assessment");
    }
}
