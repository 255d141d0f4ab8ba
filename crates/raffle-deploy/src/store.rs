//! Compiled contract artifacts and per-network deployment records on disk.

use alloy_primitives::Bytes;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DeployError;
use crate::framework::DeploymentRecord;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledArtifact {
    #[serde(default)]
    pub contract_name: Option<String>,
    #[serde(default)]
    pub abi: serde_json::Value,
    bytecode: BytecodeField,
}

// Hardhat writes the bytecode as a hex string, Foundry nests it under `object`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Hex(Bytes),
    Object { object: Bytes },
}

impl CompiledArtifact {
    pub fn bytecode(&self) -> &Bytes {
        match &self.bytecode {
            BytecodeField::Hex(bytes) | BytecodeField::Object { object: bytes } => bytes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn candidates(&self, name: &str) -> [PathBuf; 2] {
        [
            self.root.join(format!("{name}.json")),
            self.root
                .join(format!("{name}.sol"))
                .join(format!("{name}.json")),
        ]
    }

    /// Hardhat mirrors the source tree, e.g. `contracts/Raffle.sol/Raffle.json`.
    fn search(&self, name: &str) -> Result<Vec<PathBuf>, DeployError> {
        let file_name = format!("{name}.json");
        let mut found = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            if !dir.is_dir() {
                continue;
            }
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    if path.file_name().and_then(|n| n.to_str()) != Some("build-info") {
                        pending.push(path);
                    }
                } else if path.file_name().and_then(|n| n.to_str()) == Some(file_name.as_str()) {
                    found.push(path);
                }
            }
        }

        found.sort();
        Ok(found)
    }

    fn locate(&self, name: &str) -> Result<PathBuf, DeployError> {
        let candidates = self.candidates(name);
        if let Some(path) = candidates.iter().find(|p| p.is_file()) {
            return Ok(path.clone());
        }

        let mut found = self.search(name)?;
        match found.len() {
            0 => Err(DeployError::Artifact {
                name: name.to_string(),
                reason: format!("not found under {}", self.root.display()),
            }),
            1 => Ok(found.remove(0)),
            _ => Err(DeployError::Artifact {
                name: name.to_string(),
                reason: format!(
                    "ambiguous, found {}",
                    found
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            }),
        }
    }

    pub fn load(&self, name: &str) -> Result<CompiledArtifact, DeployError> {
        let path = self.locate(name)?;

        let artifact: CompiledArtifact = serde_json::from_str(&fs::read_to_string(&path)?)
            .map_err(|e| DeployError::Artifact {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        if artifact.bytecode().is_empty() {
            return Err(DeployError::Artifact {
                name: name.to_string(),
                reason: "bytecode is empty (abstract contract or interface?)".to_string(),
            });
        }
        Ok(artifact)
    }
}

/// `<root>/<network>/<Contract>.json`, plus a `.chainId` marker per network.
#[derive(Debug, Clone)]
pub struct DeploymentStore {
    root: PathBuf,
}

impl DeploymentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn network_dir(&self, network: &str) -> PathBuf {
        self.root.join(network)
    }

    fn record_path(&self, network: &str, contract_name: &str) -> PathBuf {
        self.network_dir(network).join(format!("{contract_name}.json"))
    }

    pub fn save(
        &self,
        network: &str,
        chain_id: u64,
        record: &DeploymentRecord,
    ) -> Result<PathBuf, DeployError> {
        let dir = self.network_dir(network);
        fs::create_dir_all(&dir)?;
        write_if_changed(&dir.join(".chainId"), &chain_id.to_string())?;

        let path = self.record_path(network, &record.contract_name);
        fs::write(&path, serde_json::to_string_pretty(record)?)?;
        Ok(path)
    }

    pub fn load(&self, network: &str, contract_name: &str) -> Result<DeploymentRecord, DeployError> {
        let path = self.record_path(network, contract_name);
        if !path.is_file() {
            return Err(DeployError::NoDeployment {
                contract: contract_name.to_string(),
                network: network.to_string(),
            });
        }
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }
}

fn write_if_changed(path: &Path, contents: &str) -> Result<(), DeployError> {
    if fs::read_to_string(path).ok().as_deref() != Some(contents) {
        fs::write(path, contents)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, U256};

    fn record(name: &str) -> DeploymentRecord {
        DeploymentRecord {
            contract_name: name.to_string(),
            address: Address::with_last_byte(9),
            transaction_hash: B256::with_last_byte(3),
            args: vec![U256::from(250_000_000_000_000_000u64), U256::from(1_000_000_000u64)],
            abi: serde_json::json!([]),
            block_number: Some(1),
            gas_used: Some(1_000_000),
        }
    }

    #[test]
    fn test_hardhat_artifact() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Raffle.json"),
            r#"{"contractName":"Raffle","abi":[],"bytecode":"0x6080"}"#,
        )
        .unwrap();

        let artifact = ArtifactStore::new(dir.path()).load("Raffle").unwrap();
        assert_eq!(artifact.contract_name.as_deref(), Some("Raffle"));
        assert_eq!(artifact.bytecode().as_ref(), &[0x60, 0x80]);
    }

    #[test]
    fn test_foundry_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("Raffle.sol");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            nested.join("Raffle.json"),
            r#"{"abi":[],"bytecode":{"object":"0x6080604052","linkReferences":{}}}"#,
        )
        .unwrap();

        let artifact = ArtifactStore::new(dir.path()).load("Raffle").unwrap();
        assert_eq!(artifact.contract_name, None);
        assert_eq!(artifact.bytecode().len(), 5);
    }

    #[test]
    fn test_nested_hardhat_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("contracts/Raffle.sol");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            nested.join("Raffle.json"),
            r#"{"contractName":"Raffle","abi":[],"bytecode":"0x6080"}"#,
        )
        .unwrap();
        fs::write(
            nested.join("Raffle.dbg.json"),
            r#"{"buildInfo":"../../build-info/abc.json"}"#,
        )
        .unwrap();
        let build_info = dir.path().join("build-info");
        fs::create_dir_all(&build_info).unwrap();
        fs::write(build_info.join("Raffle.json"), "{}").unwrap();

        let artifact = ArtifactStore::new(dir.path()).load("Raffle").unwrap();
        assert_eq!(artifact.contract_name.as_deref(), Some("Raffle"));
        assert_eq!(artifact.bytecode().as_ref(), &[0x60, 0x80]);
    }

    #[test]
    fn test_chainlink_mock_artifact_path() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir
            .path()
            .join("@chainlink/contracts/src/v0.8/mocks/VRFCoordinatorV2Mock.sol");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            nested.join("VRFCoordinatorV2Mock.json"),
            r#"{"contractName":"VRFCoordinatorV2Mock","abi":[],"bytecode":"0x60806040"}"#,
        )
        .unwrap();

        let artifact = ArtifactStore::new(dir.path())
            .load("VRFCoordinatorV2Mock")
            .unwrap();
        assert_eq!(artifact.bytecode().len(), 4);
    }

    #[test]
    fn test_ambiguous_artifact_name() {
        let dir = tempfile::tempdir().unwrap();
        for source in ["contracts/Raffle.sol", "contracts/old/Raffle.sol"] {
            let nested = dir.path().join(source);
            fs::create_dir_all(&nested).unwrap();
            fs::write(nested.join("Raffle.json"), r#"{"abi":[],"bytecode":"0x6080"}"#).unwrap();
        }

        let err = ArtifactStore::new(dir.path()).load("Raffle").unwrap_err();
        assert!(matches!(err, DeployError::Artifact { .. }));
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn test_missing_or_empty_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(matches!(store.load("Raffle"), Err(DeployError::Artifact { .. })));

        fs::write(dir.path().join("IRaffle.json"), r#"{"abi":[],"bytecode":"0x"}"#).unwrap();
        let err = store.load("IRaffle").unwrap_err();
        assert!(err.to_string().contains("bytecode is empty"));
    }

    #[test]
    fn test_deployment_store_persists_per_network() {
        let dir = tempfile::tempdir().unwrap();
        let store = DeploymentStore::new(dir.path());

        let path = store.save("localhost", 31337, &record("VRFCoordinatorV2Mock")).unwrap();
        assert!(path.ends_with("localhost/VRFCoordinatorV2Mock.json"));
        assert_eq!(
            fs::read_to_string(dir.path().join("localhost/.chainId")).unwrap(),
            "31337"
        );

        let loaded = store.load("localhost", "VRFCoordinatorV2Mock").unwrap();
        assert_eq!(loaded, record("VRFCoordinatorV2Mock"));

        assert!(matches!(
            store.load("goerli", "VRFCoordinatorV2Mock"),
            Err(DeployError::NoDeployment { network, .. }) if network == "goerli"
        ));
    }
}
