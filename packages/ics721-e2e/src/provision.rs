use std::{collections::BTreeMap, path::PathBuf};

use cosmwasm_std::{to_json_binary, Binary, StdResult};
use ics721_types::instantiate::ContractInstantiateInfo;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    chain::{ChainClient, ChainClientExt},
    config::E2eConfig,
    error::E2eError,
    msg::ics721::BridgeInstantiateMsg,
    relay::Side,
};

/// Where to find a contract binary and, optionally, how to instantiate it.
#[derive(Clone, Debug, PartialEq)]
pub struct ContractMsg {
    pub path: String,
    pub instantiate_msg: Option<Binary>,
}

impl ContractMsg {
    pub fn upload_only(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            instantiate_msg: None,
        }
    }

    pub fn instantiate<M: Serialize>(path: impl Into<String>, msg: &M) -> StdResult<Self> {
        Ok(Self {
            path: path.into(),
            instantiate_msg: Some(to_json_binary(msg)?),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContractRecord {
    pub logical_name: String,
    pub code_id: u64,
    /// Set once the contract is instantiated.
    pub address: Option<String>,
}

pub type ContractMap = BTreeMap<String, ContractRecord>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProvisionedContracts {
    pub a: ContractMap,
    pub b: ContractMap,
}

impl ProvisionedContracts {
    pub fn side(&self, side: Side) -> &ContractMap {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut ContractMap {
        match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        }
    }

    pub fn record(&self, side: Side, name: &str) -> Result<&ContractRecord, E2eError> {
        self.side(side)
            .get(name)
            .ok_or_else(|| E2eError::UnknownContract(format!("{name} on {side}")))
    }

    pub fn code_id(&self, side: Side, name: &str) -> Result<u64, E2eError> {
        Ok(self.record(side, name)?.code_id)
    }

    pub fn address(&self, side: Side, name: &str) -> Result<&str, E2eError> {
        self.record(side, name)?
            .address
            .as_deref()
            .ok_or_else(|| E2eError::UnknownContract(format!("{name} on {side} is not instantiated")))
    }
}

/// Source of contract binaries.
pub trait ArtifactStore {
    fn load(&self, path: &str) -> Result<Vec<u8>, E2eError>;
}

/// Reads binaries relative to a fixed directory.
#[derive(Clone, Debug, PartialEq)]
pub struct FsArtifacts {
    pub root: PathBuf,
}

impl From<&E2eConfig> for FsArtifacts {
    fn from(config: &E2eConfig) -> Self {
        Self {
            root: config.artifact_root.clone(),
        }
    }
}

impl ArtifactStore for FsArtifacts {
    fn load(&self, path: &str) -> Result<Vec<u8>, E2eError> {
        std::fs::read(self.root.join(path)).map_err(|source| E2eError::Artifact {
            path: path.to_string(),
            source,
        })
    }
}

/// Uploads every entry, duplicates included, and instantiates those with
/// an instantiate message. The first failure aborts the batch.
pub fn upload_and_instantiate(
    client: &dyn ChainClient,
    artifacts: &dyn ArtifactStore,
    contracts: &[(&str, ContractMsg)],
) -> Result<ContractMap, E2eError> {
    let sender = client.sender();
    let mut records = ContractMap::new();
    for (name, contract) in contracts {
        let wasm = artifacts.load(&contract.path)?;
        let code_id = client
            .upload(&wasm, &format!("Upload {name}"))
            .map_err(|source| E2eError::Upload {
                name: name.to_string(),
                source,
            })?;
        debug!(chain_id = %client.chain_id(), name, code_id, "uploaded");

        let address = match &contract.instantiate_msg {
            Some(msg) => {
                let address = client
                    .instantiate(code_id, msg, &format!("label {name}"), Some(&sender))
                    .map_err(|source| E2eError::Instantiate {
                        name: name.to_string(),
                        source,
                    })?;
                debug!(chain_id = %client.chain_id(), name, %address, "instantiated");
                Some(address)
            }
            None => None,
        };
        records.insert(
            name.to_string(),
            ContractRecord {
                logical_name: name.to_string(),
                code_id,
                address,
            },
        );
    }
    info!(chain_id = %client.chain_id(), contracts = records.len(), "provisioned");
    Ok(records)
}

pub fn upload_and_instantiate_all(
    a: &dyn ChainClient,
    b: &dyn ChainClient,
    artifacts: &dyn ArtifactStore,
    contracts_a: &[(&str, ContractMsg)],
    contracts_b: &[(&str, ContractMsg)],
) -> Result<ProvisionedContracts, E2eError> {
    Ok(ProvisionedContracts {
        a: upload_and_instantiate(a, artifacts, contracts_a)?,
        b: upload_and_instantiate(b, artifacts, contracts_b)?,
    })
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BridgeProxies {
    pub incoming: Option<ContractInstantiateInfo>,
    pub outgoing: Option<ContractInstantiateInfo>,
}

/// Second provisioning phase: the bridge needs the code id of the cw721
/// uploaded with it. The sender becomes admin, pauser and voucher
/// collection admin.
pub fn instantiate_bridge(
    client: &dyn ChainClient,
    bridge_code_id: u64,
    cw721_code_id: u64,
    proxies: BridgeProxies,
) -> Result<String, E2eError> {
    let sender = client.sender();
    let msg = BridgeInstantiateMsg {
        cw721_base_code_id: cw721_code_id,
        incoming_proxy: proxies.incoming,
        outgoing_proxy: proxies.outgoing,
        pauser: Some(sender.clone()),
        cw721_admin: Some(sender.clone()),
    };
    let address = client
        .instantiate_json(bridge_code_id, &msg, "label ics721", Some(&sender))
        .map_err(|source| E2eError::Instantiate {
            name: "ics721".to_string(),
            source,
        })?;
    info!(chain_id = %client.chain_id(), %address, cw721_code_id, "bridge instantiated");
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn artifacts_load_from_the_configured_root() {
        let root = std::env::temp_dir().join(format!("ics721-e2e-artifacts-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("ics721.wasm"), b"\0asm").unwrap();
        let config = E2eConfig {
            artifact_root: root.clone(),
            ..E2eConfig::default()
        };

        let artifacts = FsArtifacts::from(&config);
        assert_eq!(artifacts.root, root);
        assert_eq!(artifacts.load("ics721.wasm").unwrap(), b"\0asm".to_vec());
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn missing_artifact_names_the_path() {
        let artifacts = FsArtifacts {
            root: PathBuf::from("/nonexistent"),
        };
        match artifacts.load("ics721.wasm") {
            Err(E2eError::Artifact { path, .. }) => assert_eq!(path, "ics721.wasm"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_records_are_errors() {
        let mut contracts = ProvisionedContracts::default();
        contracts.side_mut(Side::A).insert(
            "cw721".to_string(),
            ContractRecord {
                logical_name: "cw721".to_string(),
                code_id: 1,
                address: None,
            },
        );
        assert_eq!(contracts.code_id(Side::A, "cw721").unwrap(), 1);
        assert!(matches!(
            contracts.address(Side::A, "cw721"),
            Err(E2eError::UnknownContract(_))
        ));
        assert!(contracts.record(Side::B, "cw721").is_err());
    }
}
