use cosmwasm_schema::cw_serde;
use cosmwasm_std::{to_json_binary, Addr, IbcTimeout, IbcTimeoutBlock, StdResult, Timestamp};
use cw721::OwnerOfResponse;
use ics721_types::{
    instantiate::ContractInstantiateInfo,
    memo::{Ics721Callbacks, Ics721Memo},
    packet::IbcOutgoingMsg,
};
use serde::de::DeserializeOwned;

use crate::{
    chain::{ChainClient, ChainClientExt, ExecuteResult},
    error::E2eError,
};

#[cw_serde]
pub struct BridgeInstantiateMsg {
    pub cw721_base_code_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incoming_proxy: Option<ContractInstantiateInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outgoing_proxy: Option<ContractInstantiateInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pauser: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cw721_admin: Option<String>,
}

#[cw_serde]
pub enum BridgeExecuteMsg {
    AdminCleanAndBurnNft {
        owner: String,
        token_id: String,
        class_id: String,
        collection: String,
    },
    AdminCleanAndUnescrowNft {
        recipient: String,
        token_id: String,
        class_id: String,
        collection: String,
    },
}

/// Absent proxies are disabled by the migration.
#[cw_serde]
pub enum BridgeMigrateMsg {
    WithUpdate {
        #[serde(skip_serializing_if = "Option::is_none")]
        incoming_proxy: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        outgoing_proxy: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cw721_base_code_id: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pauser: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        cw721_admin: Option<String>,
    },
}

#[cw_serde]
pub enum BridgeQueryMsg {
    ClassId {
        contract: String,
    },
    NftContract {
        class_id: String,
    },
    NftContracts {},
    OutgoingChannels {},
    IncomingChannels {},
    Owner {
        class_id: String,
        token_id: String,
    },
    IncomingProxy {},
    OutgoingProxy {},
    Cw721CodeId {},
}

/// When a transfer stops being deliverable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeoutSpec {
    Block { revision: u64, height: u64 },
    /// Nanoseconds since the unix epoch.
    Timestamp(u64),
}

impl From<TimeoutSpec> for IbcTimeout {
    fn from(spec: TimeoutSpec) -> Self {
        match spec {
            TimeoutSpec::Block { revision, height } => {
                IbcTimeout::with_block(IbcTimeoutBlock { revision, height })
            }
            TimeoutSpec::Timestamp(nanos) => IbcTimeout::with_timestamp(Timestamp::from_nanos(nanos)),
        }
    }
}

pub fn ibc_outgoing_msg(
    receiver: &str,
    channel_id: &str,
    timeout: TimeoutSpec,
    memo: Option<String>,
) -> IbcOutgoingMsg {
    IbcOutgoingMsg {
        receiver: receiver.to_string(),
        channel_id: channel_id.to_string(),
        timeout: timeout.into(),
        memo,
    }
}

/// Base64 memo asking the bridges for ack and receive callbacks.
pub fn callback_memo(callbacks: Ics721Callbacks) -> StdResult<String> {
    let memo = Ics721Memo {
        callbacks: Some(callbacks),
    };
    Ok(to_json_binary(&memo)?.to_base64())
}

fn execute(
    client: &dyn ChainClient,
    bridge: &str,
    msg: &BridgeExecuteMsg,
) -> Result<ExecuteResult, E2eError> {
    client
        .execute_json(bridge, msg)
        .map_err(|source| E2eError::Execute {
            contract: bridge.to_string(),
            source,
        })
}

fn query<R: DeserializeOwned>(
    client: &dyn ChainClient,
    bridge: &str,
    msg: &BridgeQueryMsg,
) -> Result<R, E2eError> {
    client
        .query_json(bridge, msg)
        .map_err(|source| E2eError::Query {
            contract: bridge.to_string(),
            source,
        })
}

/// Starts an ics721 transfer by sending the NFT to `target`, the bridge
/// itself or an outgoing proxy in front of it.
pub fn transfer(
    client: &dyn ChainClient,
    cw721: &str,
    target: &str,
    msg: &IbcOutgoingMsg,
    token_id: &str,
) -> Result<ExecuteResult, E2eError> {
    super::cw721::send_nft(client, cw721, target, msg, token_id)
}

pub fn migrate_with_update(
    client: &dyn ChainClient,
    bridge: &str,
    code_id: u64,
    msg: &BridgeMigrateMsg,
) -> Result<ExecuteResult, E2eError> {
    client
        .migrate_json(bridge, code_id, msg)
        .map_err(|source| E2eError::Migrate {
            contract: bridge.to_string(),
            source,
        })
}

pub fn admin_clean_and_unescrow_nft(
    client: &dyn ChainClient,
    bridge: &str,
    recipient: &str,
    token_id: &str,
    class_id: &str,
    collection: &str,
) -> Result<ExecuteResult, E2eError> {
    execute(
        client,
        bridge,
        &BridgeExecuteMsg::AdminCleanAndUnescrowNft {
            recipient: recipient.to_string(),
            token_id: token_id.to_string(),
            class_id: class_id.to_string(),
            collection: collection.to_string(),
        },
    )
}

pub fn admin_clean_and_burn_nft(
    client: &dyn ChainClient,
    bridge: &str,
    owner: &str,
    token_id: &str,
    class_id: &str,
    collection: &str,
) -> Result<ExecuteResult, E2eError> {
    execute(
        client,
        bridge,
        &BridgeExecuteMsg::AdminCleanAndBurnNft {
            owner: owner.to_string(),
            token_id: token_id.to_string(),
            class_id: class_id.to_string(),
            collection: collection.to_string(),
        },
    )
}

pub fn nft_contract(
    client: &dyn ChainClient,
    bridge: &str,
    class_id: &str,
) -> Result<Option<Addr>, E2eError> {
    query(
        client,
        bridge,
        &BridgeQueryMsg::NftContract {
            class_id: class_id.to_string(),
        },
    )
}

pub fn class_id(
    client: &dyn ChainClient,
    bridge: &str,
    contract: &str,
) -> Result<Option<String>, E2eError> {
    query(
        client,
        bridge,
        &BridgeQueryMsg::ClassId {
            contract: contract.to_string(),
        },
    )
}

pub fn nft_contracts(
    client: &dyn ChainClient,
    bridge: &str,
) -> Result<Vec<(String, Addr)>, E2eError> {
    query(client, bridge, &BridgeQueryMsg::NftContracts {})
}

pub fn outgoing_channels(
    client: &dyn ChainClient,
    bridge: &str,
) -> Result<Vec<((String, String), String)>, E2eError> {
    query(client, bridge, &BridgeQueryMsg::OutgoingChannels {})
}

pub fn incoming_channels(
    client: &dyn ChainClient,
    bridge: &str,
) -> Result<Vec<((String, String), String)>, E2eError> {
    query(client, bridge, &BridgeQueryMsg::IncomingChannels {})
}

pub fn owner(
    client: &dyn ChainClient,
    bridge: &str,
    class_id: &str,
    token_id: &str,
) -> Result<OwnerOfResponse, E2eError> {
    query(
        client,
        bridge,
        &BridgeQueryMsg::Owner {
            class_id: class_id.to_string(),
            token_id: token_id.to_string(),
        },
    )
}

pub fn incoming_proxy(client: &dyn ChainClient, bridge: &str) -> Result<Option<Addr>, E2eError> {
    query(client, bridge, &BridgeQueryMsg::IncomingProxy {})
}

pub fn outgoing_proxy(client: &dyn ChainClient, bridge: &str) -> Result<Option<Addr>, E2eError> {
    query(client, bridge, &BridgeQueryMsg::OutgoingProxy {})
}

pub fn cw721_code_id(client: &dyn ChainClient, bridge: &str) -> Result<u64, E2eError> {
    query(client, bridge, &BridgeQueryMsg::Cw721CodeId {})
}

#[cfg(test)]
mod tests {
    use cosmwasm_std::{from_json, Binary};
    use rstest::rstest;

    use super::*;

    #[test]
    fn with_update_leaves_out_absent_fields() {
        let msg = BridgeMigrateMsg::WithUpdate {
            incoming_proxy: Some("wasm1proxy".to_string()),
            outgoing_proxy: None,
            cw721_base_code_id: None,
            pauser: None,
            cw721_admin: None,
        };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"with_update":{"incoming_proxy":"wasm1proxy"}}"#
        );
    }

    #[test]
    fn registry_queries_are_empty_objects() {
        assert_eq!(
            serde_json::to_string(&BridgeQueryMsg::OutgoingChannels {}).unwrap(),
            r#"{"outgoing_channels":{}}"#
        );
        assert_eq!(
            serde_json::to_string(&BridgeQueryMsg::NftContracts {}).unwrap(),
            r#"{"nft_contracts":{}}"#
        );
    }

    #[rstest]
    #[case(TimeoutSpec::Block { revision: 1, height: 90000 }, Some((1, 90000)), None)]
    #[case(TimeoutSpec::Timestamp(1_700_000_000_000_000_000), None, Some(1_700_000_000_000_000_000))]
    fn timeout_kinds(
        #[case] spec: TimeoutSpec,
        #[case] block: Option<(u64, u64)>,
        #[case] nanos: Option<u64>,
    ) {
        let msg = ibc_outgoing_msg("osmo1owner", "channel-0", spec, None);
        assert_eq!(msg.timeout.block().map(|b| (b.revision, b.height)), block);
        assert_eq!(msg.timeout.timestamp().map(|t| t.nanos()), nanos);
    }

    #[test]
    fn callback_memo_is_base64_json() {
        let memo = callback_memo(Ics721Callbacks {
            ack_callback_data: Some(Binary::from(b"ack".to_vec())),
            ..Ics721Callbacks::default()
        })
        .unwrap();
        let decoded: Ics721Memo = from_json(Binary::from_base64(&memo).unwrap().as_slice()).unwrap();
        let callbacks = decoded.callbacks.unwrap();
        assert_eq!(callbacks.ack_callback_data, Some(Binary::from(b"ack".to_vec())));
        assert_eq!(callbacks.receive_callback_addr, None);
    }
}
