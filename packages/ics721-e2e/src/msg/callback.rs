//! The callback tester: a contract that records what it saw when the
//! bridges called it back, and that sends NFTs it owns so it becomes the
//! packet's sender.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{to_json_binary, Addr, IbcTimeout, StdResult};
use cw721::OwnerOfResponse;
use ics721_types::memo::Ics721Callbacks;
use serde::de::DeserializeOwned;

use super::ics721::{callback_memo, TimeoutSpec};
use crate::{
    chain::{ChainClient, ChainClientExt, ExecuteResult},
    error::E2eError,
};

#[cw_serde]
pub struct CallbackTesterInstantiateMsg {
    /// Callbacks from anyone else are refused.
    pub ics721: String,
}

/// Callback data the tester understands.
#[cw_serde]
#[derive(Copy)]
pub enum TesterCallback {
    /// Record the token's owner when the ack arrives.
    NftSent {},
    /// Record the token's owner when the voucher is minted.
    NftReceived {},
    FailCallback {},
}

#[cw_serde]
pub enum CallbackTesterExecuteMsg {
    SendNft {
        cw721: String,
        ics721: String,
        token_id: String,
        recipient: String,
        channel_id: String,
        timeout: IbcTimeout,
        #[serde(skip_serializing_if = "Option::is_none")]
        memo: Option<String>,
    },
}

#[cw_serde]
pub enum CallbackTesterQueryMsg {
    GetSentCallback {},
    GetReceivedCallback {},
    GetNftContract {},
}

/// Resolved callback request: data for each side plus an optional
/// explicit address. Without one the bridge calls the packet's sender
/// (ack) or receiver (receive).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallbackMemo {
    pub ack: Option<(TesterCallback, Option<String>)>,
    pub receive: Option<(TesterCallback, Option<String>)>,
}

impl CallbackMemo {
    pub fn to_memo(&self) -> StdResult<String> {
        let mut callbacks = Ics721Callbacks::default();
        if let Some((data, addr)) = &self.ack {
            callbacks.ack_callback_data = Some(to_json_binary(data)?);
            callbacks.ack_callback_addr = addr.clone();
        }
        if let Some((data, addr)) = &self.receive {
            callbacks.receive_callback_data = Some(to_json_binary(data)?);
            callbacks.receive_callback_addr = addr.clone();
        }
        callback_memo(callbacks)
    }
}

fn query<R: DeserializeOwned>(
    client: &dyn ChainClient,
    tester: &str,
    msg: &CallbackTesterQueryMsg,
) -> Result<R, E2eError> {
    client
        .query_json(tester, msg)
        .map_err(|source| E2eError::Query {
            contract: tester.to_string(),
            source,
        })
}

/// Has `tester` send a token it owns to `ics721`.
#[allow(clippy::too_many_arguments)]
pub fn send_nft(
    client: &dyn ChainClient,
    tester: &str,
    cw721: &str,
    ics721: &str,
    token_id: &str,
    recipient: &str,
    channel_id: &str,
    timeout: TimeoutSpec,
    memo: Option<String>,
) -> Result<ExecuteResult, E2eError> {
    let msg = CallbackTesterExecuteMsg::SendNft {
        cw721: cw721.to_string(),
        ics721: ics721.to_string(),
        token_id: token_id.to_string(),
        recipient: recipient.to_string(),
        channel_id: channel_id.to_string(),
        timeout: timeout.into(),
        memo,
    };
    client
        .execute_json(tester, &msg)
        .map_err(|source| E2eError::Execute {
            contract: tester.to_string(),
            source,
        })
}

/// Owner recorded by the last ack callback, `None` when the token was
/// already burned or no ack callback ran.
pub fn sent_callback(
    client: &dyn ChainClient,
    tester: &str,
) -> Result<Option<OwnerOfResponse>, E2eError> {
    query(client, tester, &CallbackTesterQueryMsg::GetSentCallback {})
}

pub fn received_callback(
    client: &dyn ChainClient,
    tester: &str,
) -> Result<Option<OwnerOfResponse>, E2eError> {
    query(client, tester, &CallbackTesterQueryMsg::GetReceivedCallback {})
}

pub fn nft_contract(client: &dyn ChainClient, tester: &str) -> Result<Option<Addr>, E2eError> {
    query(client, tester, &CallbackTesterQueryMsg::GetNftContract {})
}

#[cfg(test)]
mod tests {
    use cosmwasm_std::{from_json, Binary};
    use ics721_types::memo::parse_callbacks;

    use super::*;

    #[test]
    fn memo_keeps_default_addresses_out() {
        let memo = CallbackMemo {
            ack: Some((TesterCallback::NftSent {}, None)),
            receive: Some((TesterCallback::NftReceived {}, Some("osmo1tester".to_string()))),
        }
        .to_memo()
        .unwrap();
        let callbacks = parse_callbacks(Some(&memo)).unwrap();
        assert_eq!(callbacks.ack_callback_addr, None);
        assert_eq!(callbacks.receive_callback_addr.as_deref(), Some("osmo1tester"));
        let data: TesterCallback = from_json(callbacks.ack_callback_data.unwrap()).unwrap();
        assert_eq!(data, TesterCallback::NftSent {});
        assert_eq!(
            callbacks.receive_callback_data,
            Some(Binary::from(br#"{"nft_received":{}}"#.to_vec()))
        );
    }

    #[test]
    fn send_nft_leaves_out_an_absent_memo() {
        let msg = CallbackTesterExecuteMsg::SendNft {
            cw721: "c".to_string(),
            ics721: "i".to_string(),
            token_id: "1".to_string(),
            recipient: "r".to_string(),
            channel_id: "channel-0".to_string(),
            timeout: TimeoutSpec::Block {
                revision: 1,
                height: 5,
            }
            .into(),
            memo: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("memo"), "{json}");
    }
}
