use cosmwasm_schema::cw_serde;
use cosmwasm_std::{to_json_binary, Binary, Empty};
use cw721::{ContractInfoResponse, NftInfoResponse, NumTokensResponse, OwnerOfResponse, TokensResponse};
use cw_utils::Expiration;
use serde::Serialize;

use crate::{
    chain::{ChainClient, ChainClientExt, ExecuteResult},
    error::E2eError,
};

#[cw_serde]
pub enum Cw721ExecuteMsg {
    Mint {
        token_id: String,
        owner: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        token_uri: Option<String>,
    },
    TransferNft {
        recipient: String,
        token_id: String,
    },
    SendNft {
        contract: String,
        token_id: String,
        msg: Binary,
    },
    Approve {
        spender: String,
        token_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        expires: Option<Expiration>,
    },
    Burn {
        token_id: String,
    },
}

#[cw_serde]
pub enum Cw721QueryMsg {
    OwnerOf {
        token_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        include_expired: Option<bool>,
    },
    NumTokens {},
    AllTokens {
        #[serde(skip_serializing_if = "Option::is_none")]
        start_after: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
    },
    NftInfo {
        token_id: String,
    },
    ContractInfo {},
}

/// Instantiate shapes of the cw721-base releases in use.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Cw721InstantiateMsg {
    /// v0.16 and earlier.
    V016 {
        name: String,
        symbol: String,
        minter: String,
    },
    /// v0.18. The withdraw address is only known to the git releases
    /// after 0.18.0, so it is left out unless set.
    V018 {
        name: String,
        symbol: String,
        minter: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        withdraw_address: Option<String>,
    },
}

/// Instantiate message of the misbehaving test collection: every transfer
/// signed by `target` fails.
#[cw_serde]
pub struct Cw721TesterInstantiateMsg {
    pub name: String,
    pub symbol: String,
    pub minter: String,
    pub target: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cw721Version {
    V016,
    V018,
}

pub fn cw721_instantiate_msg(
    version: Cw721Version,
    name: &str,
    symbol: &str,
    minter: &str,
) -> Cw721InstantiateMsg {
    match version {
        Cw721Version::V016 => Cw721InstantiateMsg::V016 {
            name: name.to_string(),
            symbol: symbol.to_string(),
            minter: minter.to_string(),
        },
        Cw721Version::V018 => Cw721InstantiateMsg::V018 {
            name: name.to_string(),
            symbol: symbol.to_string(),
            minter: minter.to_string(),
            withdraw_address: None,
        },
    }
}

fn execute(
    client: &dyn ChainClient,
    cw721: &str,
    msg: &Cw721ExecuteMsg,
) -> Result<ExecuteResult, E2eError> {
    client
        .execute_json(cw721, msg)
        .map_err(|source| E2eError::Execute {
            contract: cw721.to_string(),
            source,
        })
}

fn query<R: serde::de::DeserializeOwned>(
    client: &dyn ChainClient,
    cw721: &str,
    msg: &Cw721QueryMsg,
) -> Result<R, E2eError> {
    client
        .query_json(cw721, msg)
        .map_err(|source| E2eError::Query {
            contract: cw721.to_string(),
            source,
        })
}

pub fn mint(
    client: &dyn ChainClient,
    cw721: &str,
    token_id: &str,
    owner: &str,
    token_uri: Option<&str>,
) -> Result<ExecuteResult, E2eError> {
    execute(
        client,
        cw721,
        &Cw721ExecuteMsg::Mint {
            token_id: token_id.to_string(),
            owner: owner.to_string(),
            token_uri: token_uri.map(str::to_string),
        },
    )
}

pub fn transfer_nft(
    client: &dyn ChainClient,
    cw721: &str,
    recipient: &str,
    token_id: &str,
) -> Result<ExecuteResult, E2eError> {
    execute(
        client,
        cw721,
        &Cw721ExecuteMsg::TransferNft {
            recipient: recipient.to_string(),
            token_id: token_id.to_string(),
        },
    )
}

/// Sends `token_id` to `contract`, which receives `msg` as json.
pub fn send_nft<M: Serialize + ?Sized>(
    client: &dyn ChainClient,
    cw721: &str,
    contract: &str,
    msg: &M,
    token_id: &str,
) -> Result<ExecuteResult, E2eError> {
    execute(
        client,
        cw721,
        &Cw721ExecuteMsg::SendNft {
            contract: contract.to_string(),
            token_id: token_id.to_string(),
            msg: to_json_binary(msg)?,
        },
    )
}

pub fn approve(
    client: &dyn ChainClient,
    cw721: &str,
    spender: &str,
    token_id: &str,
) -> Result<ExecuteResult, E2eError> {
    execute(
        client,
        cw721,
        &Cw721ExecuteMsg::Approve {
            spender: spender.to_string(),
            token_id: token_id.to_string(),
            expires: None,
        },
    )
}

pub fn burn(
    client: &dyn ChainClient,
    cw721: &str,
    token_id: &str,
) -> Result<ExecuteResult, E2eError> {
    execute(
        client,
        cw721,
        &Cw721ExecuteMsg::Burn {
            token_id: token_id.to_string(),
        },
    )
}

pub fn owner_of(
    client: &dyn ChainClient,
    cw721: &str,
    token_id: &str,
) -> Result<OwnerOfResponse, E2eError> {
    query(
        client,
        cw721,
        &Cw721QueryMsg::OwnerOf {
            token_id: token_id.to_string(),
            include_expired: None,
        },
    )
}

pub fn num_tokens(client: &dyn ChainClient, cw721: &str) -> Result<u64, E2eError> {
    let NumTokensResponse { count } = query(client, cw721, &Cw721QueryMsg::NumTokens {})?;
    Ok(count)
}

pub fn all_tokens(client: &dyn ChainClient, cw721: &str) -> Result<Vec<String>, E2eError> {
    let TokensResponse { tokens } = query(
        client,
        cw721,
        &Cw721QueryMsg::AllTokens {
            start_after: None,
            limit: None,
        },
    )?;
    Ok(tokens)
}

pub fn nft_info(
    client: &dyn ChainClient,
    cw721: &str,
    token_id: &str,
) -> Result<NftInfoResponse<Option<Empty>>, E2eError> {
    query(
        client,
        cw721,
        &Cw721QueryMsg::NftInfo {
            token_id: token_id.to_string(),
        },
    )
}

pub fn contract_info(
    client: &dyn ChainClient,
    cw721: &str,
) -> Result<ContractInfoResponse, E2eError> {
    query(client, cw721, &Cw721QueryMsg::ContractInfo {})
}

#[cfg(test)]
mod tests {
    use cosmwasm_std::from_json;

    use super::*;

    #[test]
    fn send_nft_wraps_receiver_payload_in_base64() {
        let msg = Cw721ExecuteMsg::SendNft {
            contract: "wasm1bridge".to_string(),
            token_id: "1".to_string(),
            msg: to_json_binary(&serde_json::json!({"receiver": "osmo1owner"})).unwrap(),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        let inner = json["send_nft"]["msg"].as_str().unwrap();
        let decoded: serde_json::Value =
            from_json(Binary::from_base64(inner).unwrap().as_slice()).unwrap();
        assert_eq!(decoded["receiver"], "osmo1owner");
    }

    #[test]
    fn absent_options_are_omitted() {
        let msg = Cw721QueryMsg::OwnerOf {
            token_id: "1".to_string(),
            include_expired: None,
        };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"owner_of":{"token_id":"1"}}"#
        );
    }
}
