use cosmwasm_std::{to_json_binary, Addr, Binary, Deps, Env, Order, StdError, StdResult};
use cw_storage_plus::{Bound, Map};

use crate::{
    msg::QueryMsg,
    state::{
        class_id_for_nft_contract, nft_contract_for_class_id, CLASS_ID_TO_NFT_CONTRACT,
        CW721_CODE_ID, INCOMING_CLASS_TOKEN_TO_CHANNEL, INCOMING_PROXY,
        NFT_CONTRACT_TO_CLASS_ID, OUTGOING_CLASS_TOKEN_TO_CHANNEL, OUTGOING_PROXY, PAUSER,
    },
};

pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::ClassId { contract } => to_json_binary(&query_class_id(deps, contract)?),
        QueryMsg::NftContract { class_id } => to_json_binary(&nft_contract_for_class_id(
            deps.storage,
            deps.api,
            &class_id,
        )?),
        QueryMsg::NftContracts { start_after, limit } => {
            to_json_binary(&query_nft_contracts(deps, start_after, limit)?)
        }
        QueryMsg::OutgoingChannels { start_after, limit } => to_json_binary(&query_channels(
            deps,
            &OUTGOING_CLASS_TOKEN_TO_CHANNEL,
            start_after,
            limit,
        )?),
        QueryMsg::IncomingChannels { start_after, limit } => to_json_binary(&query_channels(
            deps,
            &INCOMING_CLASS_TOKEN_TO_CHANNEL,
            start_after,
            limit,
        )?),
        QueryMsg::Owner { class_id, token_id } => {
            to_json_binary(&query_owner(deps, class_id, token_id)?)
        }
        QueryMsg::IncomingProxy {} => to_json_binary(&INCOMING_PROXY.load(deps.storage)?),
        QueryMsg::OutgoingProxy {} => to_json_binary(&OUTGOING_PROXY.load(deps.storage)?),
        QueryMsg::Pauser {} => to_json_binary(&PAUSER.load(deps.storage)?),
        QueryMsg::Cw721CodeId {} => to_json_binary(&CW721_CODE_ID.load(deps.storage)?),
    }
}

/// Voucher collections resolve through the registry. Any other contract
/// only has a class id once it has sent something over the bridge.
fn query_class_id(deps: Deps, contract: String) -> StdResult<Option<String>> {
    let contract = deps.api.addr_validate(&contract)?;
    if NFT_CONTRACT_TO_CLASS_ID.has(deps.storage, contract.clone()) {
        return class_id_for_nft_contract(deps.storage, &contract).map(Some);
    }
    let sent = OUTGOING_CLASS_TOKEN_TO_CHANNEL
        .prefix(contract.to_string())
        .keys(deps.storage, None, None, Order::Ascending)
        .next()
        .is_some();
    Ok(sent.then(|| contract.into_string()))
}

fn query_nft_contracts(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<Vec<(String, Addr)>> {
    let start = start_after.map(Bound::exclusive);
    let all = CLASS_ID_TO_NFT_CONTRACT.range(deps.storage, start, None, Order::Ascending);
    match limit {
        Some(limit) => all.take(limit as usize).collect(),
        None => all.collect(),
    }
}

fn query_channels(
    deps: Deps,
    class_token_to_channel: &Map<(String, String), String>,
    start_after: Option<(String, String)>,
    limit: Option<u32>,
) -> StdResult<Vec<((String, String), String)>> {
    let start = start_after.map(Bound::exclusive);
    let all = class_token_to_channel.range(deps.storage, start, None, Order::Ascending);
    match limit {
        Some(limit) => all.take(limit as usize).collect(),
        None => all.collect(),
    }
}

fn query_owner(
    deps: Deps,
    class_id: String,
    token_id: String,
) -> StdResult<cw721::OwnerOfResponse> {
    let nft_contract = nft_contract_for_class_id(deps.storage, deps.api, &class_id)?
        .ok_or_else(|| StdError::NotFound {
            kind: format!("NFT contract not found for class id {class_id}"),
        })?;
    deps.querier.query_wasm_smart(
        nft_contract,
        &cw721::Cw721QueryMsg::OwnerOf {
            token_id,
            include_expired: None,
        },
    )
}
