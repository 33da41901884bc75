#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    Binary, Deps, DepsMut, Env, MessageInfo, Reply, Response, StdResult, SubMsg,
    SubMsgResult,
};
use cw2::set_contract_version;
use cw_utils::parse_reply_instantiate_data;
use ics721_types::{
    ack::{ack_fail, ack_success},
    hooks::{basic_into_response, receive_into_response, IbcSudoMsg},
};

use crate::{
    execute, ibc,
    msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg},
    query,
    state::{
        CLASS_ID_TO_NFT_CONTRACT, CW721_ADMIN, CW721_CODE_ID, INCOMING_PROXY,
        NFT_CONTRACT_TO_CLASS_ID, OUTGOING_PROXY, PAUSER,
    },
    ContractError,
};

const CONTRACT_NAME: &str = "crates.io:ics721-sim-bridge";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) const INSTANTIATE_CW721_REPLY_ID: u64 = 0;
pub(crate) const INSTANTIATE_INCOMING_PROXY_REPLY_ID: u64 = 1;
pub(crate) const INSTANTIATE_OUTGOING_PROXY_REPLY_ID: u64 = 2;
/// Replies with this id turn the submessage outcome into the ack.
pub(crate) const ACK_AND_DO_NOTHING_REPLY_ID: u64 = 3;
/// Ack callbacks reply on error only, and the error is dropped.
pub(crate) const ACK_CALLBACK_REPLY_ID: u64 = 4;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    CW721_CODE_ID.save(deps.storage, &msg.cw721_base_code_id)?;
    INCOMING_PROXY.save(deps.storage, &None)?;
    OUTGOING_PROXY.save(deps.storage, &None)?;
    PAUSER.save(
        deps.storage,
        &msg.pauser
            .as_deref()
            .map(|p| deps.api.addr_validate(p))
            .transpose()?,
    )?;
    CW721_ADMIN.save(
        deps.storage,
        &msg.cw721_admin
            .as_deref()
            .map(|a| deps.api.addr_validate(a))
            .transpose()?,
    )?;

    let mut proxies = Vec::new();
    if let Some(cii) = msg.incoming_proxy {
        proxies.push(SubMsg::reply_on_success(
            cii.into_wasm_msg(env.contract.address.clone()),
            INSTANTIATE_INCOMING_PROXY_REPLY_ID,
        ));
    }
    if let Some(cii) = msg.outgoing_proxy {
        proxies.push(SubMsg::reply_on_success(
            cii.into_wasm_msg(env.contract.address),
            INSTANTIATE_OUTGOING_PROXY_REPLY_ID,
        ));
    }

    Ok(Response::default()
        .add_submessages(proxies)
        .add_attribute("method", "instantiate")
        .add_attribute("cw721_code_id", msg.cw721_base_code_id.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::ReceiveNft(receive) => execute::execute_receive_nft(deps, env, info, receive),
        ExecuteMsg::Callback(msg) => execute::execute_callback(deps, env, info, msg),
        ExecuteMsg::AdminCleanAndBurnNft {
            owner,
            token_id,
            class_id,
            collection,
        } => execute::execute_admin_clean_and_burn_nft(
            deps, env, info, owner, token_id, class_id, collection,
        ),
        ExecuteMsg::AdminCleanAndUnescrowNft {
            recipient,
            token_id,
            class_id,
            collection,
        } => execute::execute_admin_clean_and_unescrow_nft(
            deps, env, info, recipient, token_id, class_id, collection,
        ),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    query::query(deps, env, msg)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, msg: MigrateMsg) -> Result<Response, ContractError> {
    execute::migrate(deps, msg)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, _env: Env, reply: Reply) -> Result<Response, ContractError> {
    match reply.id {
        INSTANTIATE_CW721_REPLY_ID => {
            let res = parse_reply_instantiate_data(reply)?;
            let cw721_addr = deps.api.addr_validate(&res.contract_address)?;

            // voucher collections are named after their class id
            let cw721::ContractInfoResponse { name, .. } = deps.querier.query_wasm_smart(
                cw721_addr.clone(),
                &cw721::Cw721QueryMsg::ContractInfo {},
            )?;
            CLASS_ID_TO_NFT_CONTRACT.save(deps.storage, name.clone(), &cw721_addr)?;
            NFT_CONTRACT_TO_CLASS_ID.save(deps.storage, cw721_addr.clone(), &name)?;

            Ok(Response::default()
                .add_attribute("method", "instantiate_cw721_reply")
                .add_attribute("class_id", name)
                .add_attribute("cw721_addr", cw721_addr))
        }
        INSTANTIATE_INCOMING_PROXY_REPLY_ID => {
            let res = parse_reply_instantiate_data(reply)?;
            let proxy = deps.api.addr_validate(&res.contract_address)?;
            INCOMING_PROXY.save(deps.storage, &Some(proxy))?;
            Ok(Response::default()
                .add_attribute("method", "instantiate_incoming_proxy_reply")
                .add_attribute("incoming_proxy", res.contract_address))
        }
        INSTANTIATE_OUTGOING_PROXY_REPLY_ID => {
            let res = parse_reply_instantiate_data(reply)?;
            let proxy = deps.api.addr_validate(&res.contract_address)?;
            OUTGOING_PROXY.save(deps.storage, &Some(proxy))?;
            Ok(Response::default()
                .add_attribute("method", "instantiate_outgoing_proxy_reply")
                .add_attribute("outgoing_proxy", res.contract_address))
        }
        // overrides the data field of `ibc_packet_receive`
        ACK_AND_DO_NOTHING_REPLY_ID => match reply.result {
            SubMsgResult::Ok(_) => Ok(Response::new().set_data(ack_success())),
            SubMsgResult::Err(err) => Ok(Response::new()
                .add_attribute("method", "ack_and_do_nothing")
                .set_data(ack_fail(err))),
        },
        ACK_CALLBACK_REPLY_ID => match reply.result {
            SubMsgResult::Ok(_) => Ok(Response::new()),
            SubMsgResult::Err(err) => Ok(Response::new()
                .add_attribute("method", "ack_callback_failed")
                .add_attribute("error", err)),
        },
        _ => Err(ContractError::UnrecognisedReplyId {}),
    }
}

/// Entry point the simulated relayer delivers IBC traffic through.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn sudo(deps: DepsMut, env: Env, msg: IbcSudoMsg) -> Result<Response, ContractError> {
    match msg {
        IbcSudoMsg::ChannelOpen(msg) => {
            ibc::ibc_channel_open(deps, env, msg)?;
            Ok(Response::new().add_attribute("method", "ibc_channel_open"))
        }
        IbcSudoMsg::ChannelConnect(msg) => {
            Ok(basic_into_response(ibc::ibc_channel_connect(deps, env, msg)?))
        }
        IbcSudoMsg::ChannelClose(msg) => {
            Ok(basic_into_response(ibc::ibc_channel_close(deps, env, msg)?))
        }
        IbcSudoMsg::PacketReceive(msg) => match ibc::ibc_packet_receive(deps, env, msg) {
            Ok(res) => Ok(receive_into_response(res)),
            Err(never) => match never {},
        },
        IbcSudoMsg::PacketAck(msg) => Ok(basic_into_response(ibc::ibc_packet_ack(deps, env, msg)?)),
        IbcSudoMsg::PacketTimeout(msg) => {
            Ok(basic_into_response(ibc::ibc_packet_timeout(deps, env, msg)?))
        }
    }
}

