use cosmwasm_schema::{cw_serde, QueryResponses};
#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_json_binary, Addr, Binary, Deps, DepsMut, Env, MessageInfo, Order, Response, StdError,
    StdResult,
};
use cw2::set_contract_version;
use cw_storage_plus::{Item, Map};
use ics721_types::proxy::IncomingProxyExecuteMsg;
use thiserror::Error;

#[cw_serde]
pub struct InstantiateMsg {
    /// Bridge allowed to ask; defaults to the instantiator.
    pub origin: Option<String>,
    /// Local channel ids packets may arrive on.
    pub channels: Vec<String>,
}

pub type ExecuteMsg = IncomingProxyExecuteMsg;

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Addr)]
    Origin {},
    #[returns(Vec<String>)]
    Channels {},
}

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error(transparent)]
    Std(#[from] StdError),

    #[error("unauthorized")]
    Unauthorized {},

    #[error("channel {0} is not allow-listed")]
    UnknownChannel(String),
}

const ORIGIN: Item<Addr> = Item::new("origin");
const CHANNELS: Map<String, ()> = Map::new("channels");

const CONTRACT_NAME: &str = "crates.io:incoming-proxy-tester";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    let origin = match msg.origin {
        Some(origin) => deps.api.addr_validate(&origin)?,
        None => info.sender,
    };
    ORIGIN.save(deps.storage, &origin)?;
    for channel in &msg.channels {
        CHANNELS.save(deps.storage, channel.clone(), &())?;
    }
    Ok(Response::default()
        .add_attribute("method", "instantiate")
        .add_attribute("origin", origin)
        .add_attribute("channels", format!("{:?}", msg.channels)))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        IncomingProxyExecuteMsg::Ics721ReceivePacketMsg { packet, data } => {
            if info.sender != ORIGIN.load(deps.storage)? {
                return Err(ContractError::Unauthorized {});
            }
            let channel = packet.dest.channel_id;
            if !CHANNELS.has(deps.storage, channel.clone()) {
                return Err(ContractError::UnknownChannel(channel));
            }
            Ok(Response::default()
                .add_attribute("method", "ics721_receive_packet_msg")
                .add_attribute("channel", channel)
                .add_attribute("class_id", data.class_id.to_string()))
        }
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Origin {} => to_json_binary(&ORIGIN.load(deps.storage)?),
        QueryMsg::Channels {} => to_json_binary(
            &CHANNELS
                .keys(deps.storage, None, None, Order::Ascending)
                .collect::<StdResult<Vec<_>>>()?,
        ),
    }
}
