use cosmwasm_schema::{cw_serde, QueryResponses};
#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_json_binary, Addr, Binary, Deps, DepsMut, Empty, Env, MessageInfo, Response, StdError,
    StdResult, WasmMsg,
};
use cw2::set_contract_version;
use cw721::Cw721ReceiveMsg;
use cw_storage_plus::Item;
use ics721_types::packet::IbcOutgoingProxyMsg;
use thiserror::Error;

#[cw_serde]
pub enum Rate {
    /// At most this many transfers in one block.
    PerBlock(u64),
    /// At most one transfer every this many blocks.
    Blocks(u64),
}

#[cw_serde]
pub struct InstantiateMsg {
    /// Bridge transfers are forwarded to; defaults to the instantiator.
    pub origin: Option<String>,
    pub rate_limit: Rate,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Sent by a collection on `send_nft`; `msg` is the `IbcOutgoingMsg`
    /// meant for the bridge.
    ReceiveNft(Cw721ReceiveMsg),
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Addr)]
    Origin {},
    #[returns(Rate)]
    RateLimit {},
}

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error(transparent)]
    Std(#[from] StdError),

    #[error("rate limit must be non-zero")]
    ZeroRate {},

    #[error("rate limit reached, try again at height {retry_at}")]
    Limited { retry_at: u64 },
}

/// Height and count of transfers in the window the last transfer fell in.
#[cw_serde]
struct Window {
    start: u64,
    count: u64,
}

const ORIGIN: Item<Addr> = Item::new("origin");
const RATE: Item<Rate> = Item::new("rate");
const WINDOW: Item<Window> = Item::new("window");

const CONTRACT_NAME: &str = "crates.io:outgoing-proxy-tester";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

type Cw721ExecuteMsg = cw721_base::ExecuteMsg<cw721_base::Extension, Empty>;

impl Rate {
    fn window(&self) -> (u64, u64) {
        match self {
            Rate::PerBlock(n) => (1, *n),
            Rate::Blocks(n) => (*n, 1),
        }
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    if matches!(msg.rate_limit, Rate::PerBlock(0) | Rate::Blocks(0)) {
        return Err(ContractError::ZeroRate {});
    }
    let origin = match msg.origin {
        Some(origin) => deps.api.addr_validate(&origin)?,
        None => info.sender,
    };
    ORIGIN.save(deps.storage, &origin)?;
    RATE.save(deps.storage, &msg.rate_limit)?;
    Ok(Response::default()
        .add_attribute("method", "instantiate")
        .add_attribute("origin", origin))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::ReceiveNft(receive) => execute_receive_nft(deps, env, info, receive),
    }
}

/// Counts the transfer against the limit, moves the NFT on to the bridge
/// and tells the bridge which collection it came from.
fn execute_receive_nft(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    receive: Cw721ReceiveMsg,
) -> Result<Response, ContractError> {
    let (blocks, max) = RATE.load(deps.storage)?.window();
    let height = env.block.height;
    let window = match WINDOW.may_load(deps.storage)? {
        Some(w) if height < w.start + blocks => {
            if w.count >= max {
                return Err(ContractError::Limited {
                    retry_at: w.start + blocks,
                });
            }
            Window {
                start: w.start,
                count: w.count + 1,
            }
        }
        _ => Window {
            start: height,
            count: 1,
        },
    };
    WINDOW.save(deps.storage, &window)?;

    let bridge = ORIGIN.load(deps.storage)?;
    let collection = info.sender;
    let transfer = WasmMsg::Execute {
        contract_addr: collection.to_string(),
        msg: to_json_binary(&Cw721ExecuteMsg::TransferNft {
            recipient: bridge.to_string(),
            token_id: receive.token_id.clone(),
        })?,
        funds: vec![],
    };
    let forward = Cw721ReceiveMsg {
        sender: receive.sender,
        token_id: receive.token_id.clone(),
        msg: to_json_binary(&IbcOutgoingProxyMsg {
            collection: collection.to_string(),
            msg: receive.msg,
        })?,
    }
    .into_cosmos_msg(bridge)?;

    Ok(Response::default()
        .add_message(transfer)
        .add_message(forward)
        .add_attribute("method", "execute_receive_nft")
        .add_attribute("collection", collection)
        .add_attribute("token_id", receive.token_id)
        .add_attribute("window_count", window.count.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Origin {} => to_json_binary(&ORIGIN.load(deps.storage)?),
        QueryMsg::RateLimit {} => to_json_binary(&RATE.load(deps.storage)?),
    }
}
