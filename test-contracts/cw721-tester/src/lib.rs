use cosmwasm_schema::cw_serde;
#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{Binary, Deps, DepsMut, Empty, Env, MessageInfo, Response, StdError, StdResult};
use cw2::set_contract_version;
use cw_storage_plus::Item;
use thiserror::Error;

pub type ExecuteMsg = cw721_base::ExecuteMsg<cw721_base::Extension, Empty>;
pub type QueryMsg = cw721_base::QueryMsg<Empty>;

#[cw_serde]
pub struct InstantiateMsg {
    pub name: String,
    pub symbol: String,
    pub minter: String,
    /// Every transfer or send signed by this address fails. Pointing it
    /// at a bridge makes the bridge unable to release the token.
    pub target: String,
}

#[derive(Error, Debug)]
pub enum ContractError {
    #[error(transparent)]
    Std(#[from] StdError),

    #[error(transparent)]
    Base(#[from] cw721_base::ContractError),

    #[error("gotem")]
    Gotem {},
}

const TARGET: Item<String> = Item::new("target");

const CONTRACT_NAME: &str = "crates.io:cw721-tester";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    mut deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    let target = deps.api.addr_validate(&msg.target)?;
    let response = cw721_base::entry::instantiate(
        deps.branch(),
        env,
        info,
        cw721_base::InstantiateMsg {
            name: msg.name,
            symbol: msg.symbol,
            minter: msg.minter,
        },
    )?;
    TARGET.save(deps.storage, &target.into_string())?;
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(response.add_attribute("target", msg.target))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    let target = TARGET.load(deps.storage)?;
    match msg {
        ExecuteMsg::TransferNft { .. } | ExecuteMsg::SendNft { .. }
            if info.sender.as_str() == target =>
        {
            // a real chain would see a panic or run out of gas here;
            // an error aborts the transaction the same way
            Err(ContractError::Gotem {})
        }
        msg => Ok(cw721_base::entry::execute(deps, env, info, msg)?),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    cw721_base::entry::query(deps, env, msg)
}
