use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Api, IbcEndpoint, StdResult, Storage};
use cw_storage_plus::{Item, Map};

pub const CW721_CODE_ID: Item<u64> = Item::new("cw721_code_id");
pub const CW721_ADMIN: Item<Option<Addr>> = Item::new("cw721_admin");
pub const INCOMING_PROXY: Item<Option<Addr>> = Item::new("incoming_proxy");
pub const OUTGOING_PROXY: Item<Option<Addr>> = Item::new("outgoing_proxy");
pub const PAUSER: Item<Option<Addr>> = Item::new("pauser");

/// Voucher collections only. A native collection's class id is its
/// own address and is never stored.
pub const CLASS_ID_TO_NFT_CONTRACT: Map<String, Addr> = Map::new("a");
pub const NFT_CONTRACT_TO_CLASS_ID: Map<Addr, String> = Map::new("b");

/// (class id, token id) -> local channel the token left on.
pub const OUTGOING_CLASS_TOKEN_TO_CHANNEL: Map<(String, String), String> = Map::new("c");
/// (class id, token id) -> local channel the voucher arrived on.
pub const INCOMING_CLASS_TOKEN_TO_CHANNEL: Map<(String, String), String> = Map::new("d");

/// Local channel id -> both ends, recorded on connect.
pub const CHANNELS: Map<String, ChannelInfo> = Map::new("channels");

#[cw_serde]
pub struct ChannelInfo {
    pub endpoint: IbcEndpoint,
    pub counterparty: IbcEndpoint,
    pub connection_id: String,
}

pub fn nft_contract_for_class_id(
    storage: &dyn Storage,
    api: &dyn Api,
    class_id: &str,
) -> StdResult<Option<Addr>> {
    match CLASS_ID_TO_NFT_CONTRACT.may_load(storage, class_id.to_string())? {
        Some(addr) => Ok(Some(addr)),
        None => Ok(api.addr_validate(class_id).ok()),
    }
}

pub fn class_id_for_nft_contract(storage: &dyn Storage, contract: &Addr) -> StdResult<String> {
    Ok(NFT_CONTRACT_TO_CLASS_ID
        .may_load(storage, contract.clone())?
        .unwrap_or_else(|| contract.to_string()))
}
