use cosmwasm_std::Addr;
use cw721::OwnerOfResponse;
use cw_storage_plus::Item;

pub const ICS721: Item<Addr> = Item::new("ics721");
/// Owner of the first token when the ack callback ran; `None` once it was
/// burned.
pub const SENT_CALLBACK: Item<Option<OwnerOfResponse>> = Item::new("sent");
pub const RECEIVED_CALLBACK: Item<Option<OwnerOfResponse>> = Item::new("received");
pub const NFT_CONTRACT: Item<Addr> = Item::new("nft_contract");
