use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, WasmMsg};
use cw721::Cw721ReceiveMsg;
use ics721_types::{instantiate::ContractInstantiateInfo, packet::NonFungibleTokenPacketData};

#[cw_serde]
pub struct InstantiateMsg {
    /// Code id of the cw721 used for voucher collections.
    pub cw721_base_code_id: u64,
    pub incoming_proxy: Option<ContractInstantiateInfo>,
    pub outgoing_proxy: Option<ContractInstantiateInfo>,
    pub pauser: Option<String>,
    /// Admin of voucher collections, none makes them immutable.
    pub cw721_admin: Option<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// cw721 receive hook; `msg` is an `IbcOutgoingMsg`, or an
    /// `IbcOutgoingProxyMsg` when an outgoing proxy is set.
    ReceiveNft(Cw721ReceiveMsg),
    /// Only callable by the contract itself.
    Callback(CallbackMsg),
    /// Contract admin only. Burns a voucher and forgets where it came
    /// from; `owner` must have approved the bridge.
    AdminCleanAndBurnNft {
        owner: String,
        token_id: String,
        class_id: String,
        collection: String,
    },
    /// Contract admin only. Releases an escrowed NFT without an ack.
    AdminCleanAndUnescrowNft {
        recipient: String,
        token_id: String,
        class_id: String,
        collection: String,
    },
}

#[cw_serde]
#[allow(clippy::large_enum_variant)]
pub enum CallbackMsg {
    CreateVouchers {
        receiver: String,
        class_id: String,
        tokens: Vec<VoucherToken>,
    },
    Mint {
        receiver: String,
        class_id: String,
        tokens: Vec<VoucherToken>,
    },
    RedeemVouchers {
        receiver: String,
        class_id: String,
        token_ids: Vec<String>,
    },
    RedeemOutgoingChannelEntries(Vec<(String, String)>),
    AddIncomingChannelEntries(Vec<((String, String), String)>),
    /// Runs the memo's receive callback. The collection is looked up by
    /// `class_id` here since a new voucher collection only has an address
    /// once the preceding operand ran.
    ReceiveCallback {
        class_id: String,
        packet: NonFungibleTokenPacketData,
    },
    /// Runs all operands; any failure fails the whole conjunction.
    Conjunction { operands: Vec<WasmMsg> },
}

#[cw_serde]
pub struct VoucherToken {
    pub id: String,
    pub uri: Option<String>,
}

#[cw_serde]
pub enum MigrateMsg {
    WithUpdate {
        pauser: Option<String>,
        /// Absent disables the proxy.
        incoming_proxy: Option<String>,
        /// Absent disables the proxy.
        outgoing_proxy: Option<String>,
        cw721_base_code_id: Option<u64>,
        /// Empty string makes voucher collections immutable.
        cw721_admin: Option<String>,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Option<String>)]
    ClassId { contract: String },

    #[returns(Option<Addr>)]
    NftContract { class_id: String },

    #[returns(Vec<(String, Addr)>)]
    NftContracts {
        start_after: Option<String>,
        limit: Option<u32>,
    },

    #[returns(Vec<((String, String), String)>)]
    OutgoingChannels {
        start_after: Option<(String, String)>,
        limit: Option<u32>,
    },

    #[returns(Vec<((String, String), String)>)]
    IncomingChannels {
        start_after: Option<(String, String)>,
        limit: Option<u32>,
    },

    /// Owner of a token by class, resolved through the class's cw721.
    #[returns(cw721::OwnerOfResponse)]
    Owner { class_id: String, token_id: String },

    #[returns(Option<Addr>)]
    IncomingProxy {},

    #[returns(Option<Addr>)]
    OutgoingProxy {},

    #[returns(Option<Addr>)]
    Pauser {},

    #[returns(u64)]
    Cw721CodeId {},
}
