use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, IbcTimeout};
use cw721::OwnerOfResponse;
use ics721_types::memo::{Ics721AckCallbackMsg, Ics721ReceiveCallbackMsg};

/// Callback data this contract understands. A transfer puts it in the
/// memo's `ack_callback_data` or `receive_callback_data`.
///
/// `NftSent` is handled as an ack callback on the sending chain,
/// `NftReceived` as a receive callback on the receiving one.
#[cw_serde]
pub enum Ics721Callbacks {
    NftSent {},
    NftReceived {},
    /// Fails whichever callback carries it.
    FailCallback {},
}

#[cw_serde]
pub struct InstantiateMsg {
    /// Only callbacks from this bridge are accepted.
    pub ics721: String,
}

#[cw_serde]
#[allow(clippy::large_enum_variant)]
pub enum ExecuteMsg {
    Ics721ReceiveCallback(Ics721ReceiveCallbackMsg),
    Ics721AckCallback(Ics721AckCallbackMsg),
    /// Sends a token this contract owns to `ics721`, making it the
    /// packet's sender.
    SendNft {
        cw721: String,
        ics721: String,
        token_id: String,
        recipient: String,
        channel_id: String,
        timeout: IbcTimeout,
        memo: Option<String>,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// `None` until an ack callback recorded an owner.
    #[returns(Option<OwnerOfResponse>)]
    GetSentCallback {},

    #[returns(Option<OwnerOfResponse>)]
    GetReceivedCallback {},

    /// Collection named by the last successful callback.
    #[returns(Option<Addr>)]
    GetNftContract {},
}
