use cosmwasm_std::{to_json_binary, Deps, SubMsg, WasmMsg};
use ics721_types::{
    memo::{
        parse_callbacks, Ics721AckCallbackMsg, Ics721ReceiveCallbackMsg, Ics721Status,
        ReceiverExecuteMsg,
    },
    packet::NonFungibleTokenPacketData,
};

use crate::contract::ACK_CALLBACK_REPLY_ID;

// A failing ack callback must not fail the ack: by then the NFT exists on
// the other chain, so the voucher burn or refund has to go through. The
// reply swallows the error.
pub(crate) fn ack_callback_msg(
    deps: Deps,
    status: Ics721Status,
    packet: NonFungibleTokenPacketData,
    nft_contract: String,
) -> Option<SubMsg> {
    let callbacks = parse_callbacks(packet.memo.as_deref())?;
    let receiver = callbacks
        .ack_callback_addr
        .unwrap_or_else(|| packet.sender.clone());
    let contract_addr = deps.api.addr_validate(&receiver).ok()?.into_string();

    let msg = to_json_binary(&ReceiverExecuteMsg::Ics721AckCallback(
        Ics721AckCallbackMsg {
            status,
            nft_contract,
            msg: callbacks.ack_callback_data?,
            original_packet: packet,
        },
    ))
    .ok()?;

    Some(SubMsg::reply_on_error(
        WasmMsg::Execute {
            contract_addr,
            msg,
            funds: vec![],
        },
        ACK_CALLBACK_REPLY_ID,
    ))
}

/// Plain message, so a failing receive callback fails the conjunction it
/// runs in and the packet is acked with an error.
pub(crate) fn receive_callback_msg(
    deps: Deps,
    packet: NonFungibleTokenPacketData,
    nft_contract: String,
) -> Option<WasmMsg> {
    let callbacks = parse_callbacks(packet.memo.as_deref())?;
    let receiver = callbacks
        .receive_callback_addr
        .unwrap_or_else(|| packet.receiver.clone());
    let contract_addr = deps.api.addr_validate(&receiver).ok()?.into_string();

    let msg = to_json_binary(&ReceiverExecuteMsg::Ics721ReceiveCallback(
        Ics721ReceiveCallbackMsg {
            nft_contract,
            msg: callbacks.receive_callback_data?,
            original_packet: packet,
        },
    ))
    .ok()?;

    Some(WasmMsg::Execute {
        contract_addr,
        msg,
        funds: vec![],
    })
}

/// Whether `packet` asks for a receive callback at all.
pub(crate) fn wants_receive_callback(packet: &NonFungibleTokenPacketData) -> bool {
    parse_callbacks(packet.memo.as_deref())
        .is_some_and(|callbacks| callbacks.receive_callback_data.is_some())
}
