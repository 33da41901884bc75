//! Relay hooks for the in-process chain simulation.
//!
//! The simulated relayer cannot call a contract's IBC entry points
//! directly, so it delivers channel handshakes and closes, packets, acks
//! and timeouts as a privileged `sudo` message. Fixture contracts route each
//! variant to their regular `ibc_*` handler and convert the IBC response
//! with the helpers below.

use cosmwasm_std::{
    Binary, Event, IbcBasicResponse, IbcChannelCloseMsg, IbcChannelConnectMsg, IbcChannelOpenMsg,
    IbcPacketAckMsg, IbcPacketReceiveMsg, IbcPacketTimeoutMsg, IbcReceiveResponse, IbcTimeout,
    IbcTimeoutBlock, Response, StdError, StdResult, Timestamp,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum IbcSudoMsg {
    ChannelOpen(IbcChannelOpenMsg),
    ChannelConnect(IbcChannelConnectMsg),
    ChannelClose(IbcChannelCloseMsg),
    PacketReceive(IbcPacketReceiveMsg),
    PacketAck(IbcPacketAckMsg),
    PacketTimeout(IbcPacketTimeoutMsg),
}

/// Event type a contract emits to hand a packet to the simulated chain,
/// mirroring the `send_packet` event a chain emits for `IbcMsg::SendPacket`.
pub const SEND_PACKET_EVENT: &str = "send_packet";

pub fn basic_into_response(res: IbcBasicResponse) -> Response {
    Response::new()
        .add_submessages(res.messages)
        .add_attributes(res.attributes)
        .add_events(res.events)
}

/// The acknowledgement becomes the response data; a reply may still
/// overwrite it.
pub fn receive_into_response(res: IbcReceiveResponse) -> Response {
    Response::new()
        .add_submessages(res.messages)
        .add_attributes(res.attributes)
        .add_events(res.events)
        .set_data(res.acknowledgement)
}

/// Builds the event announcing an outgoing packet on `channel_id`.
pub fn send_packet_event(
    src_port: impl Into<String>,
    channel_id: impl Into<String>,
    data: &Binary,
    timeout: &IbcTimeout,
) -> Event {
    let height = timeout
        .block()
        .map_or_else(|| "0-0".to_string(), |b| format!("{}-{}", b.revision, b.height));
    let timestamp = timeout
        .timestamp()
        .map_or_else(|| "0".to_string(), |t| t.nanos().to_string());
    Event::new(SEND_PACKET_EVENT)
        .add_attribute("packet_src_port", src_port)
        .add_attribute("packet_src_channel", channel_id)
        .add_attribute("packet_data", data.to_base64())
        .add_attribute("packet_timeout_height", height)
        .add_attribute("packet_timeout_timestamp", timestamp)
}

/// A packet announced through [`send_packet_event`].
#[derive(Clone, Debug, PartialEq)]
pub struct SentPacket {
    pub src_port: String,
    pub src_channel: String,
    pub data: Binary,
    pub timeout: IbcTimeout,
}

/// Reads back a [`send_packet_event`]. Custom contract events reach the
/// chain with a `wasm-` type prefix; both spellings are accepted.
pub fn parse_send_packet_event(event: &Event) -> StdResult<Option<SentPacket>> {
    let ty = event.ty.strip_prefix("wasm-").unwrap_or(&event.ty);
    if ty != SEND_PACKET_EVENT {
        return Ok(None);
    }
    let attr = |key: &str| -> StdResult<&str> {
        event
            .attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
            .ok_or_else(|| StdError::generic_err(format!("send_packet event without {key}")))
    };

    let block = match attr("packet_timeout_height")?.split_once('-') {
        Some(("0", "0")) | None => None,
        Some((revision, height)) => Some(IbcTimeoutBlock {
            revision: parse_u64(revision)?,
            height: parse_u64(height)?,
        }),
    };
    let timestamp = match parse_u64(attr("packet_timeout_timestamp")?)? {
        0 => None,
        nanos => Some(Timestamp::from_nanos(nanos)),
    };
    let timeout = match (block, timestamp) {
        (Some(block), Some(timestamp)) => IbcTimeout::with_both(block, timestamp),
        (Some(block), None) => IbcTimeout::with_block(block),
        (None, Some(timestamp)) => IbcTimeout::with_timestamp(timestamp),
        (None, None) => return Err(StdError::generic_err("send_packet event without timeout")),
    };

    Ok(Some(SentPacket {
        src_port: attr("packet_src_port")?.to_string(),
        src_channel: attr("packet_src_channel")?.to_string(),
        data: Binary::from_base64(attr("packet_data")?)?,
        timeout,
    }))
}

fn parse_u64(value: &str) -> StdResult<u64> {
    value
        .parse()
        .map_err(|_| StdError::generic_err(format!("invalid number in send_packet event: {value}")))
}
