use cosmwasm_schema::cw_serde;
use cosmwasm_std::IbcPacket;

use crate::packet::NonFungibleTokenPacketData;

/// Message a bridge sends to its incoming proxy before accepting a
/// packet. The proxy fails the call to reject the packet.
#[cw_serde]
pub enum IncomingProxyExecuteMsg {
    Ics721ReceivePacketMsg {
        packet: IbcPacket,
        data: NonFungibleTokenPacketData,
    },
}
