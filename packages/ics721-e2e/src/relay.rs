use std::fmt;

use cosmwasm_std::{Binary, IbcEndpoint, IbcOrder, IbcPacket, IbcTimeout};
use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// One of the two chains a link connects.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChannelEnd {
    pub port_id: String,
    pub channel_id: String,
}

impl ChannelEnd {
    pub fn endpoint(&self) -> IbcEndpoint {
        IbcEndpoint {
            port_id: self.port_id.clone(),
            channel_id: self.channel_id.clone(),
        }
    }
}

/// Both ends of a channel; `src` lives on side A, `dest` on side B.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChannelPair {
    pub src: ChannelEnd,
    pub dest: ChannelEnd,
}

impl ChannelPair {
    pub fn end(&self, side: Side) -> &ChannelEnd {
        match side {
            Side::A => &self.src,
            Side::B => &self.dest,
        }
    }
}

/// A packet committed on its source chain and not yet relayed.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingPacket {
    pub sequence: u64,
    pub src: ChannelEnd,
    pub dest: ChannelEnd,
    pub data: Binary,
    pub timeout: IbcTimeout,
}

impl PendingPacket {
    pub fn to_ibc_packet(&self) -> IbcPacket {
        IbcPacket::new(
            self.data.clone(),
            self.src.endpoint(),
            self.dest.endpoint(),
            self.sequence,
            self.timeout.clone(),
        )
    }
}

/// Acknowledgement written by the receiving chain for `original_packet`.
#[derive(Clone, Debug, PartialEq)]
pub struct AckRecord {
    pub acknowledgement: Binary,
    pub original_packet: PendingPacket,
}

/// Outcome of one relay pass. `acks_from_b` are written by chain B for
/// packets sent from A, and the other way round.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RelayResult {
    pub packets_from_a: usize,
    pub packets_from_b: usize,
    pub acks_from_a: Vec<AckRecord>,
    pub acks_from_b: Vec<AckRecord>,
    pub timeouts_from_a: Vec<PendingPacket>,
    pub timeouts_from_b: Vec<PendingPacket>,
}

impl RelayResult {
    pub fn packets_from(&self, side: Side) -> usize {
        match side {
            Side::A => self.packets_from_a,
            Side::B => self.packets_from_b,
        }
    }

    /// Acks for packets that left `sender`.
    pub fn acks_for_packets_from(&self, sender: Side) -> &[AckRecord] {
        match sender {
            Side::A => &self.acks_from_b,
            Side::B => &self.acks_from_a,
        }
    }

    pub fn timeouts_from(&self, side: Side) -> &[PendingPacket] {
        match side {
            Side::A => &self.timeouts_from_a,
            Side::B => &self.timeouts_from_b,
        }
    }
}

/// A connection between two chains and the relay capability over the
/// channels opened on it.
pub trait Link {
    /// Runs the four step channel handshake between `port_a` on A and
    /// `port_b` on B.
    fn create_channel(
        &mut self,
        port_a: &str,
        port_b: &str,
        order: IbcOrder,
        version: &str,
    ) -> Result<ChannelPair, RelayError>;

    /// Relays every packet pending on this link's channels at call time,
    /// in submission order per direction, then delivers the resulting
    /// acks and timeouts back to the senders.
    fn relay_all(&mut self) -> Result<RelayResult, RelayError>;

    /// Packets committed on `side` and not relayed yet.
    fn pending_packets(&self, side: Side) -> Result<Vec<PendingPacket>, RelayError>;

    /// Starts the closing handshake on `side`. When the contract there
    /// refuses, the channel stays open and the refusal is returned.
    fn close_channel(&mut self, side: Side, channel: &ChannelPair) -> Result<(), RelayError>;

    /// The end opposite `side` closes without asking its contract, and
    /// `side` learns of it through `CloseConfirm`. Packets still pending
    /// on the channel time out on the next relay pass.
    fn confirm_counterparty_close(
        &mut self,
        side: Side,
        channel: &ChannelPair,
    ) -> Result<(), RelayError>;
}

pub trait Relayer {
    /// Opens a fresh connection between the two chains.
    fn connect(&self, chain_a: &str, chain_b: &str) -> Result<Box<dyn Link>, RelayError>;
}
