use cosmwasm_std::{
    IbcAcknowledgement, IbcChannel, IbcChannelCloseMsg, IbcChannelConnectMsg, IbcChannelOpenMsg,
    IbcOrder, IbcPacketAckMsg, IbcPacketReceiveMsg, IbcPacketTimeoutMsg,
};
use ics721_types::{ack::ack_fail, hooks::IbcSudoMsg};
use tracing::{debug, info, warn};

use super::chain::SimChain;
use crate::{
    error::RelayError,
    relay::{AckRecord, ChannelEnd, ChannelPair, Link, PendingPacket, RelayResult, Side},
};

struct SimChannel {
    pair: ChannelPair,
    order: IbcOrder,
    version: String,
    closed: bool,
}

/// A connection between two simulated chains.
pub struct SimLink {
    a: SimChain,
    b: SimChain,
    connection_a: String,
    connection_b: String,
    channels: Vec<SimChannel>,
}

impl SimLink {
    pub(crate) fn new(a: SimChain, b: SimChain) -> Self {
        let connection_a = a.state.borrow_mut().allocate_connection();
        let connection_b = b.state.borrow_mut().allocate_connection();
        info!(%connection_a, %connection_b, "connection open");
        Self {
            a,
            b,
            connection_a,
            connection_b,
            channels: vec![],
        }
    }

    fn chain(&self, side: Side) -> &SimChain {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    fn connection(&self, side: Side) -> &str {
        match side {
            Side::A => &self.connection_a,
            Side::B => &self.connection_b,
        }
    }

    fn owns(&self, side: Side, end: &ChannelEnd) -> bool {
        self.channels.iter().any(|c| c.pair.end(side) == end)
    }

    fn is_closed(&self, side: Side, end: &ChannelEnd) -> bool {
        self.channels
            .iter()
            .any(|c| c.closed && c.pair.end(side) == end)
    }

    fn open_channel(&self, pair: &ChannelPair) -> Result<&SimChannel, RelayError> {
        self.channels
            .iter()
            .find(|c| !c.closed && &c.pair == pair)
            .ok_or_else(|| RelayError::ChannelNotOpen(pair.src.channel_id.clone()))
    }

    /// `side`'s view of a channel.
    fn ibc_channel(
        &self,
        side: Side,
        pair: &ChannelPair,
        order: &IbcOrder,
        version: &str,
    ) -> IbcChannel {
        IbcChannel::new(
            pair.end(side).endpoint(),
            pair.end(side.other()).endpoint(),
            order.clone(),
            version,
            self.connection(side),
        )
    }

    /// Runs one handshake step against the contract bound to `port`.
    fn handshake(&self, side: Side, port: &str, msg: IbcSudoMsg) -> Result<(), RelayError> {
        let mut state = self.chain(side).state.borrow_mut();
        let chain_id = state.config.chain_id.clone();
        let contract = state
            .contract_for_port(port)
            .ok_or_else(|| RelayError::UnknownPort(port.to_string()))?;
        state
            .sudo(contract, &msg)
            .map(|_| ())
            .map_err(|err| RelayError::Handshake {
                chain_id,
                port: port.to_string(),
                reason: format!("{err:#}"),
            })
    }

    /// A closing handshake step. A refusal names the channel end it was
    /// refused on.
    fn close_step(
        &self,
        side: Side,
        pair: &ChannelPair,
        msg: IbcSudoMsg,
    ) -> Result<(), RelayError> {
        let end = pair.end(side);
        self.handshake(side, &end.port_id, msg).map_err(|err| match err {
            RelayError::Handshake {
                chain_id, reason, ..
            } => RelayError::ChannelClose {
                chain_id,
                channel_id: end.channel_id.clone(),
                reason,
            },
            other => other,
        })
    }

    /// Both chains forget the channel, so nothing new is committed on it.
    /// Packets already pending stay in the outboxes until timed out.
    fn mark_closed(&mut self, pair: &ChannelPair) {
        for side in [Side::A, Side::B] {
            let end = pair.end(side);
            self.chain(side)
                .state
                .borrow_mut()
                .channels
                .remove(&(end.port_id.clone(), end.channel_id.clone()));
        }
        if let Some(channel) = self.channels.iter_mut().find(|c| &c.pair == pair) {
            channel.closed = true;
        }
        info!(
            src_channel = %pair.src.channel_id,
            dest_channel = %pair.dest.channel_id,
            "channel closed"
        );
    }

    /// Packets committed on `side` for this link's channels. They stay in
    /// the chain's outbox until delivered.
    fn snapshot_pending(&self, side: Side) -> Vec<PendingPacket> {
        self.chain(side)
            .state
            .borrow()
            .outbox
            .iter()
            .filter(|p| self.owns(side, &p.src))
            .cloned()
            .collect()
    }

    /// Drops `packet` from the outbox of `side`.
    fn mark_relayed(&self, side: Side, packet: &PendingPacket) {
        self.chain(side)
            .state
            .borrow_mut()
            .outbox
            .retain(|p| !(p.src == packet.src && p.sequence == packet.sequence));
    }

    fn delivery_failed(&self, side: Side, err: anyhow::Error) -> RelayError {
        RelayError::Delivery {
            chain_id: self.chain(side).state.borrow().config.chain_id.clone(),
            reason: format!("{err:#}"),
        }
    }

    /// Receives `packet` on the side opposite `from` and settles the
    /// outcome back on `from`.
    fn deliver(
        &self,
        from: Side,
        packet: PendingPacket,
        result: &mut RelayResult,
    ) -> Result<(), RelayError> {
        let to = from.other();
        let dest = self.chain(to);
        let src = self.chain(from);
        let ibc_packet = packet.to_ibc_packet();
        let src_contract = src_contract(src, &packet)?;

        // a closed channel times out everything still pending on it
        let closed = self.is_closed(from, &packet.src);
        if closed || dest.state.borrow().is_timed_out(&packet.timeout) {
            debug!(side = %from, sequence = packet.sequence, closed, "packet timed out");
            let relayer = src.state.borrow().relayer.clone();
            let msg = IbcSudoMsg::PacketTimeout(IbcPacketTimeoutMsg::new(ibc_packet, relayer));
            let refunded = src.state.borrow_mut().sudo(&src_contract, &msg);
            refunded.map_err(|err| self.delivery_failed(from, err))?;
            src.state.borrow_mut().end_block();
            self.mark_relayed(from, &packet);
            match from {
                Side::A => result.timeouts_from_a.push(packet),
                Side::B => result.timeouts_from_b.push(packet),
            }
            return Ok(());
        }

        let acknowledgement = {
            let mut state = dest.state.borrow_mut();
            let contract = state
                .contract_for_port(&packet.dest.port_id)
                .ok_or_else(|| RelayError::UnknownPort(packet.dest.port_id.clone()))?
                .to_string();
            let msg = IbcSudoMsg::PacketReceive(IbcPacketReceiveMsg::new(
                ibc_packet.clone(),
                state.relayer.clone(),
            ));
            let ack = match state.sudo(&contract, &msg) {
                Ok(res) => res.data,
                // wasmd writes an error ack when the receive handler fails
                Err(err) => {
                    warn!(side = %to, sequence = packet.sequence, "receive failed: {err:#}");
                    Some(ack_fail(format!("{err:#}")))
                }
            };
            state.end_block();
            ack
        };
        // the receive is committed on `to`, so the packet cannot be relayed
        // again whatever happens to the ack
        self.mark_relayed(from, &packet);
        let acknowledgement = acknowledgement.ok_or_else(|| RelayError::Delivery {
            chain_id: dest.state.borrow().config.chain_id.clone(),
            reason: format!("no acknowledgement for packet {}", packet.sequence),
        })?;

        let relayer = src.state.borrow().relayer.clone();
        let msg = IbcSudoMsg::PacketAck(IbcPacketAckMsg::new(
            IbcAcknowledgement::new(acknowledgement.clone()),
            ibc_packet,
            relayer,
        ));
        let settled = src.state.borrow_mut().sudo(&src_contract, &msg);
        settled.map_err(|err| self.delivery_failed(from, err))?;
        src.state.borrow_mut().end_block();

        let record = AckRecord {
            acknowledgement,
            original_packet: packet,
        };
        match to {
            Side::A => result.acks_from_a.push(record),
            Side::B => result.acks_from_b.push(record),
        }
        Ok(())
    }
}

fn src_contract(chain: &SimChain, packet: &PendingPacket) -> Result<String, RelayError> {
    chain
        .state
        .borrow()
        .contract_for_port(&packet.src.port_id)
        .map(str::to_string)
        .ok_or_else(|| RelayError::UnknownPort(packet.src.port_id.clone()))
}

impl Link for SimLink {
    fn create_channel(
        &mut self,
        port_a: &str,
        port_b: &str,
        order: IbcOrder,
        version: &str,
    ) -> Result<ChannelPair, RelayError> {
        let src = ChannelEnd {
            port_id: port_a.to_string(),
            channel_id: self.a.state.borrow_mut().allocate_channel(),
        };
        let dest = ChannelEnd {
            port_id: port_b.to_string(),
            channel_id: self.b.state.borrow_mut().allocate_channel(),
        };
        let pair = ChannelPair { src, dest };
        let channel = |side: Side| self.ibc_channel(side, &pair, &order, version);

        self.handshake(
            Side::A,
            port_a,
            IbcSudoMsg::ChannelOpen(IbcChannelOpenMsg::new_init(channel(Side::A))),
        )?;
        self.handshake(
            Side::B,
            port_b,
            IbcSudoMsg::ChannelOpen(IbcChannelOpenMsg::new_try(channel(Side::B), version)),
        )?;
        self.handshake(
            Side::A,
            port_a,
            IbcSudoMsg::ChannelConnect(IbcChannelConnectMsg::new_ack(channel(Side::A), version)),
        )?;
        self.handshake(
            Side::B,
            port_b,
            IbcSudoMsg::ChannelConnect(IbcChannelConnectMsg::new_confirm(channel(Side::B))),
        )?;

        for side in [Side::A, Side::B] {
            let (local, remote) = (pair.end(side), pair.end(side.other()));
            self.chain(side).state.borrow_mut().channels.insert(
                (local.port_id.clone(), local.channel_id.clone()),
                remote.clone(),
            );
        }
        info!(
            src_channel = %pair.src.channel_id,
            dest_channel = %pair.dest.channel_id,
            version,
            "channel open"
        );
        self.channels.push(SimChannel {
            pair: pair.clone(),
            order,
            version: version.to_string(),
            closed: false,
        });
        Ok(pair)
    }

    fn relay_all(&mut self) -> Result<RelayResult, RelayError> {
        let from_a = self.snapshot_pending(Side::A);
        let from_b = self.snapshot_pending(Side::B);
        let mut result = RelayResult {
            packets_from_a: from_a.len(),
            packets_from_b: from_b.len(),
            ..Default::default()
        };
        for packet in from_a {
            self.deliver(Side::A, packet, &mut result)?;
        }
        for packet in from_b {
            self.deliver(Side::B, packet, &mut result)?;
        }
        info!(
            packets_from_a = result.packets_from_a,
            packets_from_b = result.packets_from_b,
            "relayed"
        );
        Ok(result)
    }

    fn pending_packets(&self, side: Side) -> Result<Vec<PendingPacket>, RelayError> {
        Ok(self.snapshot_pending(side))
    }
    fn close_channel(&mut self, side: Side, channel: &ChannelPair) -> Result<(), RelayError> {
        let open = self.open_channel(channel)?;
        let init = self.ibc_channel(side, channel, &open.order, &open.version);
        let confirm = self.ibc_channel(side.other(), channel, &open.order, &open.version);
        self.close_step(
            side,
            channel,
            IbcSudoMsg::ChannelClose(IbcChannelCloseMsg::new_init(init)),
        )?;
        self.close_step(
            side.other(),
            channel,
            IbcSudoMsg::ChannelClose(IbcChannelCloseMsg::new_confirm(confirm)),
        )?;
        self.mark_closed(channel);
        Ok(())
    }

    fn confirm_counterparty_close(
        &mut self,
        side: Side,
        channel: &ChannelPair,
    ) -> Result<(), RelayError> {
        let open = self.open_channel(channel)?;
        let confirm = self.ibc_channel(side, channel, &open.order, &open.version);
        self.close_step(
            side,
            channel,
            IbcSudoMsg::ChannelClose(IbcChannelCloseMsg::new_confirm(confirm)),
        )?;
        self.mark_closed(channel);
        Ok(())
    }
}
