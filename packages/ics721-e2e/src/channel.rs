use cosmwasm_std::IbcOrder;
use tracing::info;

use crate::{
    chain::ChainClient,
    error::E2eError,
    relay::{ChannelEnd, ChannelPair, Link, Relayer, Side},
};

/// A channel and the only link allowed to relay over it.
pub struct ChannelHandle {
    pub channel: ChannelPair,
    pub link: Box<dyn Link>,
}

impl ChannelHandle {
    pub fn end(&self, side: Side) -> &ChannelEnd {
        self.channel.end(side)
    }
}

fn port_of(client: &dyn ChainClient, contract: &str) -> Result<String, E2eError> {
    client
        .ibc_port(contract)
        .map_err(|source| E2eError::Query {
            contract: contract.to_string(),
            source,
        })?
        .ok_or_else(|| E2eError::NoIbcPort(contract.to_string()))
}

/// Opens a new connection and a channel between the ports of
/// `contract_a` and `contract_b`. Every call yields fresh channel ids.
pub fn create_ibc_connection_and_channel(
    relayer: &dyn Relayer,
    a: &dyn ChainClient,
    b: &dyn ChainClient,
    contract_a: &str,
    contract_b: &str,
    order: IbcOrder,
    version: &str,
) -> Result<ChannelHandle, E2eError> {
    let port_a = port_of(a, contract_a)?;
    let port_b = port_of(b, contract_b)?;
    let mut link = relayer.connect(&a.chain_id(), &b.chain_id())?;
    let channel = link.create_channel(&port_a, &port_b, order, version)?;
    info!(
        src = %channel.src.channel_id,
        dest = %channel.dest.channel_id,
        version,
        "channel open"
    );
    Ok(ChannelHandle { channel, link })
}
