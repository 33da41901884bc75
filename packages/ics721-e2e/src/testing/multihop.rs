//! Three chains: A and B as configured plus C, with the bridge on B
//! holding a channel to each. Driven through the msg helpers since a
//! scenario context only spans two chains.

use cosmwasm_std::IbcOrder;
use ics721_types::token_types::ClassId;
use test_log::test;

use super::fixtures::native_codes;
use crate::{
    ack::{self, Expect},
    chain::{ChainClient, ChainClientExt},
    channel::{create_ibc_connection_and_channel, ChannelHandle},
    config::{ChainConfig, E2eConfig},
    error::RelayError,
    msg::{
        cw721::{self, cw721_instantiate_msg, Cw721Version},
        ics721::{self, ibc_outgoing_msg, TimeoutSpec},
    },
    provision::{instantiate_bridge, upload_and_instantiate, BridgeProxies, ContractMsg},
    relay::{Relayer, Side},
    scenario::{
        steps::{CW721_WASM, ICS721_WASM},
        BRIDGE, CW721,
    },
    sim::{SimChain, SimNetwork},
};

fn chain_c() -> ChainConfig {
    ChainConfig {
        chain_id: "juno-1".to_string(),
        bech32_prefix: "juno".to_string(),
        mnemonic: "clip hire initial neck maid actor venue client foam budget lock catalog"
            .to_string(),
        revision: 1,
    }
}

struct Hop {
    chains: [SimChain; 3],
    bridges: [String; 3],
    network: SimNetwork,
}

impl Hop {
    fn new() -> anyhow::Result<Self> {
        let config = E2eConfig::default();
        let mut network = SimNetwork::new(&config, native_codes())?;
        let c = network.add_chain(chain_c(), native_codes())?;
        let chains = [network.chain(Side::A), network.chain(Side::B), c];

        let artifacts = native_codes();
        let mut bridges = Vec::with_capacity(3);
        for chain in &chains {
            let records = upload_and_instantiate(
                chain,
                &artifacts,
                &[
                    (CW721, ContractMsg::upload_only(CW721_WASM)),
                    (BRIDGE, ContractMsg::upload_only(ICS721_WASM)),
                ],
            )?;
            bridges.push(instantiate_bridge(
                chain,
                records[BRIDGE].code_id,
                records[CW721].code_id,
                BridgeProxies::default(),
            )?);
        }
        let bridges = bridges
            .try_into()
            .map_err(|_| anyhow::anyhow!("one bridge per chain"))?;
        Ok(Self {
            chains,
            bridges,
            network,
        })
    }

    /// Channel between chains `a` and `b`, `a` being side A of the link.
    fn connect(&self, a: usize, b: usize) -> anyhow::Result<ChannelHandle> {
        Ok(create_ibc_connection_and_channel(
            &self.network,
            &self.chains[a],
            &self.chains[b],
            &self.bridges[a],
            &self.bridges[b],
            IbcOrder::Unordered,
            "ics721-1",
        )?)
    }

    /// Sends `token_id` of `cw721` on chain `from` over `side` of
    /// `channel` to the sender of chain `to`, and relays it.
    fn hop(
        &self,
        channel: &mut ChannelHandle,
        side: Side,
        (from, to): (usize, usize),
        cw721: &str,
        token_id: &str,
    ) -> anyhow::Result<()> {
        let msg = ibc_outgoing_msg(
            &self.chains[to].sender(),
            &channel.end(side).channel_id,
            TimeoutSpec::Block {
                revision: 1,
                height: 90000,
            },
            None,
        );
        ics721::transfer(&self.chains[from], cw721, &self.bridges[from], &msg, token_id)?;
        let relay = channel.link.relay_all()?;
        match side {
            Side::A => ack::assert_packets_from_a(&relay, 1, Expect::Success)?,
            Side::B => ack::assert_packets_from_b(&relay, 1, Expect::Success)?,
        }
        Ok(())
    }

    /// Voucher collection on chain `on` for `class_id`.
    fn voucher(&self, on: usize, class_id: &ClassId) -> anyhow::Result<String> {
        ics721::nft_contract(&self.chains[on], &self.bridges[on], class_id)?
            .map(|addr| addr.into_string())
            .ok_or_else(|| anyhow::anyhow!("no voucher for {class_id}"))
    }
}

#[test]
fn class_ids_stack_per_hop_and_unwind_on_the_way_home() -> anyhow::Result<()> {
    let hop = Hop::new()?;
    let [a, b, c] = &hop.chains;
    let mut ab = hop.connect(0, 1)?;
    let mut bc = hop.connect(1, 2)?;

    let code_id = ics721::cw721_code_id(a, &hop.bridges[0])?;
    let collection = a.instantiate_json(
        code_id,
        &cw721_instantiate_msg(Cw721Version::V018, "ark", "ark", &a.sender()),
        "label collection",
        None,
    )?;
    cw721::mint(a, &collection, "1", &a.sender(), None)?;

    hop.hop(&mut ab, Side::A, (0, 1), &collection, "1")?;
    let end_b = ab.end(Side::B).clone();
    let class_b = ClassId::voucher(&end_b.port_id, &end_b.channel_id, &collection);
    let voucher_b = hop.voucher(1, &class_b)?;
    assert_eq!(cw721::owner_of(b, &voucher_b, "1")?.owner, b.sender());

    // B is side A of the B-C link
    hop.hop(&mut bc, Side::A, (1, 2), &voucher_b, "1")?;
    let end_c = bc.end(Side::B).clone();
    let class_c = ClassId::voucher(&end_c.port_id, &end_c.channel_id, &class_b);
    assert_eq!(
        &*class_c,
        format!(
            "{}/{}/{}/{}/{collection}",
            end_c.port_id, end_c.channel_id, end_b.port_id, end_b.channel_id
        )
    );
    let voucher_c = hop.voucher(2, &class_c)?;
    assert_eq!(cw721::owner_of(c, &voucher_c, "1")?.owner, c.sender());
    assert_eq!(
        cw721::owner_of(b, &voucher_b, "1")?.owner,
        hop.bridges[1],
        "B escrows its voucher while it is away"
    );

    hop.hop(&mut bc, Side::B, (2, 1), &voucher_c, "1")?;
    assert_eq!(cw721::num_tokens(c, &voucher_c)?, 0);
    assert_eq!(cw721::owner_of(b, &voucher_b, "1")?.owner, b.sender());

    hop.hop(&mut ab, Side::B, (1, 0), &voucher_b, "1")?;
    assert_eq!(cw721::num_tokens(b, &voucher_b)?, 0);
    assert_eq!(cw721::owner_of(a, &collection, "1")?.owner, a.sender());
    assert!(ics721::outgoing_channels(a, &hop.bridges[0])?.is_empty());
    assert!(ics721::incoming_channels(b, &hop.bridges[1])?.is_empty());
    Ok(())
}

#[test]
fn relayer_only_connects_known_chains() -> anyhow::Result<()> {
    let hop = Hop::new()?;
    hop.network.connect("wasmd-1", "juno-1")?;
    assert!(matches!(
        hop.network.connect("wasmd-1", "stargaze-1"),
        Err(RelayError::UnknownChain(id)) if id == "stargaze-1"
    ));
    Ok(())
}
