use std::path::PathBuf;

use cosmwasm_std::{to_json_binary, IbcOrder};
use rstest::rstest;
use test_log::test;

use super::fixtures::{context, context_with, native_codes};
use crate::{
    chain::{ChainClient, ChainClientExt, Fee},
    config::{ChannelOrder, E2eConfig},
    error::{ChainError, E2eError, RelayError},
    logging,
    msg::cw721::{self, cw721_instantiate_msg, Cw721InstantiateMsg, Cw721Version},
    relay::{Relayer, Side},
    scenario::{
        steps,
        suites::{self, CHANNEL},
        Account, Scenario, ScenarioContext, Transfer, TransferTimeout, BRIDGE, CW721,
    },
    sim::SimNetwork,
};

#[test]
fn chains_use_their_own_prefix() {
    let (ctx, _) = context();
    assert!(ctx.chain(Side::A).sender().starts_with("wasm1"));
    assert!(ctx.chain(Side::B).sender().starts_with("osmo1"));
    assert_eq!(ctx.chain(Side::A).chain_id(), "wasmd-1");
    assert_eq!(ctx.chain(Side::B).chain_id(), "osmo-testing-1");
}

#[test]
fn unknown_code_is_refused() {
    let (ctx, _) = context();
    let err = ctx.chain(Side::A).upload(b"nope.wasm", "Upload nope").unwrap_err();
    assert!(matches!(err, ChainError::UnknownCode(name) if name == "nope.wasm"));
}

#[test]
fn every_transaction_is_its_own_block() {
    let (ctx, _) = context();
    let chain = ctx.chain(Side::A);
    let code_id = chain.upload(steps::CW721_WASM.as_bytes(), "Upload cw721").unwrap();
    let sender = chain.sender();
    let collection = chain
        .instantiate_json(
            code_id,
            &cw721_instantiate_msg(Cw721Version::V016, "ark", "ark", &sender),
            "label cw721",
            Some(&sender),
        )
        .unwrap();

    let before = chain.height().unwrap();
    let first = cw721::mint(chain, &collection, "1", &sender, None).unwrap();
    let second = cw721::mint(chain, &collection, "2", &sender, None).unwrap();
    assert_eq!(first.height, before);
    assert_eq!(second.height, before + 1);
    assert_ne!(first.transaction_hash, second.transaction_hash);
    assert_eq!(first.transaction_hash.len(), 64);
    assert_eq!(chain.height().unwrap(), before + 2);
}

#[rstest]
#[case::v016(Cw721Version::V016)]
#[case::v018(Cw721Version::V018)]
#[test_log::test]
fn registered_cw721_takes_each_instantiate_shape(#[case] version: Cw721Version) {
    let (ctx, _) = context();
    let chain = ctx.chain(Side::B);
    let code_id = chain.upload(steps::CW721_WASM.as_bytes(), "Upload cw721").unwrap();
    let sender = chain.sender();
    let collection = chain
        .instantiate_json(
            code_id,
            &cw721_instantiate_msg(version, "ark", "ARK", &sender),
            "label cw721",
            Some(&sender),
        )
        .unwrap();
    let info = cw721::contract_info(chain, &collection).unwrap();
    assert_eq!((info.name.as_str(), info.symbol.as_str()), ("ark", "ARK"));
}

#[test]
fn registered_cw721_has_no_withdraw_address() {
    let (ctx, _) = context();
    let chain = ctx.chain(Side::A);
    let code_id = chain.upload(steps::CW721_WASM.as_bytes(), "Upload cw721").unwrap();
    let sender = chain.sender();
    let msg = Cw721InstantiateMsg::V018 {
        name: "ark".to_string(),
        symbol: "ark".to_string(),
        minter: sender.clone(),
        withdraw_address: Some(sender.clone()),
    };
    let err = chain
        .instantiate_json(code_id, &msg, "label cw721", Some(&sender))
        .unwrap_err();
    assert!(format!("{err}").contains("withdraw_address"), "{err}");
}

#[test]
fn failed_transaction_reports_the_chain() {
    let (ctx, _) = context();
    let chain = ctx.chain(Side::B);
    let err = chain
        .execute(
            "osmo1nothere",
            &to_json_binary(&cosmwasm_std::Empty {}).unwrap(),
            &Fee::Auto,
        )
        .unwrap_err();
    assert!(matches!(err, ChainError::TxFailed { chain_id, .. } if chain_id == "osmo-testing-1"));
}

#[test]
fn only_bridges_get_ports() -> anyhow::Result<()> {
    let (mut ctx, _) = context();
    Scenario::new("bridges")
        .steps([steps::provision(), steps::instantiate_bridge(Side::A)])
        .run(&mut ctx)?;
    let chain = ctx.chain(Side::A);
    let bridge = ctx.bridge(Side::A)?;
    assert_eq!(chain.ibc_port(&bridge)?, Some(format!("wasm.{bridge}")));
    assert_eq!(chain.ibc_port(&ctx.contract(Side::A, "cw721")?)?, None);
    Ok(())
}

#[test]
fn ordered_channels_are_refused() {
    let mut config = E2eConfig::default();
    config.channel.order = ChannelOrder::Ordered;
    let (mut ctx, _) = context_with(config);
    let err = Scenario::new("ordered")
        .steps(suites::setup())
        .run(&mut ctx)
        .unwrap_err();
    match err.root() {
        E2eError::Relay(RelayError::Handshake { chain_id, .. }) => {
            assert_eq!(chain_id, "wasmd-1")
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(ctx.channels.is_empty());
}

#[test]
fn wrong_version_is_refused() {
    let mut config = E2eConfig::default();
    config.channel.version = "ics20-1".to_string();
    let (mut ctx, _) = context_with(config);
    let err = Scenario::new("ics20")
        .steps(suites::setup())
        .run(&mut ctx)
        .unwrap_err();
    assert!(matches!(
        err.root(),
        E2eError::Relay(RelayError::Handshake { .. })
    ));
}

#[test]
fn channel_on_a_port_less_contract_fails() -> anyhow::Result<()> {
    let (mut ctx, network) = context();
    Scenario::new("provision")
        .steps([steps::provision(), steps::instantiate_bridge(Side::B)])
        .run(&mut ctx)?;
    let err = crate::channel::create_ibc_connection_and_channel(
        &network,
        ctx.chain(Side::A),
        ctx.chain(Side::B),
        &ctx.contract(Side::A, "cw721")?,
        &ctx.bridge(Side::B)?,
        IbcOrder::Unordered,
        "ics721-1",
    )
    .err()
    .unwrap();
    assert!(matches!(err, E2eError::NoIbcPort(_)));
    Ok(())
}

#[test]
fn relayer_knows_only_its_chains() {
    let network = SimNetwork::new(&E2eConfig::default(), native_codes()).unwrap();
    let err = network.connect("wasmd-1", "juno-1").err().unwrap();
    assert!(matches!(err, RelayError::UnknownChain(id) if id == "juno-1"));
}

#[test]
fn nothing_pending_settles_at_zero() -> anyhow::Result<()> {
    logging::init();
    logging::init();

    let (mut ctx, _) = context();
    Scenario::new("idle").steps(suites::setup()).run(&mut ctx)?;
    let link = ctx.channel(suites::CHANNEL)?.link.as_ref();
    let policy = ctx.config.settle.clone();
    assert_eq!(crate::wait::settle(link, Side::A, &policy)?, 0);
    assert_eq!(crate::wait::settle(link, Side::B, &policy)?, 0);
    assert!(ctx.contract(Side::A, BRIDGE).is_ok());
    Ok(())
}

#[test]
fn failed_delivery_leaves_the_batch_pending() -> anyhow::Result<()> {
    const MALICIOUS: &str = "malicious";
    let (mut ctx, _) = context();
    Scenario::new("stuck refund")
        .steps(suites::setup())
        .steps([
            steps::instantiate_malicious_collection(Side::A, MALICIOUS),
            steps::mint(Side::A, MALICIOUS, "1", Account::Sender(Side::A)),
            steps::mint(Side::A, CW721, "2", Account::Sender(Side::A)),
            // the refund of this one fails: the collection refuses the bridge
            steps::send(
                Transfer::new(Side::A, MALICIOUS, "1", CHANNEL).timeout(TransferTimeout::Expired),
            ),
            steps::send(Transfer::new(Side::A, CW721, "2", CHANNEL)),
        ])
        .run(&mut ctx)?;

    let link = &mut ctx.channel_mut(CHANNEL)?.link;
    for _ in 0..2 {
        let err = link.relay_all().unwrap_err();
        assert!(
            matches!(&err, RelayError::Delivery { chain_id, .. } if chain_id == "wasmd-1"),
            "{err}"
        );
        let pending = link.pending_packets(Side::A)?;
        assert_eq!(
            pending.iter().map(|p| p.sequence).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }
    Ok(())
}

#[test]
fn provision_reads_binaries_from_the_artifact_root() {
    let config = E2eConfig {
        artifact_root: PathBuf::from("/nonexistent/ics721-artifacts"),
        ..E2eConfig::default()
    };
    let network = SimNetwork::new(&config, native_codes()).unwrap();
    let mut ctx = ScenarioContext::from_config(
        Box::new(network.chain(Side::A)),
        Box::new(network.chain(Side::B)),
        Box::new(network.clone()),
        config,
    );
    let err = Scenario::new("artifacts from disk")
        .step(steps::provision())
        .run(&mut ctx)
        .unwrap_err();
    match err.root() {
        E2eError::Artifact { path, .. } => assert_eq!(path, steps::CW721_WASM),
        other => panic!("unexpected error {other:?}"),
    }
}
