use test_log::test;

use super::fixtures::{context, run};
use crate::{
    ack::{self, AckOutcome, Expect},
    chain::ChainClient,
    error::{AssertionError, E2eError, RelayError},
    msg::{callback, cw721, ics721},
    relay::Side,
    scenario::{
        steps::{self, Direction},
        suites::{self, CHANNEL, TESTER, VOUCHER},
        Account, Scenario, Transfer, BRIDGE, CW721,
    },
};

#[test]
fn unidirectional_transfer() -> anyhow::Result<()> {
    let (ctx, _) = run(suites::unidirectional())?;

    let bridge_a = ctx.bridge(Side::A)?;
    let collection = ctx.contract(Side::A, CW721)?;
    let owner = cw721::owner_of(ctx.chain(Side::A), &collection, "1")?;
    assert_eq!(owner.owner, bridge_a);

    // class id is destination port / destination channel / source contract
    let end = ctx.channel(CHANNEL)?.end(Side::B).clone();
    let class_id = format!("{}/{}/{}", end.port_id, end.channel_id, collection);
    let voucher = ctx.contract(Side::B, VOUCHER)?;
    assert_eq!(
        ics721::class_id(ctx.chain(Side::B), &ctx.bridge(Side::B)?, &voucher)?,
        Some(class_id)
    );
    Ok(())
}

#[test]
fn transfer_to_a_third_party_receiver() -> anyhow::Result<()> {
    let (mut ctx, network) = context();
    let receiver = network.chain(Side::B).addr_make("receiver")?;

    Scenario::new("third party receiver")
        .steps(suites::setup())
        .steps([
            steps::mint(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::send(
                Transfer::new(Side::A, CW721, "1", CHANNEL)
                    .receiver(Account::Address(receiver.clone())),
            ),
            steps::relay(CHANNEL),
            steps::expect_acks(Side::A, 1, Expect::Success),
            steps::resolve_voucher(Side::B, CHANNEL, CW721, VOUCHER),
            steps::assert_owner(Side::B, VOUCHER, "1", Account::Address(receiver)),
        ])
        .run(&mut ctx)?;
    Ok(())
}

#[test]
fn round_trip() -> anyhow::Result<()> {
    let (ctx, _) = run(suites::round_trip())?;
    let voucher = ctx.contract(Side::B, VOUCHER)?;
    assert!(cw721::all_tokens(ctx.chain(Side::B), &voucher)?.is_empty());
    Ok(())
}

#[test]
fn incoming_allow_list_rejection() -> anyhow::Result<()> {
    let (ctx, _) = run(suites::incoming_allow_list_rejection())?;
    let allowed = ctx.channel("allowed")?.end(Side::B).channel_id.clone();
    let blocked = ctx.channel("blocked")?.end(Side::B).channel_id.clone();
    assert_ne!(allowed, blocked);

    let incoming = ics721::incoming_channels(ctx.chain(Side::B), &ctx.bridge(Side::B)?)?;
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].1, allowed);
    Ok(())
}

#[test]
fn outgoing_rate_limit_rejection() -> anyhow::Result<()> {
    let (ctx, _) = run(suites::outgoing_rate_limit_rejection())?;
    let proxy = ics721::outgoing_proxy(ctx.chain(Side::A), &ctx.bridge(Side::A)?)?;
    assert!(proxy.is_some());
    Ok(())
}

#[test]
fn malicious_nft() -> anyhow::Result<()> {
    run(suites::malicious_nft())?;
    Ok(())
}

#[test]
fn timeout_refund() -> anyhow::Result<()> {
    let (ctx, _) = run(suites::timeout_refund())?;
    let relay = ctx.last_relay()?;
    assert_eq!(relay.packets_from_a, 1);
    assert!(relay.acks_from_b.is_empty());
    Ok(())
}

#[test]
fn admin_cleanup() -> anyhow::Result<()> {
    run(suites::admin_cleanup())?;
    Ok(())
}

#[test]
fn class_id_idempotence() -> anyhow::Result<()> {
    run(suites::class_id_idempotence())?;
    Ok(())
}

#[test]
fn multi_dispatch_fifo() -> anyhow::Result<()> {
    let (ctx, _) = run(suites::multi_dispatch_fifo())?;
    let sequences: Vec<u64> = ctx
        .last_relay()?
        .acks_from_b
        .iter()
        .map(|ack| ack.original_packet.sequence)
        .collect();
    assert_eq!(sequences, vec![1, 2]);
    Ok(())
}

#[test]
fn close_rejected() -> anyhow::Result<()> {
    let (mut ctx, _) = run(suites::close_rejected())?;
    let handle = ctx.channel_mut(CHANNEL)?;
    let pair = handle.channel.clone();
    match handle.link.close_channel(Side::A, &pair) {
        Err(RelayError::ChannelClose {
            chain_id,
            channel_id,
            reason,
        }) => {
            assert_eq!(chain_id, "wasmd-1");
            assert_eq!(channel_id, pair.src.channel_id);
            assert!(reason.contains("ICS 721 channels may not be closed"), "{reason}");
        }
        other => panic!("unexpected result {other:?}"),
    }
    Ok(())
}

#[test]
fn unexpected_close() -> anyhow::Result<()> {
    let (mut ctx, _) = run(suites::unexpected_close())?;
    assert_eq!(ctx.last_relay()?.timeouts_from(Side::A).len(), 1);

    let handle = ctx.channel_mut(CHANNEL)?;
    let pair = handle.channel.clone();
    assert!(handle.link.pending_packets(Side::A)?.is_empty());
    assert!(matches!(
        handle.link.close_channel(Side::B, &pair),
        Err(RelayError::ChannelNotOpen(_))
    ));
    Ok(())
}

#[test]
fn callbacks_round_trip() -> anyhow::Result<()> {
    let (ctx, _) = run(suites::callbacks_round_trip())?;
    // A's tester last heard of the NFT when it came home
    let tester_a = ctx.contract(Side::A, TESTER)?;
    let nft_contract = callback::nft_contract(ctx.chain(Side::A), &tester_a)?;
    assert_eq!(
        nft_contract.map(|addr| addr.into_string()),
        Some(ctx.contract(Side::A, CW721)?)
    );
    Ok(())
}

#[test]
fn callbacks_to_explicit_addresses() -> anyhow::Result<()> {
    let (ctx, _) = run(suites::callbacks_to_explicit_addresses())?;
    // neither end holds the NFT, so only the memo routed the callbacks
    let tester_b = ctx.contract(Side::B, TESTER)?;
    let voucher = ctx.contract(Side::B, VOUCHER)?;
    assert_ne!(cw721::owner_of(ctx.chain(Side::B), &voucher, "1")?.owner, tester_b);
    Ok(())
}

#[test]
fn callback_on_timeout() -> anyhow::Result<()> {
    let (ctx, _) = run(suites::callback_on_timeout())?;
    let tester_b = ctx.contract(Side::B, TESTER)?;
    assert_eq!(callback::nft_contract(ctx.chain(Side::B), &tester_b)?, None);
    Ok(())
}

#[test]
fn failed_receive_callback() -> anyhow::Result<()> {
    let (ctx, _) = run(suites::failed_receive_callback())?;
    let acks = ctx.last_relay()?.acks_for_packets_from(Side::A);
    match ack::decode_ack(0, &acks[0].acknowledgement)? {
        AckOutcome::Error(error) => {
            assert!(error.contains("callback failed on request"), "{error}")
        }
        AckOutcome::Success(_) => panic!("expected an error ack"),
    }
    Ok(())
}

#[test]
fn failed_ack_callback() -> anyhow::Result<()> {
    let (ctx, _) = run(suites::failed_ack_callback())?;
    let tester_b = ctx.contract(Side::B, TESTER)?;
    assert_eq!(callback::nft_contract(ctx.chain(Side::B), &tester_b)?, None);
    Ok(())
}

#[test]
fn every_suite_runs_on_fresh_chains() -> anyhow::Result<()> {
    for scenario in suites::all() {
        let name = scenario.name().to_string();
        run(scenario).map_err(|err| anyhow::anyhow!("{name}: {err:?}"))?;
    }
    Ok(())
}

#[test]
fn failing_step_is_named() {
    let err = run(Scenario::new("missing token")
        .steps(suites::setup())
        .step(steps::assert_owner(
            Side::A,
            CW721,
            "9",
            Account::Sender(Side::A),
        )))
    .err()
    .unwrap();

    match &err {
        E2eError::Step { step, .. } => assert_eq!(step, "assert owner of 9 in cw721 on A"),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(matches!(err.root(), E2eError::Query { .. }));
}

#[test]
fn steps_after_a_failure_do_not_run() {
    let (mut ctx, _) = context();
    let mut scenario = Scenario::new("stops early")
        .steps(suites::setup())
        .step(steps::expect_acks(Side::A, 1, Expect::Success))
        .step(steps::mint(Side::A, CW721, "1", Account::Sender(Side::A)));
    scenario.run(&mut ctx).unwrap_err();

    let collection = ctx.contract(Side::A, CW721).unwrap();
    assert_eq!(cw721::num_tokens(ctx.chain(Side::A), &collection).unwrap(), 0);
}

#[test]
fn pending_count_counts_dispatches_since_last_relay() -> anyhow::Result<()> {
    let (mut ctx, _) = context();
    Scenario::new("pending")
        .steps(suites::setup())
        .steps([
            steps::mint(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::mint(Side::A, CW721, "2", Account::Sender(Side::A)),
            steps::send(Transfer::new(Side::A, CW721, "1", CHANNEL)),
            steps::assert_pending(CHANNEL, Side::A),
            steps::relay(CHANNEL),
            steps::send(Transfer::new(Side::A, CW721, "2", CHANNEL)),
        ])
        .run(&mut ctx)?;

    assert_eq!(ctx.dispatched(CHANNEL, Side::A), 1);
    let link = ctx.channel(CHANNEL)?.link.as_ref();
    ack::assert_pending_count(link, Side::A, 1)?;
    ack::assert_pending_count(link, Side::B, 0)?;

    let err = ack::assert_pending_count(link, Side::A, 2).unwrap_err();
    assert!(matches!(
        err,
        E2eError::Assertion(AssertionError::Count {
            expected: 2,
            actual: 1,
            ..
        })
    ));
    Ok(())
}

#[test]
fn relay_only_drains_its_own_channel() -> anyhow::Result<()> {
    let (mut ctx, _) = context();
    Scenario::new("two channels")
        .steps([
            steps::provision(),
            steps::instantiate_bridge(Side::A),
            steps::instantiate_bridge(Side::B),
            steps::create_channel("one"),
            steps::create_channel("two"),
            steps::mint(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::mint(Side::A, CW721, "2", Account::Sender(Side::A)),
            steps::send(Transfer::new(Side::A, CW721, "1", "one")),
            steps::send(Transfer::new(Side::A, CW721, "2", "two")),
            steps::relay("one"),
            steps::expect_acks(Side::A, 1, Expect::Success),
            steps::assert_pending("two", Side::A),
        ])
        .run(&mut ctx)?;

    let one = ctx.channel("one")?;
    let two = ctx.channel("two")?;
    assert_eq!(one.end(Side::A).channel_id, "channel-0");
    assert_eq!(two.end(Side::A).channel_id, "channel-1");
    assert_eq!(two.end(Side::B).channel_id, "channel-1");
    assert_eq!(two.link.pending_packets(Side::A)?.len(), 1);
    Ok(())
}

#[test]
fn registry_change_is_detected() {
    let err = run(Scenario::new("registry")
        .steps(suites::setup())
        .steps([
            steps::mint(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::snapshot_registry(Side::A),
            steps::send(Transfer::new(Side::A, CW721, "1", CHANNEL)),
            steps::assert_registry_unchanged(Side::A),
        ]))
    .err()
    .unwrap();
    assert!(matches!(
        err.root(),
        E2eError::Assertion(AssertionError::RegistryChanged { .. })
    ));
}

#[test]
fn committed_dispatch_is_not_a_rejection() {
    let err = run(Scenario::new("not rejected")
        .steps(suites::setup())
        .steps([
            steps::mint(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::send_rejected(Transfer::new(Side::A, CW721, "1", CHANNEL)),
        ]))
    .err()
    .unwrap();
    assert!(matches!(
        err.root(),
        E2eError::Assertion(AssertionError::Mismatch { .. })
    ));
}

#[test]
fn wrong_ack_expectation_fails() {
    let err = run(Scenario::new("expects an error")
        .steps(suites::setup())
        .steps([
            steps::mint(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::send(Transfer::new(Side::A, CW721, "1", CHANNEL)),
            steps::relay(CHANNEL),
            steps::expect_acks(Side::A, 1, Expect::Error),
        ]))
    .err()
    .unwrap();
    assert_eq!(
        err.root().to_string(),
        AssertionError::UnexpectedSuccess { index: 0 }.to_string()
    );
}

#[test]
fn admin_unescrow_checks_the_collection() -> anyhow::Result<()> {
    let (mut ctx, _) = context();
    Scenario::new("escrowed")
        .steps(suites::setup())
        .steps([
            steps::mint(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::send(Transfer::new(Side::A, CW721, "1", CHANNEL)),
            steps::assert_channel_entries(Side::A, Direction::Outgoing, 1),
        ])
        .run(&mut ctx)?;

    let collection = ctx.contract(Side::A, CW721)?;
    let err = ics721::admin_clean_and_unescrow_nft(
        ctx.chain(Side::A),
        &ctx.bridge(Side::A)?,
        &ctx.chain(Side::A).sender(),
        "1",
        &collection,
        "not-a-collection",
    )
    .unwrap_err();
    assert!(matches!(err, E2eError::Execute { .. }));
    assert_eq!(
        cw721::owner_of(ctx.chain(Side::A), &collection, "1")?.owner,
        ctx.contract(Side::A, BRIDGE)?
    );
    Ok(())
}
