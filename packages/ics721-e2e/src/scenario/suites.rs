//! Prebuilt scenarios covering the transfer paths end to end.

use super::{
    steps::{self, CallbackKind, Direction},
    Account, CallbackRequest, Scenario, Step, Transfer, TransferTimeout, Via, BRIDGE, CW721,
};
use crate::{
    ack::Expect,
    msg::{callback::TesterCallback, proxy::RateLimit},
    relay::Side,
};

pub const CHANNEL: &str = "main";
pub const VOUCHER: &str = "voucher";
/// Callback tester instance, one per chain.
pub const TESTER: &str = "tester";

/// Contracts on both chains, both bridges and one channel between them.
pub fn setup() -> Vec<Step> {
    vec![
        steps::provision(),
        steps::instantiate_bridge(Side::A),
        steps::instantiate_bridge(Side::B),
        steps::create_channel(CHANNEL),
    ]
}

/// Mints `token_id` to A's sender and carries it to B over `channel`.
fn forward(collection: &str, token_id: &str, channel: &str) -> Vec<Step> {
    vec![
        steps::mint(Side::A, collection, token_id, Account::Sender(Side::A)),
        steps::assert_owner(Side::A, collection, token_id, Account::Sender(Side::A)),
        steps::send(Transfer::new(Side::A, collection, token_id, channel)),
        steps::assert_pending(channel, Side::A),
        steps::relay(channel),
        steps::expect_acks(Side::A, 1, Expect::Success),
        steps::assert_owner(
            Side::A,
            collection,
            token_id,
            Account::contract(Side::A, BRIDGE),
        ),
        steps::resolve_voucher(Side::B, channel, collection, VOUCHER),
        steps::assert_owner(Side::B, VOUCHER, token_id, Account::Sender(Side::B)),
    ]
}

pub fn unidirectional() -> Scenario {
    Scenario::new("unidirectional transfer")
        .steps(setup())
        .steps(forward(CW721, "1", CHANNEL))
}

/// A to B and back: the voucher is burned and the original owner holds the
/// NFT again.
pub fn round_trip() -> Scenario {
    Scenario::new("round trip")
        .steps(setup())
        .steps(forward(CW721, "1", CHANNEL))
        .steps([
            steps::send(
                Transfer::new(Side::B, VOUCHER, "1", CHANNEL).receiver(Account::Sender(Side::A)),
            ),
            steps::assert_pending(CHANNEL, Side::B),
            steps::relay(CHANNEL),
            steps::expect_acks(Side::B, 1, Expect::Success),
            steps::assert_num_tokens(Side::B, VOUCHER, 0),
            steps::assert_owner(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::assert_channel_entries(Side::A, Direction::Outgoing, 0),
            steps::assert_channel_entries(Side::B, Direction::Incoming, 0),
        ])
}

/// B only accepts packets over `allowed`. A transfer over `blocked` is
/// refused with an error ack and leaves no trace in either registry.
pub fn incoming_allow_list_rejection() -> Scenario {
    Scenario::new("incoming allow list rejection")
        .steps([
            steps::provision(),
            steps::instantiate_bridge(Side::A),
            steps::instantiate_bridge(Side::B),
            steps::create_channel("allowed"),
            steps::create_channel("blocked"),
            steps::set_incoming_proxy(Side::B, &["allowed"]),
            steps::mint(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::snapshot_registry(Side::A),
            steps::snapshot_registry(Side::B),
            steps::send(Transfer::new(Side::A, CW721, "1", "blocked")),
            steps::assert_pending("blocked", Side::A),
            steps::relay("blocked"),
            steps::expect_acks(Side::A, 1, Expect::Error),
            steps::assert_registry_unchanged(Side::A),
            steps::assert_registry_unchanged(Side::B),
            steps::assert_owner(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::send(Transfer::new(Side::A, CW721, "1", "allowed")),
            steps::assert_pending("allowed", Side::A),
            steps::relay("allowed"),
            steps::expect_acks(Side::A, 1, Expect::Success),
            steps::resolve_voucher(Side::B, "allowed", CW721, VOUCHER),
            steps::assert_owner(Side::B, VOUCHER, "1", Account::Sender(Side::B)),
        ])
}

/// A's bridge sits behind a proxy allowing one transfer every ten blocks;
/// the second transfer never becomes a packet.
pub fn outgoing_rate_limit_rejection() -> Scenario {
    Scenario::new("outgoing rate limit rejection")
        .steps([
            steps::provision(),
            steps::instantiate_bridge_with_outgoing_proxy(Side::A, RateLimit::Blocks(10)),
            steps::instantiate_bridge(Side::B),
            steps::create_channel(CHANNEL),
            steps::mint(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::mint(Side::A, CW721, "2", Account::Sender(Side::A)),
            steps::send(Transfer::new(Side::A, CW721, "1", CHANNEL).via(Via::OutgoingProxy)),
            steps::send_rejected(
                Transfer::new(Side::A, CW721, "2", CHANNEL).via(Via::OutgoingProxy),
            ),
            steps::assert_pending(CHANNEL, Side::A),
            steps::relay(CHANNEL),
            steps::expect_acks(Side::A, 1, Expect::Success),
            steps::assert_owner(Side::A, CW721, "2", Account::Sender(Side::A)),
            steps::resolve_voucher(Side::B, CHANNEL, CW721, VOUCHER),
            steps::assert_owner(Side::B, VOUCHER, "1", Account::Sender(Side::B)),
        ])
}

/// The collection on A fails every transfer the bridge makes, so the
/// voucher can go out but never come home. B gets an error ack and its
/// voucher back.
pub fn malicious_nft() -> Scenario {
    const MALICIOUS: &str = "malicious";
    Scenario::new("malicious nft")
        .steps(setup())
        .step(steps::instantiate_malicious_collection(Side::A, MALICIOUS))
        .steps(forward(MALICIOUS, "1", CHANNEL))
        .steps([
            steps::send(
                Transfer::new(Side::B, VOUCHER, "1", CHANNEL).receiver(Account::Sender(Side::A)),
            ),
            steps::assert_pending(CHANNEL, Side::B),
            steps::relay(CHANNEL),
            steps::expect_acks(Side::B, 1, Expect::Error),
            steps::assert_owner(Side::B, VOUCHER, "1", Account::Sender(Side::B)),
            steps::assert_owner(Side::A, MALICIOUS, "1", Account::contract(Side::A, BRIDGE)),
        ])
}

/// A packet whose timeout height B has already reached is timed out, and
/// A hands the NFT back to its owner.
pub fn timeout_refund() -> Scenario {
    Scenario::new("timeout refund")
        .steps(setup())
        .steps([
            steps::mint(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::send(
                Transfer::new(Side::A, CW721, "1", CHANNEL).timeout(TransferTimeout::Expired),
            ),
            steps::assert_pending(CHANNEL, Side::A),
            steps::relay(CHANNEL),
            steps::expect_timeouts(Side::A, 1),
            steps::assert_owner(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::assert_channel_entries(Side::A, Direction::Outgoing, 0),
        ])
}

/// Admin paths that bypass IBC: A's bridge releases the escrowed NFT and
/// B's bridge burns the approved voucher.
pub fn admin_cleanup() -> Scenario {
    Scenario::new("admin cleanup")
        .steps(setup())
        .steps(forward(CW721, "1", CHANNEL))
        .steps([
            steps::admin_unescrow(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::assert_owner(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::assert_channel_entries(Side::A, Direction::Outgoing, 0),
            steps::approve(Side::B, VOUCHER, Account::contract(Side::B, BRIDGE), "1"),
            steps::admin_burn(Side::B, VOUCHER, "1", Account::Sender(Side::B)),
            steps::assert_num_tokens(Side::B, VOUCHER, 0),
            steps::assert_channel_entries(Side::B, Direction::Incoming, 0),
        ])
}

/// A second token of the same collection over the same channel lands in
/// the same voucher collection.
pub fn class_id_idempotence() -> Scenario {
    Scenario::new("class id idempotence")
        .steps(setup())
        .steps(forward(CW721, "1", CHANNEL))
        .steps([
            steps::assert_class_id_stable(Side::B, VOUCHER),
            steps::mint(Side::A, CW721, "2", Account::Sender(Side::A)),
            steps::send(Transfer::new(Side::A, CW721, "2", CHANNEL)),
            steps::relay(CHANNEL),
            steps::expect_acks(Side::A, 1, Expect::Success),
            steps::resolve_voucher(Side::B, CHANNEL, CW721, "voucher_again"),
            steps::assert_same_contract(Side::B, VOUCHER, "voucher_again"),
            steps::assert_num_tokens(Side::B, VOUCHER, 2),
        ])
}

/// Two dispatches before one relay pass come back as two acks in dispatch
/// order.
pub fn multi_dispatch_fifo() -> Scenario {
    Scenario::new("multi dispatch fifo")
        .steps(setup())
        .steps([
            steps::mint(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::mint(Side::A, CW721, "2", Account::Sender(Side::A)),
            steps::send(Transfer::new(Side::A, CW721, "1", CHANNEL)),
            steps::send(Transfer::new(Side::A, CW721, "2", CHANNEL)),
            steps::assert_pending(CHANNEL, Side::A),
            steps::relay(CHANNEL),
            steps::expect_acks(Side::A, 2, Expect::Success),
            steps::expect_packet_order(Side::A, &["1", "2"]),
        ])
}

/// Neither bridge lets its own side close the channel, and transfers keep
/// flowing afterwards.
pub fn close_rejected() -> Scenario {
    Scenario::new("close rejected")
        .steps(setup())
        .steps([
            steps::close_channel_rejected(CHANNEL, Side::A),
            steps::close_channel_rejected(CHANNEL, Side::B),
        ])
        .steps(forward(CW721, "1", CHANNEL))
}

/// B closes the channel behind A's back while a transfer is in flight.
/// A accepts the close, the transfer times out and is refunded, and A
/// refuses to send over the channel again.
pub fn unexpected_close() -> Scenario {
    Scenario::new("unexpected close")
        .steps(setup())
        .steps([
            steps::mint(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::mint(Side::A, CW721, "2", Account::Sender(Side::A)),
            steps::send(Transfer::new(Side::A, CW721, "1", CHANNEL)),
            steps::assert_pending(CHANNEL, Side::A),
            steps::counterparty_closes(CHANNEL, Side::A),
            steps::relay(CHANNEL),
            steps::expect_timeouts(Side::A, 1),
            steps::assert_owner(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::assert_channel_entries(Side::A, Direction::Outgoing, 0),
            steps::send_rejected(Transfer::new(Side::A, CW721, "2", CHANNEL)),
            steps::assert_owner(Side::A, CW721, "2", Account::Sender(Side::A)),
        ])
}

/// [`setup`] plus a callback tester on each chain.
fn callback_setup() -> Vec<Step> {
    let mut steps = setup();
    steps.extend([
        steps::instantiate_callback_tester(Side::A, TESTER),
        steps::instantiate_callback_tester(Side::B, TESTER),
    ]);
    steps
}

fn tester(side: Side) -> Account {
    Account::contract(side, TESTER)
}

fn both_callbacks() -> CallbackRequest {
    CallbackRequest::default()
        .ack(TesterCallback::NftSent {})
        .receive(TesterCallback::NftReceived {})
}

/// Tester A sends to tester B and back, both asking for both callbacks at
/// their default addresses. A's ack callback sees the NFT in escrow, B's
/// receive callback sees the voucher already minted. On the way home B's
/// ack callback finds the voucher burned.
pub fn callbacks_round_trip() -> Scenario {
    Scenario::new("callbacks round trip")
        .steps(callback_setup())
        .steps([
            steps::mint(Side::A, CW721, "1", tester(Side::A)),
            steps::send(
                Transfer::new(Side::A, CW721, "1", CHANNEL)
                    .sent_by_tester(TESTER)
                    .receiver(tester(Side::B))
                    .callbacks(both_callbacks()),
            ),
            steps::assert_pending(CHANNEL, Side::A),
            steps::relay(CHANNEL),
            steps::expect_acks(Side::A, 1, Expect::Success),
            steps::resolve_voucher(Side::B, CHANNEL, CW721, VOUCHER),
            steps::assert_owner(Side::B, VOUCHER, "1", tester(Side::B)),
            steps::assert_callback_owner(
                Side::B,
                TESTER,
                CallbackKind::Received,
                Some(tester(Side::B)),
            ),
            steps::assert_callback_nft_contract(Side::B, TESTER, VOUCHER),
            steps::assert_callback_owner(
                Side::A,
                TESTER,
                CallbackKind::Sent,
                Some(Account::contract(Side::A, BRIDGE)),
            ),
            steps::assert_callback_nft_contract(Side::A, TESTER, CW721),
            steps::send(
                Transfer::new(Side::B, VOUCHER, "1", CHANNEL)
                    .sent_by_tester(TESTER)
                    .receiver(tester(Side::A))
                    .callbacks(both_callbacks()),
            ),
            steps::relay(CHANNEL),
            steps::expect_acks(Side::B, 1, Expect::Success),
            steps::assert_num_tokens(Side::B, VOUCHER, 0),
            steps::assert_owner(Side::A, CW721, "1", tester(Side::A)),
            steps::assert_callback_owner(
                Side::A,
                TESTER,
                CallbackKind::Received,
                Some(tester(Side::A)),
            ),
            steps::assert_callback_owner(Side::B, TESTER, CallbackKind::Sent, None),
            steps::assert_callback_nft_contract(Side::B, TESTER, VOUCHER),
        ])
}

/// Plain accounts on both ends with the callbacks addressed to the
/// testers explicitly.
pub fn callbacks_to_explicit_addresses() -> Scenario {
    Scenario::new("callbacks to explicit addresses")
        .steps(callback_setup())
        .steps([
            steps::mint(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::send(
                Transfer::new(Side::A, CW721, "1", CHANNEL).callbacks(
                    CallbackRequest::default()
                        .ack_to(TesterCallback::NftSent {}, tester(Side::A))
                        .receive_to(TesterCallback::NftReceived {}, tester(Side::B)),
                ),
            ),
            steps::relay(CHANNEL),
            steps::expect_acks(Side::A, 1, Expect::Success),
            steps::resolve_voucher(Side::B, CHANNEL, CW721, VOUCHER),
            steps::assert_callback_owner(
                Side::B,
                TESTER,
                CallbackKind::Received,
                Some(Account::Sender(Side::B)),
            ),
            steps::assert_callback_nft_contract(Side::B, TESTER, VOUCHER),
            steps::assert_callback_owner(
                Side::A,
                TESTER,
                CallbackKind::Sent,
                Some(Account::contract(Side::A, BRIDGE)),
            ),
        ])
}

/// A timed out transfer refunds the tester before its ack callback runs.
/// Nothing reaches B.
pub fn callback_on_timeout() -> Scenario {
    Scenario::new("callback on timeout")
        .steps(callback_setup())
        .steps([
            steps::mint(Side::A, CW721, "1", tester(Side::A)),
            steps::send(
                Transfer::new(Side::A, CW721, "1", CHANNEL)
                    .sent_by_tester(TESTER)
                    .receiver(tester(Side::B))
                    .timeout(TransferTimeout::Expired)
                    .callbacks(both_callbacks()),
            ),
            steps::relay(CHANNEL),
            steps::expect_timeouts(Side::A, 1),
            steps::assert_owner(Side::A, CW721, "1", tester(Side::A)),
            steps::assert_callback_owner(
                Side::A,
                TESTER,
                CallbackKind::Sent,
                Some(tester(Side::A)),
            ),
            steps::assert_callback_owner(Side::B, TESTER, CallbackKind::Received, None),
        ])
}

/// A failing receive callback fails the whole receive: error ack, refund
/// on A and no voucher class on B.
pub fn failed_receive_callback() -> Scenario {
    Scenario::new("failed receive callback")
        .steps(callback_setup())
        .steps([
            steps::mint(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::snapshot_registry(Side::B),
            steps::send(
                Transfer::new(Side::A, CW721, "1", CHANNEL).callbacks(
                    CallbackRequest::default()
                        .ack_to(TesterCallback::NftSent {}, tester(Side::A))
                        .receive_to(TesterCallback::FailCallback {}, tester(Side::B)),
                ),
            ),
            steps::relay(CHANNEL),
            steps::expect_acks(Side::A, 1, Expect::Error),
            steps::assert_registry_unchanged(Side::B),
            steps::assert_owner(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::assert_channel_entries(Side::A, Direction::Outgoing, 0),
            steps::assert_callback_owner(
                Side::A,
                TESTER,
                CallbackKind::Sent,
                Some(Account::Sender(Side::A)),
            ),
            steps::assert_callback_owner(Side::B, TESTER, CallbackKind::Received, None),
        ])
}

/// A failing ack callback changes nothing: the voucher still goes home and
/// is burned.
pub fn failed_ack_callback() -> Scenario {
    Scenario::new("failed ack callback")
        .steps(callback_setup())
        .steps([
            steps::mint(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::send(Transfer::new(Side::A, CW721, "1", CHANNEL).receiver(tester(Side::B))),
            steps::relay(CHANNEL),
            steps::expect_acks(Side::A, 1, Expect::Success),
            steps::resolve_voucher(Side::B, CHANNEL, CW721, VOUCHER),
            steps::send(
                Transfer::new(Side::B, VOUCHER, "1", CHANNEL)
                    .sent_by_tester(TESTER)
                    .receiver(Account::Sender(Side::A))
                    .callbacks(CallbackRequest::default().ack(TesterCallback::FailCallback {})),
            ),
            steps::relay(CHANNEL),
            steps::expect_acks(Side::B, 1, Expect::Success),
            steps::assert_num_tokens(Side::B, VOUCHER, 0),
            steps::assert_owner(Side::A, CW721, "1", Account::Sender(Side::A)),
            steps::assert_callback_owner(Side::B, TESTER, CallbackKind::Sent, None),
        ])
}

/// Every prebuilt scenario.
pub fn all() -> Vec<Scenario> {
    vec![
        unidirectional(),
        round_trip(),
        incoming_allow_list_rejection(),
        outgoing_rate_limit_rejection(),
        malicious_nft(),
        timeout_refund(),
        admin_cleanup(),
        class_id_idempotence(),
        multi_dispatch_fifo(),
        close_rejected(),
        unexpected_close(),
        callbacks_round_trip(),
        callbacks_to_explicit_addresses(),
        callback_on_timeout(),
        failed_receive_callback(),
        failed_ack_callback(),
    ]
}
