//! Step constructors. Each captures its arguments and does one thing to
//! the context: provision, mint, dispatch, relay or assert.

use cosmwasm_std::from_json;
use ics721_types::{packet::NonFungibleTokenPacketData, token_types::ClassId};
use tracing::{debug, info};

use super::{
    Account, RegistrySnapshot, ScenarioContext, Step, Transfer, Via, BRIDGE, CALLBACK_TESTER, CW721,
    CW721_TESTER, INCOMING_PROXY, OUTGOING_PROXY,
};
use crate::{
    ack::{self, check_count, check_eq, Expect},
    chain::{ChainClientExt, ExecuteResult},
    channel::create_ibc_connection_and_channel,
    error::{AssertionError, E2eError, RelayError},
    msg::{
        callback::{self, CallbackTesterInstantiateMsg},
        cw721::{self, cw721_instantiate_msg, Cw721TesterInstantiateMsg, Cw721Version},
        ics721::{self, ibc_outgoing_msg, BridgeMigrateMsg},
        proxy::{
            proxy_instantiate_info, IncomingProxyInstantiateMsg, OutgoingProxyInstantiateMsg,
            RateLimit,
        },
    },
    provision::{self, upload_and_instantiate, BridgeProxies, ContractMsg},
    relay::Side,
    wait::settle,
};

pub const CW721_WASM: &str = "cw721_base.wasm";
pub const ICS721_WASM: &str = "ics721_sim_bridge.wasm";
pub const CW721_TESTER_WASM: &str = "cw721_tester.wasm";
pub const INCOMING_PROXY_WASM: &str = "incoming_proxy_tester.wasm";
pub const OUTGOING_PROXY_WASM: &str = "outgoing_proxy_tester.wasm";
pub const CALLBACK_TESTER_WASM: &str = "callback_tester.wasm";

/// Uploads the bridge and its companions to both chains. Chain A also gets
/// an instantiated collection minting to its sender; chain B only needs
/// the cw721 code for vouchers.
pub fn provision() -> Step {
    Step::new("provision", |ctx| {
        for side in [Side::A, Side::B] {
            let collection = match side {
                Side::A => ContractMsg::instantiate(
                    CW721_WASM,
                    &cw721_instantiate_msg(
                        Cw721Version::V018,
                        "ark",
                        "ark",
                        &ctx.chain(side).sender(),
                    ),
                )?,
                Side::B => ContractMsg::upload_only(CW721_WASM),
            };
            let contracts = [
                (CW721, collection),
                (BRIDGE, ContractMsg::upload_only(ICS721_WASM)),
                (CW721_TESTER, ContractMsg::upload_only(CW721_TESTER_WASM)),
                (INCOMING_PROXY, ContractMsg::upload_only(INCOMING_PROXY_WASM)),
                (OUTGOING_PROXY, ContractMsg::upload_only(OUTGOING_PROXY_WASM)),
                (CALLBACK_TESTER, ContractMsg::upload_only(CALLBACK_TESTER_WASM)),
            ];

            let records =
                upload_and_instantiate(ctx.chain(side), ctx.artifacts.as_ref(), &contracts)?;
            *ctx.contracts.side_mut(side) = records;
        }
        Ok(())
    })
}

fn bridge_step(side: Side, name: String, outgoing: Option<RateLimit>) -> Step {
    Step::new(name, move |ctx| {
        let proxies = BridgeProxies {
            incoming: None,
            outgoing: outgoing
                .clone()
                .map(|rate_limit| {
                    proxy_instantiate_info(
                        ctx.contracts.code_id(side, OUTGOING_PROXY)?,
                        &OutgoingProxyInstantiateMsg {
                            origin: None,
                            rate_limit,
                        },
                        "label outgoing proxy",
                    )
                    .map_err(E2eError::from)
                })
                .transpose()?,
        };
        let address = provision::instantiate_bridge(
            ctx.chain(side),
            ctx.contracts.code_id(side, BRIDGE)?,
            ctx.contracts.code_id(side, CW721)?,
            proxies,
        )?;
        if let Some(record) = ctx.contracts.side_mut(side).get_mut(BRIDGE) {
            record.address = Some(address);
        }
        Ok(())
    })
}

/// Second provisioning phase: the bridge on `side`, wired to that side's
/// cw721 code id.
pub fn instantiate_bridge(side: Side) -> Step {
    bridge_step(side, format!("instantiate bridge on {side}"), None)
}

/// As [`instantiate_bridge`], with the bridge instantiating a rate limiting
/// outgoing proxy in front of itself.
pub fn instantiate_bridge_with_outgoing_proxy(side: Side, rate_limit: RateLimit) -> Step {
    bridge_step(
        side,
        format!("instantiate bridge with outgoing proxy on {side}"),
        Some(rate_limit),
    )
}

/// Opens channel `name` between the two bridges with the configured order
/// and version.
pub fn create_channel(name: &str) -> Step {
    let name = name.to_string();
    Step::new(format!("create channel {name}"), move |ctx| {
        let handle = create_ibc_connection_and_channel(
            ctx.relayer.as_ref(),
            ctx.chain(Side::A),
            ctx.chain(Side::B),
            &ctx.bridge(Side::A)?,
            &ctx.bridge(Side::B)?,
            ctx.config.channel.order.into(),
            &ctx.config.channel.version,
        )?;
        ctx.channels.insert(name.clone(), handle);
        Ok(())
    })
}

/// Tries to close `channel` from `side` and requires the bridge there to
/// refuse. The channel stays open.
pub fn close_channel_rejected(channel: &str, side: Side) -> Step {
    let channel = channel.to_string();
    Step::new(format!("close {channel} from {side} is rejected"), move |ctx| {
        let handle = ctx.channel_mut(&channel)?;
        let pair = handle.channel.clone();
        match handle.link.close_channel(side, &pair) {
            Err(RelayError::ChannelClose { reason, .. }) => {
                info!(%reason, "close rejected");
                Ok(())
            }
            Err(err) => Err(err.into()),
            Ok(()) => Err(AssertionError::Mismatch {
                what: format!("close of {channel}"),
                expected: "rejected".to_string(),
                actual: "closed".to_string(),
            }
            .into()),
        }
    })
}

/// The chain opposite `side` closes its end of `channel` unilaterally and
/// the bridge on `side` is told. Its pending packets time out on the next
/// relay pass.
pub fn counterparty_closes(channel: &str, side: Side) -> Step {
    let channel = channel.to_string();
    Step::new(format!("counterparty of {side} closes {channel}"), move |ctx| {
        let handle = ctx.channel_mut(&channel)?;
        let pair = handle.channel.clone();
        handle.link.confirm_counterparty_close(side, &pair)?;
        Ok(())
    })
}

/// A cw721 that fails every transfer made by the bridge on `side`, so
/// vouchers can never be redeemed into it.
pub fn instantiate_malicious_collection(side: Side, name: &str) -> Step {
    let name = name.to_string();
    Step::new(format!("instantiate malicious collection {name}"), move |ctx| {
        let client = ctx.chain(side);
        let msg = Cw721TesterInstantiateMsg {
            name: name.clone(),
            symbol: name.clone(),
            minter: client.sender(),
            target: ctx.bridge(side)?,
        };
        let code_id = ctx.contracts.code_id(side, CW721_TESTER)?;
        let address = client
            .instantiate_json(code_id, &msg, &format!("label {name}"), Some(&client.sender()))
            .map_err(|source| E2eError::Instantiate {
                name: name.clone(),
                source,
            })?;
        ctx.addresses.insert((side, name.clone()), address);
        Ok(())
    })
}

/// A callback tester on `side` that only takes callbacks from that side's
/// bridge, recorded as `name`.
pub fn instantiate_callback_tester(side: Side, name: &str) -> Step {
    let name = name.to_string();
    Step::new(format!("instantiate callback tester {name} on {side}"), move |ctx| {
        let client = ctx.chain(side);
        let msg = CallbackTesterInstantiateMsg {
            ics721: ctx.bridge(side)?,
        };
        let code_id = ctx.contracts.code_id(side, CALLBACK_TESTER)?;
        let address = client
            .instantiate_json(code_id, &msg, &format!("label {name}"), Some(&client.sender()))
            .map_err(|source| E2eError::Instantiate {
                name: name.clone(),
                source,
            })?;
        ctx.addresses.insert((side, name.clone()), address);
        Ok(())
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackKind {
    /// Ack callback on the sending chain.
    Sent,
    /// Receive callback on the receiving chain.
    Received,
}

/// The owner `tester` recorded in its last callback of `kind`. `None`
/// expects no recorded owner: the callback never ran, failed, or saw a
/// burned token.
pub fn assert_callback_owner(
    side: Side,
    tester: &str,
    kind: CallbackKind,
    owner: Option<Account>,
) -> Step {
    let tester = tester.to_string();
    Step::new(
        format!("assert {kind:?} callback owner on {tester}"),
        move |ctx| {
            let address = ctx.contract(side, &tester)?;
            let client = ctx.chain(side);
            let recorded = match kind {
                CallbackKind::Sent => callback::sent_callback(client, &address)?,
                CallbackKind::Received => callback::received_callback(client, &address)?,
            }
            .map(|response| response.owner);
            let expected = owner.as_ref().map(|o| ctx.account(o)).transpose()?;
            check_eq(
                &format!("{kind:?} callback owner"),
                &format!("{expected:?}"),
                &format!("{recorded:?}"),
            )?;
            Ok(())
        },
    )
}

/// The collection named in the last successful callback `tester` took.
pub fn assert_callback_nft_contract(side: Side, tester: &str, collection: &str) -> Step {
    let (tester, collection) = (tester.to_string(), collection.to_string());
    Step::new(
        format!("assert callback nft contract on {tester} is {collection}"),
        move |ctx| {
            let expected = ctx.contract(side, &collection)?;
            let recorded = callback::nft_contract(ctx.chain(side), &ctx.contract(side, &tester)?)?
                .map(|addr| addr.into_string())
                .unwrap_or_default();
            check_eq("callback nft contract", &expected, &recorded)?;
            Ok(())
        },
    )
}

pub fn mint(side: Side, collection: &str, token_id: &str, owner: Account) -> Step {
    let (collection, token_id) = (collection.to_string(), token_id.to_string());
    Step::new(format!("mint {token_id} on {side}"), move |ctx| {
        let cw721 = ctx.contract(side, &collection)?;
        let owner = ctx.account(&owner)?;
        cw721::mint(ctx.chain(side), &cw721, &token_id, &owner, None)?;
        Ok(())
    })
}

pub fn assert_owner(side: Side, collection: &str, token_id: &str, owner: Account) -> Step {
    let (collection, token_id) = (collection.to_string(), token_id.to_string());
    Step::new(
        format!("assert owner of {token_id} in {collection} on {side}"),
        move |ctx| {
            let cw721 = ctx.contract(side, &collection)?;
            let expected = ctx.account(&owner)?;
            let actual = cw721::owner_of(ctx.chain(side), &cw721, &token_id)?.owner;
            check_eq(&format!("owner of {token_id}"), &expected, &actual)?;
            Ok(())
        },
    )
}

pub fn assert_num_tokens(side: Side, collection: &str, expected: u64) -> Step {
    let collection = collection.to_string();
    Step::new(format!("assert {expected} tokens in {collection} on {side}"), move |ctx| {
        let cw721 = ctx.contract(side, &collection)?;
        let actual = cw721::num_tokens(ctx.chain(side), &cw721)?;
        check_count(
            &format!("tokens in {collection}"),
            expected as usize,
            actual as usize,
        )?;
        Ok(())
    })
}

fn dispatch(ctx: &ScenarioContext, transfer: &Transfer) -> Result<ExecuteResult, E2eError> {
    let side = transfer.from;
    let client = ctx.chain(side);
    let cw721 = ctx.contract(side, &transfer.collection)?;
    let bridge = ctx.bridge(side)?;
    let target = match transfer.via {
        Via::Bridge => bridge,
        Via::OutgoingProxy => ics721::outgoing_proxy(client, &bridge)?
            .map(|addr| addr.into_string())
            .ok_or_else(|| E2eError::UnknownContract(format!("outgoing proxy of {bridge}")))?,
    };
    let receiver = ctx.account(&transfer.receiver)?;
    let channel_id = ctx.channel(&transfer.channel)?.end(side).channel_id.clone();
    let timeout = transfer.timeout_spec(ctx)?;
    let memo = transfer.memo_for(ctx)?;
    match &transfer.tester {
        Some(tester) => callback::send_nft(
            client,
            &ctx.contract(side, tester)?,
            &cw721,
            &target,
            &transfer.token_id,
            &receiver,
            &channel_id,
            timeout,
            memo,
        ),
        None => {
            let msg = ibc_outgoing_msg(&receiver, &channel_id, timeout, memo);
            ics721::transfer(client, &cw721, &target, &msg, &transfer.token_id)
        }
    }
}

/// Dispatches `transfer` and requires the chain to accept it. Acceptance
/// says nothing about the packet's fate.
pub fn send(transfer: Transfer) -> Step {
    Step::new(
        format!("send {} from {} over {}", transfer.token_id, transfer.from, transfer.channel),
        move |ctx| {
            let res = dispatch(ctx, &transfer)?;
            if !res.is_committed() {
                return Err(AssertionError::Mismatch {
                    what: format!("dispatch of {}", transfer.token_id),
                    expected: "a committed transaction".to_string(),
                    actual: "no transaction hash".to_string(),
                }
                .into());
            }
            debug!(tx = %res.transaction_hash, height = res.height, "dispatched");
            *ctx
                .dispatches
                .entry((transfer.channel.clone(), transfer.from))
                .or_default() += 1;
            Ok(())
        },
    )
}

/// Dispatches `transfer` and requires the chain to refuse it, as an
/// outgoing proxy does before any packet exists.
pub fn send_rejected(transfer: Transfer) -> Step {
    Step::new(
        format!("send {} from {} is rejected", transfer.token_id, transfer.from),
        move |ctx| match dispatch(ctx, &transfer) {
            Err(err @ E2eError::Execute { .. }) => {
                info!(error = %err, "dispatch rejected");
                Ok(())
            }
            Err(err) => Err(err),
            Ok(_) => Err(AssertionError::Mismatch {
                what: format!("dispatch of {}", transfer.token_id),
                expected: "rejected".to_string(),
                actual: "committed".to_string(),
            }
            .into()),
        },
    )
}

/// Packets pending on `side` of `channel` equal the transfers committed
/// there since its last relay pass.
pub fn assert_pending(channel: &str, side: Side) -> Step {
    let channel = channel.to_string();
    Step::new(format!("assert pending on {channel} side {side}"), move |ctx| {
        let expected = ctx.dispatched(&channel, side);
        let policy = ctx.config.settle.clone();
        let handle = ctx.channel(&channel)?;
        settle(handle.link.as_ref(), side, &policy)?;
        ack::assert_pending_count(handle.link.as_ref(), side, expected)
    })
}

/// Relays everything pending on `channel` and keeps the result for the
/// following assertions.
pub fn relay(channel: &str) -> Step {
    let channel = channel.to_string();
    Step::new(format!("relay {channel}"), move |ctx| {
        let result = ctx.channel_mut(&channel)?.link.relay_all()?;
        for side in [Side::A, Side::B] {
            ctx.dispatches.remove(&(channel.clone(), side));
        }
        ctx.last_relay = Some(result);
        Ok(())
    })
}

/// `count` packets from `sender` in the last relay pass, each acked as
/// expected.
pub fn expect_acks(sender: Side, count: usize, expect: Expect) -> Step {
    Step::new(format!("expect {count} {expect:?} acks for {sender}"), move |ctx| {
        let relay = ctx.last_relay()?;
        match sender {
            Side::A => ack::assert_packets_from_a(relay, count, expect)?,
            Side::B => ack::assert_packets_from_b(relay, count, expect)?,
        }
        Ok(())
    })
}

pub fn expect_timeouts(sender: Side, count: usize) -> Step {
    Step::new(format!("expect {count} timeouts for {sender}"), move |ctx| {
        let relay = ctx.last_relay()?;
        check_count(
            &format!("timeouts from {sender}"),
            count,
            relay.timeouts_from(sender).len(),
        )?;
        check_count(
            &format!("acks from {}", sender.other()),
            0,
            relay.acks_for_packets_from(sender).len(),
        )?;
        Ok(())
    })
}

/// Finds the voucher collection minted on `side` for `source_collection`
/// of the other side and records it as `name`. Checks both directions of
/// the class id mapping.
pub fn resolve_voucher(side: Side, channel: &str, source_collection: &str, name: &str) -> Step {
    let (channel, source_collection, name) =
        (channel.to_string(), source_collection.to_string(), name.to_string());
    Step::new(format!("resolve voucher {name} on {side}"), move |ctx| {
        let source = ctx.contract(side.other(), &source_collection)?;
        let end = ctx.channel(&channel)?.end(side).clone();
        let class_id = ClassId::voucher(&end.port_id, &end.channel_id, &source);
        let client = ctx.chain(side);
        let bridge = ctx.bridge(side)?;
        let voucher = ics721::nft_contract(client, &bridge, &class_id)?
            .ok_or_else(|| E2eError::UnknownContract(format!("voucher for {class_id}")))?
            .into_string();
        let reverse = ics721::class_id(client, &bridge, &voucher)?;
        check_eq(
            &format!("class id of {voucher}"),
            &class_id,
            reverse.as_deref().unwrap_or_default(),
        )?;
        debug!(%class_id, %voucher, "voucher resolved");
        ctx.addresses.insert((side, name.clone()), voucher);
        Ok(())
    })
}

/// Resolving the voucher's class id again yields the recorded address.
pub fn assert_class_id_stable(side: Side, name: &str) -> Step {
    let name = name.to_string();
    Step::new(format!("assert class id of {name} is stable"), move |ctx| {
        let voucher = ctx.contract(side, &name)?;
        let client = ctx.chain(side);
        let bridge = ctx.bridge(side)?;
        let class_id = ics721::class_id(client, &bridge, &voucher)?
            .ok_or_else(|| E2eError::UnknownContract(format!("class id of {voucher}")))?;
        for _ in 0..2 {
            let resolved = ics721::nft_contract(client, &bridge, &class_id)?
                .map(|addr| addr.into_string())
                .unwrap_or_default();
            check_eq(&format!("nft contract of {class_id}"), &voucher, &resolved)?;
        }
        Ok(())
    })
}

pub fn snapshot_registry(side: Side) -> Step {
    Step::new(format!("snapshot registry on {side}"), move |ctx| {
        let snapshot = RegistrySnapshot::take(ctx.chain(side), &ctx.bridge(side)?)?;
        ctx.snapshots.insert(side, snapshot);
        Ok(())
    })
}

pub fn assert_registry_unchanged(side: Side) -> Step {
    Step::new(format!("assert registry unchanged on {side}"), move |ctx| {
        let bridge = ctx.bridge(side)?;
        let before = ctx
            .snapshots
            .get(&side)
            .cloned()
            .ok_or_else(|| AssertionError::Mismatch {
                what: format!("registry snapshot on {side}"),
                expected: "a snapshot".to_string(),
                actual: "none".to_string(),
            })?;
        let after = RegistrySnapshot::take(ctx.chain(side), &bridge)?;
        if before != after {
            return Err(AssertionError::RegistryChanged {
                bridge,
                before: format!("{before:?}"),
                after: format!("{after:?}"),
            }
            .into());
        }
        Ok(())
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// Number of rows in the bridge's outgoing or incoming channel table.
pub fn assert_channel_entries(side: Side, direction: Direction, expected: usize) -> Step {
    Step::new(
        format!("assert {expected} {direction:?} channel entries on {side}"),
        move |ctx| {
            let client = ctx.chain(side);
            let bridge = ctx.bridge(side)?;
            let entries = match direction {
                Direction::Outgoing => ics721::outgoing_channels(client, &bridge)?,
                Direction::Incoming => ics721::incoming_channels(client, &bridge)?,
            };
            check_count(
                &format!("{direction:?} channel entries"),
                expected,
                entries.len(),
            )?;
            Ok(())
        },
    )
}

/// Puts an incoming proxy in front of the bridge on `side` that only lets
/// packets in over the named channels.
pub fn set_incoming_proxy(side: Side, allowed: &[&str]) -> Step {
    let allowed: Vec<String> = allowed.iter().map(|c| c.to_string()).collect();
    Step::new(format!("set incoming proxy on {side}"), move |ctx| {
        let bridge = ctx.bridge(side)?;
        let channels = allowed
            .iter()
            .map(|name| Ok(ctx.channel(name)?.end(side).channel_id.clone()))
            .collect::<Result<Vec<_>, E2eError>>()?;
        let client = ctx.chain(side);
        let proxy = client
            .instantiate_json(
                ctx.contracts.code_id(side, INCOMING_PROXY)?,
                &IncomingProxyInstantiateMsg {
                    origin: Some(bridge.clone()),
                    channels,
                },
                "label incoming proxy",
                Some(&client.sender()),
            )
            .map_err(|source| E2eError::Instantiate {
                name: INCOMING_PROXY.to_string(),
                source,
            })?;
        ics721::migrate_with_update(
            client,
            &bridge,
            ctx.contracts.code_id(side, BRIDGE)?,
            &BridgeMigrateMsg::WithUpdate {
                incoming_proxy: Some(proxy.clone()),
                outgoing_proxy: None,
                cw721_base_code_id: None,
                pauser: None,
                cw721_admin: None,
            },
        )?;
        let configured = ics721::incoming_proxy(client, &bridge)?
            .map(|addr| addr.into_string())
            .unwrap_or_default();
        check_eq("incoming proxy", &proxy, &configured)?;
        ctx.addresses.insert((side, INCOMING_PROXY.to_string()), proxy);
        Ok(())
    })
}

pub fn approve(side: Side, collection: &str, spender: Account, token_id: &str) -> Step {
    let (collection, token_id) = (collection.to_string(), token_id.to_string());
    Step::new(format!("approve {token_id} on {side}"), move |ctx| {
        let cw721 = ctx.contract(side, &collection)?;
        let spender = ctx.account(&spender)?;
        cw721::approve(ctx.chain(side), &cw721, &spender, &token_id)?;
        Ok(())
    })
}

fn class_id_of(ctx: &ScenarioContext, side: Side, cw721: &str) -> Result<String, E2eError> {
    Ok(ics721::class_id(ctx.chain(side), &ctx.bridge(side)?, cw721)?
        .unwrap_or_else(|| cw721.to_string()))
}

/// Admin releases an escrowed NFT to `recipient` without any packet.
pub fn admin_unescrow(side: Side, collection: &str, token_id: &str, recipient: Account) -> Step {
    let (collection, token_id) = (collection.to_string(), token_id.to_string());
    Step::new(format!("admin unescrow {token_id} on {side}"), move |ctx| {
        let cw721 = ctx.contract(side, &collection)?;
        let class_id = class_id_of(ctx, side, &cw721)?;
        let recipient = ctx.account(&recipient)?;
        ics721::admin_clean_and_unescrow_nft(
            ctx.chain(side),
            &ctx.bridge(side)?,
            &recipient,
            &token_id,
            &class_id,
            &cw721,
        )?;
        Ok(())
    })
}

/// Admin burns a voucher `owner` approved the bridge for.
pub fn admin_burn(side: Side, collection: &str, token_id: &str, owner: Account) -> Step {
    let (collection, token_id) = (collection.to_string(), token_id.to_string());
    Step::new(format!("admin burn {token_id} on {side}"), move |ctx| {
        let cw721 = ctx.contract(side, &collection)?;
        let class_id = class_id_of(ctx, side, &cw721)?;
        let owner = ctx.account(&owner)?;
        ics721::admin_clean_and_burn_nft(
            ctx.chain(side),
            &ctx.bridge(side)?,
            &owner,
            &token_id,
            &class_id,
            &cw721,
        )?;
        Ok(())
    })
}

/// Packets `sender` sent in the last relay pass, decoded.
fn relayed_packets(
    ctx: &ScenarioContext,
    sender: Side,
) -> Result<Vec<NonFungibleTokenPacketData>, E2eError> {
    ctx.last_relay()?
        .acks_for_packets_from(sender)
        .iter()
        .map(|ack| Ok(from_json(&ack.original_packet.data)?))
        .collect()
}

/// Acks of the last relay pass came back in dispatch order.
pub fn expect_packet_order(sender: Side, token_ids: &[&str]) -> Step {
    let expected: Vec<String> = token_ids.iter().map(|t| t.to_string()).collect();
    Step::new(format!("expect packet order {expected:?} from {sender}"), move |ctx| {
        let actual: Vec<String> = relayed_packets(ctx, sender)?
            .into_iter()
            .flat_map(|packet| packet.token_ids.into_iter().map(String::from))
            .collect();
        check_eq(
            "token order",
            &format!("{expected:?}"),
            &format!("{actual:?}"),
        )?;
        Ok(())
    })
}

/// Two recorded contracts on `side` are the same contract.
pub fn assert_same_contract(side: Side, first: &str, second: &str) -> Step {
    let (first, second) = (first.to_string(), second.to_string());
    Step::new(format!("assert {first} is {second}"), move |ctx| {
        check_eq(
            &format!("address of {second}"),
            &ctx.contract(side, &first)?,
            &ctx.contract(side, &second)?,
        )?;
        Ok(())
    })
}
