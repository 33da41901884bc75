#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    from_json, to_json_binary, Addr, DepsMut, Env, IbcBasicResponse, IbcChannel,
    IbcChannelCloseMsg, IbcChannelConnectMsg, IbcChannelOpenMsg, IbcChannelOpenResponse, IbcOrder,
    IbcPacket, IbcPacketAckMsg, IbcPacketReceiveMsg, IbcPacketTimeoutMsg, IbcReceiveResponse,
    StdResult, SubMsg, WasmMsg,
};
use ics721_types::{
    ack::{ack_fail, ack_success, Ics721Ack},
    memo::Ics721Status,
    proxy::IncomingProxyExecuteMsg,
    token_types::ClassId,
};

use crate::{
    contract::ACK_AND_DO_NOTHING_REPLY_ID,
    error::Never,
    execute::{burn_msg, packet_data, transfer_msg},
    helpers::{ack_callback_msg, wants_receive_callback},
    msg::{CallbackMsg, ExecuteMsg, VoucherToken},
    state::{
        nft_contract_for_class_id, ChannelInfo, CHANNELS, INCOMING_CLASS_TOKEN_TO_CHANNEL,
        INCOMING_PROXY, OUTGOING_CLASS_TOKEN_TO_CHANNEL,
    },
    ContractError,
};

pub const IBC_VERSION: &str = "ics721-1";

/// Only unordered `ics721-1` channels are accepted. The counterparty
/// version is known during `OpenTry` and `OpenAck` only.
fn validate_order_and_version(
    channel: &IbcChannel,
    counterparty_version: Option<&str>,
) -> Result<(), ContractError> {
    if channel.order != IbcOrder::Unordered {
        return Err(ContractError::OrderedChannel {});
    }
    for version in std::iter::once(channel.version.as_str()).chain(counterparty_version) {
        if version != IBC_VERSION {
            return Err(ContractError::InvalidVersion {
                actual: version.to_string(),
                expected: IBC_VERSION.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_channel_open(
    _deps: DepsMut,
    _env: Env,
    msg: IbcChannelOpenMsg,
) -> Result<IbcChannelOpenResponse, ContractError> {
    validate_order_and_version(msg.channel(), msg.counterparty_version())?;
    Ok(None)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_channel_connect(
    deps: DepsMut,
    _env: Env,
    msg: IbcChannelConnectMsg,
) -> Result<IbcBasicResponse, ContractError> {
    validate_order_and_version(msg.channel(), msg.counterparty_version())?;
    let channel = msg.channel();
    CHANNELS.save(
        deps.storage,
        channel.endpoint.channel_id.clone(),
        &ChannelInfo {
            endpoint: channel.endpoint.clone(),
            counterparty: channel.counterparty_endpoint.clone(),
            connection_id: channel.connection_id.clone(),
        },
    )?;

    Ok(IbcBasicResponse::new()
        .add_attribute("method", "ibc_channel_connect")
        .add_attribute("channel", &channel.endpoint.channel_id)
        .add_attribute("port", &channel.endpoint.port_id))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_channel_close(
    deps: DepsMut,
    _env: Env,
    msg: IbcChannelCloseMsg,
) -> Result<IbcBasicResponse, ContractError> {
    match msg {
        // nothing local may close a channel NFTs travel over
        IbcChannelCloseMsg::CloseInit { .. } => Err(ContractError::CantCloseChannel {}),
        // the counterparty closed anyway. Refusing would only keep our end
        // half open, so it goes through, later sends over it are refused
        // and the admin has to step in for escrowed NFTs.
        IbcChannelCloseMsg::CloseConfirm { channel } => {
            CHANNELS.remove(deps.storage, channel.endpoint.channel_id.clone());
            Ok(IbcBasicResponse::new()
                .add_attribute("method", "ibc_channel_close")
                .add_attribute("channel", channel.endpoint.channel_id))
        }
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_packet_receive(
    deps: DepsMut,
    env: Env,
    msg: IbcPacketReceiveMsg,
) -> Result<IbcReceiveResponse, Never> {
    match receive_ibc_packet(deps, env, msg.packet) {
        Ok(response) => Ok(response),
        Err(error) => Ok(IbcReceiveResponse::new()
            .add_attribute("method", "ibc_packet_receive")
            .add_attribute("error", error.to_string())
            .set_ack(ack_fail(error.to_string()))),
    }
}

/// Everything that changes state runs inside one self-addressed
/// conjunction, so a failure anywhere reverts it and the reply writes an
/// error ack instead.
fn receive_ibc_packet(
    deps: DepsMut,
    env: Env,
    packet: IbcPacket,
) -> Result<IbcReceiveResponse, ContractError> {
    let data = packet_data(&packet.data)?;
    data.validate()?;
    let receiver = deps.api.addr_validate(&data.receiver)?;

    let mut operands = Vec::with_capacity(4);
    if let Some(proxy) = INCOMING_PROXY.load(deps.storage)? {
        operands.push(WasmMsg::Execute {
            contract_addr: proxy.into_string(),
            msg: to_json_binary(&IncomingProxyExecuteMsg::Ics721ReceivePacketMsg {
                packet: packet.clone(),
                data: data.clone(),
            })?,
            funds: vec![],
        });
    }

    let local_class_id = data
        .class_id
        .strip_hop(&packet.src.port_id, &packet.src.channel_id)
        .map(str::to_string);
    let token_ids: Vec<String> = data.token_ids.iter().map(|t| t.to_string()).collect();

    // a token is coming home if it left on the channel it now arrives on
    let mut returning = Vec::new();
    if let Some(local_class_id) = &local_class_id {
        for token_id in &token_ids {
            let outgoing = OUTGOING_CLASS_TOKEN_TO_CHANNEL
                .may_load(deps.storage, (local_class_id.clone(), token_id.clone()))?;
            if outgoing.as_deref() == Some(packet.dest.channel_id.as_str()) {
                returning.push(token_id.clone());
            }
        }
    }

    let callback = |msg: CallbackMsg| -> StdResult<WasmMsg> {
        Ok(WasmMsg::Execute {
            contract_addr: env.contract.address.to_string(),
            msg: to_json_binary(&ExecuteMsg::Callback(msg))?,
            funds: vec![],
        })
    };
    let (class_id, is_redemption, voucher_msg, entries_msg) = match local_class_id {
        Some(local_class_id) if returning.len() == token_ids.len() => {
            let redeem = callback(CallbackMsg::RedeemVouchers {
                receiver: receiver.to_string(),
                class_id: local_class_id.clone(),
                token_ids: token_ids.clone(),
            })?;
            let entries = callback(CallbackMsg::RedeemOutgoingChannelEntries(
                token_ids
                    .iter()
                    .map(|t| (local_class_id.clone(), t.clone()))
                    .collect(),
            ))?;
            (local_class_id, true, redeem, entries)
        }
        _ if !returning.is_empty() => return Err(ContractError::InvalidTransferBothActions),
        _ => {
            let voucher_class_id =
                ClassId::voucher(&packet.dest.port_id, &packet.dest.channel_id, &data.class_id)
                    .to_string();
            let uris = data.token_uris.clone().unwrap_or_default();
            let tokens = token_ids
                .iter()
                .enumerate()
                .map(|(i, id)| VoucherToken {
                    id: id.clone(),
                    uri: uris.get(i).cloned(),
                })
                .collect();
            let create = callback(CallbackMsg::CreateVouchers {
                receiver: receiver.to_string(),
                class_id: voucher_class_id.clone(),
                tokens,
            })?;
            let entries = callback(CallbackMsg::AddIncomingChannelEntries(
                token_ids
                    .iter()
                    .map(|t| {
                        (
                            (voucher_class_id.clone(), t.clone()),
                            packet.dest.channel_id.clone(),
                        )
                    })
                    .collect(),
            ))?;
            (voucher_class_id, false, create, entries)
        }
    };

    // proxy, vouchers, receive callback, channel entries
    operands.push(voucher_msg);
    if wants_receive_callback(&data) {
        operands.push(callback(CallbackMsg::ReceiveCallback {
            class_id: class_id.clone(),
            packet: data.clone(),
        })?);
    }
    operands.push(entries_msg);

    let conjunction = callback(CallbackMsg::Conjunction { operands })?;
    let mut response = IbcReceiveResponse::new()
        .set_ack(ack_success())
        .add_submessage(SubMsg::reply_always(conjunction, ACK_AND_DO_NOTHING_REPLY_ID))
        .add_attribute("method", "receive_ibc_packet")
        .add_attribute("class_id", class_id)
        .add_attribute("redemption", is_redemption.to_string())
        .add_attribute("local_channel", packet.dest.channel_id)
        .add_attribute("counterparty_channel", packet.src.channel_id);
    if let Some(memo) = data.memo.filter(|m| !m.is_empty()) {
        response = response.add_attribute("ics721_memo", memo);
    }
    Ok(response)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_packet_ack(
    deps: DepsMut,
    _env: Env,
    ack: IbcPacketAckMsg,
) -> Result<IbcBasicResponse, ContractError> {
    let error = match from_json::<Ics721Ack>(&ack.acknowledgement.data) {
        Ok(Ics721Ack::Result(_)) => None,
        Ok(Ics721Ack::Error(error)) => Some(error),
        Err(_) => Some("unparsable acknowledgement".to_string()),
    };
    if let Some(error) = error {
        return handle_packet_fail(deps, ack.original_packet, &error);
    }

    let data = packet_data(&ack.original_packet.data)?;
    let class_id = data.class_id.to_string();
    let mut burns = Vec::new();
    for token_id in data.token_ids.iter().map(|t| t.to_string()) {
        let key = (class_id.clone(), token_id.clone());
        // a voucher that went back to where it came from is burned, a
        // native token stays escrowed with its outgoing entry
        let incoming = INCOMING_CLASS_TOKEN_TO_CHANNEL.may_load(deps.storage, key.clone())?;
        if incoming.as_deref() == Some(ack.original_packet.src.channel_id.as_str()) {
            INCOMING_CLASS_TOKEN_TO_CHANNEL.remove(deps.storage, key.clone());
            OUTGOING_CLASS_TOKEN_TO_CHANNEL.remove(deps.storage, key);
            let nft_contract = nft_contract_for_class_id(deps.storage, deps.api, &class_id)?
                .ok_or_else(|| ContractError::NoNftContractForClassId(class_id.clone()))?;
            burns.push(burn_msg(&nft_contract, token_id)?);
        }
    }

    let nft_contract = nft_contract_for_class_id(deps.storage, deps.api, &class_id)?
        .map(Addr::into_string)
        .unwrap_or_default();
    let mut response = IbcBasicResponse::new().add_messages(burns);
    if let Some(callback) =
        ack_callback_msg(deps.as_ref(), Ics721Status::Success, data.clone(), nft_contract)
    {
        response = response.add_submessage(callback);
    }

    Ok(response
        .add_attribute("method", "acknowledge")
        .add_attribute("sender", data.sender)
        .add_attribute("receiver", data.receiver)
        .add_attribute("class_id", class_id)
        .add_attribute("token_ids", format!("{:?}", data.token_ids)))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn ibc_packet_timeout(
    deps: DepsMut,
    _env: Env,
    msg: IbcPacketTimeoutMsg,
) -> Result<IbcBasicResponse, ContractError> {
    handle_packet_fail(deps, msg.packet, "timeout")
}

/// Returns the escrowed NFT to its sender and forgets the outgoing entry.
fn handle_packet_fail(
    deps: DepsMut,
    packet: IbcPacket,
    error: &str,
) -> Result<IbcBasicResponse, ContractError> {
    let data = packet_data(&packet.data)?;
    let class_id = data.class_id.to_string();
    let nft_contract = nft_contract_for_class_id(deps.storage, deps.api, &class_id)?
        .ok_or_else(|| ContractError::NoNftContractForClassId(class_id.clone()))?;
    let sender = deps.api.addr_validate(&data.sender)?;

    let refunds = data
        .token_ids
        .iter()
        .map(|token_id| {
            OUTGOING_CLASS_TOKEN_TO_CHANNEL
                .remove(deps.storage, (class_id.clone(), token_id.to_string()));
            transfer_msg(&nft_contract, &sender, token_id.to_string())
        })
        .collect::<StdResult<Vec<_>>>()?;

    // refunds first, so the callback sees the sender owning the NFT again
    let mut response = IbcBasicResponse::new().add_messages(refunds);
    if let Some(callback) = ack_callback_msg(
        deps.as_ref(),
        Ics721Status::Failed(error.to_string()),
        data.clone(),
        nft_contract.into_string(),
    ) {
        response = response.add_submessage(callback);
    }

    Ok(response
        .add_attribute("method", "handle_packet_fail")
        .add_attribute("class_id", class_id)
        .add_attribute("channel_id", packet.src.channel_id)
        .add_attribute("address_refunded", data.sender)
        .add_attribute("error", error))
}
