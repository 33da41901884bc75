use cosmwasm_std::{
    from_json, to_json_binary, Addr, Binary, ContractInfoResponse, DepsMut, Empty, Env, Event,
    MessageInfo, Response, StdResult, SubMsg, WasmMsg,
};
use cw721::{AllNftInfoResponse, Cw721ReceiveMsg, OwnerOfResponse};
use ics721_types::{
    hooks::send_packet_event,
    packet::{IbcOutgoingMsg, IbcOutgoingProxyMsg, NonFungibleTokenPacketData},
    token_types::{ClassId, TokenId},
};

use crate::{
    contract::INSTANTIATE_CW721_REPLY_ID,
    helpers::receive_callback_msg,
    msg::{CallbackMsg, ExecuteMsg, MigrateMsg, VoucherToken},
    state::{
        class_id_for_nft_contract, nft_contract_for_class_id, CHANNELS,
        CLASS_ID_TO_NFT_CONTRACT, CW721_ADMIN, CW721_CODE_ID, INCOMING_CLASS_TOKEN_TO_CHANNEL,
        INCOMING_PROXY, OUTGOING_CLASS_TOKEN_TO_CHANNEL, OUTGOING_PROXY, PAUSER,
    },
    ContractError,
};

type Cw721ExecuteMsg = cw721_base::ExecuteMsg<cw721_base::Extension, Empty>;

/// The bridge is sent an NFT either by the collection itself or, when an
/// outgoing proxy is configured, by that proxy only. In the proxy case
/// `msg` wraps the collection address since `info.sender` is the proxy.
pub fn execute_receive_nft(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    receive: Cw721ReceiveMsg,
) -> Result<Response, ContractError> {
    let Cw721ReceiveMsg {
        sender,
        token_id,
        msg,
    } = receive;
    let (nft_contract, msg) = match OUTGOING_PROXY.load(deps.storage)? {
        Some(proxy) => {
            if proxy != info.sender {
                return Err(ContractError::Unauthorized {});
            }
            let proxied: IbcOutgoingProxyMsg = from_json(&msg)
                .map_err(|_| ContractError::UnknownMsg(msg.to_base64()))?;
            (deps.api.addr_validate(&proxied.collection)?, proxied.msg)
        }
        None => (info.sender, msg),
    };
    let outgoing: IbcOutgoingMsg =
        from_json(&msg).map_err(|_| ContractError::UnknownMsg(msg.to_base64()))?;
    let channel = CHANNELS
        .may_load(deps.storage, outgoing.channel_id.clone())?
        .ok_or_else(|| ContractError::UnknownChannel(outgoing.channel_id.clone()))?;

    let AllNftInfoResponse { access, info }: AllNftInfoResponse<cw721_base::Extension> =
        deps.querier.query_wasm_smart(
            nft_contract.to_string(),
            &cw721::Cw721QueryMsg::AllNftInfo {
                token_id: token_id.clone(),
                include_expired: None,
            },
        )?;
    if access.owner != env.contract.address.as_str() {
        return Err(ContractError::NotEscrowedByIcs721(access.owner));
    }

    let class_id = class_id_for_nft_contract(deps.storage, &nft_contract)?;
    let sender = deps.api.addr_validate(&sender)?;
    let packet = NonFungibleTokenPacketData {
        class_id: ClassId::new(class_id.clone()),
        class_uri: None,
        class_data: None,
        token_ids: vec![TokenId::new(token_id.clone())],
        token_uris: info.token_uri.map(|uri| vec![uri]),
        token_data: None,
        sender: sender.into_string(),
        receiver: outgoing.receiver,
        memo: outgoing.memo,
    };
    let data = to_json_binary(&packet)?;

    OUTGOING_CLASS_TOKEN_TO_CHANNEL.save(
        deps.storage,
        (class_id.clone(), token_id.clone()),
        &outgoing.channel_id,
    )?;

    Ok(Response::default()
        .add_attribute("method", "execute_receive_nft")
        .add_attribute("token_id", token_id)
        .add_attribute("class_id", class_id)
        .add_attribute("channel_id", outgoing.channel_id.clone())
        .add_event(send_packet_event(
            channel.endpoint.port_id,
            outgoing.channel_id,
            &data,
            &outgoing.timeout,
        )))
}

pub fn execute_callback(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: CallbackMsg,
) -> Result<Response, ContractError> {
    if info.sender != env.contract.address {
        return Err(ContractError::Unauthorized {});
    }
    match msg {
        CallbackMsg::CreateVouchers {
            receiver,
            class_id,
            tokens,
        } => callback_create_vouchers(deps, env, receiver, class_id, tokens),
        CallbackMsg::Mint {
            receiver,
            class_id,
            tokens,
        } => callback_mint(deps, receiver, class_id, tokens),
        CallbackMsg::RedeemVouchers {
            receiver,
            class_id,
            token_ids,
        } => callback_redeem_vouchers(deps, receiver, class_id, token_ids),
        CallbackMsg::RedeemOutgoingChannelEntries(entries) => {
            for key in entries {
                OUTGOING_CLASS_TOKEN_TO_CHANNEL.remove(deps.storage, key);
            }
            Ok(Response::default().add_attribute("method", "callback_redeem_outgoing_channel_entries"))
        }
        CallbackMsg::AddIncomingChannelEntries(entries) => {
            for (key, channel) in entries {
                INCOMING_CLASS_TOKEN_TO_CHANNEL.save(deps.storage, key, &channel)?;
            }
            Ok(Response::default().add_attribute("method", "callback_add_incoming_channel_entries"))
        }
        CallbackMsg::ReceiveCallback { class_id, packet } => {
            callback_receive_callback(deps, class_id, packet)
        }
        CallbackMsg::Conjunction { operands } => Ok(Response::default()
            .add_attribute("method", "callback_conjunction")
            .add_messages(operands)),
    }
}

/// Instantiates the voucher collection on first sight of a class, then
/// mints. The mint runs as a separate callback so it sees the address
/// recorded by the instantiate reply.
fn callback_create_vouchers(
    deps: DepsMut,
    env: Env,
    receiver: String,
    class_id: String,
    tokens: Vec<VoucherToken>,
) -> Result<Response, ContractError> {
    let mut response = Response::default().add_attribute("method", "callback_create_vouchers");
    if !CLASS_ID_TO_NFT_CONTRACT.has(deps.storage, class_id.clone()) {
        let init = cw721_base::InstantiateMsg {
            name: class_id.clone(),
            symbol: class_id.clone(),
            minter: env.contract.address.to_string(),
        };
        response = response.add_submessage(SubMsg::reply_on_success(
            WasmMsg::Instantiate {
                admin: CW721_ADMIN.load(deps.storage)?.map(Addr::into_string),
                code_id: CW721_CODE_ID.load(deps.storage)?,
                msg: to_json_binary(&init)?,
                funds: vec![],
                label: "ics-721 debt-voucher cw-721".to_string(),
            },
            INSTANTIATE_CW721_REPLY_ID,
        ));
    }

    let event = Event::new("ics721_receive_create_vouchers")
        .add_attribute("class_id", class_id.clone())
        .add_attribute("token_ids", format!("{:?}", tokens.iter().map(|t| &t.id).collect::<Vec<_>>()));
    let mint = WasmMsg::Execute {
        contract_addr: env.contract.address.into_string(),
        msg: to_json_binary(&ExecuteMsg::Callback(CallbackMsg::Mint {
            receiver,
            class_id,
            tokens,
        }))?,
        funds: vec![],
    };
    Ok(response.add_event(event).add_message(mint))
}

fn callback_mint(
    deps: DepsMut,
    receiver: String,
    class_id: String,
    tokens: Vec<VoucherToken>,
) -> Result<Response, ContractError> {
    let receiver = deps.api.addr_validate(&receiver)?;
    let nft_contract = CLASS_ID_TO_NFT_CONTRACT
        .may_load(deps.storage, class_id.clone())?
        .ok_or(ContractError::NoNftContractForClassId(class_id))?;

    let mints = tokens
        .into_iter()
        .map(|VoucherToken { id, uri }| {
            Ok(WasmMsg::Execute {
                contract_addr: nft_contract.to_string(),
                msg: to_json_binary(&Cw721ExecuteMsg::Mint {
                    token_id: id,
                    owner: receiver.to_string(),
                    token_uri: uri,
                    extension: None,
                })?,
                funds: vec![],
            })
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(Response::default()
        .add_attribute("method", "callback_mint")
        .add_messages(mints))
}

fn callback_redeem_vouchers(
    deps: DepsMut,
    receiver: String,
    class_id: String,
    token_ids: Vec<String>,
) -> Result<Response, ContractError> {
    let receiver = deps.api.addr_validate(&receiver)?;
    let nft_contract = nft_contract_for_class_id(deps.storage, deps.api, &class_id)?
        .ok_or_else(|| ContractError::NoNftContractForClassId(class_id.clone()))?;

    let event = Event::new("ics721_receive_redeem_vouchers")
        .add_attribute("class_id", class_id)
        .add_attribute("nft_contract", nft_contract.to_string())
        .add_attribute("token_ids", format!("{token_ids:?}"));
    let transfers = token_ids
        .into_iter()
        .map(|token_id| transfer_msg(&nft_contract, &receiver, token_id))
        .collect::<StdResult<Vec<_>>>()?;

    Ok(Response::default()
        .add_attribute("method", "callback_redeem_vouchers")
        .add_event(event)
        .add_messages(transfers))
}

fn callback_receive_callback(
    deps: DepsMut,
    class_id: String,
    packet: NonFungibleTokenPacketData,
) -> Result<Response, ContractError> {
    let nft_contract = nft_contract_for_class_id(deps.storage, deps.api, &class_id)?
        .ok_or_else(|| ContractError::NoNftContractForClassId(class_id.clone()))?;
    let mut response = Response::default()
        .add_attribute("method", "callback_receive_callback")
        .add_attribute("nft_contract", nft_contract.to_string());
    if let Some(msg) = receive_callback_msg(deps.as_ref(), packet, nft_contract.into_string()) {
        response = response.add_message(msg);
    }
    Ok(response)
}

pub(crate) fn transfer_msg(
    nft_contract: &Addr,
    recipient: &Addr,
    token_id: String,
) -> StdResult<WasmMsg> {
    Ok(WasmMsg::Execute {
        contract_addr: nft_contract.to_string(),
        msg: to_json_binary(&Cw721ExecuteMsg::TransferNft {
            recipient: recipient.to_string(),
            token_id,
        })?,
        funds: vec![],
    })
}

pub(crate) fn burn_msg(nft_contract: &Addr, token_id: String) -> StdResult<WasmMsg> {
    Ok(WasmMsg::Execute {
        contract_addr: nft_contract.to_string(),
        msg: to_json_binary(&Cw721ExecuteMsg::Burn { token_id })?,
        funds: vec![],
    })
}

fn ensure_admin(deps: &DepsMut, env: &Env, info: &MessageInfo) -> Result<(), ContractError> {
    let ContractInfoResponse { admin, .. } = deps
        .querier
        .query_wasm_contract_info(env.contract.address.to_string())?;
    match admin {
        Some(admin) if admin != info.sender.as_str() => Err(ContractError::Unauthorized {}),
        _ => Ok(()),
    }
}

fn ensure_collection(
    deps: &DepsMut,
    class_id: &str,
    collection: &str,
) -> Result<Addr, ContractError> {
    let collection = deps.api.addr_validate(collection)?;
    match nft_contract_for_class_id(deps.storage, deps.api, class_id)? {
        Some(cw721_addr) if cw721_addr == collection => Ok(collection),
        Some(cw721_addr) => Err(ContractError::NoNftContractMatch {
            collection: collection.into_string(),
            class_id: class_id.to_string(),
            cw721_addr: cw721_addr.into_string(),
        }),
        None => Err(ContractError::NoNftContractForClassId(class_id.to_string())),
    }
}

fn owner_of(deps: &DepsMut, collection: &Addr, token_id: &str) -> Option<String> {
    deps.querier
        .query_wasm_smart::<OwnerOfResponse>(
            collection.to_string(),
            &cw721::Cw721QueryMsg::OwnerOf {
                token_id: token_id.to_string(),
                include_expired: None,
            },
        )
        .ok()
        .map(|res| res.owner)
}

#[allow(clippy::too_many_arguments)]
pub fn execute_admin_clean_and_burn_nft(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    owner: String,
    token_id: String,
    class_id: String,
    collection: String,
) -> Result<Response, ContractError> {
    deps.api.addr_validate(&owner)?;
    ensure_admin(&deps, &env, &info)?;
    let collection = ensure_collection(&deps, &class_id, &collection)?;

    INCOMING_CLASS_TOKEN_TO_CHANNEL.remove(deps.storage, (class_id, token_id.clone()));

    let mut response =
        Response::default().add_attribute("method", "execute_admin_clean_and_burn_nft");
    if let Some(current) = owner_of(&deps, &collection, &token_id) {
        if current != owner {
            return Err(ContractError::NotOwnerOfNft {
                recipient: owner,
                token_id,
                owner: current,
            });
        }
        response = response.add_message(burn_msg(&collection, token_id)?);
    }
    Ok(response)
}

#[allow(clippy::too_many_arguments)]
pub fn execute_admin_clean_and_unescrow_nft(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    recipient: String,
    token_id: String,
    class_id: String,
    collection: String,
) -> Result<Response, ContractError> {
    let recipient = deps.api.addr_validate(&recipient)?;
    ensure_admin(&deps, &env, &info)?;
    let collection = ensure_collection(&deps, &class_id, &collection)?;

    OUTGOING_CLASS_TOKEN_TO_CHANNEL.remove(deps.storage, (class_id, token_id.clone()));

    let mut response =
        Response::default().add_attribute("method", "execute_admin_clean_and_unescrow_nft");
    if let Some(current) = owner_of(&deps, &collection, &token_id) {
        if current != env.contract.address.as_str() {
            return Err(ContractError::NotEscrowedByIcs721(current));
        }
        response = response.add_message(transfer_msg(&collection, &recipient, token_id)?);
    }
    Ok(response)
}

pub fn migrate(deps: DepsMut, msg: MigrateMsg) -> Result<Response, ContractError> {
    match msg {
        MigrateMsg::WithUpdate {
            pauser,
            incoming_proxy,
            outgoing_proxy,
            cw721_base_code_id,
            cw721_admin,
        } => {
            let validate = |addr: &Option<String>| {
                addr.as_deref()
                    .map(|a| deps.api.addr_validate(a))
                    .transpose()
            };
            INCOMING_PROXY.save(deps.storage, &validate(&incoming_proxy)?)?;
            OUTGOING_PROXY.save(deps.storage, &validate(&outgoing_proxy)?)?;
            PAUSER.save(deps.storage, &validate(&pauser)?)?;
            if let Some(code_id) = cw721_base_code_id {
                CW721_CODE_ID.save(deps.storage, &code_id)?;
            }
            match cw721_admin.as_deref() {
                Some("") => CW721_ADMIN.save(deps.storage, &None)?,
                Some(admin) => {
                    CW721_ADMIN.save(deps.storage, &Some(deps.api.addr_validate(admin)?))?
                }
                None => {}
            }

            let or_none = |v: Option<String>| v.unwrap_or_else(|| "none".to_string());
            Ok(Response::default()
                .add_attribute("method", "migrate")
                .add_attribute("incoming_proxy", or_none(incoming_proxy))
                .add_attribute("outgoing_proxy", or_none(outgoing_proxy))
                .add_attribute("pauser", or_none(pauser))
                .add_attribute(
                    "cw721_base_code_id",
                    or_none(cw721_base_code_id.map(|id| id.to_string())),
                ))
        }
    }
}

pub(crate) fn packet_data(data: &Binary) -> StdResult<NonFungibleTokenPacketData> {
    from_json(data)
}
