#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    ensure_eq, from_json, to_json_binary, Addr, Binary, Deps, DepsMut, Env, IbcTimeout,
    MessageInfo, Response, StdResult, WasmMsg,
};
use cw2::set_contract_version;
use cw721::{Cw721ExecuteMsg, Cw721QueryMsg, OwnerOfResponse};
use ics721_types::{
    memo::{Ics721AckCallbackMsg, Ics721ReceiveCallbackMsg},
    packet::{IbcOutgoingMsg, NonFungibleTokenPacketData},
};

use crate::{
    msg::{ExecuteMsg, Ics721Callbacks, InstantiateMsg, QueryMsg},
    state::{ICS721, NFT_CONTRACT, RECEIVED_CALLBACK, SENT_CALLBACK},
    ContractError,
};

const CONTRACT_NAME: &str = "crates.io:callback-tester";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    ICS721.save(deps.storage, &deps.api.addr_validate(&msg.ics721)?)?;
    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("ics721", msg.ics721))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Ics721ReceiveCallback(msg) => execute_receive_callback(deps, &info, msg),
        ExecuteMsg::Ics721AckCallback(msg) => execute_ack_callback(deps, &info, msg),
        ExecuteMsg::SendNft {
            cw721,
            ics721,
            token_id,
            recipient,
            channel_id,
            timeout,
            memo,
        } => execute_send_nft(cw721, ics721, token_id, recipient, channel_id, timeout, memo),
    }
}

fn execute_receive_callback(
    deps: DepsMut,
    info: &MessageInfo,
    msg: Ics721ReceiveCallbackMsg,
) -> Result<Response, ContractError> {
    match from_json::<Ics721Callbacks>(&msg.msg)? {
        Ics721Callbacks::NftReceived {} => {
            let (nft_contract, owner) =
                owner_at_callback(deps.as_ref(), info, &msg.original_packet, &msg.nft_contract)?;
            RECEIVED_CALLBACK.save(deps.storage, &owner)?;
            NFT_CONTRACT.save(deps.storage, &nft_contract)?;
            Ok(Response::new().add_attribute("method", "nft_received"))
        }
        Ics721Callbacks::FailCallback {} => Err(ContractError::RequestedFailure {}),
        Ics721Callbacks::NftSent {} => Err(ContractError::InvalidCallback {}),
    }
}

fn execute_ack_callback(
    deps: DepsMut,
    info: &MessageInfo,
    msg: Ics721AckCallbackMsg,
) -> Result<Response, ContractError> {
    match from_json::<Ics721Callbacks>(&msg.msg)? {
        Ics721Callbacks::NftSent {} => {
            let (nft_contract, owner) =
                owner_at_callback(deps.as_ref(), info, &msg.original_packet, &msg.nft_contract)?;
            SENT_CALLBACK.save(deps.storage, &owner)?;
            NFT_CONTRACT.save(deps.storage, &nft_contract)?;
            Ok(Response::new()
                .add_attribute("method", "nft_sent")
                .add_attribute("status", format!("{:?}", msg.status)))
        }
        Ics721Callbacks::FailCallback {} => Err(ContractError::RequestedFailure {}),
        Ics721Callbacks::NftReceived {} => Err(ContractError::InvalidCallback {}),
    }
}

/// Checks the callback came from the bridge and looks up who holds the
/// packet's first token. A burned token has no owner.
fn owner_at_callback(
    deps: Deps,
    info: &MessageInfo,
    packet: &NonFungibleTokenPacketData,
    nft_contract: &str,
) -> Result<(Addr, Option<OwnerOfResponse>), ContractError> {
    ensure_eq!(
        info.sender,
        ICS721.load(deps.storage)?,
        ContractError::SenderIsNotIcs721
    );
    let nft_contract = deps.api.addr_validate(nft_contract)?;
    let token_id = packet
        .token_ids
        .first()
        .ok_or(ContractError::InvalidCallback {})?;
    let owner = deps
        .querier
        .query_wasm_smart::<OwnerOfResponse>(
            &nft_contract,
            &Cw721QueryMsg::OwnerOf {
                token_id: token_id.to_string(),
                include_expired: None,
            },
        )
        .ok();
    Ok((nft_contract, owner))
}

fn execute_send_nft(
    cw721: String,
    ics721: String,
    token_id: String,
    recipient: String,
    channel_id: String,
    timeout: IbcTimeout,
    memo: Option<String>,
) -> Result<Response, ContractError> {
    let send = WasmMsg::Execute {
        contract_addr: cw721,
        msg: to_json_binary(&Cw721ExecuteMsg::SendNft {
            contract: ics721,
            token_id: token_id.clone(),
            msg: to_json_binary(&IbcOutgoingMsg {
                receiver: recipient,
                channel_id,
                timeout,
                memo,
            })?,
        })?,
        funds: vec![],
    };
    Ok(Response::new()
        .add_message(send)
        .add_attribute("method", "send_nft")
        .add_attribute("token_id", token_id))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::GetSentCallback {} => {
            to_json_binary(&SENT_CALLBACK.may_load(deps.storage)?.flatten())
        }
        QueryMsg::GetReceivedCallback {} => {
            to_json_binary(&RECEIVED_CALLBACK.may_load(deps.storage)?.flatten())
        }
        QueryMsg::GetNftContract {} => to_json_binary(&NFT_CONTRACT.may_load(deps.storage)?),
    }
}

#[cfg(test)]
mod tests {
    use cosmwasm_std::{
        testing::{
            mock_dependencies, mock_env, mock_info, MockApi, MockQuerier, MockStorage,
        },
        ContractResult, CosmosMsg, Empty, OwnedDeps, SystemResult, WasmQuery,
    };
    use ics721_types::{
        memo::Ics721Status,
        token_types::{ClassId, TokenId},
    };

    use super::*;

    const ICS721_ADDR: &str = "ics721";
    const NFT: &str = "voucher";

    fn setup() -> OwnedDeps<MockStorage, MockApi, MockQuerier<Empty>> {
        let mut deps = mock_dependencies();
        instantiate(
            deps.as_mut(),
            mock_env(),
            mock_info("creator", &[]),
            InstantiateMsg {
                ics721: ICS721_ADDR.to_string(),
            },
        )
        .unwrap();
        deps.querier.update_wasm(|query| match query {
            WasmQuery::Smart { contract_addr, .. } if contract_addr == NFT => {
                SystemResult::Ok(ContractResult::Ok(
                    to_json_binary(&OwnerOfResponse {
                        owner: "tester".to_string(),
                        approvals: vec![],
                    })
                    .unwrap(),
                ))
            }
            _ => SystemResult::Ok(ContractResult::Err("not found".to_string())),
        });
        deps
    }

    fn packet() -> NonFungibleTokenPacketData {
        NonFungibleTokenPacketData {
            class_id: ClassId::new("wasm.b/channel-0/wasm1nft"),
            class_uri: None,
            class_data: None,
            token_ids: vec![TokenId::new("1")],
            token_uris: None,
            token_data: None,
            sender: "sender".to_string(),
            receiver: "tester".to_string(),
            memo: None,
        }
    }

    fn received(callback: &Ics721Callbacks, nft_contract: &str) -> ExecuteMsg {
        ExecuteMsg::Ics721ReceiveCallback(Ics721ReceiveCallbackMsg {
            nft_contract: nft_contract.to_string(),
            original_packet: packet(),
            msg: to_json_binary(callback).unwrap(),
        })
    }

    fn sent(callback: &Ics721Callbacks, nft_contract: &str) -> ExecuteMsg {
        ExecuteMsg::Ics721AckCallback(Ics721AckCallbackMsg {
            status: Ics721Status::Success,
            nft_contract: nft_contract.to_string(),
            original_packet: packet(),
            msg: to_json_binary(callback).unwrap(),
        })
    }

    fn query_owner(deps: Deps, msg: QueryMsg) -> Option<OwnerOfResponse> {
        from_json(query(deps, mock_env(), msg).unwrap()).unwrap()
    }

    #[test]
    fn receive_callback_records_the_owner() {
        let mut deps = setup();
        execute(
            deps.as_mut(),
            mock_env(),
            mock_info(ICS721_ADDR, &[]),
            received(&Ics721Callbacks::NftReceived {}, NFT),
        )
        .unwrap();

        let owner = query_owner(deps.as_ref(), QueryMsg::GetReceivedCallback {}).unwrap();
        assert_eq!(owner.owner, "tester");
        assert_eq!(query_owner(deps.as_ref(), QueryMsg::GetSentCallback {}), None);
        let nft: Option<Addr> =
            from_json(query(deps.as_ref(), mock_env(), QueryMsg::GetNftContract {}).unwrap())
                .unwrap();
        assert_eq!(nft, Some(Addr::unchecked(NFT)));
    }

    #[test]
    fn ack_callback_of_a_burned_token_records_no_owner() {
        let mut deps = setup();
        execute(
            deps.as_mut(),
            mock_env(),
            mock_info(ICS721_ADDR, &[]),
            sent(&Ics721Callbacks::NftSent {}, "burned"),
        )
        .unwrap();
        assert_eq!(query_owner(deps.as_ref(), QueryMsg::GetSentCallback {}), None);
        let nft: Option<Addr> =
            from_json(query(deps.as_ref(), mock_env(), QueryMsg::GetNftContract {}).unwrap())
                .unwrap();
        assert_eq!(nft, Some(Addr::unchecked("burned")));
    }

    #[test]
    fn callbacks_are_only_taken_from_the_bridge() {
        let mut deps = setup();
        let err = execute(
            deps.as_mut(),
            mock_env(),
            mock_info("stranger", &[]),
            received(&Ics721Callbacks::NftReceived {}, NFT),
        )
        .unwrap_err();
        assert_eq!(err, ContractError::SenderIsNotIcs721);
    }

    #[test]
    fn fail_callback_fails_either_side() {
        let mut deps = setup();
        for msg in [
            received(&Ics721Callbacks::FailCallback {}, NFT),
            sent(&Ics721Callbacks::FailCallback {}, NFT),
        ] {
            let err = execute(deps.as_mut(), mock_env(), mock_info(ICS721_ADDR, &[]), msg)
                .unwrap_err();
            assert_eq!(err, ContractError::RequestedFailure {});
        }
        assert_eq!(
            query_owner(deps.as_ref(), QueryMsg::GetReceivedCallback {}),
            None
        );
    }

    #[test]
    fn send_nft_wraps_the_outgoing_msg() {
        let mut deps = setup();
        let res = execute(
            deps.as_mut(),
            mock_env(),
            mock_info("anyone", &[]),
            ExecuteMsg::SendNft {
                cw721: NFT.to_string(),
                ics721: ICS721_ADDR.to_string(),
                token_id: "1".to_string(),
                recipient: "receiver".to_string(),
                channel_id: "channel-0".to_string(),
                timeout: IbcTimeout::with_timestamp(mock_env().block.time.plus_seconds(600)),
                memo: None,
            },
        )
        .unwrap();
        let CosmosMsg::Wasm(WasmMsg::Execute { contract_addr, msg, .. }) =
            &res.messages[0].msg
        else {
            panic!("expected a wasm execute");
        };
        assert_eq!(contract_addr, NFT);
        let Cw721ExecuteMsg::SendNft { contract, msg, .. } = from_json::<Cw721ExecuteMsg>(msg).unwrap()
        else {
            panic!("expected send_nft");
        };
        assert_eq!(contract, ICS721_ADDR);
        let outgoing: IbcOutgoingMsg = from_json(msg).unwrap();
        assert_eq!(outgoing.receiver, "receiver");
        assert_eq!(outgoing.channel_id, "channel-0");
    }
}
