use cosmwasm_schema::cw_serde;
use cosmwasm_std::{from_json, Binary};

use crate::packet::NonFungibleTokenPacketData;

/// Memo understood by the bridge. It travels base64 encoded.
#[cw_serde]
#[derive(Default)]
pub struct Ics721Memo {
    pub callbacks: Option<Ics721Callbacks>,
}

/// Callback hints attached to a transfer. Each side only receives a
/// callback when its data field is present; the address defaults to the
/// sender (ack) or receiver (receive).
#[cw_serde]
#[derive(Default)]
pub struct Ics721Callbacks {
    pub ack_callback_data: Option<Binary>,
    pub ack_callback_addr: Option<String>,
    pub receive_callback_data: Option<Binary>,
    pub receive_callback_addr: Option<String>,
}

/// Callbacks of a packet memo. Memos that are not base64 json of an
/// [`Ics721Memo`] carry none.
pub fn parse_callbacks(memo: Option<&str>) -> Option<Ics721Callbacks> {
    let binary = Binary::from_base64(memo?).ok()?;
    from_json::<Ics721Memo>(&binary).ok()?.callbacks
}

/// Sent to the receive callback address once the NFT sits with the
/// receiver. Failing it fails the transfer.
#[cw_serde]
pub struct Ics721ReceiveCallbackMsg {
    /// Collection on the receiving chain, the voucher unless the token
    /// came home.
    pub nft_contract: String,
    pub original_packet: NonFungibleTokenPacketData,
    pub msg: Binary,
}

/// Status update for the sending side. Failing it changes nothing about
/// the transfer.
#[cw_serde]
pub struct Ics721AckCallbackMsg {
    pub status: Ics721Status,
    pub nft_contract: String,
    pub original_packet: NonFungibleTokenPacketData,
    pub msg: Binary,
}

#[cw_serde]
pub enum Ics721Status {
    Success,
    Failed(String),
}

/// Execute messages a callback receiver has to understand.
#[cw_serde]
pub enum ReceiverExecuteMsg {
    Ics721ReceiveCallback(Ics721ReceiveCallbackMsg),
    Ics721AckCallback(Ics721AckCallbackMsg),
}

#[cfg(test)]
mod tests {
    use cosmwasm_std::{to_json_binary, to_json_string};

    use super::*;

    #[test]
    fn callbacks_round_the_base64_memo() {
        let memo = to_json_binary(&Ics721Memo {
            callbacks: Some(Ics721Callbacks {
                receive_callback_data: Some(Binary::from(br#"{"nft_received":{}}"#.to_vec())),
                receive_callback_addr: Some("osmo1tester".to_string()),
                ..Default::default()
            }),
        })
        .unwrap()
        .to_base64();
        let callbacks = parse_callbacks(Some(&memo)).unwrap();
        assert_eq!(callbacks.receive_callback_addr.as_deref(), Some("osmo1tester"));
        assert_eq!(callbacks.ack_callback_data, None);
    }

    #[test]
    fn plain_memos_carry_no_callbacks() {
        assert_eq!(parse_callbacks(None), None);
        assert_eq!(parse_callbacks(Some("gm")), None);
        // base64 of the json string "gm"
        assert_eq!(parse_callbacks(Some("ImdtIg==")), None);
    }

    #[test]
    fn status_is_snake_case() {
        assert_eq!(
            to_json_string(&Ics721Status::Failed("timeout".to_string())).unwrap(),
            r#"{"failed":"timeout"}"#
        );
    }
}
