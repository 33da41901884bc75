use cosmwasm_schema::cw_serde;
use cosmwasm_std::{to_json_binary, Binary};

/// Acknowledgement written by an ICS-721 receiver, in the ICS-20 style
/// `{"result": ..}` / `{"error": ..}` envelope.
#[cw_serde]
pub enum Ics721Ack {
    Result(Binary),
    Error(String),
}

/// Success payload is a single `0x01` byte.
pub fn ack_success() -> Binary {
    to_json_binary(&Ics721Ack::Result(Binary::from(vec![1]))).unwrap_or_default()
}

pub fn ack_fail(message: impl Into<String>) -> Binary {
    to_json_binary(&Ics721Ack::Error(message.into())).unwrap_or_default()
}
