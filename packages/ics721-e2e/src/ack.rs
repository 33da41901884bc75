//! Checks over relay results. Nothing here talks to a chain except
//! [`assert_pending_count`], which reads the link's pending packets.

use cosmwasm_std::Binary;
use serde::Deserialize;

use crate::{
    error::{AssertionError, E2eError},
    relay::{AckRecord, Link, RelayResult, Side},
};

/// A decoded acknowledgement.
#[derive(Clone, Debug, PartialEq)]
pub enum AckOutcome {
    Success(Binary),
    Error(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expect {
    Success,
    Error,
}

#[derive(Deserialize)]
struct RawAck {
    result: Option<Binary>,
    error: Option<String>,
}

/// Decodes an ack envelope, which must carry exactly one of `result` and
/// `error`.
pub fn decode_ack(index: usize, acknowledgement: &[u8]) -> Result<AckOutcome, AssertionError> {
    let raw: RawAck =
        serde_json::from_slice(acknowledgement).map_err(|e| AssertionError::MalformedAck {
            index,
            reason: e.to_string(),
        })?;
    match (raw.result, raw.error) {
        (Some(result), None) => Ok(AckOutcome::Success(result)),
        (None, Some(error)) => Ok(AckOutcome::Error(error)),
        (Some(_), Some(_)) => Err(AssertionError::AckBothFields { index }),
        (None, None) => Err(AssertionError::AckNoField { index }),
    }
}

pub fn assert_all_success(acks: &[AckRecord]) -> Result<(), AssertionError> {
    for (index, ack) in acks.iter().enumerate() {
        if let AckOutcome::Error(error) = decode_ack(index, &ack.acknowledgement)? {
            return Err(AssertionError::UnexpectedError { index, error });
        }
    }
    Ok(())
}

pub fn assert_all_errors(acks: &[AckRecord]) -> Result<(), AssertionError> {
    for (index, ack) in acks.iter().enumerate() {
        if let AckOutcome::Success(_) = decode_ack(index, &ack.acknowledgement)? {
            return Err(AssertionError::UnexpectedSuccess { index });
        }
    }
    Ok(())
}

pub fn assert_acks(acks: &[AckRecord], expect: Expect) -> Result<(), AssertionError> {
    match expect {
        Expect::Success => assert_all_success(acks),
        Expect::Error => assert_all_errors(acks),
    }
}

/// Payload of a success ack.
pub fn parse_ack_success(ack: &AckRecord) -> Result<Binary, AssertionError> {
    match decode_ack(0, &ack.acknowledgement)? {
        AckOutcome::Success(result) => Ok(result),
        AckOutcome::Error(error) => Err(AssertionError::UnexpectedError { index: 0, error }),
    }
}

pub fn assert_pending_count(link: &dyn Link, side: Side, expected: usize) -> Result<(), E2eError> {
    let actual = link.pending_packets(side)?.len();
    check_count(&format!("pending packets on side {side}"), expected, actual)?;
    Ok(())
}

/// `count` packets left A in this pass and each was acked by B as
/// expected.
pub fn assert_packets_from_a(
    relay: &RelayResult,
    count: usize,
    expect: Expect,
) -> Result<(), AssertionError> {
    assert_packets_from(relay, Side::A, count, expect)
}

pub fn assert_packets_from_b(
    relay: &RelayResult,
    count: usize,
    expect: Expect,
) -> Result<(), AssertionError> {
    assert_packets_from(relay, Side::B, count, expect)
}

fn assert_packets_from(
    relay: &RelayResult,
    sender: Side,
    count: usize,
    expect: Expect,
) -> Result<(), AssertionError> {
    check_count(
        &format!("packets from {sender}"),
        count,
        relay.packets_from(sender),
    )?;
    let acks = relay.acks_for_packets_from(sender);
    check_count(
        &format!("acks from {}", sender.other()),
        count,
        acks.len(),
    )?;
    assert_acks(acks, expect)
}

pub(crate) fn check_count(what: &str, expected: usize, actual: usize) -> Result<(), AssertionError> {
    if expected == actual {
        Ok(())
    } else {
        Err(AssertionError::Count {
            what: what.to_string(),
            expected,
            actual,
        })
    }
}

pub(crate) fn check_eq(what: &str, expected: &str, actual: &str) -> Result<(), AssertionError> {
    if expected == actual {
        Ok(())
    } else {
        Err(AssertionError::Mismatch {
            what: what.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use cosmwasm_std::{IbcTimeout, Timestamp};
    use ics721_types::ack::{ack_fail, ack_success};
    use rstest::rstest;

    use super::*;
    use crate::relay::{ChannelEnd, PendingPacket};

    fn record(acknowledgement: &[u8]) -> AckRecord {
        let end = ChannelEnd {
            port_id: "wasm.bridge".to_string(),
            channel_id: "channel-0".to_string(),
        };
        AckRecord {
            acknowledgement: Binary::from(acknowledgement),
            original_packet: PendingPacket {
                sequence: 1,
                src: end.clone(),
                dest: end,
                data: Binary::default(),
                timeout: IbcTimeout::with_timestamp(Timestamp::from_seconds(1)),
            },
        }
    }

    #[rstest]
    #[case(br#"{"result":"AQ=="}"#, Ok(AckOutcome::Success(Binary::from(vec![1]))))]
    #[case(br#"{"error":"nope"}"#, Ok(AckOutcome::Error("nope".to_string())))]
    #[case(br#"{"result":"AQ==","error":"nope"}"#, Err(AssertionError::AckBothFields { index: 0 }))]
    #[case(br#"{}"#, Err(AssertionError::AckNoField { index: 0 }))]
    fn exactly_one_of_result_and_error(
        #[case] raw: &[u8],
        #[case] expected: Result<AckOutcome, AssertionError>,
    ) {
        assert_eq!(decode_ack(0, raw), expected);
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            decode_ack(3, b"not json"),
            Err(AssertionError::MalformedAck { index: 3, .. })
        ));
    }

    #[test]
    fn uniform_outcomes() {
        let ok = record(&ack_success());
        let failed = record(&ack_fail("boom"));

        assert_eq!(assert_all_success(&[ok.clone(), ok.clone()]), Ok(()));
        assert_eq!(assert_all_errors(&[failed.clone()]), Ok(()));
        assert_eq!(
            assert_all_success(&[ok.clone(), failed.clone()]),
            Err(AssertionError::UnexpectedError {
                index: 1,
                error: "boom".to_string()
            })
        );
        assert_eq!(
            assert_all_errors(&[failed, ok.clone()]),
            Err(AssertionError::UnexpectedSuccess { index: 1 })
        );
        assert_eq!(parse_ack_success(&ok), Ok(Binary::from(vec![1])));
    }

    #[test]
    fn packet_counts_are_checked_before_outcomes() {
        let relay = RelayResult {
            packets_from_a: 2,
            acks_from_b: vec![record(&ack_success())],
            ..RelayResult::default()
        };
        assert_eq!(
            assert_packets_from_a(&relay, 2, Expect::Success),
            Err(AssertionError::Count {
                what: "acks from B".to_string(),
                expected: 2,
                actual: 1
            })
        );
        assert!(assert_packets_from_b(&relay, 0, Expect::Error).is_ok());
    }
}
