use std::{thread, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::RelayError,
    relay::{Link, Side},
};

/// How long to watch a side's pending packets before trusting the count.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SettlePolicy {
    pub interval_ms: u64,
    /// Consecutive polls that must agree.
    pub stable_rounds: u32,
    pub max_polls: u32,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            interval_ms: 0,
            stable_rounds: 2,
            max_polls: 50,
        }
    }
}

impl SettlePolicy {
    /// For chains producing blocks on their own clock.
    pub fn live() -> Self {
        Self {
            interval_ms: 500,
            stable_rounds: 3,
            max_polls: 120,
        }
    }
}

/// Polls `pending_packets(side)` until the count stays the same for
/// `stable_rounds` polls in a row and returns that count. Replaces fixed
/// sleeps around relay calls.
pub fn settle(link: &dyn Link, side: Side, policy: &SettlePolicy) -> Result<usize, RelayError> {
    let stable_rounds = policy.stable_rounds.max(1);
    let mut last = link.pending_packets(side)?.len();
    let mut agreeing = 1;
    let mut polls = 1;
    while agreeing < stable_rounds {
        if polls >= policy.max_polls {
            return Err(RelayError::SettleTimeout { side, polls, last });
        }
        if policy.interval_ms > 0 {
            thread::sleep(Duration::from_millis(policy.interval_ms));
        }
        let count = link.pending_packets(side)?.len();
        polls += 1;
        if count == last {
            agreeing += 1;
        } else {
            debug!(%side, from = last, to = count, "pending packets still moving");
            last = count;
            agreeing = 1;
        }
    }
    Ok(last)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use cosmwasm_std::{Binary, IbcOrder, IbcTimeout, Timestamp};

    use super::*;
    use crate::relay::{ChannelEnd, ChannelPair, PendingPacket, RelayResult};

    /// Reports the given counts in order, repeating the last one.
    struct Scripted(RefCell<Vec<usize>>);

    impl Link for Scripted {
        fn create_channel(
            &mut self,
            _: &str,
            _: &str,
            _: IbcOrder,
            _: &str,
        ) -> Result<ChannelPair, RelayError> {
            unreachable!()
        }

        fn relay_all(&mut self) -> Result<RelayResult, RelayError> {
            unreachable!()
        }

        fn pending_packets(&self, _: Side) -> Result<Vec<PendingPacket>, RelayError> {
            let mut counts = self.0.borrow_mut();
            let count = if counts.len() > 1 {
                counts.remove(0)
            } else {
                counts[0]
            };
            let end = ChannelEnd {
                port_id: "p".to_string(),
                channel_id: "channel-0".to_string(),
            };
            Ok((0..count as u64)
                .map(|sequence| PendingPacket {
                    sequence,
                    src: end.clone(),
                    dest: end.clone(),
                    data: Binary::default(),
                    timeout: IbcTimeout::with_timestamp(Timestamp::from_seconds(1)),
                })
                .collect())
        }

        fn close_channel(&mut self, _: Side, _: &ChannelPair) -> Result<(), RelayError> {
            unreachable!()
        }

        fn confirm_counterparty_close(
            &mut self,
            _: Side,
            _: &ChannelPair,
        ) -> Result<(), RelayError> {
            unreachable!()
        }
    }

    #[test]
    fn waits_for_count_to_stop_moving() {
        let link = Scripted(RefCell::new(vec![0, 1, 2, 2, 2]));
        let policy = SettlePolicy {
            stable_rounds: 3,
            ..SettlePolicy::default()
        };
        assert_eq!(settle(&link, Side::A, &policy).unwrap(), 2);
    }

    #[test]
    fn gives_up_after_max_polls() {
        let link = Scripted(RefCell::new((0..100).collect()));
        let policy = SettlePolicy {
            max_polls: 5,
            ..SettlePolicy::default()
        };
        let err = settle(&link, Side::B, &policy).unwrap_err();
        assert!(matches!(
            err,
            RelayError::SettleTimeout {
                side: Side::B,
                polls: 5,
                last: 4
            }
        ));
    }
}
