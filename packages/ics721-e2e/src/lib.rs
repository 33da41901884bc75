//! Orchestration of ICS-721 transfers between two chains.
//!
//! A run provisions contracts on both chains ([`provision`]), opens
//! channels between two bridge ports ([`channel`]) and then drives
//! [`scenario`]s: ordered steps that mint, dispatch, relay and assert on
//! acknowledgements ([`ack`]) and on-chain state. Chains and the relayer
//! are reached only through the [`chain::ChainClient`] and
//! [`relay::Relayer`] capabilities; [`sim`] implements both in process.

pub mod ack;
pub mod chain;
pub mod channel;
pub mod config;
pub mod error;
pub mod logging;
pub mod msg;
pub mod provision;
pub mod relay;
pub mod scenario;
pub mod sim;
pub mod wait;

#[cfg(test)]
mod testing;

pub use crate::error::{AssertionError, ChainError, E2eError, RelayError};
