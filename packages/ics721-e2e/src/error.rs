use cosmwasm_std::StdError;
use thiserror::Error;

use crate::relay::Side;

/// Failures of a single chain call.
#[derive(Error, Debug)]
pub enum ChainError {
    #[error(transparent)]
    Std(#[from] StdError),

    #[error("transaction failed on {chain_id}: {reason}")]
    TxFailed { chain_id: String, reason: String },

    #[error("query failed on {chain_id}: {reason}")]
    QueryFailed { chain_id: String, reason: String },

    #[error("no code known for artifact {0}")]
    UnknownCode(String),
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error(transparent)]
    Std(#[from] StdError),

    #[error("unknown chain {0}")]
    UnknownChain(String),

    #[error("port {0} is not bound to a contract")]
    UnknownPort(String),

    #[error("channel handshake failed on {chain_id} port {port}: {reason}")]
    Handshake {
        chain_id: String,
        port: String,
        reason: String,
    },

    #[error("packet delivery failed on {chain_id}: {reason}")]
    Delivery { chain_id: String, reason: String },

    #[error("closing channel {channel_id} failed on {chain_id}: {reason}")]
    ChannelClose {
        chain_id: String,
        channel_id: String,
        reason: String,
    },

    #[error("channel {0} is not open on this link")]
    ChannelNotOpen(String),

    #[error("pending packets on side {side} did not settle after {polls} polls, last count {last}")]
    SettleTimeout { side: Side, polls: u32, last: usize },
}

/// A check on acks or chain state did not hold.
#[derive(Error, Debug, PartialEq)]
pub enum AssertionError {
    #[error("ack {index} is not valid json: {reason}")]
    MalformedAck { index: usize, reason: String },

    #[error("ack {index} has both result and error")]
    AckBothFields { index: usize },

    #[error("ack {index} has neither result nor error")]
    AckNoField { index: usize },

    #[error("ack {index} expected success, got error: {error}")]
    UnexpectedError { index: usize, error: String },

    #[error("ack {index} expected error, got success")]
    UnexpectedSuccess { index: usize },

    #[error("expected {expected} {what}, found {actual}")]
    Count {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("{what}: expected {expected}, found {actual}")]
    Mismatch {
        what: String,
        expected: String,
        actual: String,
    },

    #[error("registry of {bridge} changed: before {before}, after {after}")]
    RegistryChanged {
        bridge: String,
        before: String,
        after: String,
    },
}

#[derive(Error, Debug)]
pub enum E2eError {
    #[error(transparent)]
    Std(#[from] StdError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error(transparent)]
    Assertion(#[from] AssertionError),

    #[error("uploading {name}")]
    Upload {
        name: String,
        #[source]
        source: ChainError,
    },

    #[error("instantiating {name}")]
    Instantiate {
        name: String,
        #[source]
        source: ChainError,
    },

    #[error("executing on {contract}")]
    Execute {
        contract: String,
        #[source]
        source: ChainError,
    },

    #[error("querying {contract}")]
    Query {
        contract: String,
        #[source]
        source: ChainError,
    },

    #[error("migrating {contract}")]
    Migrate {
        contract: String,
        #[source]
        source: ChainError,
    },

    #[error("reading artifact {path}")]
    Artifact {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("contract {0} has no ibc port")]
    NoIbcPort(String),

    #[error("unknown contract {0}")]
    UnknownContract(String),

    #[error("unknown channel {0}")]
    UnknownChannel(String),

    #[error("step `{step}` failed")]
    Step {
        step: String,
        #[source]
        source: Box<E2eError>,
    },

    #[error("invalid config {path}: {reason}")]
    Config { path: String, reason: String },
}

impl E2eError {
    /// Innermost error, skipping step and call context.
    pub fn root(&self) -> &E2eError {
        match self {
            E2eError::Step { source, .. } => source.root(),
            other => other,
        }
    }
}
