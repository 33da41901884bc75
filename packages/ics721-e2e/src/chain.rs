use cosmwasm_std::{from_json, to_json_binary, Binary, Coin, Event};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::ChainError;

#[derive(Clone, Debug, PartialEq)]
pub enum Fee {
    /// Let the client simulate and pick gas.
    Auto,
    Fixed { gas: u64, amount: Vec<Coin> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExecuteResult {
    pub transaction_hash: String,
    pub height: u64,
    pub events: Vec<Event>,
    pub data: Option<Binary>,
}

impl ExecuteResult {
    /// Whether the chain accepted the transaction. Says nothing about
    /// what happens to the packets it committed.
    pub fn is_committed(&self) -> bool {
        !self.transaction_hash.is_empty()
    }

    pub fn attribute(&self, event_type: &str, key: &str) -> Option<&str> {
        self.events
            .iter()
            .filter(|e| e.ty == event_type)
            .flat_map(|e| e.attributes.iter())
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

/// A signing connection to one chain. Every call is one blocking round
/// trip; messages travel as raw json.
pub trait ChainClient {
    fn chain_id(&self) -> String;

    /// Address of the signing identity.
    fn sender(&self) -> String;

    fn upload(&self, wasm: &[u8], memo: &str) -> Result<u64, ChainError>;

    fn instantiate(
        &self,
        code_id: u64,
        msg: &Binary,
        label: &str,
        admin: Option<&str>,
    ) -> Result<String, ChainError>;

    fn execute(&self, contract: &str, msg: &Binary, fee: &Fee)
        -> Result<ExecuteResult, ChainError>;

    fn query_smart(&self, contract: &str, msg: &Binary) -> Result<Binary, ChainError>;

    fn migrate(
        &self,
        contract: &str,
        code_id: u64,
        msg: &Binary,
        fee: &Fee,
    ) -> Result<ExecuteResult, ChainError>;

    /// Port bound by `contract`, if it speaks IBC.
    fn ibc_port(&self, contract: &str) -> Result<Option<String>, ChainError>;

    fn height(&self) -> Result<u64, ChainError>;
}

/// Typed helpers over [`ChainClient`].
pub trait ChainClientExt: ChainClient {
    fn instantiate_json<M: Serialize + ?Sized>(
        &self,
        code_id: u64,
        msg: &M,
        label: &str,
        admin: Option<&str>,
    ) -> Result<String, ChainError> {
        self.instantiate(code_id, &to_json_binary(msg)?, label, admin)
    }

    fn execute_json<M: Serialize + ?Sized>(
        &self,
        contract: &str,
        msg: &M,
    ) -> Result<ExecuteResult, ChainError> {
        self.execute(contract, &to_json_binary(msg)?, &Fee::Auto)
    }

    fn query_json<M: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        contract: &str,
        msg: &M,
    ) -> Result<R, ChainError> {
        let res = self.query_smart(contract, &to_json_binary(msg)?)?;
        Ok(from_json(res.as_slice())?)
    }

    fn migrate_json<M: Serialize + ?Sized>(
        &self,
        contract: &str,
        code_id: u64,
        msg: &M,
    ) -> Result<ExecuteResult, ChainError> {
        self.migrate(contract, code_id, &to_json_binary(msg)?, &Fee::Auto)
    }
}

impl<T: ChainClient + ?Sized> ChainClientExt for T {}
