pub mod contract;
pub mod error;
pub mod execute;
mod helpers;
pub mod ibc;
pub mod msg;
pub mod query;
pub mod state;

pub use crate::error::ContractError;
