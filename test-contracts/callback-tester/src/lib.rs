pub mod contract;
mod error;
pub mod msg;
mod state;

pub use crate::error::ContractError;
