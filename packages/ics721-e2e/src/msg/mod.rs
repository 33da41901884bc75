//! Payload builders for the contracts a run talks to. Each intent is a
//! tagged variant; optional fields are left out of the json when absent
//! rather than sent as `null`.

pub mod callback;
pub mod cw721;
pub mod ics721;
pub mod proxy;
