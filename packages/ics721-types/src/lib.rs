pub mod ack;
pub mod error;
pub mod hooks;
pub mod instantiate;
pub mod memo;
pub mod packet;
pub mod proxy;
pub mod token_types;
