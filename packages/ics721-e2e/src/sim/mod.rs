//! Two chains and a relayer running in process on `cw-multi-test`.
//!
//! Each chain is its own `App` with its own bech32 prefix. IBC entry
//! points are reached through `sudo` (see [`ics721_types::hooks`]), and
//! packets are picked up from the `send_packet` events contracts emit.

mod api;
mod chain;
mod codes;
mod link;

pub use api::{Bech32Api, WasmdAddresses};
pub use chain::SimChain;
pub use codes::NativeCodes;
pub use link::SimLink;

use crate::{
    config::{ChainConfig, E2eConfig},
    error::{ChainError, RelayError},
    relay::{Link, Relayer, Side},
};

/// Chain A, chain B and the relayer between them, plus any chains added
/// for multi hop runs. Clones share the chains known at clone time.
#[derive(Clone)]
pub struct SimNetwork {
    a: SimChain,
    b: SimChain,
    extra: Vec<SimChain>,
}

impl SimNetwork {
    pub fn new(config: &E2eConfig, codes: NativeCodes) -> Result<Self, ChainError> {
        Ok(Self {
            a: SimChain::new(config.chain_a.clone(), codes.clone())?,
            b: SimChain::new(config.chain_b.clone(), codes)?,
            extra: vec![],
        })
    }

    /// A further chain the relayer can connect to by its chain id.
    pub fn add_chain(
        &mut self,
        config: ChainConfig,
        codes: NativeCodes,
    ) -> Result<SimChain, ChainError> {
        let chain = SimChain::new(config, codes)?;
        self.extra.push(chain.clone());
        Ok(chain)
    }

    pub fn chain(&self, side: Side) -> SimChain {
        match side {
            Side::A => self.a.clone(),
            Side::B => self.b.clone(),
        }
    }

    fn by_id(&self, chain_id: &str) -> Result<SimChain, RelayError> {
        [&self.a, &self.b]
            .into_iter()
            .chain(&self.extra)
            .find(|c| c.state.borrow().config.chain_id == chain_id)
            .cloned()
            .ok_or_else(|| RelayError::UnknownChain(chain_id.to_string()))
    }
}

impl Relayer for SimNetwork {
    fn connect(&self, chain_a: &str, chain_b: &str) -> Result<Box<dyn Link>, RelayError> {
        Ok(Box::new(SimLink::new(
            self.by_id(chain_a)?,
            self.by_id(chain_b)?,
        )))
    }
}
