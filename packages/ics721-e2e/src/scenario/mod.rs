//! Scenarios: ordered steps over an explicit [`ScenarioContext`].
//!
//! A step is a named function over the context. A scenario runs its steps
//! front to back and stops at the first failure, which is reported
//! wrapped in [`E2eError::Step`] with the step's name.

pub mod steps;
pub mod suites;

use std::collections::BTreeMap;

use tracing::{info, info_span};

use crate::{
    chain::ChainClient,
    channel::ChannelHandle,
    config::E2eConfig,
    error::{AssertionError, E2eError},
    msg::{
        callback::{CallbackMemo, TesterCallback},
        ics721::{self, TimeoutSpec},
    },
    provision::{ArtifactStore, FsArtifacts, ProvisionedContracts},
    relay::{RelayResult, Relayer, Side},
};

/// Logical contract name of the bridge on either chain.
pub const BRIDGE: &str = "ics721";
/// Logical contract name of the collection uploaded with the bridge.
pub const CW721: &str = "cw721";
pub const CW721_TESTER: &str = "cw721_tester";
/// Code of the callback tester; instances are recorded under their own
/// names.
pub const CALLBACK_TESTER: &str = "callback_tester";
pub const INCOMING_PROXY: &str = "incoming_proxy";
pub const OUTGOING_PROXY: &str = "outgoing_proxy";

/// Registry tables of one bridge, compared across a failed transfer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegistrySnapshot {
    pub nft_contracts: Vec<(String, String)>,
    pub outgoing_channels: Vec<((String, String), String)>,
    pub incoming_channels: Vec<((String, String), String)>,
}

impl RegistrySnapshot {
    pub fn take(client: &dyn ChainClient, bridge: &str) -> Result<Self, E2eError> {
        Ok(Self {
            nft_contracts: ics721::nft_contracts(client, bridge)?
                .into_iter()
                .map(|(class_id, addr)| (class_id, addr.into_string()))
                .collect(),
            outgoing_channels: ics721::outgoing_channels(client, bridge)?,
            incoming_channels: ics721::incoming_channels(client, bridge)?,
        })
    }
}

/// Everything a scenario accumulates while it runs. Steps only ever reach
/// chains and channels through it.
pub struct ScenarioContext {
    chain_a: Box<dyn ChainClient>,
    chain_b: Box<dyn ChainClient>,
    pub relayer: Box<dyn Relayer>,
    pub artifacts: Box<dyn ArtifactStore>,
    pub config: E2eConfig,
    pub contracts: ProvisionedContracts,
    pub channels: BTreeMap<String, ChannelHandle>,
    /// Addresses created during the run, e.g. voucher collections.
    pub addresses: BTreeMap<(Side, String), String>,
    /// Transfers committed per (channel, side) since that channel's last
    /// relay pass.
    pub dispatches: BTreeMap<(String, Side), usize>,
    pub last_relay: Option<RelayResult>,
    pub snapshots: BTreeMap<Side, RegistrySnapshot>,
}

impl ScenarioContext {
    pub fn new(
        chain_a: Box<dyn ChainClient>,
        chain_b: Box<dyn ChainClient>,
        relayer: Box<dyn Relayer>,
        artifacts: Box<dyn ArtifactStore>,
        config: E2eConfig,
    ) -> Self {
        Self {
            chain_a,
            chain_b,
            relayer,
            artifacts,
            config,
            contracts: ProvisionedContracts::default(),
            channels: BTreeMap::new(),
            addresses: BTreeMap::new(),
            dispatches: BTreeMap::new(),
            last_relay: None,
            snapshots: BTreeMap::new(),
        }
    }

    /// Binaries come from the configured artifact root.
    pub fn from_config(
        chain_a: Box<dyn ChainClient>,
        chain_b: Box<dyn ChainClient>,
        relayer: Box<dyn Relayer>,
        config: E2eConfig,
    ) -> Self {
        let artifacts = Box::new(FsArtifacts::from(&config));
        Self::new(chain_a, chain_b, relayer, artifacts, config)
    }

    pub fn chain(&self, side: Side) -> &dyn ChainClient {
        match side {
            Side::A => self.chain_a.as_ref(),
            Side::B => self.chain_b.as_ref(),
        }
    }

    /// Address of a contract by logical name: one recorded during the run
    /// first, then a provisioned one.
    pub fn contract(&self, side: Side, name: &str) -> Result<String, E2eError> {
        match self.addresses.get(&(side, name.to_string())) {
            Some(address) => Ok(address.clone()),
            None => Ok(self.contracts.address(side, name)?.to_string()),
        }
    }

    pub fn bridge(&self, side: Side) -> Result<String, E2eError> {
        self.contract(side, BRIDGE)
    }

    pub fn account(&self, account: &Account) -> Result<String, E2eError> {
        match account {
            Account::Sender(side) => Ok(self.chain(*side).sender()),
            Account::Contract(side, name) => self.contract(*side, name),
            Account::Address(address) => Ok(address.clone()),
        }
    }

    pub fn channel(&self, name: &str) -> Result<&ChannelHandle, E2eError> {
        self.channels
            .get(name)
            .ok_or_else(|| E2eError::UnknownChannel(name.to_string()))
    }

    pub fn channel_mut(&mut self, name: &str) -> Result<&mut ChannelHandle, E2eError> {
        self.channels
            .get_mut(name)
            .ok_or_else(|| E2eError::UnknownChannel(name.to_string()))
    }

    pub fn dispatched(&self, channel: &str, side: Side) -> usize {
        self.dispatches
            .get(&(channel.to_string(), side))
            .copied()
            .unwrap_or_default()
    }

    pub fn last_relay(&self) -> Result<&RelayResult, E2eError> {
        self.last_relay.as_ref().ok_or_else(|| {
            AssertionError::Mismatch {
                what: "relay result".to_string(),
                expected: "a relay pass".to_string(),
                actual: "none".to_string(),
            }
            .into()
        })
    }
}

/// An address a step refers to before it is known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Account {
    /// The signing identity of a chain.
    Sender(Side),
    /// A contract by logical name.
    Contract(Side, String),
    Address(String),
}

impl Account {
    pub fn contract(side: Side, name: impl Into<String>) -> Self {
        Account::Contract(side, name.into())
    }
}

/// Which contract the NFT is sent to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Via {
    Bridge,
    /// The bridge's outgoing proxy, looked up from the bridge.
    OutgoingProxy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferTimeout {
    /// `transfer_timeout_height` from the config.
    Default,
    /// The destination's current height, so the packet can only time out.
    Expired,
    Custom(TimeoutSpec),
}

/// Callbacks a transfer asks for. Addresses resolve at dispatch; without
/// one the bridge calls the packet's sender (ack) or receiver (receive).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallbackRequest {
    pub ack: Option<(TesterCallback, Option<Account>)>,
    pub receive: Option<(TesterCallback, Option<Account>)>,
}

impl CallbackRequest {
    pub fn ack(mut self, callback: TesterCallback) -> Self {
        self.ack = Some((callback, None));
        self
    }

    pub fn ack_to(mut self, callback: TesterCallback, addr: Account) -> Self {
        self.ack = Some((callback, Some(addr)));
        self
    }

    pub fn receive(mut self, callback: TesterCallback) -> Self {
        self.receive = Some((callback, None));
        self
    }

    pub fn receive_to(mut self, callback: TesterCallback, addr: Account) -> Self {
        self.receive = Some((callback, Some(addr)));
        self
    }

    pub(crate) fn resolve(&self, ctx: &ScenarioContext) -> Result<CallbackMemo, E2eError> {
        let resolve = |request: &Option<(TesterCallback, Option<Account>)>| {
            request
                .as_ref()
                .map(|(callback, addr)| {
                    let addr = addr.as_ref().map(|a| ctx.account(a)).transpose()?;
                    Ok::<_, E2eError>((*callback, addr))
                })
                .transpose()
        };
        Ok(CallbackMemo {
            ack: resolve(&self.ack)?,
            receive: resolve(&self.receive)?,
        })
    }
}

/// A transfer intent: which token leaves which side over which channel.
#[derive(Clone, Debug, PartialEq)]
pub struct Transfer {
    pub from: Side,
    pub collection: String,
    pub token_id: String,
    pub channel: String,
    pub receiver: Account,
    pub via: Via,
    pub timeout: TransferTimeout,
    pub memo: Option<String>,
    /// Replaces `memo` with a callback memo when set.
    pub callbacks: Option<CallbackRequest>,
    /// Callback tester on `from` that owns the token and sends it.
    pub tester: Option<String>,
}

impl Transfer {
    /// Sent through the bridge to the other side's sender.
    pub fn new(
        from: Side,
        collection: impl Into<String>,
        token_id: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            from,
            collection: collection.into(),
            token_id: token_id.into(),
            channel: channel.into(),
            receiver: Account::Sender(from.other()),
            via: Via::Bridge,
            timeout: TransferTimeout::Default,
            memo: None,
            callbacks: None,
            tester: None,
        }
    }

    pub fn receiver(mut self, receiver: Account) -> Self {
        self.receiver = receiver;
        self
    }

    pub fn via(mut self, via: Via) -> Self {
        self.via = via;
        self
    }

    pub fn timeout(mut self, timeout: TransferTimeout) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    pub fn callbacks(mut self, callbacks: CallbackRequest) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    pub fn sent_by_tester(mut self, tester: impl Into<String>) -> Self {
        self.tester = Some(tester.into());
        self
    }

    pub(crate) fn memo_for(&self, ctx: &ScenarioContext) -> Result<Option<String>, E2eError> {
        match &self.callbacks {
            Some(callbacks) => Ok(Some(callbacks.resolve(ctx)?.to_memo()?)),
            None => Ok(self.memo.clone()),
        }
    }

    pub(crate) fn timeout_spec(&self, ctx: &ScenarioContext) -> Result<TimeoutSpec, E2eError> {
        let dest = self.from.other();
        let revision = ctx.config.chain(dest).revision;
        Ok(match self.timeout {
            TransferTimeout::Default => TimeoutSpec::Block {
                revision,
                height: ctx.config.transfer_timeout_height,
            },
            TransferTimeout::Expired => {
                let height = ctx.chain(dest).height().map_err(|source| E2eError::Query {
                    contract: ctx.chain(dest).chain_id(),
                    source,
                })?;
                TimeoutSpec::Block { revision, height }
            }
            TransferTimeout::Custom(spec) => spec,
        })
    }
}

type StepFn = Box<dyn FnMut(&mut ScenarioContext) -> Result<(), E2eError>>;

pub struct Step {
    name: String,
    run: StepFn,
}

impl Step {
    pub fn new(
        name: impl Into<String>,
        run: impl FnMut(&mut ScenarioContext) -> Result<(), E2eError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&mut self, ctx: &mut ScenarioContext) -> Result<(), E2eError> {
        (self.run)(ctx)
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step").field("name", &self.name).finish()
    }
}

#[derive(Debug)]
pub struct Scenario {
    name: String,
    steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: vec![],
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(Step::name).collect()
    }

    pub fn run(&mut self, ctx: &mut ScenarioContext) -> Result<(), E2eError> {
        info!(scenario = %self.name, steps = self.steps.len(), "running scenario");
        for step in &mut self.steps {
            let span = info_span!("step", scenario = %self.name, step = %step.name);
            let _enter = span.enter();
            step.run(ctx).map_err(|source| E2eError::Step {
                step: step.name.clone(),
                source: Box::new(source),
            })?;
        }
        info!(scenario = %self.name, "scenario passed");
        Ok(())
    }
}
