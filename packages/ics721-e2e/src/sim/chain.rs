use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet, VecDeque},
    rc::Rc,
};

use cosmwasm_std::{
    to_json_vec, Addr, Binary, ContractResult, CosmosMsg, Empty, Event, IbcTimeout,
    MemoryStorage, Querier, QueryRequest, SystemResult, WasmMsg, WasmQuery,
};
use cw_multi_test::{
    next_block, App, AppBuilder, AppResponse, BankKeeper, DistributionKeeper, Executor,
    FailingModule, IbcAcceptingModule, Router, StakeKeeper, WasmKeeper,
};
use ics721_types::hooks::{parse_send_packet_event, IbcSudoMsg};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::{
    api::{Bech32Api, WasmdAddresses},
    codes::NativeCodes,
};
use crate::{
    chain::{ChainClient, ExecuteResult, Fee},
    config::ChainConfig,
    error::ChainError,
    relay::{ChannelEnd, PendingPacket},
};

pub(crate) type SimApp = App<
    BankKeeper,
    Bech32Api,
    MemoryStorage,
    FailingModule<Empty, Empty, Empty>,
    WasmKeeper<Empty, Empty>,
    StakeKeeper,
    DistributionKeeper,
    IbcAcceptingModule,
>;

fn no_init(
    _router: &mut Router<
        BankKeeper,
        FailingModule<Empty, Empty, Empty>,
        WasmKeeper<Empty, Empty>,
        StakeKeeper,
        DistributionKeeper,
        IbcAcceptingModule,
        FailingModule<cosmwasm_std::GovMsg, Empty, Empty>,
        cw_multi_test::StargateFailing,
    >,
    _api: &dyn cosmwasm_std::Api,
    _storage: &mut dyn cosmwasm_std::Storage,
) {
}

pub(crate) struct ChainState {
    pub app: SimApp,
    pub config: ChainConfig,
    pub sender: Addr,
    pub relayer: Addr,
    codes: NativeCodes,
    ibc_codes: BTreeSet<u64>,
    /// contract address -> port id
    ports: BTreeMap<String, String>,
    /// (port id, channel id) -> counterparty end
    pub channels: BTreeMap<(String, String), ChannelEnd>,
    /// Packets committed and not relayed, in commit order.
    pub outbox: VecDeque<PendingPacket>,
    next_sequence: BTreeMap<String, u64>,
    next_channel: u64,
    next_connection: u64,
    txs: u64,
}

impl ChainState {
    fn new(config: ChainConfig, codes: NativeCodes) -> Result<Self, ChainError> {
        let api = Bech32Api::new(config.bech32_prefix.clone());
        let sender = api.addr_make(&config.mnemonic)?;
        let relayer = api.addr_make(&format!("{} relayer", config.mnemonic))?;
        let app = AppBuilder::new()
            .with_wasm::<WasmKeeper<Empty, Empty>>(
                WasmKeeper::new().with_address_generator(WasmdAddresses),
            )
            .with_ibc(IbcAcceptingModule::default())
            .with_api(api)
            .build(no_init);
        Ok(Self {
            app,
            config,
            sender,
            relayer,
            codes,
            ibc_codes: BTreeSet::new(),
            ports: BTreeMap::new(),
            channels: BTreeMap::new(),
            outbox: VecDeque::new(),
            next_sequence: BTreeMap::new(),
            next_channel: 0,
            next_connection: 0,
            txs: 0,
        })
    }

    fn tx_failed(&self, err: anyhow::Error) -> ChainError {
        ChainError::TxFailed {
            chain_id: self.config.chain_id.clone(),
            reason: format!("{err:#}"),
        }
    }

    /// Runs one transaction in its own block.
    fn submit(&mut self, msg: CosmosMsg) -> Result<ExecuteResult, ChainError> {
        let height = self.app.block_info().height;
        let res = self.app.execute(self.sender.clone(), msg);
        self.app.update_block(next_block);
        let res = res.map_err(|err| self.tx_failed(err))?;
        self.bind_ports(&res.events);
        self.commit_packets(&res.events);

        self.txs += 1;
        let hash = Sha256::new()
            .chain_update(self.config.chain_id.as_bytes())
            .chain_update(height.to_be_bytes())
            .chain_update(self.txs.to_be_bytes())
            .finalize();
        Ok(ExecuteResult {
            transaction_hash: hash.iter().map(|b| format!("{b:02X}")).collect(),
            height,
            events: res.events,
            data: res.data,
        })
    }

    /// Ibc capable contracts get a `wasm.<address>` port, including those
    /// instantiated by other contracts.
    fn bind_ports(&mut self, events: &[Event]) {
        for event in events.iter().filter(|e| e.ty == "instantiate") {
            let attr = |key: &str| {
                event
                    .attributes
                    .iter()
                    .find(|a| a.key == key)
                    .map(|a| a.value.clone())
            };
            let (Some(address), Some(code_id)) = (attr("_contract_address"), attr("code_id"))
            else {
                continue;
            };
            if code_id
                .parse::<u64>()
                .is_ok_and(|id| self.ibc_codes.contains(&id))
            {
                self.ports.insert(address.clone(), format!("wasm.{address}"));
            }
        }
    }

    /// Picks up packets announced through `send_packet` events.
    pub(crate) fn commit_packets(&mut self, events: &[Event]) {
        for event in events {
            let sent = match parse_send_packet_event(event) {
                Ok(Some(sent)) => sent,
                Ok(None) => continue,
                Err(err) => {
                    warn!(chain_id = %self.config.chain_id, %err, "malformed send_packet event");
                    continue;
                }
            };
            let key = (sent.src_port.clone(), sent.src_channel.clone());
            let Some(counterparty) = self.channels.get(&key).cloned() else {
                warn!(
                    chain_id = %self.config.chain_id,
                    channel = %sent.src_channel,
                    "packet on unknown channel dropped"
                );
                continue;
            };
            let sequence = self.next_sequence.entry(sent.src_channel.clone()).or_insert(1);
            let packet = PendingPacket {
                sequence: *sequence,
                src: ChannelEnd {
                    port_id: sent.src_port,
                    channel_id: sent.src_channel,
                },
                dest: counterparty,
                data: sent.data,
                timeout: sent.timeout,
            };
            *sequence += 1;
            debug!(
                chain_id = %self.config.chain_id,
                channel = %packet.src.channel_id,
                sequence = packet.sequence,
                "packet committed"
            );
            self.outbox.push_back(packet);
        }
    }

    pub(crate) fn allocate_connection(&mut self) -> String {
        let id = format!("connection-{}", self.next_connection);
        self.next_connection += 1;
        id
    }

    pub(crate) fn allocate_channel(&mut self) -> String {
        let id = format!("channel-{}", self.next_channel);
        self.next_channel += 1;
        id
    }

    pub(crate) fn contract_for_port<'a>(&self, port: &'a str) -> Option<&'a str> {
        port.strip_prefix("wasm.")
            .filter(|addr| self.ports.contains_key(*addr))
    }

    /// Delivers a relayer message to a contract's IBC handlers.
    pub(crate) fn sudo(&mut self, contract: &str, msg: &IbcSudoMsg) -> anyhow::Result<AppResponse> {
        let res = self.app.wasm_sudo(Addr::unchecked(contract), msg)?;
        self.commit_packets(&res.events);
        Ok(res)
    }

    /// Whether a packet with `timeout` can no longer be received here.
    pub(crate) fn is_timed_out(&self, timeout: &IbcTimeout) -> bool {
        let block = self.app.block_info();
        let height_reached = timeout
            .block()
            .is_some_and(|b| (self.config.revision, block.height) >= (b.revision, b.height));
        let time_reached = timeout.timestamp().is_some_and(|t| block.time >= t);
        height_reached || time_reached
    }

    pub(crate) fn end_block(&mut self) {
        self.app.update_block(next_block);
    }
}

/// Handle on one simulated chain. Clones share the chain.
#[derive(Clone)]
pub struct SimChain {
    pub(crate) state: Rc<RefCell<ChainState>>,
}

impl SimChain {
    pub(crate) fn new(config: ChainConfig, codes: NativeCodes) -> Result<Self, ChainError> {
        Ok(Self {
            state: Rc::new(RefCell::new(ChainState::new(config, codes)?)),
        })
    }

    /// Address derived from `seed` on this chain, for extra accounts.
    pub fn addr_make(&self, seed: &str) -> Result<String, ChainError> {
        Ok(self.state.borrow().app.api().addr_make(seed)?.into_string())
    }
}

impl ChainClient for SimChain {
    fn chain_id(&self) -> String {
        self.state.borrow().config.chain_id.clone()
    }

    fn sender(&self) -> String {
        self.state.borrow().sender.to_string()
    }

    fn upload(&self, wasm: &[u8], memo: &str) -> Result<u64, ChainError> {
        let mut state = self.state.borrow_mut();
        let (contract, ibc) = state
            .codes
            .resolve(wasm)
            .ok_or_else(|| ChainError::UnknownCode(String::from_utf8_lossy(wasm).into_owned()))?;
        let code_id = state.app.store_code(contract);
        if ibc {
            state.ibc_codes.insert(code_id);
        }
        debug!(chain_id = %state.config.chain_id, code_id, memo, "code stored");
        Ok(code_id)
    }

    fn instantiate(
        &self,
        code_id: u64,
        msg: &Binary,
        label: &str,
        admin: Option<&str>,
    ) -> Result<String, ChainError> {
        let res = self.state.borrow_mut().submit(
            WasmMsg::Instantiate {
                admin: admin.map(str::to_string),
                code_id,
                msg: msg.clone(),
                funds: vec![],
                label: label.to_string(),
            }
            .into(),
        )?;
        res.attribute("instantiate", "_contract_address")
            .map(str::to_string)
            .ok_or_else(|| ChainError::TxFailed {
                chain_id: self.chain_id(),
                reason: "instantiate emitted no contract address".to_string(),
            })
    }

    fn execute(
        &self,
        contract: &str,
        msg: &Binary,
        fee: &Fee,
    ) -> Result<ExecuteResult, ChainError> {
        debug!(chain_id = %self.chain_id(), contract, ?fee, "execute");
        self.state.borrow_mut().submit(
            WasmMsg::Execute {
                contract_addr: contract.to_string(),
                msg: msg.clone(),
                funds: vec![],
            }
            .into(),
        )
    }

    fn query_smart(&self, contract: &str, msg: &Binary) -> Result<Binary, ChainError> {
        let request: QueryRequest<Empty> = QueryRequest::Wasm(WasmQuery::Smart {
            contract_addr: contract.to_string(),
            msg: msg.clone(),
        });
        let state = self.state.borrow();
        let query_failed = |reason: String| ChainError::QueryFailed {
            chain_id: state.config.chain_id.clone(),
            reason,
        };
        match state.app.raw_query(&to_json_vec(&request)?) {
            SystemResult::Ok(ContractResult::Ok(res)) => Ok(res),
            SystemResult::Ok(ContractResult::Err(err)) => Err(query_failed(err)),
            SystemResult::Err(err) => Err(query_failed(err.to_string())),
        }
    }

    fn migrate(
        &self,
        contract: &str,
        code_id: u64,
        msg: &Binary,
        fee: &Fee,
    ) -> Result<ExecuteResult, ChainError> {
        debug!(chain_id = %self.chain_id(), contract, code_id, ?fee, "migrate");
        self.state.borrow_mut().submit(
            WasmMsg::Migrate {
                contract_addr: contract.to_string(),
                new_code_id: code_id,
                msg: msg.clone(),
            }
            .into(),
        )
    }

    fn ibc_port(&self, contract: &str) -> Result<Option<String>, ChainError> {
        Ok(self.state.borrow().ports.get(contract).cloned())
    }

    fn height(&self) -> Result<u64, ChainError> {
        Ok(self.state.borrow().app.block_info().height)
    }
}
