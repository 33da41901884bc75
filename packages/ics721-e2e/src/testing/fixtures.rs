use cosmwasm_std::Empty;
use cw_multi_test::{Contract, ContractWrapper};

use crate::{
    config::E2eConfig,
    relay::Side,
    scenario::{
        steps::{
            CALLBACK_TESTER_WASM, CW721_TESTER_WASM, CW721_WASM, ICS721_WASM, INCOMING_PROXY_WASM,
            OUTGOING_PROXY_WASM,
        },
        Scenario, ScenarioContext,
    },
    sim::{NativeCodes, SimNetwork},
    E2eError,
};

fn cw721_base_contract() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        cw721_base::entry::execute,
        cw721_base::entry::instantiate,
        cw721_base::entry::query,
    );
    Box::new(contract)
}

fn bridge_contract() -> Box<dyn Contract<Empty>> {
    use ics721_sim_bridge::contract::{execute, instantiate, migrate, query, reply, sudo};
    let contract = ContractWrapper::new(execute, instantiate, query)
        .with_reply(reply)
        .with_migrate(migrate)
        .with_sudo(sudo);
    Box::new(contract)
}

fn cw721_tester_contract() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        cw721_tester::execute,
        cw721_tester::instantiate,
        cw721_tester::query,
    );
    Box::new(contract)
}

fn incoming_proxy_contract() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        incoming_proxy_tester::execute,
        incoming_proxy_tester::instantiate,
        incoming_proxy_tester::query,
    );
    Box::new(contract)
}

fn outgoing_proxy_contract() -> Box<dyn Contract<Empty>> {
    let contract = ContractWrapper::new(
        outgoing_proxy_tester::execute,
        outgoing_proxy_tester::instantiate,
        outgoing_proxy_tester::query,
    );
    Box::new(contract)
}

fn callback_tester_contract() -> Box<dyn Contract<Empty>> {
    use callback_tester::contract::{execute, instantiate, query};
    Box::new(ContractWrapper::new(execute, instantiate, query))
}

pub fn native_codes() -> NativeCodes {
    NativeCodes::default()
        .register(CW721_WASM, cw721_base_contract)
        .register_ibc(ICS721_WASM, bridge_contract)
        .register(CW721_TESTER_WASM, cw721_tester_contract)
        .register(INCOMING_PROXY_WASM, incoming_proxy_contract)
        .register(OUTGOING_PROXY_WASM, outgoing_proxy_contract)
        .register(CALLBACK_TESTER_WASM, callback_tester_contract)
}

/// Fresh chains plus a context wired to them. The network handle is
/// returned for checks the chain client trait does not cover.
pub fn context_with(config: E2eConfig) -> (ScenarioContext, SimNetwork) {
    let network = SimNetwork::new(&config, native_codes()).unwrap();
    let ctx = ScenarioContext::new(
        Box::new(network.chain(Side::A)),
        Box::new(network.chain(Side::B)),
        Box::new(network.clone()),
        Box::new(native_codes()),
        config,
    );
    (ctx, network)
}

pub fn context() -> (ScenarioContext, SimNetwork) {
    context_with(E2eConfig::default())
}

/// Runs `scenario` on fresh chains and hands back the context for further
/// checks.
pub fn run(mut scenario: Scenario) -> Result<(ScenarioContext, SimNetwork), E2eError> {
    let (mut ctx, network) = context();
    scenario.run(&mut ctx)?;
    Ok((ctx, network))
}
