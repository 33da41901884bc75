use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, WasmMsg};

#[cw_serde]
pub enum Admin {
    Address { addr: String },
    Instantiator {},
}

/// Instructions for a contract to instantiate a companion contract, e.g. a
/// bridge instantiating its proxies.
#[cw_serde]
pub struct ContractInstantiateInfo {
    pub code_id: u64,
    pub msg: Binary,
    pub admin: Option<Admin>,
    pub label: String,
}

impl ContractInstantiateInfo {
    pub fn into_wasm_msg(self, instantiator: Addr) -> WasmMsg {
        WasmMsg::Instantiate {
            admin: self.admin.map(|admin| match admin {
                Admin::Address { addr } => addr,
                Admin::Instantiator {} => instantiator.into_string(),
            }),
            code_id: self.code_id,
            msg: self.msg,
            label: self.label,
            funds: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use cosmwasm_std::to_json_binary;

    use super::*;

    #[test]
    fn instantiator_admin_resolves_to_caller() {
        let info = ContractInstantiateInfo {
            code_id: 7,
            msg: to_json_binary("proxy").unwrap(),
            admin: Some(Admin::Instantiator {}),
            label: "incoming proxy".to_string(),
        };
        assert_eq!(
            info.into_wasm_msg(Addr::unchecked("bridge")),
            WasmMsg::Instantiate {
                admin: Some("bridge".to_string()),
                code_id: 7,
                msg: to_json_binary("proxy").unwrap(),
                funds: vec![],
                label: "incoming proxy".to_string(),
            }
        );
    }
}
