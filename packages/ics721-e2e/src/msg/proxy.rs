use cosmwasm_schema::cw_serde;
use cosmwasm_std::{to_json_binary, StdResult};
use ics721_types::instantiate::{Admin, ContractInstantiateInfo};
use serde::Serialize;

/// Incoming proxy letting packets in over the listed channels only.
#[cw_serde]
pub struct IncomingProxyInstantiateMsg {
    /// Defaults to the instantiator, usually the bridge itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub channels: Vec<String>,
}

#[cw_serde]
pub enum RateLimit {
    PerBlock(u64),
    Blocks(u64),
}

/// Outgoing proxy that rate limits transfers before they reach the bridge.
#[cw_serde]
pub struct OutgoingProxyInstantiateMsg {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub rate_limit: RateLimit,
}

/// Lets the bridge instantiate a proxy itself, with the bridge as admin.
pub fn proxy_instantiate_info<M: Serialize>(
    code_id: u64,
    msg: &M,
    label: &str,
) -> StdResult<ContractInstantiateInfo> {
    Ok(ContractInstantiateInfo {
        code_id,
        msg: to_json_binary(msg)?,
        admin: Some(Admin::Instantiator {}),
        label: label.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_shapes() {
        let msg = OutgoingProxyInstantiateMsg {
            origin: None,
            rate_limit: RateLimit::Blocks(10),
        };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"rate_limit":{"blocks":10}}"#
        );
        assert_eq!(
            serde_json::to_string(&RateLimit::PerBlock(1)).unwrap(),
            r#"{"per_block":1}"#
        );
    }

    #[test]
    fn allow_list_keeps_explicit_origin() {
        let msg = IncomingProxyInstantiateMsg {
            origin: Some("osmo1bridge".to_string()),
            channels: vec!["channel-0".to_string()],
        };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"origin":"osmo1bridge","channels":["channel-0"]}"#
        );
    }
}
