use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Binary, IbcTimeout};

use crate::{
    error::ValidationError,
    token_types::{ClassId, TokenId},
};

/// Packet payload of an ICS-721 transfer. Field names are camelCase on
/// the wire.
#[cw_serde]
#[serde(rename_all = "camelCase")]
pub struct NonFungibleTokenPacketData {
    pub class_id: ClassId,
    pub class_uri: Option<String>,
    pub class_data: Option<Binary>,
    pub token_ids: Vec<TokenId>,
    /// `token_uris[n]` belongs to `token_ids[n]`.
    pub token_uris: Option<Vec<String>>,
    /// `token_data[n]` belongs to `token_ids[n]`.
    pub token_data: Option<Vec<Binary>>,
    pub sender: String,
    pub receiver: String,
    pub memo: Option<String>,
}

impl NonFungibleTokenPacketData {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.class_id.is_empty() {
            return Err(ValidationError::EmptyClassId {});
        }
        if self.class_uri.as_ref().is_some_and(|uri| uri.is_empty())
            || self.class_data.as_ref().is_some_and(|data| data.is_empty())
        {
            return Err(ValidationError::EmptyOptional {});
        }

        let token_count = self.token_ids.len();
        if token_count == 0 {
            return Err(ValidationError::NoTokens {});
        }
        let uris_mismatch = self
            .token_uris
            .as_ref()
            .is_some_and(|uris| uris.len() != token_count);
        let data_mismatch = self
            .token_data
            .as_ref()
            .is_some_and(|data| data.len() != token_count);
        if uris_mismatch || data_mismatch {
            return Err(ValidationError::TokenInfoLenMismatch {});
        }
        Ok(())
    }
}

/// Payload carried base64 encoded in the `msg` field of a cw721
/// `send_nft` whose target is the bridge.
#[cw_serde]
pub struct IbcOutgoingMsg {
    /// Receiver on the counterparty chain.
    pub receiver: String,
    /// Local channel the transfer leaves on.
    pub channel_id: String,
    pub timeout: IbcTimeout,
    pub memo: Option<String>,
}

/// What an outgoing proxy forwards to the bridge: the original
/// [`IbcOutgoingMsg`] plus the collection, since the proxy and not the
/// collection is the sender.
#[cw_serde]
pub struct IbcOutgoingProxyMsg {
    pub collection: String,
    pub msg: Binary,
}
