use cosmwasm_std::StdError;
use cw_utils::ParseReplyError;
use ics721_types::error::ValidationError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error(transparent)]
    Std(#[from] StdError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    ParseReply(#[from] ParseReplyError),

    #[error("unauthorized")]
    Unauthorized {},

    #[error("NFT not escrowed by ICS721! Owner: {0}")]
    NotEscrowedByIcs721(String),

    #[error("only unordered channels are supported")]
    OrderedChannel {},

    #[error("invalid IBC channel version - got ({actual}), expected ({expected})")]
    InvalidVersion { actual: String, expected: String },

    #[error("ICS 721 channels may not be closed")]
    CantCloseChannel {},

    #[error("unknown channel {0}")]
    UnknownChannel(String),

    #[error("unrecognised reply ID")]
    UnrecognisedReplyId {},

    #[error("transfer mixes redemptions and voucher creations")]
    InvalidTransferBothActions,

    #[error("couldn't find nft contract for class id: {0}")]
    NoNftContractForClassId(String),

    #[error("class id {class_id} maps to {cw721_addr}, not {collection}")]
    NoNftContractMatch {
        collection: String,
        class_id: String,
        cw721_addr: String,
    },

    #[error("{recipient} is not the owner of token {token_id}, {owner} is")]
    NotOwnerOfNft {
        recipient: String,
        token_id: String,
        owner: String,
    },

    #[error("unknown message: {0}")]
    UnknownMsg(String),
}

/// Packet receives never fail; failures are written into the ack.
pub enum Never {}
