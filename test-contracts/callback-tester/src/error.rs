use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error(transparent)]
    Std(#[from] StdError),

    #[error("callback sender is not the ics721 bridge")]
    SenderIsNotIcs721,

    #[error("callback data is not meant for this callback")]
    InvalidCallback {},

    #[error("callback failed on request")]
    RequestedFailure {},
}
