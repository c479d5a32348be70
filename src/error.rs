use crate::trade::TradeState;
use crate::types::{ClassId, InstanceId, ItemKey};
use std::fmt;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The response body did not have the expected shape.
    #[error("Unexpected response: {}", .0)]
    Response(String),
    /// The platform flagged the request as unsuccessful.
    #[error("Server rejected request: {}", .0)]
    ServerRejected(String),
    #[error("Request error: {}", .0)]
    Reqwest(#[from] reqwest::Error),
    #[error("Request middleware error: {}", .0)]
    ReqwestMiddleware(anyhow::Error),
    #[error("Error parsing URL: {}", .0)]
    UrlParse(#[from] url::ParseError),
    #[error("Error parsing response: {}", .0)]
    Parse(#[from] serde_json::Error),
    #[error("{}", .0)]
    MissingDescription(#[from] MissingDescriptionError),
    /// One or more inventory types failed to load while others succeeded.
    #[error("Partial inventory load: {}", .0.join("; "))]
    PartialLoad(Vec<String>),
    /// The offer does not meet the trade rules. Recoverable; never closes the session.
    #[error("Offer validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    /// The counterparty went too long without acting.
    #[error("No action from the counterparty within the allowed gap")]
    ActionTimeout,
    /// The trade as a whole ran too long.
    #[error("Trade exceeded the maximum duration")]
    TotalTimeout,
    /// The accept commit reported neither clear success nor clear failure. The session
    /// still closes but is flagged for manual reconciliation.
    #[error("Accept outcome could not be confirmed")]
    UncertainOutcome,
    /// The requested operation is not valid in the session's current state.
    #[error("Invalid operation in state {}", .0)]
    InvalidState(TradeState),
    #[error("Item {} is not in the offer", .0)]
    ItemNotFound(ItemKey),
}

impl From<reqwest_middleware::Error> for Error {
    fn from(error: reqwest_middleware::Error) -> Error {
        match error {
            reqwest_middleware::Error::Reqwest(e) => Error::Reqwest(e),
            reqwest_middleware::Error::Middleware(e) => Error::ReqwestMiddleware(e),
        }
    }
}

/// An inventory entry whose description record is absent from the page. Fatal for
/// the page it appeared on.
#[derive(thiserror::Error, Debug)]
pub struct MissingDescriptionError {
    pub classid: ClassId,
    pub instanceid: InstanceId,
}

impl fmt::Display for MissingDescriptionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Missing description for {}:{}",
            self.classid,
            self.instanceid.unwrap_or(0),
        )
    }
}
