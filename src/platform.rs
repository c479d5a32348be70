use crate::error::Error;
use crate::types::ItemKey;
use std::future::Future;
use std::sync::Arc;

/// An observable action the counterparty performed, pulled from a trade status poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterpartyAction {
    /// The counterparty placed an item into their side of the offer.
    ItemAdded { key: ItemKey },
    /// The counterparty withdrew an item from their side of the offer.
    ItemRemoved { key: ItemKey },
    /// The counterparty toggled their ready flag.
    ReadyChanged { ready: bool },
    /// The counterparty sent a message in the trade window.
    Message(String),
    /// The counterparty accepted the trade.
    Accepted,
    /// The counterparty disconnected or cancelled.
    Disconnected,
}

/// The result of committing an accepted trade on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The platform confirmed the trade went through.
    Confirmed,
    /// The platform reported neither clear success nor clear failure. Commits on
    /// trades with many items are known to do this.
    Uncertain,
}

/// The opaque protocol layer the session and supervisor drive but do not implement.
pub trait PlatformClient: Send + Sync {
    /// Sends a regular chat message to the counterparty.
    fn send_chat_message(&self, message: &str) -> impl Future<Output = Result<(), Error>> + Send;

    /// Sends a message within the trade window.
    fn send_trade_message(&self, message: &str) -> impl Future<Output = Result<(), Error>> + Send;

    /// Commits the trade on the platform.
    fn commit_trade(&self) -> impl Future<Output = Result<CommitOutcome, Error>> + Send;

    /// Cancels the trade on the platform.
    fn cancel_trade(&self) -> impl Future<Output = Result<(), Error>> + Send;

    /// Polls the platform for actions the counterparty performed since the last poll.
    fn poll_trade(&self) -> impl Future<Output = Result<Vec<CounterpartyAction>, Error>> + Send;
}

impl<P: PlatformClient> PlatformClient for Arc<P> {
    async fn send_chat_message(&self, message: &str) -> Result<(), Error> {
        (**self).send_chat_message(message).await
    }

    async fn send_trade_message(&self, message: &str) -> Result<(), Error> {
        (**self).send_trade_message(message).await
    }

    async fn commit_trade(&self) -> Result<CommitOutcome, Error> {
        (**self).commit_trade().await
    }

    async fn cancel_trade(&self) -> Result<(), Error> {
        (**self).cancel_trade().await
    }

    async fn poll_trade(&self) -> Result<Vec<CounterpartyAction>, Error> {
        (**self).poll_trade().await
    }
}
