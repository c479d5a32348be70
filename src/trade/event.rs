use crate::inventory::Item;
use crate::types::ItemKey;
use super::offer::Side;

/// Typed events emitted by the session and supervisor, consumed by the chat-handler
/// layer.
#[derive(Debug, Clone, strum_macros::Display)]
pub enum TradeEvent {
    ItemAdded { side: Side, item: Item },
    ItemRemoved { side: Side, key: ItemKey },
    ReadyChanged { side: Side, ready: bool },
    Accepted,
    Cancelled,
    TimedOut,
    Error(String),
    /// Always the last event of a session, fired exactly once.
    Closed,
}
