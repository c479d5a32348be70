use crate::error::Error;
use crate::inventory::{InventoryCollection, Item};
use crate::platform::{CommitOutcome, CounterpartyAction, PlatformClient};
use crate::time::{self, ServerTime};
use crate::types::ItemKey;
use super::event::TradeEvent;
use super::offer::{Side, TradeOfferModel};
use super::validation::{OfferValidator, Validation};
use tokio::sync::mpsc::UnboundedSender;

/// The lifecycle state of a trade session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum TradeState {
    /// Trade window opened, no items exchanged yet.
    Initiated,
    /// At least one item change has occurred.
    Negotiating,
    /// One side is ready, waiting on the other.
    ReadyPending,
    Accepted,
    Cancelled,
    TimedOut,
    /// The final state, reached from every other state exactly once.
    Closed,
}

impl TradeState {
    /// Whether negotiation is over. Settled sessions only move to `Closed`.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            Self::Accepted | Self::Cancelled | Self::TimedOut | Self::Closed,
        )
    }
}

/// A state machine wrapping one live trade.
///
/// All mutations go through the session so concurrent attempts serialize; the
/// snapshots it holds are immutable and shared with validation lookups.
pub struct TradeSession<P> {
    platform: P,
    state: TradeState,
    offer: TradeOfferModel,
    our_inventories: InventoryCollection,
    their_inventories: InventoryCollection,
    their_privileged: bool,
    started_at: ServerTime,
    last_counterparty_action: ServerTime,
    uncertain_outcome: bool,
    events: Option<UnboundedSender<TradeEvent>>,
}

impl<P: PlatformClient> TradeSession<P> {
    pub fn new(
        platform: P,
        our_inventories: InventoryCollection,
        their_inventories: InventoryCollection,
        validator: Box<dyn OfferValidator>,
    ) -> Self {
        let now = time::get_server_time_now();

        Self {
            platform,
            state: TradeState::Initiated,
            offer: TradeOfferModel::new(validator),
            our_inventories,
            their_inventories,
            their_privileged: false,
            started_at: now,
            last_counterparty_action: now,
            uncertain_outcome: false,
            events: None,
        }
    }

    /// Attaches the sink trade events are delivered to. Without one, events are
    /// dropped silently.
    pub fn with_event_sink(mut self, events: UnboundedSender<TradeEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Grants the counterparty the admin capability, allowing them to accept
    /// without mutual readiness or validation.
    pub fn with_privileged_counterparty(mut self) -> Self {
        self.their_privileged = true;
        self
    }

    pub fn state(&self) -> TradeState {
        self.state
    }

    pub fn offer(&self) -> &TradeOfferModel {
        &self.offer
    }

    pub fn our_inventories(&self) -> &InventoryCollection {
        &self.our_inventories
    }

    pub fn their_inventories(&self) -> &InventoryCollection {
        &self.their_inventories
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn started_at(&self) -> ServerTime {
        self.started_at
    }

    /// When the counterparty last did something observable.
    pub fn last_counterparty_action(&self) -> ServerTime {
        self.last_counterparty_action
    }

    /// Whether the accept commit could not be confirmed either way. Flagged for
    /// manual reconciliation.
    pub fn uncertain_outcome(&self) -> bool {
        self.uncertain_outcome
    }

    pub fn other_accepted(&self) -> bool {
        self.offer.accepted(Side::Them)
    }

    fn emit(&self, event: TradeEvent) {
        if let Some(events) = &self.events {
            // The receiving side may be gone; nothing to do about that here.
            let _ = events.send(event);
        }
    }

    pub(crate) fn emit_error(&self, message: String) {
        self.emit(TradeEvent::Error(message));
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.state.is_settled() {
            Err(Error::InvalidState(self.state))
        } else {
            Ok(())
        }
    }

    fn bump_negotiating(&mut self) {
        if matches!(self.state, TradeState::Initiated | TradeState::ReadyPending) {
            self.state = TradeState::Negotiating;
        }
    }

    /// Adds an item to a side's offer.
    pub fn add_item(&mut self, side: Side, item: Item) -> Result<(), Error> {
        self.ensure_open()?;

        if self.offer.add_item(side, item.clone()) {
            self.bump_negotiating();
            self.emit(TradeEvent::ItemAdded { side, item });
        }

        Ok(())
    }

    /// Removes an item from a side's offer.
    pub fn remove_item(&mut self, side: Side, key: &ItemKey) -> Result<Item, Error> {
        self.ensure_open()?;

        let item = self.offer
            .remove_item(side, key)
            .ok_or(Error::ItemNotFound(*key))?;

        self.bump_negotiating();
        self.emit(TradeEvent::ItemRemoved { side, key: *key });
        Ok(item)
    }

    /// Marks a side ready or not ready. Returns the validation result; readiness
    /// stays false when validation fails and the errors are returned for display.
    pub fn set_ready(&mut self, side: Side, ready: bool) -> Result<Validation, Error> {
        self.ensure_open()?;

        let validation = self.offer.set_ready(side, ready);

        if ready && self.offer.ready(side) {
            self.state = TradeState::ReadyPending;
            self.emit(TradeEvent::ReadyChanged { side, ready: true });
        } else if !ready {
            self.state = TradeState::Negotiating;
            self.emit(TradeEvent::ReadyChanged { side, ready: false });
        }

        Ok(validation)
    }

    /// Commits the trade on the platform.
    ///
    /// Allowed for a privileged counterparty regardless of readiness; otherwise
    /// both sides must be ready and the counterparty's offer must validate at
    /// accept time. An ambiguous commit still transitions to `Accepted` but is
    /// flagged rather than assumed successful.
    pub async fn accept(&mut self, side: Side) -> Result<(), Error> {
        self.ensure_open()?;

        let privileged = side == Side::Them && self.their_privileged;

        if !privileged {
            if !self.offer.both_ready() {
                return Err(Error::InvalidState(self.state));
            }

            let validation = self.offer.validate(Side::Them);

            if !validation.ok() {
                return Err(Error::Validation(validation.errors));
            }
        }

        match self.platform.commit_trade().await {
            Ok(CommitOutcome::Confirmed) => {},
            Ok(CommitOutcome::Uncertain) => {
                self.uncertain_outcome = true;
                self.emit_error(Error::UncertainOutcome.to_string());
            },
            // A clear failure is recoverable; the session stays where it was.
            Err(error) => return Err(error),
        }

        self.offer.set_accepted(side);
        self.state = TradeState::Accepted;
        self.emit(TradeEvent::Accepted);
        Ok(())
    }

    /// Cancels the trade. A no-op once the session is settled.
    pub async fn cancel(&mut self) -> Result<(), Error> {
        if self.state.is_settled() {
            return Ok(());
        }

        self.platform.cancel_trade().await?;
        self.state = TradeState::Cancelled;
        self.emit(TradeEvent::Cancelled);
        Ok(())
    }

    /// Forces the session into `TimedOut`. Raised only by the supervisor.
    pub(crate) async fn force_timeout(&mut self, cause: Error) {
        if self.state.is_settled() {
            return;
        }

        log::debug!("Trade timed out: {cause}");

        // Best effort; the trade is being abandoned either way.
        if let Err(error) = self.platform.cancel_trade().await {
            log::debug!("Failed to cancel timed out trade: {error}");
        }

        self.state = TradeState::TimedOut;
        self.emit(TradeEvent::TimedOut);
    }

    /// Moves the session to `Closed`. Idempotent; the `Closed` event fires exactly
    /// once no matter how the session terminated.
    pub fn close(&mut self) {
        if self.state == TradeState::Closed {
            return;
        }

        self.state = TradeState::Closed;
        self.emit(TradeEvent::Closed);
    }

    /// Polls the platform for counterparty activity and applies it to the offer.
    ///
    /// Returns whether any observable counterparty action occurred.
    pub async fn poll(&mut self) -> Result<bool, Error> {
        if self.state.is_settled() {
            return Ok(false);
        }

        let actions = self.platform.poll_trade().await?;
        let acted = !actions.is_empty();

        for action in actions {
            self.apply_counterparty_action(action);

            if self.state.is_settled() {
                break;
            }
        }

        if acted {
            self.last_counterparty_action = time::get_server_time_now();
        }

        Ok(acted)
    }

    fn apply_counterparty_action(&mut self, action: CounterpartyAction) {
        match action {
            CounterpartyAction::ItemAdded { key } => {
                let Some(item) = self.their_inventories.get(&key).cloned() else {
                    self.emit_error(format!("Counterparty added unknown item {key}"));
                    return;
                };

                if self.offer.add_item(Side::Them, item.clone()) {
                    self.bump_negotiating();
                    self.emit(TradeEvent::ItemAdded { side: Side::Them, item });
                }
            },
            CounterpartyAction::ItemRemoved { key } => {
                if self.offer.remove_item(Side::Them, &key).is_some() {
                    self.bump_negotiating();
                    self.emit(TradeEvent::ItemRemoved { side: Side::Them, key });
                }
            },
            CounterpartyAction::ReadyChanged { ready } => {
                // Readiness reported by the platform is a fact, not a request.
                self.offer.force_ready(Side::Them, ready);
                self.state = if ready {
                    TradeState::ReadyPending
                } else {
                    TradeState::Negotiating
                };
                self.emit(TradeEvent::ReadyChanged { side: Side::Them, ready });
            },
            CounterpartyAction::Message(_) => {
                // Chat is the handler layer's concern; it still counts as activity.
            },
            CounterpartyAction::Accepted => {
                self.offer.set_accepted(Side::Them);
            },
            CounterpartyAction::Disconnected => {
                self.state = TradeState::Cancelled;
                self.emit(TradeEvent::Cancelled);
            },
        }
    }
}
