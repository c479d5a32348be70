//! The trade-session lifecycle: offer model, state machine, and supervisor.

mod event;
mod offer;
mod session;
mod supervisor;
mod validation;

#[cfg(test)]
pub(crate) mod support;

pub use event::TradeEvent;
pub use offer::{Side, TradeOfferModel};
pub use session::{TradeSession, TradeState};
pub use supervisor::{
    spawn_supervisor,
    NoCallbacks,
    SupervisorHandle,
    TimeoutPolicy,
    TradeCallbacks,
};
pub use validation::{AcceptAny, MetalValue, OfferValidator, Validation};
