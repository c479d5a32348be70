//! Core plumbing for an automated Steam trading bot.
//!
//! Loads user inventories page-by-page from the community endpoint, models a
//! live trade offer with pluggable validation, drives the trade through its
//! state machine, and supervises it with timeout and AFK-warning polling.
//!
//! The platform connection is abstracted behind [`PlatformClient`] so the
//! session logic stays independent of any particular Steam client library.

mod error;
mod platform;
mod serialize;
mod web;

pub mod inventory;
pub mod time;
pub mod trade;
pub mod types;

pub use error::{Error, MissingDescriptionError};
pub use platform::{CommitOutcome, CounterpartyAction, PlatformClient};
pub use web::{ReqwestWebClient, WebClient};

pub use steamid_ng::SteamID;
