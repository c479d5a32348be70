//! Shared fakes for trade tests.

use crate::error::Error;
use crate::inventory::{InventoryCollection, InventorySnapshot, Item};
use crate::platform::{CommitOutcome, CounterpartyAction, PlatformClient};
use crate::types::InventoryType;
use super::event::TradeEvent;
use super::session::TradeSession;
use super::validation::AcceptAny;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use steamid_ng::SteamID;
use tokio::sync::mpsc::UnboundedReceiver;

const OWNER: u64 = 76561198000000002;

pub(crate) struct MockPlatform {
    commits: Mutex<VecDeque<Result<CommitOutcome, Error>>>,
    polls: Mutex<VecDeque<Vec<CounterpartyAction>>>,
    trade_messages: Mutex<Vec<String>>,
    chat_messages: Mutex<Vec<String>>,
    fail_trade_messages: AtomicBool,
    cancels: AtomicUsize,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            commits: Mutex::new(VecDeque::new()),
            polls: Mutex::new(VecDeque::new()),
            trade_messages: Mutex::new(Vec::new()),
            chat_messages: Mutex::new(Vec::new()),
            fail_trade_messages: AtomicBool::new(false),
            cancels: AtomicUsize::new(0),
        }
    }

    pub fn queue_commit(&self, outcome: Result<CommitOutcome, Error>) {
        self.commits.lock().unwrap().push_back(outcome);
    }

    pub fn queue_poll(&self, actions: Vec<CounterpartyAction>) {
        self.polls.lock().unwrap().push_back(actions);
    }

    pub fn trade_messages(&self) -> Vec<String> {
        self.trade_messages.lock().unwrap().clone()
    }

    pub fn set_fail_trade_messages(&self, fail: bool) {
        self.fail_trade_messages.store(fail, Ordering::SeqCst);
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

impl PlatformClient for MockPlatform {
    async fn send_chat_message(&self, message: &str) -> Result<(), Error> {
        self.chat_messages.lock().unwrap().push(message.to_owned());
        Ok(())
    }

    async fn send_trade_message(&self, message: &str) -> Result<(), Error> {
        if self.fail_trade_messages.load(Ordering::SeqCst) {
            return Err(Error::Response("message dropped".into()));
        }

        self.trade_messages.lock().unwrap().push(message.to_owned());
        Ok(())
    }

    async fn commit_trade(&self) -> Result<CommitOutcome, Error> {
        self.commits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(CommitOutcome::Confirmed))
    }

    async fn cancel_trade(&self) -> Result<(), Error> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn poll_trade(&self) -> Result<Vec<CounterpartyAction>, Error> {
        Ok(self.polls.lock().unwrap().pop_front().unwrap_or_default())
    }
}

pub(crate) fn collection(items: &[Item]) -> InventoryCollection {
    InventoryCollection::new(vec![InventorySnapshot::test_loaded(
        SteamID::from(OWNER),
        InventoryType::TEAM_FORTRESS_2,
        items.to_vec(),
    )])
}

/// A session over [`AcceptAny`] whose counterparty owns the given items.
pub(crate) fn session_with(
    platform: Arc<MockPlatform>,
    their_items: &[Item],
) -> TradeSession<Arc<MockPlatform>> {
    TradeSession::new(
        platform,
        collection(&[]),
        collection(their_items),
        Box::new(AcceptAny),
    )
}

pub(crate) fn drain(rx: &mut UnboundedReceiver<TradeEvent>) -> Vec<TradeEvent> {
    let mut events = Vec::new();

    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    events
}
