use crate::error::Error;
use crate::platform::PlatformClient;
use super::session::{TradeSession, TradeState};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration, Instant};

/// Sent once the remaining time until the action-gap timeout drops below this.
const AFK_WARNING_WINDOW: Duration = Duration::from_secs(20);
/// Minimum spacing between AFK warnings.
const AFK_WARNING_COOLDOWN: Duration = Duration::from_secs(10);

/// Time limits for one supervised trade.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutPolicy {
    /// The maximum duration of the whole trade. Default is 180 seconds.
    pub max_trade_duration: Duration,
    /// The maximum gap between counterparty actions. Default is 15 seconds.
    pub max_action_gap: Duration,
    /// Interval between poll cycles. Default is 800 milliseconds.
    pub poll_interval: Duration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            max_trade_duration: Duration::from_secs(180),
            max_action_gap: Duration::from_secs(15),
            poll_interval: Duration::from_millis(800),
        }
    }
}

/// Capabilities invoked when the polling loop exits. Errors are surfaced as
/// [`super::TradeEvent::Error`], never propagated to the caller.
pub trait TradeCallbacks: Send {
    /// Fired iff the session ended in `Accepted`.
    fn on_success(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Fired unconditionally after `on_success`, no matter how the session
    /// terminated and even if `on_success` errored.
    fn on_close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// The do-nothing callback set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCallbacks;

impl TradeCallbacks for NoCallbacks {}

enum SupervisorAction {
    Stop,
}

/// Handle to a running supervisor task.
pub struct SupervisorHandle {
    tx: mpsc::Sender<SupervisorAction>,
    /// The supervisor task. Await it to join on loop exit.
    pub handle: JoinHandle<()>,
}

impl SupervisorHandle {
    /// Requests cooperative termination. Takes effect within one poll interval.
    pub async fn stop(&self) {
        let _ = self.tx.send(SupervisorAction::Stop).await;
    }
}

/// Starts the polling loop for a session on its own task.
///
/// Each cycle polls the session, tracks counterparty activity, enforces the
/// timeout policy, and emits one AFK warning per cooldown inside the warning
/// band. On exit the callbacks fire in strict order: success iff the session
/// ended `Accepted`, then close unconditionally.
pub fn spawn_supervisor<P, C>(
    session: Arc<Mutex<TradeSession<P>>>,
    policy: TimeoutPolicy,
    callbacks: C,
) -> SupervisorHandle
where
    P: PlatformClient + 'static,
    C: TradeCallbacks + 'static,
{
    let (tx, rx) = mpsc::channel(10);
    let handle = tokio::spawn(run(session, policy, callbacks, rx));

    SupervisorHandle { tx, handle }
}

async fn run<P: PlatformClient, C: TradeCallbacks>(
    session: Arc<Mutex<TradeSession<P>>>,
    policy: TimeoutPolicy,
    mut callbacks: C,
    mut rx: mpsc::Receiver<SupervisorAction>,
) {
    let started = Instant::now();
    let mut last_action = started;
    let mut last_warning: Option<Instant> = None;

    loop {
        // Poll under the lock so concurrent mutations serialize against the cycle
        // and a timeout decided here wins over them.
        let mut session_guard = session.lock().await;

        match session_guard.poll().await {
            Ok(true) => last_action = Instant::now(),
            Ok(false) => {},
            Err(error) => session_guard.emit_error(format!("Error polling trade: {error}")),
        }

        if session_guard.state().is_settled() {
            break;
        }

        // A counterparty that already accepted is no longer on the clock.
        if !session_guard.other_accepted() {
            let now = Instant::now();
            let action_deadline = last_action + policy.max_action_gap;
            let trade_deadline = started + policy.max_trade_duration;

            if now >= action_deadline {
                session_guard.force_timeout(Error::ActionTimeout).await;
                break;
            }

            if now >= trade_deadline {
                session_guard.force_timeout(Error::TotalTimeout).await;
                break;
            }

            let until_action_timeout = action_deadline - now;
            let warned_recently = last_warning
                .is_some_and(|at| now.duration_since(at) < AFK_WARNING_COOLDOWN);

            if until_action_timeout <= AFK_WARNING_WINDOW && !warned_recently {
                let message = format!(
                    "Are you AFK? The trade will be cancelled in {} seconds if you don't do something.",
                    until_action_timeout.as_secs(),
                );

                // Best effort; a dropped warning is not fatal.
                if let Err(error) = session_guard.platform().send_trade_message(&message).await {
                    log::debug!("Failed to deliver AFK warning: {error}");
                }

                last_warning = Some(now);
            }
        }

        drop(session_guard);

        tokio::select! {
            action = rx.recv() => match action {
                Some(SupervisorAction::Stop) | None => break,
            },
            _ = sleep(policy.poll_interval) => {},
        }
    }

    finish(&session, &mut callbacks).await;
}

async fn finish<P: PlatformClient, C: TradeCallbacks>(
    session: &Arc<Mutex<TradeSession<P>>>,
    callbacks: &mut C,
) {
    let mut session = session.lock().await;

    // Success strictly before close; close runs even when success errors.
    if session.state() == TradeState::Accepted {
        if let Err(error) = callbacks.on_success() {
            session.emit_error(format!("Success handler failed: {error}"));
        }
    }

    if let Err(error) = callbacks.on_close() {
        session.emit_error(format!("Close handler failed: {error}"));
    }

    session.close();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::CounterpartyAction;
    use crate::trade::event::TradeEvent;
    use crate::trade::offer::Side;
    use crate::trade::support::{drain, session_with, MockPlatform};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::mpsc::unbounded_channel;

    struct RecordingCallbacks {
        calls: Arc<StdMutex<Vec<&'static str>>>,
        fail_success: bool,
    }

    impl TradeCallbacks for RecordingCallbacks {
        fn on_success(&mut self) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push("success");

            if self.fail_success {
                anyhow::bail!("boom");
            }

            Ok(())
        }

        fn on_close(&mut self) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push("close");
            Ok(())
        }
    }

    fn quiet_session(
        platform: &Arc<MockPlatform>,
    ) -> (
        Arc<Mutex<TradeSession<Arc<MockPlatform>>>>,
        tokio::sync::mpsc::UnboundedReceiver<TradeEvent>,
    ) {
        let (tx, rx) = unbounded_channel();
        let session = session_with(Arc::clone(platform), &[]).with_event_sink(tx);

        (Arc::new(Mutex::new(session)), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_within_one_poll_of_the_action_gap() {
        let platform = Arc::new(MockPlatform::new());
        let (session, mut rx) = quiet_session(&platform);
        let policy = TimeoutPolicy::default();
        let started = Instant::now();
        let supervisor = spawn_supervisor(Arc::clone(&session), policy, NoCallbacks);

        supervisor.handle.await.unwrap();

        let elapsed = started.elapsed();

        assert!(elapsed >= policy.max_action_gap);
        assert!(elapsed <= policy.max_action_gap + policy.poll_interval);
        assert_eq!(session.lock().await.state(), TradeState::Closed);
        assert_eq!(platform.cancel_count(), 1);

        let events = drain(&mut rx);

        assert!(matches!(events[events.len() - 2], TradeEvent::TimedOut));
        assert!(matches!(events[events.len() - 1], TradeEvent::Closed));
    }

    #[tokio::test(start_paused = true)]
    async fn afk_warnings_respect_the_cooldown() {
        let platform = Arc::new(MockPlatform::new());
        let (session, _rx) = quiet_session(&platform);
        let supervisor = spawn_supervisor(
            Arc::clone(&session),
            TimeoutPolicy::default(),
            NoCallbacks,
        );

        supervisor.handle.await.unwrap();

        // with a 15 second gap the whole run sits inside the 20 second warning
        // band: one warning immediately, one after the 10 second cooldown
        let warnings = platform.trade_messages();

        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Are you AFK?"));
    }

    #[tokio::test(start_paused = true)]
    async fn warning_delivery_failure_is_swallowed() {
        let platform = Arc::new(MockPlatform::new());

        platform.set_fail_trade_messages(true);

        let (session, _rx) = quiet_session(&platform);
        let supervisor = spawn_supervisor(
            Arc::clone(&session),
            TimeoutPolicy::default(),
            NoCallbacks,
        );

        supervisor.handle.await.unwrap();

        assert_eq!(session.lock().await.state(), TradeState::Closed);
        assert!(platform.trade_messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn accepted_counterparty_disables_timeouts() {
        let platform = Arc::new(MockPlatform::new());

        platform.queue_poll(vec![CounterpartyAction::Accepted]);

        let (session, mut rx) = quiet_session(&platform);
        let started = Instant::now();
        let supervisor = spawn_supervisor(
            Arc::clone(&session),
            TimeoutPolicy::default(),
            NoCallbacks,
        );

        // well past both deadlines
        sleep(Duration::from_secs(400)).await;
        supervisor.stop().await;
        supervisor.handle.await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(400));

        let events = drain(&mut rx);

        assert!(!events.iter().any(|event| matches!(event, TradeEvent::TimedOut)));
        assert_eq!(session.lock().await.state(), TradeState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_takes_effect_within_one_poll_interval() {
        let platform = Arc::new(MockPlatform::new());
        let (session, _rx) = quiet_session(&platform);
        let policy = TimeoutPolicy::default();
        let started = Instant::now();
        let supervisor = spawn_supervisor(Arc::clone(&session), policy, NoCallbacks);

        supervisor.stop().await;
        supervisor.handle.await.unwrap();

        assert!(started.elapsed() <= policy.poll_interval);
        assert_eq!(session.lock().await.state(), TradeState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn success_fires_before_close_and_close_survives_its_error() {
        let platform = Arc::new(MockPlatform::new());
        let (tx, mut rx) = unbounded_channel();
        let mut session = session_with(Arc::clone(&platform), &[]).with_event_sink(tx);

        session.set_ready(Side::Us, true).unwrap();
        session.set_ready(Side::Them, true).unwrap();
        session.accept(Side::Us).await.unwrap();

        let session = Arc::new(Mutex::new(session));
        let calls = Arc::new(StdMutex::new(Vec::new()));
        let supervisor = spawn_supervisor(
            Arc::clone(&session),
            TimeoutPolicy::default(),
            RecordingCallbacks {
                calls: Arc::clone(&calls),
                fail_success: true,
            },
        );

        supervisor.handle.await.unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["success", "close"]);

        let events = drain(&mut rx);

        assert!(events.iter().any(
            |event| matches!(event, TradeEvent::Error(message) if message.contains("Success handler"))
        ));
        assert!(matches!(events[events.len() - 1], TradeEvent::Closed));
    }

    #[tokio::test(start_paused = true)]
    async fn no_success_callback_after_timeout() {
        let platform = Arc::new(MockPlatform::new());
        let (session, _rx) = quiet_session(&platform);
        let calls = Arc::new(StdMutex::new(Vec::new()));
        let supervisor = spawn_supervisor(
            Arc::clone(&session),
            TimeoutPolicy::default(),
            RecordingCallbacks {
                calls: Arc::clone(&calls),
                fail_success: false,
            },
        );

        supervisor.handle.await.unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["close"]);
    }
}
