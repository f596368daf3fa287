//! Cooking runner: feeds commands and one-second ticks into a
//! [`CookingSession`].
//!
//! The session itself has no notion of time.  [`CookingRunner::run`] owns it
//! inside a single task and multiplexes two inputs with `tokio::select!`:
//!
//! ```text
//! CookingCommand (mpsc) ──▶ session.apply(..)      reset ticker on start/resume/next
//! interval tick          ──▶ session.tick()        only while Running
//! ```
//!
//! The loop ends when every command sender has been dropped.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Interval, MissedTickBehavior};

use crate::recipe::Step;

use super::session::{CookingEvent, CookingSession, SessionSnapshot};

// ---------------------------------------------------------------------------
// CookingCommand
// ---------------------------------------------------------------------------

/// User-issued inputs.  Ticks come from the runner's own clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookingCommand {
    Start(Vec<Step>),
    Pause,
    Resume,
    NextStep,
    Stop,
}

impl From<CookingCommand> for CookingEvent {
    fn from(command: CookingCommand) -> Self {
        match command {
            CookingCommand::Start(steps) => CookingEvent::Start(steps),
            CookingCommand::Pause => CookingEvent::Pause,
            CookingCommand::Resume => CookingEvent::Resume,
            CookingCommand::NextStep => CookingEvent::NextStep,
            CookingCommand::Stop => CookingEvent::Stop,
        }
    }
}

// ---------------------------------------------------------------------------
// CookingRunner
// ---------------------------------------------------------------------------

/// Drives a [`CookingSession`] in real time.
///
/// ```rust,no_run
/// use std::time::Duration;
/// use cookitup::cooking::{CookingCommand, CookingRunner};
///
/// # async fn example(steps: Vec<cookitup::recipe::Step>) {
/// let runner = CookingRunner::new(Duration::from_secs(1));
/// let snapshots = runner.subscribe();
///
/// let (tx, rx) = tokio::sync::mpsc::channel(8);
/// tokio::spawn(runner.run(rx));
///
/// tx.send(CookingCommand::Start(steps)).await.unwrap();
/// # let _ = snapshots;
/// # }
/// ```
pub struct CookingRunner {
    session: CookingSession,
    tick_interval: Duration,
}

impl CookingRunner {
    pub fn new(tick_interval: Duration) -> Self {
        Self::with_session(CookingSession::new(), tick_interval)
    }

    pub fn with_session(session: CookingSession, tick_interval: Duration) -> Self {
        Self {
            session,
            tick_interval,
        }
    }

    /// Observe session snapshots; call before [`run`](Self::run) consumes
    /// the runner.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.session.subscribe()
    }

    /// Run until `commands` is closed.
    pub async fn run(mut self, mut commands: mpsc::Receiver<CookingCommand>) {
        let period = self.tick_interval.max(Duration::from_millis(1));
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command, &mut ticker),
                    None => break,
                },
                _ = ticker.tick(), if self.session.state().is_running() => {
                    self.session.tick();
                }
            }
        }

        log::info!("cooking: command channel closed, runner shutting down");
    }

    fn handle(&mut self, command: CookingCommand, ticker: &mut Interval) {
        log::debug!("cooking: {command:?}");

        let restarts_countdown = matches!(
            command,
            CookingCommand::Start(_) | CookingCommand::Resume | CookingCommand::NextStep
        );
        let before = self.session.state();

        self.session.apply(command.into());

        let after = self.session.state();
        if restarts_countdown && after.is_running() && after != before {
            ticker.reset();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
