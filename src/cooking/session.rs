//! Cooking-mode state machine and its observable snapshot.
//!
//! [`CookingSession`] walks a recipe's steps with one countdown per step.
//! It does no I/O and never sleeps: the caller drives [`CookingSession::tick`]
//! about once per second (see [`CookingRunner`](crate::cooking::CookingRunner)).
//!
//! Every `(state, event)` pair is defined; events that make no sense in the
//! current state are ignored.

use std::sync::Arc;

use tokio::sync::watch;

use crate::cooking::duration::parse_duration_to_seconds;
use crate::recipe::Step;

// ---------------------------------------------------------------------------
// CookingState
// ---------------------------------------------------------------------------

/// States of a cooking session.
///
/// ```text
/// Idle ──start──▶ Running ──pause──▶ Paused ──resume (remaining > 0)──▶ Running
///                 Running ──tick, last step reaches 0──▶ Completed
///                 Running ──tick, other step reaches 0──▶ Running (next step)
///      Running / Paused ──next (not last)──▶ Running (next step)
/// any state ──stop──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CookingState {
    #[default]
    Idle,
    Running { step_index: usize, remaining_secs: u32 },
    Paused { step_index: usize, remaining_secs: u32 },
    /// The last step's countdown ran out.  The session stays active on the
    /// final step until stopped.
    Completed { step_index: usize },
}

impl CookingState {
    pub fn label(&self) -> &'static str {
        match self {
            CookingState::Idle => "Idle",
            CookingState::Running { .. } => "Running",
            CookingState::Paused { .. } => "Paused",
            CookingState::Completed { .. } => "Completed",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, CookingState::Running { .. })
    }

    /// Cooking mode is active in every state except `Idle`.
    pub fn is_active(&self) -> bool {
        !matches!(self, CookingState::Idle)
    }

    pub fn step_index(&self) -> usize {
        match *self {
            CookingState::Idle => 0,
            CookingState::Running { step_index, .. }
            | CookingState::Paused { step_index, .. }
            | CookingState::Completed { step_index } => step_index,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        match *self {
            CookingState::Running { remaining_secs, .. }
            | CookingState::Paused { remaining_secs, .. } => remaining_secs,
            CookingState::Idle | CookingState::Completed { .. } => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// CookingEvent
// ---------------------------------------------------------------------------

/// Every input the state machine accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookingEvent {
    Start(Vec<Step>),
    Tick,
    Pause,
    Resume,
    NextStep,
    Stop,
}

// ---------------------------------------------------------------------------
// SessionSnapshot
// ---------------------------------------------------------------------------

/// What a renderer needs to draw cooking mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub state: CookingState,
    pub step_index: usize,
    pub remaining_secs: u32,
    pub running: bool,
    pub active: bool,
    pub step_count: usize,
    pub current_step: Option<Step>,
}

// ---------------------------------------------------------------------------
// CookingSession
// ---------------------------------------------------------------------------

/// Single-owner cooking controller.
///
/// All transitions take `&mut self`; concurrent callers must serialise
/// through one task.  Observers use [`subscribe`](Self::subscribe).
///
/// # Example
/// ```rust
/// use cookitup::cooking::{CookingSession, CookingState};
/// use cookitup::recipe::{RecipeId, Step};
///
/// let steps = vec![
///     Step::new(RecipeId(1), 1, "Boil water", "2 seconds"),
///     Step::new(RecipeId(1), 2, "Steep", "1 second"),
/// ];
///
/// let mut session = CookingSession::new();
/// session.start(steps);
/// session.tick();
/// session.tick();
/// assert_eq!(session.state(), CookingState::Running { step_index: 1, remaining_secs: 1 });
/// session.tick();
/// assert_eq!(session.state(), CookingState::Completed { step_index: 1 });
/// ```
pub struct CookingSession {
    steps: Arc<[Step]>,
    state: CookingState,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl CookingSession {
    pub fn new() -> Self {
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());
        Self {
            steps: Arc::from(Vec::new()),
            state: CookingState::Idle,
            snapshot_tx,
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Begin cooking `steps` from the first step.  An empty list is ignored.
    pub fn start(&mut self, steps: Vec<Step>) {
        if steps.is_empty() {
            log::debug!("cooking: start ignored, no steps");
            return;
        }

        self.steps = Arc::from(steps);
        let remaining_secs = self.seed(0);
        self.state = CookingState::Running {
            step_index: 0,
            remaining_secs,
        };
        log::info!("cooking: started with {} steps", self.steps.len());
        self.publish();
    }

    /// One elapsed second.  Only meaningful while running.
    pub fn tick(&mut self) {
        let CookingState::Running {
            step_index,
            remaining_secs,
        } = self.state
        else {
            return;
        };

        let remaining_secs = remaining_secs.saturating_sub(1);
        self.state = if remaining_secs > 0 {
            CookingState::Running {
                step_index,
                remaining_secs,
            }
        } else if self.is_last_index(step_index) {
            log::info!("cooking: all steps done");
            CookingState::Completed { step_index }
        } else {
            let next = step_index + 1;
            log::debug!("cooking: step {} timer expired, advancing", step_index + 1);
            CookingState::Running {
                step_index: next,
                remaining_secs: self.seed(next),
            }
        };
        self.publish();
    }

    pub fn pause(&mut self) {
        if let CookingState::Running {
            step_index,
            remaining_secs,
        } = self.state
        {
            self.state = CookingState::Paused {
                step_index,
                remaining_secs,
            };
            self.publish();
        }
    }

    /// Resume a paused countdown.  Refused when no time is left.
    pub fn resume(&mut self) {
        if let CookingState::Paused {
            step_index,
            remaining_secs,
        } = self.state
        {
            if remaining_secs > 0 {
                self.state = CookingState::Running {
                    step_index,
                    remaining_secs,
                };
                self.publish();
            }
        }
    }

    /// Skip to the next step.  Does nothing on the last step.
    pub fn next_step(&mut self) {
        let step_index = match self.state {
            CookingState::Running { step_index, .. } | CookingState::Paused { step_index, .. } => {
                step_index
            }
            _ => return,
        };
        if self.is_last_index(step_index) {
            return;
        }

        let next = step_index + 1;
        self.state = CookingState::Running {
            step_index: next,
            remaining_secs: self.seed(next),
        };
        self.publish();
    }

    /// Leave cooking mode from any state.
    pub fn stop(&mut self) {
        self.steps = Arc::from(Vec::new());
        self.state = CookingState::Idle;
        log::debug!("cooking: stopped");
        self.publish();
    }

    /// Dispatch any [`CookingEvent`].
    pub fn apply(&mut self, event: CookingEvent) {
        match event {
            CookingEvent::Start(steps) => self.start(steps),
            CookingEvent::Tick => self.tick(),
            CookingEvent::Pause => self.pause(),
            CookingEvent::Resume => self.resume(),
            CookingEvent::NextStep => self.next_step(),
            CookingEvent::Stop => self.stop(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn state(&self) -> CookingState {
        self.state
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_last_step(&self) -> bool {
        self.is_last_index(self.state.step_index())
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.state.step_index())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            step_index: self.state.step_index(),
            remaining_secs: self.state.remaining_secs(),
            running: self.state.is_running(),
            active: self.state.is_active(),
            step_count: self.steps.len(),
            current_step: self.current_step().cloned(),
        }
    }

    /// Observe snapshots; the current one is visible immediately.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn is_last_index(&self, step_index: usize) -> bool {
        self.steps.len().checked_sub(1) == Some(step_index)
    }

    fn seed(&self, step_index: usize) -> u32 {
        self.steps
            .get(step_index)
            .map_or(0, |step| parse_duration_to_seconds(&step.duration))
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            *current = snapshot;
            true
        });
    }
}

impl Default for CookingSession {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::RecipeId;

    fn steps(durations: &[&str]) -> Vec<Step> {
        durations
            .iter()
            .enumerate()
            .map(|(i, d)| Step::new(RecipeId(1), i as u32 + 1, format!("step {}", i + 1), *d))
            .collect()
    }

    fn running(step_index: usize, remaining_secs: u32) -> CookingState {
        CookingState::Running {
            step_index,
            remaining_secs,
        }
    }

    fn paused(step_index: usize, remaining_secs: u32) -> CookingState {
        CookingState::Paused {
            step_index,
            remaining_secs,
        }
    }

    /// Session in each of the four states over a 2-step recipe
    /// ("3 seconds", "1 minute").
    fn session_in(label: &str) -> CookingSession {
        let mut s = CookingSession::new();
        match label {
            "Idle" => {}
            "Running" => s.start(steps(&["3 seconds", "1 minute"])),
            "Paused" => {
                s.start(steps(&["3 seconds", "1 minute"]));
                s.pause();
            }
            "Completed" => {
                s.start(steps(&["3 seconds", "1 second"]));
                s.next_step();
                s.tick();
            }
            other => panic!("unknown state {other}"),
        }
        assert_eq!(s.state().label(), label);
        s
    }

    // ---- Walkthrough ---

    #[test]
    fn two_step_session_advances_and_completes() {
        let mut s = CookingSession::new();
        s.start(steps(&["2 seconds", "1 second"]));
        assert_eq!(s.state(), running(0, 2));

        s.tick();
        s.tick();
        assert_eq!(s.state(), running(1, 1));

        s.tick();
        assert_eq!(s.state(), CookingState::Completed { step_index: 1 });
        assert!(s.is_last_step());
        assert_eq!(s.current_step().map(|st| st.position), Some(2));
    }

    #[test]
    fn start_with_no_steps_stays_idle() {
        let mut s = CookingSession::new();
        s.start(Vec::new());
        assert_eq!(s.state(), CookingState::Idle);
        assert!(s.current_step().is_none());
    }

    #[test]
    fn zero_duration_step_advances_on_first_tick() {
        let mut s = CookingSession::new();
        s.start(steps(&["quick", "2 seconds"]));
        assert_eq!(s.state(), running(0, 0));
        s.tick();
        assert_eq!(s.state(), running(1, 2));
    }

    // ---- Transition table ---

    #[test]
    fn start_from_any_state_restarts_at_first_step() {
        for label in ["Idle", "Running", "Paused", "Completed"] {
            let mut s = session_in(label);
            s.start(steps(&["5 seconds"]));
            assert_eq!(s.state(), running(0, 5), "from {label}");
            assert_eq!(s.steps().len(), 1);
        }
    }

    #[test]
    fn tick_outside_running_is_noop() {
        for label in ["Idle", "Paused", "Completed"] {
            let mut s = session_in(label);
            let before = s.state();
            s.tick();
            assert_eq!(s.state(), before, "from {label}");
        }
    }

    #[test]
    fn tick_in_running_counts_down() {
        let mut s = session_in("Running");
        s.tick();
        assert_eq!(s.state(), running(0, 2));
    }

    #[test]
    fn pause_only_from_running() {
        let mut s = session_in("Running");
        s.pause();
        assert_eq!(s.state(), paused(0, 3));

        for label in ["Idle", "Paused", "Completed"] {
            let mut s = session_in(label);
            let before = s.state();
            s.pause();
            assert_eq!(s.state(), before, "from {label}");
        }
    }

    #[test]
    fn resume_only_from_paused() {
        let mut s = session_in("Paused");
        s.resume();
        assert_eq!(s.state(), running(0, 3));

        for label in ["Idle", "Running", "Completed"] {
            let mut s = session_in(label);
            let before = s.state();
            s.resume();
            assert_eq!(s.state(), before, "from {label}");
        }
    }

    #[test]
    fn resume_with_no_time_left_is_refused() {
        let mut s = CookingSession::new();
        s.start(steps(&["soon", "1 minute"]));
        s.pause();
        assert_eq!(s.state(), paused(0, 0));

        s.resume();
        assert_eq!(s.state(), paused(0, 0));

        let mut idle = CookingSession::new();
        idle.resume();
        assert_eq!(idle.state(), CookingState::Idle);
    }

    #[test]
    fn next_step_from_running_and_paused() {
        let mut s = session_in("Running");
        s.next_step();
        assert_eq!(s.state(), running(1, 60));

        let mut s = session_in("Paused");
        s.next_step();
        assert_eq!(s.state(), running(1, 60));
    }

    #[test]
    fn next_step_on_last_step_does_not_complete() {
        let mut s = session_in("Running");
        s.next_step();
        s.next_step();
        assert_eq!(s.state(), running(1, 60));

        s.pause();
        s.next_step();
        assert_eq!(s.state(), paused(1, 60));
    }

    #[test]
    fn next_step_from_idle_or_completed_is_noop() {
        for label in ["Idle", "Completed"] {
            let mut s = session_in(label);
            let before = s.state();
            s.next_step();
            assert_eq!(s.state(), before, "from {label}");
        }
    }

    #[test]
    fn stop_from_any_state_resets() {
        for label in ["Idle", "Running", "Paused", "Completed"] {
            let mut s = session_in(label);
            s.stop();
            assert_eq!(s.state(), CookingState::Idle, "from {label}");
            let snap = s.snapshot();
            assert_eq!(snap.step_index, 0);
            assert_eq!(snap.remaining_secs, 0);
            assert!(!snap.active);
            assert!(s.current_step().is_none());
        }
    }

    #[test]
    fn every_state_event_pair_is_defined() {
        let events = || {
            vec![
                CookingEvent::Start(steps(&["1 second", "2 seconds"])),
                CookingEvent::Tick,
                CookingEvent::Pause,
                CookingEvent::Resume,
                CookingEvent::NextStep,
                CookingEvent::Stop,
            ]
        };
        for label in ["Idle", "Running", "Paused", "Completed"] {
            for event in events() {
                let mut s = session_in(label);
                s.apply(event.clone());
                let snap = s.snapshot();
                assert_eq!(snap.running, s.state().is_running(), "{label} + {event:?}");
                assert!(snap.step_index < snap.step_count.max(1), "{label} + {event:?}");
            }
        }
    }

    // ---- Queries ---

    #[test]
    fn is_last_step_tracks_index() {
        let mut s = CookingSession::new();
        assert!(!s.is_last_step());
        s.start(steps(&["1 minute", "1 minute"]));
        assert!(!s.is_last_step());
        s.next_step();
        assert!(s.is_last_step());
    }

    // ---- Observation ---

    #[test]
    fn late_subscriber_sees_current_snapshot() {
        let mut s = CookingSession::new();
        s.start(steps(&["2 seconds", "1 second"]));
        s.tick();

        let rx = s.subscribe();
        let snap = rx.borrow().clone();
        assert_eq!(snap.state, running(0, 1));
        assert!(snap.running);
        assert!(snap.active);
        assert_eq!(snap.step_count, 2);
        assert_eq!(snap.current_step.map(|st| st.description), Some("step 1".to_string()));
    }

    #[test]
    fn noop_events_do_not_notify() {
        let mut s = CookingSession::new();
        let mut rx = s.subscribe();
        rx.borrow_and_update();

        s.pause();
        s.tick();
        assert!(!rx.has_changed().unwrap());

        s.start(steps(&["1 second"]));
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn default_state_is_idle() {
        assert_eq!(CookingState::default(), CookingState::Idle);
        assert_eq!(CookingSession::default().state(), CookingState::Idle);
    }
}
