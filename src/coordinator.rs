//! Timeline execution.
//!
//! The coordinator plays a built [`Timeline`] against an [`ActionSink`],
//! suspending cooperatively until each action's scheduled offset. It is
//! the only component that waits; waits are `sleep_until` on a monotonic
//! clock, raced against an interrupt signal so cancellation lands exactly
//! on action boundaries, never mid-action.

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::InterruptPolicy;
use crate::errors::{EngineError, Result};
use crate::types::{TimedAction, Timeline};

/// Receives actions at their scheduled offsets. Implemented by the
/// transport boundary; emit errors abort the remaining timeline.
#[async_trait]
pub trait ActionSink: Send {
    async fn emit(&mut self, action: &TimedAction) -> Result<()>;
}

/// Why a run stopped early.
#[derive(Debug)]
pub enum AbortReason {
    /// The interrupt signal fired (e.g. a new user message arrived)
    Interrupted,
    /// The sink rejected an action; no retry is attempted
    EmitFailed(EngineError),
}

/// Terminal result of one run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every action was emitted in order
    Completed,
    /// Execution stopped at an action boundary; remaining actions dropped
    Aborted(AbortReason),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Coordinator lifecycle: `idle -> running -> {completed, aborted}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Running,
    Completed,
    Aborted,
}

impl CoordinatorState {
    fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }
}

/// One-shot executor for a single timeline.
///
/// A timeline is consumed exactly once; after `run` returns the
/// coordinator stays in its terminal state and a fresh coordinator (and a
/// fresh timeline) is needed for the next turn.
#[derive(Debug)]
pub struct Coordinator {
    policy: InterruptPolicy,
    state: CoordinatorState,
}

impl Coordinator {
    pub fn new(policy: InterruptPolicy) -> Self {
        Self {
            policy,
            state: CoordinatorState::Idle,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Plays `timeline` against `sink`, honoring scheduled offsets.
    ///
    /// `interrupt` is a watch channel; a `true` value requests an abort,
    /// honored only between actions. Emit failures abort without retry
    /// and are reported in the outcome, not as an error: a dead transport
    /// is non-fatal to the engine.
    pub async fn run(
        &mut self,
        timeline: Timeline,
        sink: &mut dyn ActionSink,
        mut interrupt: watch::Receiver<bool>,
    ) -> Result<RunOutcome> {
        if self.state != CoordinatorState::Idle {
            return Err(EngineError::CoordinatorBusy(self.state.name().to_string()));
        }
        self.state = CoordinatorState::Running;

        let total = timeline.len();
        let start = Instant::now();
        let mut emitted = 0usize;
        // Segment of the last emitted action; only a segment already in
        // flight may drain after an interrupt.
        let mut last_segment: Option<usize> = None;
        // Once interrupted under FinishSegment, only this segment drains.
        let mut draining: Option<usize> = None;

        for action in timeline {
            if let Some(segment) = draining {
                if action.segment != segment {
                    self.state = CoordinatorState::Aborted;
                    info!(emitted, total, "timeline aborted after draining segment");
                    return Ok(RunOutcome::Aborted(AbortReason::Interrupted));
                }
            }

            let deadline = start + Duration::from_millis(action.offset_ms);
            let interrupted = if draining.is_some() {
                sleep_until(deadline).await;
                false
            } else {
                wait_or_interrupt(deadline, &mut interrupt).await
            };

            if interrupted {
                match self.policy {
                    InterruptPolicy::AbortAtBoundary => {
                        self.state = CoordinatorState::Aborted;
                        info!(emitted, total, "timeline aborted at action boundary");
                        return Ok(RunOutcome::Aborted(AbortReason::Interrupted));
                    }
                    InterruptPolicy::FinishSegment => {
                        // Drain only a segment already in flight. An
                        // interrupt during the gap before a new segment
                        // (or before anything was emitted) aborts now.
                        match last_segment {
                            Some(segment) if segment == action.segment => {
                                draining = Some(segment);
                                sleep_until(deadline).await;
                            }
                            _ => {
                                self.state = CoordinatorState::Aborted;
                                info!(emitted, total, "timeline aborted at segment boundary");
                                return Ok(RunOutcome::Aborted(AbortReason::Interrupted));
                            }
                        }
                    }
                }
            }

            debug!(id = action.id, kind = action.kind.as_str(), offset_ms = action.offset_ms, "emit");
            if let Err(e) = sink.emit(&action).await {
                warn!(id = action.id, error = %e, "emit failed, aborting timeline");
                self.state = CoordinatorState::Aborted;
                return Ok(RunOutcome::Aborted(AbortReason::EmitFailed(e)));
            }
            emitted += 1;
            last_segment = Some(action.segment);
        }

        self.state = CoordinatorState::Completed;
        debug!(emitted, "timeline completed");
        Ok(RunOutcome::Completed)
    }
}

/// Sleeps until `deadline` unless the interrupt signal turns true first.
/// A dropped sender is treated as "no interrupt will ever come".
async fn wait_or_interrupt(deadline: Instant, interrupt: &mut watch::Receiver<bool>) -> bool {
    if *interrupt.borrow() {
        return true;
    }
    loop {
        tokio::select! {
            () = sleep_until(deadline) => return false,
            changed = interrupt.changed() => match changed {
                Ok(()) => {
                    if *interrupt.borrow() {
                        return true;
                    }
                }
                Err(_) => {
                    sleep_until(deadline).await;
                    return false;
                }
            },
        }
    }
}
