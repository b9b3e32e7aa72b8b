//! Core data types: segments, timed actions, and the timeline.
//!
//! A [`Timeline`] is the ordered, absolutely-timed action plan for one
//! assistant conversational turn. It is built once, consumed once by the
//! coordinator, and discarded; persistence of what was emitted is the
//! external store's responsibility.

use serde::{Deserialize, Serialize};

/// Identifier of an action within a single timeline.
///
/// Ids are a deterministic sequence (0, 1, 2, ...) in build order, so two
/// builds from identical inputs and seed produce identical ids.
pub type ActionId = u64;

/// One atomic text chunk sent as a single message bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Position of this segment within the turn (0-based)
    pub index: usize,
    /// Segment text, exactly as it will be sent
    pub text: String,
    /// Length in characters (not bytes; segments may be CJK)
    pub len: usize,
}

impl Segment {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let len = text.chars().count();
        Self { index, text, len }
    }
}

/// The kind of a scheduled action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Typing indicator turns on
    TypingOn,
    /// Typing indicator turns off
    TypingOff,
    /// A message bubble is committed (persisted + broadcast by the transport)
    SendText,
    /// A previously sent message is retracted; `target` names the send
    SendRecall,
    /// One short typing on/off pulse before the real typing bracket
    HesitateFlicker,
    /// Pure passage of time (think pause, retype delay); no transport effect
    Wait,
}

impl ActionKind {
    /// Wire label, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypingOn => "typing_on",
            Self::TypingOff => "typing_off",
            Self::SendText => "send_text",
            Self::SendRecall => "send_recall",
            Self::HesitateFlicker => "hesitate_flicker",
            Self::Wait => "wait",
        }
    }
}

/// A single step in the playback timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedAction {
    /// Unique within the owning timeline
    pub id: ActionId,
    /// Index of the segment this action belongs to
    pub segment: usize,
    /// What happens at `offset_ms`
    pub kind: ActionKind,
    /// Message text for `SendText`; `None` otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Milliseconds from turn start (t=0) at which the action fires
    pub offset_ms: u64,
    /// Duration for `Wait` and `HesitateFlicker`; 0 for instantaneous kinds
    pub duration_ms: u64,
    /// For `SendRecall`: id of the `SendText` this action retracts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ActionId>,
}

impl TimedAction {
    pub fn is_send(&self) -> bool {
        self.kind == ActionKind::SendText
    }
}

/// Ordered sequence of timed actions for one assistant turn.
///
/// Invariants, upheld by the builder:
/// - offsets are non-decreasing;
/// - every `SendText` is immediately preceded by a `TypingOn`/`TypingOff`
///   bracket;
/// - every `SendRecall` targets an earlier `SendText` with a strictly
///   smaller offset.
///
/// An empty timeline is valid and represents an intentional no-reply turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    actions: Vec<TimedAction>,
}

impl Timeline {
    /// Wraps a built action list. Crate-internal: only the builder
    /// constructs timelines, so the invariants above are assumed here.
    pub(crate) fn from_actions(actions: Vec<TimedAction>) -> Self {
        debug_assert!(actions.windows(2).all(|w| w[0].offset_ms <= w[1].offset_ms));
        Self { actions }
    }

    pub fn actions(&self) -> &[TimedAction] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of message bubbles this timeline commits.
    pub fn send_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_send()).count()
    }

    /// Number of retraction events in this timeline.
    pub fn recall_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| a.kind == ActionKind::SendRecall)
            .count()
    }

    /// Total scheduled duration: offset of the last action.
    pub fn total_duration_ms(&self) -> u64 {
        self.actions
            .last()
            .map(|a| a.offset_ms + a.duration_ms)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimedAction> {
        self.actions.iter()
    }
}

impl IntoIterator for Timeline {
    type Item = TimedAction;
    type IntoIter = std::vec::IntoIter<TimedAction>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}
