#![allow(dead_code)]
#![allow(clippy::too_many_arguments)]

//! # Chatterline
//!
//! A behavior engine that replays one AI-generated chat reply as a
//! sequence of timestamped, human-like messaging actions: segmented
//! sends, typing-indicator toggles, hesitation flickers, and
//! typo-then-recall self-corrections.
//!
//! [`behavior::build_timeline`] turns raw reply text, an emotion map, and
//! a character's tuning into a deterministic [`types::Timeline`];
//! [`coordinator::Coordinator`] plays it out over time against an
//! [`coordinator::ActionSink`] at the transport boundary.

pub mod behavior;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod providers;
pub mod session;
pub mod transport;
pub mod types;

pub use behavior::{build_timeline, EmotionMap, EmotionState, Intensity};
pub use config::{CharacterBehaviorConfig, InterruptPolicy};
pub use coordinator::{ActionSink, Coordinator, RunOutcome};
pub use errors::{EngineError, Result};
pub use types::{ActionKind, TimedAction, Timeline};
