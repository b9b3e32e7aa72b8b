//! Transport boundary.
//!
//! Maps engine actions onto the wire contract: sends become persisted,
//! broadcast messages; typing toggles and flickers become ephemeral status
//! events; recalls become retraction events referencing the original
//! message (the store marks it recalled, it is never deleted). Waits have
//! no wire representation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;

use crate::coordinator::ActionSink;
use crate::errors::{EngineError, Result};
use crate::types::{ActionKind, TimedAction};

/// One event crossing the transport boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Persisted + broadcast chat message
    Message {
        id: String,
        sender: String,
        kind: String,
        content: String,
        metadata: serde_json::Value,
        timestamp: DateTime<Utc>,
    },
    /// Ephemeral typing indicator state; never persisted
    TypingStatus {
        sender: String,
        active: bool,
        /// Set for hesitation flickers: how long the pulse lasts
        #[serde(skip_serializing_if = "Option::is_none")]
        flicker_ms: Option<u64>,
        timestamp: DateTime<Utc>,
    },
    /// Retraction of a previously sent message
    Recall {
        sender: String,
        /// Message id of the send being retracted
        target: String,
        timestamp: DateTime<Utc>,
    },
}

/// Wire message id for the send action with this timeline id.
pub fn message_id(action_id: u64) -> String {
    format!("msg_{action_id}")
}

/// Translates an action into its wire event. `None` for pure waits.
pub fn to_outbound(action: &TimedAction, sender: &str) -> Option<OutboundEvent> {
    let timestamp = Utc::now();
    match action.kind {
        ActionKind::SendText => Some(OutboundEvent::Message {
            id: message_id(action.id),
            sender: sender.to_string(),
            kind: "text".to_string(),
            content: action.text.clone().unwrap_or_default(),
            metadata: json!({ "segment": action.segment }),
            timestamp,
        }),
        ActionKind::TypingOn => Some(OutboundEvent::TypingStatus {
            sender: sender.to_string(),
            active: true,
            flicker_ms: None,
            timestamp,
        }),
        ActionKind::TypingOff => Some(OutboundEvent::TypingStatus {
            sender: sender.to_string(),
            active: false,
            flicker_ms: None,
            timestamp,
        }),
        ActionKind::HesitateFlicker => Some(OutboundEvent::TypingStatus {
            sender: sender.to_string(),
            active: true,
            flicker_ms: Some(action.duration_ms),
            timestamp,
        }),
        ActionKind::SendRecall => action.target.map(|target| OutboundEvent::Recall {
            sender: sender.to_string(),
            target: message_id(target),
            timestamp,
        }),
        ActionKind::Wait => None,
    }
}

/// Sink that forwards wire events over a tokio mpsc channel, e.g. to a
/// websocket broadcast task. A closed receiver reads as a transport
/// failure and aborts the timeline.
pub struct ChannelSink {
    sender: String,
    tx: mpsc::Sender<OutboundEvent>,
}

impl ChannelSink {
    pub fn new(sender: impl Into<String>, tx: mpsc::Sender<OutboundEvent>) -> Self {
        Self {
            sender: sender.into(),
            tx,
        }
    }
}

#[async_trait]
impl ActionSink for ChannelSink {
    async fn emit(&mut self, action: &TimedAction) -> Result<()> {
        let Some(event) = to_outbound(action, &self.sender) else {
            return Ok(());
        };
        self.tx
            .send(event)
            .await
            .map_err(|e| EngineError::EmitFailure {
                action_id: action.id,
                message: format!("channel closed: {e}"),
            })
    }
}
