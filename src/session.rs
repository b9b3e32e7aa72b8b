//! Per-turn orchestration.
//!
//! Ties the external collaborators and the engine together for one
//! assistant turn: generate the reply, classify its emotion (with neutral
//! fallback), build the timeline, and drive it through a coordinator.
//! Debug tracing is an explicit per-turn option, never process-wide state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::behavior::build_timeline;
use crate::config::CharacterBehaviorConfig;
use crate::coordinator::{ActionSink, Coordinator, RunOutcome};
use crate::errors::Result;
use crate::providers::{classify_or_neutral, EmotionClassifier, TextGenerator, TurnContext};
use crate::types::Timeline;

/// Default deadline for the emotion classifier before falling back.
const DEFAULT_CLASSIFY_DEADLINE: Duration = Duration::from_secs(5);

/// Per-turn options, passed explicitly on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnOptions {
    /// Fixed RNG seed; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Log the full timeline before executing it
    pub debug: bool,
}

/// One user-character conversation's behavior pipeline.
///
/// Sessions share nothing mutable: each owns its config copy, and each
/// turn's timeline is executed by a task that exclusively owns it, so
/// independent sessions run concurrently without locking.
pub struct BehaviorSession {
    session_id: String,
    character_id: String,
    config: CharacterBehaviorConfig,
    generator: Arc<dyn TextGenerator>,
    classifier: Option<Arc<dyn EmotionClassifier>>,
    classify_deadline: Duration,
}

impl BehaviorSession {
    pub fn new(
        session_id: impl Into<String>,
        character_id: impl Into<String>,
        config: CharacterBehaviorConfig,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            character_id: character_id.into(),
            config,
            generator,
            classifier: None,
            classify_deadline: DEFAULT_CLASSIFY_DEADLINE,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn EmotionClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_classify_deadline(mut self, deadline: Duration) -> Self {
        self.classify_deadline = deadline;
        self
    }

    pub fn config(&self) -> &CharacterBehaviorConfig {
        &self.config
    }

    /// Builds the timeline for one turn without executing it.
    ///
    /// Generator failure propagates; classifier failure degrades to
    /// neutral. An empty generated reply yields an empty timeline: an
    /// intentional no-reply turn.
    pub async fn plan_turn(&self, user_message: &str, options: TurnOptions) -> Result<Timeline> {
        let context = TurnContext {
            session_id: self.session_id.clone(),
            character_id: self.character_id.clone(),
            user_message: user_message.to_string(),
        };

        let reply = self.generator.generate(&context).await?;
        let emotion = classify_or_neutral(
            self.classifier.as_deref(),
            &reply,
            &context,
            self.classify_deadline,
        )
        .await;

        let timeline = build_timeline(&reply, &self.config, &emotion, options.seed)?;
        info!(
            session = %self.session_id,
            actions = timeline.len(),
            sends = timeline.send_count(),
            duration_ms = timeline.total_duration_ms(),
            "turn planned"
        );

        if options.debug {
            for action in timeline.iter() {
                let preview = action
                    .text
                    .as_deref()
                    .map(|t| t.chars().take(30).collect::<String>())
                    .unwrap_or_default();
                debug!(
                    id = action.id,
                    kind = action.kind.as_str(),
                    offset_ms = action.offset_ms,
                    %preview,
                    "timeline action"
                );
            }
        }

        Ok(timeline)
    }

    /// Runs a full turn: plan, then play the timeline against `sink`.
    pub async fn run_turn(
        &self,
        user_message: &str,
        sink: &mut dyn ActionSink,
        interrupt: watch::Receiver<bool>,
        options: TurnOptions,
    ) -> Result<RunOutcome> {
        let timeline = self.plan_turn(user_message, options).await?;
        let mut coordinator = Coordinator::new(self.config.interrupt_policy);
        coordinator.run(timeline, sink, interrupt).await
    }
}
