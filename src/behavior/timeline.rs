//! Timeline assembly.
//!
//! Composes the segmenter, pause model, typo injector, and hesitation
//! simulator into one absolutely-timed action list per assistant turn.
//! Building is pure: every random decision is drawn from the caller's RNG
//! while the timeline is assembled, never during playback.

use rand::Rng;
use tracing::{debug, warn};

use crate::behavior::emotion::{EmotionMap, EmotionState, Intensity};
use crate::behavior::hesitation::HesitationSimulator;
use crate::behavior::pause::PauseModel;
use crate::behavior::segmenter::Segmenter;
use crate::behavior::typo::{TypoInjector, TypoPlan};
use crate::config::CharacterBehaviorConfig;
use crate::types::{ActionId, ActionKind, Segment, TimedAction, Timeline};

/// Builds timelines for one character config.
#[derive(Debug, Clone, Copy)]
pub struct TimelineBuilder<'a> {
    config: &'a CharacterBehaviorConfig,
}

/// Mutable assembly state threaded through one build.
struct Assembly {
    actions: Vec<TimedAction>,
    next_id: ActionId,
    offset_ms: u64,
}

impl Assembly {
    fn push(&mut self, segment: usize, kind: ActionKind, text: Option<String>, duration_ms: u64) -> ActionId {
        let id = self.next_id;
        self.next_id += 1;
        self.actions.push(TimedAction {
            id,
            segment,
            kind,
            text,
            offset_ms: self.offset_ms,
            duration_ms,
            target: None,
        });
        id
    }

    fn push_recall(&mut self, segment: usize, target: ActionId) {
        let id = self.next_id;
        self.next_id += 1;
        self.actions.push(TimedAction {
            id,
            segment,
            kind: ActionKind::SendRecall,
            text: None,
            offset_ms: self.offset_ms,
            duration_ms: 0,
            target: Some(target),
        });
    }
}

impl<'a> TimelineBuilder<'a> {
    pub fn new(config: &'a CharacterBehaviorConfig) -> Self {
        Self { config }
    }

    /// Assembles the timeline for one reply.
    ///
    /// Empty input yields an empty timeline: an intentional no-reply turn.
    pub fn build<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        text: &str,
        emotion: &EmotionMap,
    ) -> Timeline {
        let segments = self.segment(text);
        if segments.is_empty() {
            return Timeline::default();
        }

        let (state, intensity) = if self.config.enable_emotion {
            emotion.primary()
        } else {
            (EmotionState::Neutral, Intensity::Medium)
        };

        let pause = PauseModel::new(self.config);
        let typo = TypoInjector::new(self.config);
        let hesitation = HesitationSimulator::new(self.config);

        let mut asm = Assembly {
            actions: Vec::new(),
            next_id: 0,
            offset_ms: pause.entry_delay(rng),
        };

        let last_index = segments.len() - 1;
        for segment in &segments {
            self.build_segment(rng, &mut asm, segment, state, intensity, &pause, &typo, &hesitation);

            if segment.index < last_index {
                asm.offset_ms += pause.segment_gap(rng, segment.len, state, intensity);
            }
        }

        debug!(
            segments = segments.len(),
            actions = asm.actions.len(),
            duration_ms = asm.offset_ms,
            emotion = ?state,
            "timeline assembled"
        );

        Timeline::from_actions(asm.actions)
    }

    fn segment(&self, text: &str) -> Vec<Segment> {
        let mut segments = if self.config.enable_segmentation {
            Segmenter::new(
                self.config.max_segment_length,
                self.config.min_viable_segment_length,
            )
            .segment(text)
        } else if text.trim().is_empty() {
            Vec::new()
        } else {
            vec![Segment::new(0, text)]
        };

        // Guard against malformed generation flooding the chat.
        if segments.len() > self.config.max_segments {
            warn!(
                segments = segments.len(),
                cap = self.config.max_segments,
                "excessive segments, truncating"
            );
            segments.truncate(self.config.max_segments);
        }
        segments
    }

    #[allow(clippy::too_many_arguments)]
    fn build_segment<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        asm: &mut Assembly,
        segment: &Segment,
        state: EmotionState,
        intensity: Intensity,
        pause: &PauseModel<'_>,
        typo: &TypoInjector<'_>,
        hesitation: &HesitationSimulator<'_>,
    ) {
        let i = segment.index;

        for cycle in hesitation.plan(rng) {
            asm.push(i, ActionKind::HesitateFlicker, None, cycle.flicker_ms);
            asm.offset_ms += cycle.flicker_ms + cycle.gap_ms;
        }

        let think_ms = pause.think_delay(segment.len, state, intensity);
        match typo.plan(rng, &segment.text, state, intensity) {
            TypoPlan::Clean => {
                self.typing_bracket(asm, i, think_ms, segment.text.clone());
            }
            TypoPlan::Uncaught { corrupted } => {
                self.typing_bracket(asm, i, think_ms, corrupted);
            }
            TypoPlan::Caught { corrupted } => {
                let typo_send = self.typing_bracket(asm, i, think_ms, corrupted);

                // The recall must land strictly after its target.
                asm.offset_ms += self.config.recall_delay_ms.max(1);
                asm.push_recall(i, typo_send);

                asm.offset_ms += self.config.correction_gap_ms;
                self.typing_bracket(asm, i, self.config.retype_delay_ms, segment.text.clone());
            }
        }
    }

    /// Emits `typing_on -> wait(think) -> typing_off -> send_text` and
    /// returns the send's id. Every send in a timeline goes through here,
    /// so the bracketing invariant holds by construction.
    fn typing_bracket(
        &self,
        asm: &mut Assembly,
        segment: usize,
        think_ms: u64,
        text: String,
    ) -> ActionId {
        asm.push(segment, ActionKind::TypingOn, None, 0);
        asm.push(segment, ActionKind::Wait, None, think_ms);
        asm.offset_ms += think_ms;
        asm.push(segment, ActionKind::TypingOff, None, 0);
        asm.push(segment, ActionKind::SendText, Some(text), 0)
    }
}
