//! Character behavior configuration.
//!
//! Every tunable knob of the engine lives on one immutable value object
//! owned by a character entity. Configs are validated at build/load time:
//! a bad range or probability is rejected before any timeline exists.

use std::fs;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::behavior::emotion::{EmotionState, Intensity};
use crate::errors::{EngineError, Result};

/// Inclusive millisecond range used for sampled delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Uniform sample within the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        rng.random_range(self.min_ms..=self.max_ms)
    }

    fn validate(&self, field: &str) -> Result<()> {
        if self.min_ms > self.max_ms {
            return Err(EngineError::config(
                field,
                format!("min ({}) exceeds max ({})", self.min_ms, self.max_ms),
            ));
        }
        Ok(())
    }
}

/// One `(threshold, lead_time)` pair of the typing lead-time curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadTime {
    /// Segment char-count threshold this pair covers (inclusive)
    pub threshold: usize,
    /// Typing duration before the send commits
    pub lead_ms: u64,
}

/// Per-state multiplicative factors (1.0 = no effect).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateFactors {
    pub neutral: f64,
    pub happy: f64,
    pub excited: f64,
    pub sad: f64,
    pub angry: f64,
    pub anxious: f64,
    pub confused: f64,
}

impl StateFactors {
    pub fn get(&self, state: EmotionState) -> f64 {
        match state {
            EmotionState::Neutral => self.neutral,
            EmotionState::Happy => self.happy,
            EmotionState::Excited => self.excited,
            EmotionState::Sad => self.sad,
            EmotionState::Angry => self.angry,
            EmotionState::Anxious => self.anxious,
            EmotionState::Confused => self.confused,
        }
    }

    fn validate(&self, field: &str) -> Result<()> {
        let all = [
            self.neutral,
            self.happy,
            self.excited,
            self.sad,
            self.angry,
            self.anxious,
            self.confused,
        ];
        if all.iter().any(|f| !f.is_finite() || *f < 0.0) {
            return Err(EngineError::config(field, "factors must be finite and >= 0"));
        }
        Ok(())
    }
}

/// How strongly an intensity bucket amplifies a state factor's deviation
/// from 1.0. Medium is the reference point (1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityScale {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub extreme: f64,
}

impl IntensityScale {
    pub fn get(&self, intensity: Intensity) -> f64 {
        match intensity {
            Intensity::Low => self.low,
            Intensity::Medium => self.medium,
            Intensity::High => self.high,
            Intensity::Extreme => self.extreme,
        }
    }
}

impl Default for IntensityScale {
    fn default() -> Self {
        Self {
            low: 0.5,
            medium: 1.0,
            high: 1.5,
            extreme: 2.0,
        }
    }
}

/// What the coordinator does when an interrupt arrives mid-timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptPolicy {
    /// Stop at the next action boundary and discard the rest
    #[default]
    AbortAtBoundary,
    /// Finish the current segment's actions, then stop
    FinishSegment,
}

/// All tunable knobs for one character, immutable once built.
///
/// Defaults reproduce the stock character tuning. Use
/// [`CharacterBehaviorConfig::builder`] to override individual knobs;
/// `build()` validates the result as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterBehaviorConfig {
    // Feature switches
    pub enable_segmentation: bool,
    pub enable_typo: bool,
    pub enable_recall: bool,
    pub enable_emotion: bool,

    // Segmentation
    pub max_segment_length: usize,
    /// Trailing fragments shorter than this merge into the prior segment
    pub min_viable_segment_length: usize,

    // Inter-segment gap
    pub segment_gap: DelayRange,
    /// Gap bonus per character of the preceding segment
    pub length_bonus_ms_per_char: u64,
    pub length_bonus_cap_ms: u64,

    // Typo / recall
    pub base_typo_rate: f64,
    pub typo_recall_rate: f64,
    /// Dwell time before the character notices and recalls a typo
    pub recall_delay_ms: u64,
    /// Typing time spent re-entering the corrected text
    pub retype_delay_ms: u64,
    /// Short beat between the recall and the corrected retype starting
    pub correction_gap_ms: u64,

    // Hesitation
    pub hesitation_probability: f64,
    pub hesitation_cycles_min: u32,
    pub hesitation_cycles_max: u32,
    pub hesitation_duration: DelayRange,
    pub hesitation_gap: DelayRange,

    // Typing lead-time curve: ascending thresholds; the smallest threshold
    // the segment length does not exceed wins, lengths beyond the last
    // threshold use the default.
    pub typing_lead_times: Vec<LeadTime>,
    pub typing_lead_default_ms: u64,

    // Entry delay: weighted choice over ranges. `entry_delay_weights` are
    // cumulative and cover all ranges but the last (remainder bucket).
    pub entry_delay_ranges: Vec<DelayRange>,
    pub entry_delay_weights: Vec<f64>,

    // Emotion modulation
    pub emotion_pause_factors: StateFactors,
    pub emotion_typo_factors: StateFactors,
    pub intensity_scale: IntensityScale,

    // Coordinator
    pub interrupt_policy: InterruptPolicy,
    /// Hard cap on segments per turn; excess is truncated with a warning
    pub max_segments: usize,
}

impl Default for CharacterBehaviorConfig {
    fn default() -> Self {
        Self {
            enable_segmentation: true,
            enable_typo: true,
            enable_recall: true,
            enable_emotion: true,

            max_segment_length: 50,
            min_viable_segment_length: 4,

            segment_gap: DelayRange::new(800, 6000),
            length_bonus_ms_per_char: 40,
            length_bonus_cap_ms: 6000,

            base_typo_rate: 0.05,
            typo_recall_rate: 0.75,
            recall_delay_ms: 2000,
            retype_delay_ms: 2500,
            correction_gap_ms: 300,

            hesitation_probability: 0.15,
            hesitation_cycles_min: 1,
            hesitation_cycles_max: 2,
            hesitation_duration: DelayRange::new(1500, 5000),
            hesitation_gap: DelayRange::new(500, 2000),

            typing_lead_times: vec![
                LeadTime { threshold: 6, lead_ms: 1200 },
                LeadTime { threshold: 15, lead_ms: 2000 },
                LeadTime { threshold: 28, lead_ms: 3800 },
                LeadTime { threshold: 34, lead_ms: 6000 },
                LeadTime { threshold: 50, lead_ms: 8800 },
            ],
            typing_lead_default_ms: 2500,

            entry_delay_ranges: vec![
                DelayRange::new(3000, 4000),
                DelayRange::new(4000, 6000),
                DelayRange::new(6000, 7000),
                DelayRange::new(8000, 9000),
            ],
            entry_delay_weights: vec![0.45, 0.75, 0.93],

            emotion_pause_factors: StateFactors {
                neutral: 1.0,
                happy: 0.9,
                excited: 0.8,
                sad: 1.4,
                angry: 0.7,
                anxious: 1.1,
                confused: 1.3,
            },
            emotion_typo_factors: StateFactors {
                neutral: 1.0,
                happy: 1.2,
                excited: 2.0,
                sad: 0.5,
                angry: 2.3,
                anxious: 1.3,
                confused: 0.3,
            },
            intensity_scale: IntensityScale::default(),

            interrupt_policy: InterruptPolicy::AbortAtBoundary,
            max_segments: 20,
        }
    }
}

fn check_probability(field: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) || !value.is_finite() {
        return Err(EngineError::config(
            field,
            format!("probability {value} outside [0, 1]"),
        ));
    }
    Ok(())
}

impl CharacterBehaviorConfig {
    pub fn builder() -> CharacterBehaviorConfigBuilder {
        CharacterBehaviorConfigBuilder::default()
    }

    /// Smallest entry delay the config can produce; the first action of any
    /// non-empty timeline is scheduled at or after this offset.
    pub fn min_entry_delay_ms(&self) -> u64 {
        self.entry_delay_ranges
            .iter()
            .map(|r| r.min_ms)
            .min()
            .unwrap_or(0)
    }

    /// Combined emotion factor: the state multiplier's deviation from 1.0,
    /// scaled by intensity. Neutral is exactly 1.0 at every intensity.
    pub fn pause_factor(&self, state: EmotionState, intensity: Intensity) -> f64 {
        let base = self.emotion_pause_factors.get(state);
        1.0 + (base - 1.0) * self.intensity_scale.get(intensity)
    }

    /// Typo-rate factor under the given emotion, same scaling as pauses.
    pub fn typo_factor(&self, state: EmotionState, intensity: Intensity) -> f64 {
        let base = self.emotion_typo_factors.get(state);
        1.0 + (base - 1.0) * self.intensity_scale.get(intensity)
    }

    /// Rejects invalid knob combinations. Called by the builder and by
    /// file loading, before the config reaches the engine.
    pub fn validate(&self) -> Result<()> {
        if self.max_segment_length == 0 {
            return Err(EngineError::config("max_segment_length", "must be > 0"));
        }
        if self.min_viable_segment_length > self.max_segment_length {
            return Err(EngineError::config(
                "min_viable_segment_length",
                "exceeds max_segment_length",
            ));
        }
        if self.max_segments == 0 {
            return Err(EngineError::config("max_segments", "must be > 0"));
        }

        check_probability("base_typo_rate", self.base_typo_rate)?;
        check_probability("typo_recall_rate", self.typo_recall_rate)?;
        check_probability("hesitation_probability", self.hesitation_probability)?;

        self.segment_gap.validate("segment_gap")?;
        self.hesitation_duration.validate("hesitation_duration")?;
        self.hesitation_gap.validate("hesitation_gap")?;

        if self.hesitation_cycles_min > self.hesitation_cycles_max {
            return Err(EngineError::config(
                "hesitation_cycles",
                "min exceeds max",
            ));
        }

        if self.typing_lead_times.is_empty() {
            return Err(EngineError::config("typing_lead_times", "must not be empty"));
        }
        if !self
            .typing_lead_times
            .windows(2)
            .all(|w| w[0].threshold < w[1].threshold)
        {
            return Err(EngineError::config(
                "typing_lead_times",
                "thresholds must be strictly ascending",
            ));
        }

        if self.entry_delay_ranges.is_empty() {
            return Err(EngineError::config("entry_delay_ranges", "must not be empty"));
        }
        for range in &self.entry_delay_ranges {
            range.validate("entry_delay_ranges")?;
        }
        if self.entry_delay_weights.len() + 1 != self.entry_delay_ranges.len() {
            return Err(EngineError::config(
                "entry_delay_weights",
                "need exactly one weight per range except the last",
            ));
        }
        for weight in &self.entry_delay_weights {
            check_probability("entry_delay_weights", *weight)?;
        }
        if !self.entry_delay_weights.windows(2).all(|w| w[0] < w[1]) {
            return Err(EngineError::config(
                "entry_delay_weights",
                "cumulative weights must be strictly ascending",
            ));
        }

        self.emotion_pause_factors.validate("emotion_pause_factors")?;
        self.emotion_typo_factors.validate("emotion_typo_factors")?;

        Ok(())
    }

    /// Loads a config file (TOML by extension, JSON otherwise) and
    /// validates it. A missing file yields the defaults.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| EngineError::ConfigLoad(format!("failed to read config: {e}")))?;

        let config: Self = if path.extension().is_some_and(|e| e == "toml") {
            toml::from_str(&content)
                .map_err(|e| EngineError::ConfigLoad(format!("invalid TOML config: {e}")))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| EngineError::ConfigLoad(format!("invalid JSON config: {e}")))?
        };

        config.validate()?;
        Ok(config)
    }
}

/// Builder for [`CharacterBehaviorConfig`]; starts from the defaults and
/// overrides individual knobs. `build()` validates the final value.
#[derive(Debug, Clone, Default)]
pub struct CharacterBehaviorConfigBuilder {
    config: CharacterBehaviorConfig,
}

impl CharacterBehaviorConfigBuilder {
    pub fn max_segment_length(mut self, len: usize) -> Self {
        self.config.max_segment_length = len;
        self
    }

    pub fn min_viable_segment_length(mut self, len: usize) -> Self {
        self.config.min_viable_segment_length = len;
        self
    }

    pub fn segment_gap(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.config.segment_gap = DelayRange::new(min_ms, max_ms);
        self
    }

    pub fn length_bonus(mut self, per_char_ms: u64, cap_ms: u64) -> Self {
        self.config.length_bonus_ms_per_char = per_char_ms;
        self.config.length_bonus_cap_ms = cap_ms;
        self
    }

    pub fn base_typo_rate(mut self, rate: f64) -> Self {
        self.config.base_typo_rate = rate;
        self
    }

    pub fn typo_recall_rate(mut self, rate: f64) -> Self {
        self.config.typo_recall_rate = rate;
        self
    }

    pub fn recall_delays(mut self, recall_ms: u64, retype_ms: u64) -> Self {
        self.config.recall_delay_ms = recall_ms;
        self.config.retype_delay_ms = retype_ms;
        self
    }

    pub fn hesitation_probability(mut self, probability: f64) -> Self {
        self.config.hesitation_probability = probability;
        self
    }

    pub fn hesitation_cycles(mut self, min: u32, max: u32) -> Self {
        self.config.hesitation_cycles_min = min;
        self.config.hesitation_cycles_max = max;
        self
    }

    pub fn entry_delay(mut self, ranges: Vec<DelayRange>, cumulative_weights: Vec<f64>) -> Self {
        self.config.entry_delay_ranges = ranges;
        self.config.entry_delay_weights = cumulative_weights;
        self
    }

    pub fn typing_lead_times(mut self, pairs: Vec<LeadTime>, default_ms: u64) -> Self {
        self.config.typing_lead_times = pairs;
        self.config.typing_lead_default_ms = default_ms;
        self
    }

    pub fn interrupt_policy(mut self, policy: InterruptPolicy) -> Self {
        self.config.interrupt_policy = policy;
        self
    }

    pub fn enable_typo(mut self, on: bool) -> Self {
        self.config.enable_typo = on;
        self
    }

    pub fn enable_segmentation(mut self, on: bool) -> Self {
        self.config.enable_segmentation = on;
        self
    }

    pub fn build(self) -> Result<CharacterBehaviorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(CharacterBehaviorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_min_exceeds_max_rejected() {
        let result = CharacterBehaviorConfig::builder()
            .segment_gap(5000, 100)
            .build();
        assert!(matches!(
            result,
            Err(crate::errors::EngineError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_probability_out_of_range_rejected() {
        let result = CharacterBehaviorConfig::builder().base_typo_rate(1.5).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_weight_count_mismatch_rejected() {
        let result = CharacterBehaviorConfig::builder()
            .entry_delay(vec![DelayRange::new(100, 200)], vec![0.5])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_non_ascending_lead_thresholds_rejected() {
        let result = CharacterBehaviorConfig::builder()
            .typing_lead_times(
                vec![
                    LeadTime { threshold: 15, lead_ms: 2000 },
                    LeadTime { threshold: 15, lead_ms: 3800 },
                ],
                2500,
            )
            .build();
        assert!(matches!(
            result,
            Err(crate::errors::EngineError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_non_ascending_cumulative_weights_rejected() {
        let result = CharacterBehaviorConfig::builder()
            .entry_delay(
                vec![
                    DelayRange::new(100, 200),
                    DelayRange::new(200, 300),
                    DelayRange::new(300, 400),
                ],
                vec![0.7, 0.4],
            )
            .build();
        assert!(matches!(
            result,
            Err(crate::errors::EngineError::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_min_entry_delay() {
        let config = CharacterBehaviorConfig::default();
        assert_eq!(config.min_entry_delay_ms(), 3000);
    }

    #[test]
    fn test_neutral_factor_is_noop_at_any_intensity() {
        use crate::behavior::emotion::{EmotionState, Intensity};
        let config = CharacterBehaviorConfig::default();
        for intensity in [
            Intensity::Low,
            Intensity::Medium,
            Intensity::High,
            Intensity::Extreme,
        ] {
            let factor = config.pause_factor(EmotionState::Neutral, intensity);
            assert!((factor - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_intensity_scales_deviation() {
        use crate::behavior::emotion::{EmotionState, Intensity};
        let config = CharacterBehaviorConfig::default();
        // happy pause factor is 0.9; at high intensity (scale 1.5) the
        // deviation of -0.1 becomes -0.15.
        let factor = config.pause_factor(EmotionState::Happy, Intensity::High);
        assert!((factor - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let path = Path::new("/nonexistent/behavior.toml");
        let config = CharacterBehaviorConfig::load_file(path).unwrap();
        assert_eq!(config, CharacterBehaviorConfig::default());
    }

    #[test]
    fn test_load_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("behavior.toml");
        let mut config = CharacterBehaviorConfig::default();
        config.base_typo_rate = 0.2;
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = CharacterBehaviorConfig::load_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("behavior.toml");
        let mut config = CharacterBehaviorConfig::default();
        config.base_typo_rate = 3.0;
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        assert!(CharacterBehaviorConfig::load_file(&path).is_err());
    }
}
