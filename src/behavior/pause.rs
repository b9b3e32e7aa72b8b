//! Pause prediction.
//!
//! Computes the entry delay opening a turn, the per-segment think delay
//! (typing lead time), and the gap between consecutive segments. Emotion
//! modulates everything multiplicatively; neutral is a no-op.

use rand::Rng;

use crate::behavior::emotion::{EmotionState, Intensity};
use crate::config::CharacterBehaviorConfig;

/// Pause model bound to one character config.
#[derive(Debug, Clone, Copy)]
pub struct PauseModel<'a> {
    config: &'a CharacterBehaviorConfig,
}

impl<'a> PauseModel<'a> {
    pub fn new(config: &'a CharacterBehaviorConfig) -> Self {
        Self { config }
    }

    /// Delay before the first action of a turn: weighted choice over the
    /// configured ranges (cumulative weights, last range is the remainder
    /// bucket), then uniform within the chosen range.
    pub fn entry_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        let roll: f64 = rng.random_range(0.0..1.0);
        let ranges = &self.config.entry_delay_ranges;
        let weights = &self.config.entry_delay_weights;

        let idx = weights
            .iter()
            .position(|w| roll < *w)
            .unwrap_or(ranges.len() - 1);
        ranges[idx].sample(rng)
    }

    /// Think delay for a segment: how long the typing indicator stays on
    /// before the send commits. Picks the smallest lead-time threshold the
    /// segment length does not exceed (default beyond the last), then
    /// applies the emotion factor. Deterministic: no sampling involved.
    pub fn think_delay(
        &self,
        segment_len: usize,
        state: EmotionState,
        intensity: Intensity,
    ) -> u64 {
        let lead_ms = self
            .config
            .typing_lead_times
            .iter()
            .find(|pair| segment_len <= pair.threshold)
            .map(|pair| pair.lead_ms)
            .unwrap_or(self.config.typing_lead_default_ms);

        let factor = self.config.pause_factor(state, intensity);
        scale_ms(lead_ms, factor)
    }

    /// Gap between two consecutive segments: uniform within the configured
    /// range, jittered by a 0.8..1.2 variance, scaled by emotion, plus a
    /// capped per-character bonus for the segment just sent.
    pub fn segment_gap<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        prev_segment_len: usize,
        state: EmotionState,
        intensity: Intensity,
    ) -> u64 {
        let base = self.config.segment_gap.sample(rng);
        let variance: f64 = rng.random_range(0.8..1.2);
        let factor = self.config.pause_factor(state, intensity);

        let bonus = (prev_segment_len as u64 * self.config.length_bonus_ms_per_char)
            .min(self.config.length_bonus_cap_ms);

        scale_ms(base, variance * factor) + bonus
    }
}

/// Scales a millisecond value by a non-negative factor, rounding to the
/// nearest ms.
fn scale_ms(ms: u64, factor: f64) -> u64 {
    ((ms as f64) * factor).round().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> CharacterBehaviorConfig {
        CharacterBehaviorConfig::default()
    }

    #[test]
    fn test_entry_delay_within_configured_ranges() {
        let config = config();
        let model = PauseModel::new(&config);
        let mut rng = StdRng::seed_from_u64(7);
        let lo = config.min_entry_delay_ms();
        let hi = config
            .entry_delay_ranges
            .iter()
            .map(|r| r.max_ms)
            .max()
            .unwrap();
        for _ in 0..200 {
            let delay = model.entry_delay(&mut rng);
            assert!(delay >= lo && delay <= hi, "delay {delay} out of [{lo}, {hi}]");
        }
    }

    #[test]
    fn test_entry_delay_deterministic_under_seed() {
        let config = config();
        let model = PauseModel::new(&config);
        let a: Vec<u64> = {
            let mut rng = StdRng::seed_from_u64(42);
            (0..16).map(|_| model.entry_delay(&mut rng)).collect()
        };
        let b: Vec<u64> = {
            let mut rng = StdRng::seed_from_u64(42);
            (0..16).map(|_| model.entry_delay(&mut rng)).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_think_delay_follows_lead_time_curve() {
        let config = config();
        let model = PauseModel::new(&config);
        let neutral = |len| model.think_delay(len, EmotionState::Neutral, Intensity::Medium);

        assert_eq!(neutral(3), 1200);
        assert_eq!(neutral(6), 1200);
        assert_eq!(neutral(7), 2000);
        assert_eq!(neutral(30), 6000);
        assert_eq!(neutral(50), 8800);
        // beyond the last threshold: configured default
        assert_eq!(neutral(51), config.typing_lead_default_ms);
    }

    #[test]
    fn test_emotion_scales_think_delay() {
        let config = config();
        let model = PauseModel::new(&config);
        let neutral = model.think_delay(10, EmotionState::Neutral, Intensity::Medium);
        let happy_high = model.think_delay(10, EmotionState::Happy, Intensity::High);
        let expected = (neutral as f64 * config.pause_factor(EmotionState::Happy, Intensity::High))
            .round() as u64;
        assert_eq!(happy_high, expected);
        assert_ne!(happy_high, neutral);
    }

    #[test]
    fn test_segment_gap_includes_length_bonus() {
        let config = CharacterBehaviorConfig::builder()
            .segment_gap(1000, 1000)
            .build()
            .unwrap();
        let model = PauseModel::new(&config);
        let mut rng_a = StdRng::seed_from_u64(5);
        let mut rng_b = StdRng::seed_from_u64(5);

        let short = model.segment_gap(&mut rng_a, 0, EmotionState::Neutral, Intensity::Medium);
        let long = model.segment_gap(&mut rng_b, 100, EmotionState::Neutral, Intensity::Medium);
        // same rng state, so the difference is exactly the capped bonus
        assert_eq!(long - short, config.length_bonus_cap_ms.min(100 * 40));
    }
}
