//! Hesitation simulation.
//!
//! Before a segment's real typing bracket, a character can visibly start
//! and abandon typing a few times. Each cycle is one flicker (typing
//! indicator on for a sampled duration) followed by a sampled gap of
//! silence.

use rand::Rng;

use crate::config::CharacterBehaviorConfig;

/// One flicker cycle: indicator on for `flicker_ms`, then quiet for
/// `gap_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HesitationCycle {
    pub flicker_ms: u64,
    pub gap_ms: u64,
}

/// Hesitation simulator bound to one character config.
#[derive(Debug, Clone, Copy)]
pub struct HesitationSimulator<'a> {
    config: &'a CharacterBehaviorConfig,
}

impl<'a> HesitationSimulator<'a> {
    pub fn new(config: &'a CharacterBehaviorConfig) -> Self {
        Self { config }
    }

    /// Decides whether this segment hesitates and, if so, samples the
    /// cycles. An empty vec means no hesitation.
    pub fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<HesitationCycle> {
        let p = self.config.hesitation_probability.clamp(0.0, 1.0);
        if p <= 0.0 || !rng.random_bool(p) {
            return Vec::new();
        }

        let cycles = rng.random_range(
            self.config.hesitation_cycles_min..=self.config.hesitation_cycles_max,
        );

        (0..cycles)
            .map(|_| HesitationCycle {
                flicker_ms: self.config.hesitation_duration.sample(rng),
                gap_ms: self.config.hesitation_gap.sample(rng),
            })
            .collect()
    }
}
