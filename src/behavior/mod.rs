//! The behavior engine: reply text in, timed action plan out.
//!
//! Component layering, leaves first: [`segmenter`] chunks the reply,
//! [`pause`] prices the delays, [`typo`] and [`hesitation`] decorate
//! segments, and [`timeline`] composes everything into one [`Timeline`].

pub mod emotion;
pub mod hesitation;
pub mod pause;
pub mod segmenter;
pub mod timeline;
pub mod typo;

use rand::rngs::StdRng;
use rand::SeedableRng;

pub use emotion::{EmotionMap, EmotionState, Intensity};
pub use hesitation::{HesitationCycle, HesitationSimulator};
pub use pause::PauseModel;
pub use segmenter::Segmenter;
pub use timeline::TimelineBuilder;
pub use typo::{TypoInjector, TypoPlan};

use crate::config::CharacterBehaviorConfig;
use crate::errors::Result;
use crate::types::Timeline;

/// Builds the playback timeline for one assistant turn.
///
/// Pure: given the same inputs and the same `seed`, the returned timeline
/// is byte-identical across calls. With `seed = None` the RNG is drawn
/// from OS entropy. The config is re-validated so a hand-constructed
/// value cannot smuggle bad knobs past the builder.
pub fn build_timeline(
    text: &str,
    config: &CharacterBehaviorConfig,
    emotion: &EmotionMap,
    seed: Option<u64>,
) -> Result<Timeline> {
    config.validate()?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    Ok(TimelineBuilder::new(config).build(&mut rng, text, emotion))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_timeline_rejects_invalid_config() {
        let mut config = CharacterBehaviorConfig::default();
        config.base_typo_rate = 2.0;
        let result = build_timeline("hi", &config, &EmotionMap::neutral(), Some(1));
        assert!(result.is_err());
    }

    #[test]
    fn test_build_timeline_deterministic() {
        let config = CharacterBehaviorConfig::default();
        let map = EmotionMap::neutral();
        let a = build_timeline("看看这个是不是稳定的输出。", &config, &map, Some(77)).unwrap();
        let b = build_timeline("看看这个是不是稳定的输出。", &config, &map, Some(77)).unwrap();
        assert_eq!(a, b);
    }
}
