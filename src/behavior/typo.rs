//! Typo injection.
//!
//! Probabilistically corrupts a segment and decides whether the character
//! "catches" the mistake. An uncaught typo ships as-is; that is an
//! intentional imperfection. All randomness is drawn from the caller's RNG
//! at plan time, so an aborted timeline leaves no pending decisions.

use rand::Rng;

use crate::behavior::emotion::{EmotionState, Intensity};
use crate::config::CharacterBehaviorConfig;

/// QWERTY adjacency used for substitution typos on ASCII letters.
fn keyboard_neighbors(ch: char) -> &'static [char] {
    match ch.to_ascii_lowercase() {
        'q' => &['w', 'a'],
        'w' => &['q', 'e', 's'],
        'e' => &['w', 'r', 'd'],
        'r' => &['e', 't', 'f'],
        't' => &['r', 'y', 'g'],
        'y' => &['t', 'u', 'h'],
        'u' => &['y', 'i', 'j'],
        'i' => &['u', 'o', 'k'],
        'o' => &['i', 'p', 'l'],
        'p' => &['o', 'l'],
        'a' => &['q', 's', 'z'],
        's' => &['a', 'w', 'd', 'x'],
        'd' => &['s', 'e', 'f', 'c'],
        'f' => &['d', 'r', 'g', 'v'],
        'g' => &['f', 't', 'h', 'b'],
        'h' => &['g', 'y', 'j', 'n'],
        'j' => &['h', 'u', 'k', 'm'],
        'k' => &['j', 'i', 'l'],
        'l' => &['k', 'o', 'p'],
        'z' => &['a', 'x'],
        'x' => &['z', 's', 'c'],
        'c' => &['x', 'd', 'v'],
        'v' => &['c', 'f', 'b'],
        'b' => &['v', 'g', 'n'],
        'n' => &['b', 'h', 'm'],
        'm' => &['n', 'j'],
        _ => &[],
    }
}

/// How a single character is corrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CorruptionKind {
    Substitute,
    Drop,
    Duplicate,
}

/// The typo decision for one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypoPlan {
    /// No typo; send the segment text as-is
    Clean,
    /// Typo ships and the character never notices
    Uncaught { corrupted: String },
    /// Typo ships, is recalled, and the original text is re-sent
    Caught { corrupted: String },
}

/// Typo injector bound to one character config.
#[derive(Debug, Clone, Copy)]
pub struct TypoInjector<'a> {
    config: &'a CharacterBehaviorConfig,
}

impl<'a> TypoInjector<'a> {
    pub fn new(config: &'a CharacterBehaviorConfig) -> Self {
        Self { config }
    }

    /// Effective typo rate for the given emotion, clamped to [0, 1].
    pub fn adjusted_rate(&self, state: EmotionState, intensity: Intensity) -> f64 {
        (self.config.base_typo_rate * self.config.typo_factor(state, intensity))
            .clamp(0.0, 1.0)
    }

    /// Resolves the full typo decision for one segment.
    pub fn plan<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        text: &str,
        state: EmotionState,
        intensity: Intensity,
    ) -> TypoPlan {
        if !self.config.enable_typo {
            return TypoPlan::Clean;
        }

        let rate = self.adjusted_rate(state, intensity);
        if rate <= 0.0 || !rng.random_bool(rate) {
            return TypoPlan::Clean;
        }

        let Some(corrupted) = corrupt(rng, text) else {
            return TypoPlan::Clean;
        };

        let caught = self.config.enable_recall
            && self.config.typo_recall_rate > 0.0
            && rng.random_bool(self.config.typo_recall_rate.clamp(0.0, 1.0));

        if caught {
            TypoPlan::Caught { corrupted }
        } else {
            TypoPlan::Uncaught { corrupted }
        }
    }
}

/// Applies one corruption to `text`: substitute (keyboard neighbor), drop,
/// or duplicate a character in the last two thirds of the segment. Returns
/// `None` when the text is too short to corrupt convincingly.
fn corrupt<R: Rng + ?Sized>(rng: &mut R, text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 2 {
        return None;
    }

    // Typos near the start of a message read as implausible; the original
    // system confines them to the final two thirds.
    let min_pos = std::cmp::max(1, chars.len() / 3);
    let pos = rng.random_range(min_pos..chars.len());
    let target = chars[pos];

    let mut kinds: Vec<CorruptionKind> = vec![CorruptionKind::Drop, CorruptionKind::Duplicate];
    if !keyboard_neighbors(target).is_empty() {
        kinds.push(CorruptionKind::Substitute);
    }
    let kind = kinds[rng.random_range(0..kinds.len())];

    let mut out: Vec<char> = chars.clone();
    match kind {
        CorruptionKind::Substitute => {
            let neighbors = keyboard_neighbors(target);
            let replacement = neighbors[rng.random_range(0..neighbors.len())];
            out[pos] = if target.is_ascii_uppercase() {
                replacement.to_ascii_uppercase()
            } else {
                replacement
            };
        }
        CorruptionKind::Drop => {
            out.remove(pos);
        }
        CorruptionKind::Duplicate => {
            out.insert(pos, target);
        }
    }

    let corrupted: String = out.into_iter().collect();
    if corrupted == text {
        return None;
    }
    Some(corrupted)
}
