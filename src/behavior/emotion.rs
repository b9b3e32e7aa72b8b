//! Emotion interpretation.
//!
//! Emotion data arrives from the classifier as a map of label -> intensity
//! bucket. The engine reduces that map to a primary [`EmotionState`] plus
//! its [`Intensity`], which the pause model and typo injector consume.
//! A missing or failed classification always degrades to `{neutral: medium}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Emotion states that affect message behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionState {
    Neutral,
    Happy,
    Excited,
    Sad,
    Angry,
    Anxious,
    Confused,
}

impl EmotionState {
    /// Maps a classifier label (with common aliases) to a state.
    /// Unknown labels fall back to neutral.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "happy" | "playful" | "affectionate" | "caring" => Self::Happy,
            "excited" | "surprised" => Self::Excited,
            "sad" | "tired" | "bored" => Self::Sad,
            "angry" | "mad" => Self::Angry,
            "anxious" | "nervous" | "embarrassed" => Self::Anxious,
            "confused" | "shy" => Self::Confused,
            _ => Self::Neutral,
        }
    }
}

/// Intensity bucket attached to an emotion label.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
    Extreme,
}

impl Intensity {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "extreme" => Some(Self::Extreme),
            _ => None,
        }
    }
}

/// Normalized emotion map: label -> intensity bucket.
///
/// Keys are kept sorted so the primary-emotion resolution is stable when
/// two labels share the highest intensity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionMap {
    entries: BTreeMap<String, Intensity>,
}

impl EmotionMap {
    /// The universal fallback: `{neutral: medium}`.
    pub fn neutral() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert("neutral".to_string(), Intensity::Medium);
        Self { entries }
    }

    /// Normalizes a raw classifier payload. Blank labels and unknown
    /// intensity strings are dropped; an empty result becomes neutral.
    pub fn from_raw<'a, I>(raw: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut entries = BTreeMap::new();
        for (label, intensity) in raw {
            let label = label.trim().to_lowercase();
            if label.is_empty() {
                continue;
            }
            if let Some(intensity) = Intensity::from_label(intensity) {
                entries.insert(label, intensity);
            }
        }
        if entries.is_empty() {
            return Self::neutral();
        }
        Self { entries }
    }

    pub fn insert(&mut self, label: &str, intensity: Intensity) {
        self.entries.insert(label.trim().to_lowercase(), intensity);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves the map to its dominant (state, intensity) pair: the entry
    /// with the highest intensity, ties broken by label order.
    pub fn primary(&self) -> (EmotionState, Intensity) {
        self.entries
            .iter()
            .max_by_key(|(_, intensity)| **intensity)
            .map(|(label, intensity)| (EmotionState::from_label(label), *intensity))
            .unwrap_or((EmotionState::Neutral, Intensity::Medium))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_map_is_neutral() {
        let map = EmotionMap::from_raw(std::iter::empty());
        assert_eq!(map.primary(), (EmotionState::Neutral, Intensity::Medium));
    }

    #[test]
    fn test_unknown_intensity_dropped() {
        let map = EmotionMap::from_raw([("happy", "very"), ("sad", "low")]);
        assert_eq!(map.primary(), (EmotionState::Sad, Intensity::Low));
    }

    #[test]
    fn test_highest_intensity_wins() {
        let map = EmotionMap::from_raw([("happy", "low"), ("angry", "extreme")]);
        assert_eq!(map.primary(), (EmotionState::Angry, Intensity::Extreme));
    }

    #[test]
    fn test_alias_labels() {
        assert_eq!(EmotionState::from_label("Mad"), EmotionState::Angry);
        assert_eq!(EmotionState::from_label("shy"), EmotionState::Confused);
        assert_eq!(EmotionState::from_label("surprised"), EmotionState::Excited);
        assert_eq!(EmotionState::from_label("???"), EmotionState::Neutral);
    }

    #[test]
    fn test_tie_break_is_stable() {
        let a = EmotionMap::from_raw([("happy", "high"), ("anxious", "high")]);
        let b = EmotionMap::from_raw([("anxious", "high"), ("happy", "high")]);
        assert_eq!(a.primary(), b.primary());
    }
}
