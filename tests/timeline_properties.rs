//! Property-style tests for timeline construction.
//!
//! These pin the externally observable guarantees of `build_timeline`:
//! ordering, bracketing, recall references, determinism, and the emotion
//! adjustment.

use chatterline::behavior::{EmotionMap, Segmenter};
use chatterline::config::CharacterBehaviorConfig;
use chatterline::{build_timeline, ActionKind, Timeline};

fn quiet_config() -> CharacterBehaviorConfig {
    CharacterBehaviorConfig::builder()
        .base_typo_rate(0.0)
        .hesitation_probability(0.0)
        .build()
        .expect("valid config")
}

fn noisy_config() -> CharacterBehaviorConfig {
    CharacterBehaviorConfig::builder()
        .base_typo_rate(1.0)
        .typo_recall_rate(1.0)
        .hesitation_probability(1.0)
        .build()
        .expect("valid config")
}

fn build(config: &CharacterBehaviorConfig, text: &str, seed: u64) -> Timeline {
    build_timeline(text, config, &EmotionMap::neutral(), Some(seed)).expect("build")
}

const SAMPLE_TEXTS: &[&str] = &[
    "hello over there, long time no see! how have you been doing lately?",
    "你好，我在忙。稍等一下哦",
    "第一句说完了。第二句继续讲点别的。第三句说完就收工了，今天先到这里。",
    "one plain ascii sentence with no punctuation at all just rambling on and on and on",
];

#[test]
fn offsets_are_non_decreasing_for_all_builds() {
    for config in [quiet_config(), noisy_config()] {
        for text in SAMPLE_TEXTS {
            for seed in 0..20 {
                let timeline = build(&config, text, seed);
                for pair in timeline.actions().windows(2) {
                    assert!(
                        pair[0].offset_ms <= pair[1].offset_ms,
                        "offsets regressed at seed {seed} for {text:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn first_offset_at_least_min_entry_delay() {
    let config = noisy_config();
    for text in SAMPLE_TEXTS {
        for seed in 0..20 {
            let timeline = build(&config, text, seed);
            let first = timeline.actions().first().expect("non-empty timeline");
            assert!(first.offset_ms >= config.min_entry_delay_ms());
        }
    }
}

#[test]
fn every_recall_references_an_earlier_send() {
    let config = noisy_config();
    for text in SAMPLE_TEXTS {
        for seed in 0..20 {
            let timeline = build(&config, text, seed);
            let actions = timeline.actions();
            for (idx, action) in actions.iter().enumerate() {
                if action.kind != ActionKind::SendRecall {
                    continue;
                }
                let target_id = action.target.expect("recall carries a target");
                let target = actions[..idx]
                    .iter()
                    .find(|a| a.id == target_id)
                    .expect("target appears earlier in the same timeline");
                assert_eq!(target.kind, ActionKind::SendText);
                assert!(target.offset_ms < action.offset_ms);
            }
        }
    }
}

#[test]
fn every_send_is_bracketed_by_typing() {
    let config = noisy_config();
    for text in SAMPLE_TEXTS {
        for seed in 0..20 {
            let timeline = build(&config, text, seed);
            let actions = timeline.actions();
            for (idx, action) in actions.iter().enumerate() {
                if action.kind != ActionKind::SendText {
                    continue;
                }
                assert!(idx >= 3, "send needs a preceding bracket");
                assert_eq!(actions[idx - 1].kind, ActionKind::TypingOff);
                assert_eq!(actions[idx - 2].kind, ActionKind::Wait);
                assert_eq!(actions[idx - 3].kind, ActionKind::TypingOn);
            }
        }
    }
}

#[test]
fn segmenter_is_identity_below_length_cap() {
    let segmenter = Segmenter::new(50, 4);
    for text in ["hi", "短句子。", "this stays in one piece"] {
        let segments = segmenter.segment(text);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, text);
    }
}

#[test]
fn zero_rates_yield_plain_bracket_per_segment() {
    let config = quiet_config();
    for text in SAMPLE_TEXTS {
        for seed in 0..10 {
            let timeline = build(&config, text, seed);
            let actions = timeline.actions();
            assert_eq!(actions.len() % 4, 0);
            for bracket in actions.chunks(4) {
                let kinds: Vec<ActionKind> = bracket.iter().map(|a| a.kind).collect();
                assert_eq!(
                    kinds,
                    vec![
                        ActionKind::TypingOn,
                        ActionKind::Wait,
                        ActionKind::TypingOff,
                        ActionKind::SendText,
                    ]
                );
            }
            assert_eq!(timeline.recall_count(), 0);
        }
    }
}

#[test]
fn identical_inputs_and_seed_are_byte_identical() {
    let config = CharacterBehaviorConfig::default();
    let emotion = EmotionMap::from_raw([("anxious", "extreme"), ("happy", "low")]);
    for text in SAMPLE_TEXTS {
        let a = build_timeline(text, &config, &emotion, Some(4242)).expect("build");
        let b = build_timeline(text, &config, &emotion, Some(4242)).expect("build");
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_vec(&a).expect("serialize"),
            serde_json::to_vec(&b).expect("serialize")
        );
    }
}

#[test]
fn chinese_two_segment_scenario() {
    let config = CharacterBehaviorConfig::builder()
        .max_segment_length(10)
        .base_typo_rate(0.0)
        .hesitation_probability(0.0)
        .build()
        .expect("valid config");

    let timeline = build(&config, "你好，我在忙。稍等一下哦", 1);
    assert_eq!(timeline.send_count(), 2);
    assert_eq!(timeline.len(), 8);
    assert_eq!(timeline.recall_count(), 0);

    let sends: Vec<&str> = timeline
        .iter()
        .filter_map(|a| a.text.as_deref())
        .collect();
    assert_eq!(sends, vec!["你好，我在忙。", "稍等一下哦"]);
}

#[test]
fn emotion_shifts_pause_by_configured_factor() {
    let config = quiet_config();
    let text = "一段固定的内容用来对比。";
    let seed = 31;

    let neutral = build_timeline(text, &config, &EmotionMap::neutral(), Some(seed)).expect("build");
    let happy_high = build_timeline(
        text,
        &config,
        &EmotionMap::from_raw([("happy", "high")]),
        Some(seed),
    )
    .expect("build");

    let wait_of = |timeline: &Timeline| {
        timeline
            .iter()
            .find(|a| a.kind == ActionKind::Wait)
            .expect("think wait present")
            .duration_ms
    };

    let neutral_wait = wait_of(&neutral);
    let happy_wait = wait_of(&happy_high);
    let factor = config.pause_factor(
        chatterline::EmotionState::Happy,
        chatterline::Intensity::High,
    );
    let expected = (neutral_wait as f64 * factor).round() as u64;
    assert_eq!(happy_wait, expected);
    assert_ne!(happy_wait, neutral_wait);
}

#[test]
fn empty_text_builds_empty_timeline() {
    let timeline = build(&CharacterBehaviorConfig::default(), "", 0);
    assert!(timeline.is_empty());
}
