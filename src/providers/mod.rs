//! External collaborator interfaces.
//!
//! The engine never generates text or classifies emotion itself; both are
//! behind async traits implemented by the embedding application. Generator
//! failure is fatal for the turn (no timeline is built); classifier
//! failure never is: it always degrades to `{neutral: medium}`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::behavior::EmotionMap;
use crate::errors::Result;

/// Context for one assistant turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnContext {
    pub session_id: String,
    pub character_id: String,
    /// The user message being replied to
    pub user_message: String,
}

/// Produces the raw reply text for a turn.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, context: &TurnContext) -> Result<String>;
}

/// Classifies the emotional tone of a reply.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self, text: &str, context: &TurnContext) -> Result<EmotionMap>;
}

/// Runs the classifier with a deadline, recovering every failure mode
/// (absent classifier, error, timeout) to the neutral map.
pub async fn classify_or_neutral(
    classifier: Option<&dyn EmotionClassifier>,
    text: &str,
    context: &TurnContext,
    deadline: Duration,
) -> EmotionMap {
    let Some(classifier) = classifier else {
        return EmotionMap::neutral();
    };

    match tokio::time::timeout(deadline, classifier.classify(text, context)).await {
        Ok(Ok(map)) if !map.is_empty() => map,
        Ok(Ok(_)) => EmotionMap::neutral(),
        Ok(Err(e)) => {
            warn!(error = %e, "emotion classification failed, using neutral");
            EmotionMap::neutral()
        }
        Err(_) => {
            warn!(deadline_ms = deadline.as_millis() as u64, "emotion classification timed out, using neutral");
            EmotionMap::neutral()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{EmotionState, Intensity};
    use crate::errors::EngineError;

    struct FixedClassifier(EmotionMap);

    #[async_trait]
    impl EmotionClassifier for FixedClassifier {
        async fn classify(&self, _text: &str, _context: &TurnContext) -> Result<EmotionMap> {
            Ok(self.0.clone())
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl EmotionClassifier for FailingClassifier {
        async fn classify(&self, _text: &str, _context: &TurnContext) -> Result<EmotionMap> {
            Err(EngineError::GenerationFailed("upstream 500".to_string()))
        }
    }

    struct SlowClassifier;

    #[async_trait]
    impl EmotionClassifier for SlowClassifier {
        async fn classify(&self, _text: &str, _context: &TurnContext) -> Result<EmotionMap> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(EmotionMap::neutral())
        }
    }

    #[tokio::test]
    async fn test_absent_classifier_is_neutral() {
        let map = classify_or_neutral(None, "hi", &TurnContext::default(), Duration::from_secs(1)).await;
        assert_eq!(map, EmotionMap::neutral());
    }

    #[tokio::test]
    async fn test_classifier_result_passes_through() {
        let classifier = FixedClassifier(EmotionMap::from_raw([("happy", "high")]));
        let map = classify_or_neutral(
            Some(&classifier),
            "hi",
            &TurnContext::default(),
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(map.primary(), (EmotionState::Happy, Intensity::High));
    }

    #[tokio::test]
    async fn test_classifier_error_recovers_to_neutral() {
        let map = classify_or_neutral(
            Some(&FailingClassifier),
            "hi",
            &TurnContext::default(),
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(map, EmotionMap::neutral());
    }

    #[tokio::test]
    async fn test_classifier_timeout_recovers_to_neutral() {
        let map = classify_or_neutral(
            Some(&SlowClassifier),
            "hi",
            &TurnContext::default(),
            Duration::from_millis(10),
        )
        .await;
        assert_eq!(map, EmotionMap::neutral());
    }
}
