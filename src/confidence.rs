use crate::config::ScoringWeights;
use crate::identity::{contains_word, find_closest_celebrity_match};
use crate::vocabulary::Vocabulary;

/// Scores a resolved name against the reference list and its surrounding text.
pub struct ConfidenceScorer {
    weights: ScoringWeights,
    action_words: Vec<String>,
    outfit_keywords: Vec<String>,
}

impl ConfidenceScorer {
    pub fn new(vocab: &Vocabulary, weights: ScoringWeights) -> Self {
        Self {
            weights,
            action_words: vocab.action_words.iter().map(|w| w.to_lowercase()).collect(),
            outfit_keywords: vocab.outfit_keywords.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score in `[0, 1]`; zero when `name` has no reference match at all.
    pub fn score(&self, name: &str, references: &[String], context: &str) -> f64 {
        let Some(matched) = find_closest_celebrity_match(name, references) else {
            return 0.0;
        };

        let mut score = self.weights.reference_match;
        if matched.to_lowercase() == name.trim().to_lowercase() {
            score += self.weights.exact_bonus;
        }

        let lower = context.to_lowercase();
        if self.action_words.iter().any(|w| contains_word(&lower, w)) {
            score += self.weights.action_bonus;
        }
        if self.outfit_keywords.iter().any(|w| contains_word(&lower, w)) {
            score += self.weights.outfit_keyword_bonus;
        }

        score.clamp(0.0, 1.0)
    }

    /// Whether an item with this score may enter the result set.
    pub fn accepts(&self, score: f64, exact: bool) -> bool {
        exact || score > self.weights.acceptance_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> (ConfidenceScorer, Vec<String>) {
        let vocab = Vocabulary::default();
        (
            ConfidenceScorer::new(&vocab, ScoringWeights::default()),
            vocab.celebrities,
        )
    }

    #[test]
    fn unknown_name_scores_zero() {
        let (s, refs) = scorer();
        assert_eq!(s.score("Jane Doe", &refs, "Jane Doe wore a red dress"), 0.0);
    }

    #[test]
    fn exact_name_with_action_and_keyword_caps_at_one() {
        let (s, refs) = scorer();
        let score = s.score("Zendaya", &refs, "Zendaya wore a stunning outfit");
        assert_eq!(score, 1.0);
    }

    #[test]
    fn fuzzy_name_without_context_gets_base_only() {
        let (s, refs) = scorer();
        let score = s.score("Beyonce", &refs, "A silver gown covered in crystals");
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn context_bonuses_add_up() {
        let (s, refs) = scorer();
        let action_only = s.score("Beyonce", &refs, "Beyonce donned a silver gown");
        assert!((action_only - 0.7).abs() < 1e-9);
        let keyword_only = s.score("Beyonce", &refs, "Beyonce and her silver look");
        assert!((keyword_only - 0.6).abs() < 1e-9);
    }

    #[test]
    fn acceptance_gate() {
        let (s, _) = scorer();
        assert!(!s.accepts(0.6, false));
        assert!(s.accepts(0.61, false));
        assert!(s.accepts(0.0, true));
    }
}
