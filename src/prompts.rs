//! Prompt templates for assistant recommendations.
//!
//! Rendering is deterministic: the same scores always produce the same text.

use crate::scoring::{round_score, PillarScore};

/// A prompt template with a `{scores}` placeholder.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub slug: &'static str,
    pub user: &'static str,
}

impl PromptTemplate {
    /// Render with one `- <pillar>: <score>` line per pillar, in the given order.
    pub fn render(&self, pillars: &[PillarScore]) -> String {
        let lines = pillars
            .iter()
            .map(|p| format!("- {}: {:.2}", p.pillar, round_score(p.score)))
            .collect::<Vec<_>>()
            .join("\n");
        self.user.replace("{scores}", &lines)
    }
}

pub const DEFAULT_PROMPT: PromptTemplate = PromptTemplate {
    slug: "recommendation_v1",
    user: "My AI readiness scores are:\n{scores}\n\nWhat is my overall maturity level and how can I improve?",
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::MaturityLevel;

    fn score(pillar: &str, score: f64) -> PillarScore {
        PillarScore {
            pillar: pillar.into(),
            score,
            level: MaturityLevel::from_score(score),
        }
    }

    #[test]
    fn renders_scores_in_order() {
        let text = DEFAULT_PROMPT.render(&[
            score("1. Infrastructure Layer", 0.8),
            score("2. Orchestration Layer", 4.0),
        ]);
        assert_eq!(
            text,
            "My AI readiness scores are:\n\
             - 1. Infrastructure Layer: 0.80\n\
             - 2. Orchestration Layer: 4.00\n\
             \n\
             What is my overall maturity level and how can I improve?"
        );
    }

}
