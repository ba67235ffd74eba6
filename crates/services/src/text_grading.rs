use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use assess_core::model::{AssessmentItem, ParagraphPrompt, TextStats};
use assess_core::variant::percent;

use crate::config::TextGradingConfig;
use crate::error::TextGradingError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextGrade {
    /// Percentage in `0..=100`.
    pub score: u8,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// The text-quality collaborator.
#[async_trait]
pub trait TextGrader: Send + Sync {
    /// # Errors
    ///
    /// Returns `TextGradingError` if the grader cannot be reached or rejects
    /// the request.
    async fn grade(&self, prompt: &ParagraphPrompt, text: &str)
    -> Result<TextGrade, TextGradingError>;
}

/// Offline grader: scores how much of the word limit was used and
/// penalizes overshoot proportionally. Blank answers score zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTextGrader;

impl HeuristicTextGrader {
    #[must_use]
    pub fn score(prompt: &ParagraphPrompt, text: &str) -> u8 {
        let words = u64::from(TextStats::of(text).words);
        let limit = u64::from(prompt.word_limit());
        if words == 0 {
            0
        } else if words <= limit {
            percent(words, limit)
        } else {
            percent(limit, words)
        }
    }
}

#[async_trait]
impl TextGrader for HeuristicTextGrader {
    async fn grade(
        &self,
        prompt: &ParagraphPrompt,
        text: &str,
    ) -> Result<TextGrade, TextGradingError> {
        Ok(TextGrade {
            score: Self::score(prompt, text),
            feedback: None,
        })
    }
}

#[derive(Clone)]
pub struct HttpTextGrader {
    client: Client,
    config: TextGradingConfig,
}

impl HttpTextGrader {
    #[must_use]
    pub fn new(config: TextGradingConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl TextGrader for HttpTextGrader {
    async fn grade(
        &self,
        prompt: &ParagraphPrompt,
        text: &str,
    ) -> Result<TextGrade, TextGradingError> {
        let payload = GradeTextRequest {
            prompt: prompt.prompt(),
            text,
            word_limit: prompt.word_limit(),
        };
        let response = self
            .client
            .post(&self.config.url)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TextGradingError::HttpStatus(response.status()));
        }

        let mut grade: TextGrade = response.json().await?;
        grade.score = grade.score.min(100);
        Ok(grade)
    }
}

/// Uses the HTTP grader when `ASSESS_TEXT_GRADER_URL` is set, otherwise the
/// offline heuristic.
#[must_use]
pub fn text_grader_from_env() -> std::sync::Arc<dyn TextGrader> {
    match TextGradingConfig::from_env() {
        Some(config) => std::sync::Arc::new(HttpTextGrader::new(config)),
        None => std::sync::Arc::new(HeuristicTextGrader),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GradeTextRequest<'a> {
    prompt: &'a str,
    text: &'a str,
    word_limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::ItemId;

    fn prompt(limit: u32) -> ParagraphPrompt {
        ParagraphPrompt::new(ItemId::new(1), "Describe", limit).unwrap()
    }

    #[test]
    fn heuristic_rewards_using_the_limit() {
        let p = prompt(10);
        assert_eq!(HeuristicTextGrader::score(&p, "   "), 0);
        assert_eq!(HeuristicTextGrader::score(&p, "one two three four five"), 50);
        assert_eq!(
            HeuristicTextGrader::score(&p, &"word ".repeat(10)),
            100
        );
    }

    #[test]
    fn heuristic_penalizes_overshoot() {
        let p = prompt(10);
        assert_eq!(HeuristicTextGrader::score(&p, &"word ".repeat(20)), 50);
    }

    #[test]
    fn request_payload_is_camel_case() {
        let json = serde_json::to_value(GradeTextRequest {
            prompt: "p",
            text: "t",
            word_limit: 5,
        })
        .unwrap();
        assert_eq!(json["wordLimit"], 5);
    }

    #[tokio::test]
    async fn heuristic_grader_implements_trait() {
        let grade = HeuristicTextGrader
            .grade(&prompt(4), "a b c d")
            .await
            .unwrap();
        assert_eq!(grade.score, 100);
        assert_eq!(grade.feedback, None);
    }
}
