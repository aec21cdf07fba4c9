//! Headline-generation mode: the model writes the headlines itself.

use anyhow::{anyhow, Result};

use super::{DynTextModel, GenerationParams};

pub const HEADLINE_COUNT: usize = 5;

pub const HEADLINE_PROMPT: &str = "You are a professional AI news generator.
Generate 5 factual headlines about recent artificial intelligence developments.
Focus on major AI companies, research breakthroughs, and industry developments.
Keep headlines professional and informative.
Format: Return exactly 5 headlines, one per line.
Do not include any numbering or extra text.";

/// Non-empty trimmed lines, first five, otherwise verbatim.
pub fn split_headlines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(HEADLINE_COUNT)
        .map(str::to_string)
        .collect()
}

pub struct HeadlineGenerator {
    model: DynTextModel,
    params: GenerationParams,
}

impl HeadlineGenerator {
    pub fn new(model: DynTextModel, params: GenerationParams) -> Self {
        Self { model, params }
    }

    pub fn provider_name(&self) -> &'static str {
        self.model.name()
    }

    /// Up to five headlines; an answer without any usable line is an error.
    pub async fn generate(&self) -> Result<Vec<String>> {
        let text = self.model.generate(HEADLINE_PROMPT, self.params).await?;
        let lines = split_headlines(&text);
        if lines.is_empty() {
            return Err(anyhow!("no valid headlines generated"));
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelCfg;
    use crate::model::MockModel;
    use std::sync::Arc;

    #[test]
    fn split_skips_blank_lines_and_caps_at_five() {
        let text = "\n  A  \n\nB\nC\nD\nE\nF\n";
        assert_eq!(split_headlines(text), vec!["A", "B", "C", "D", "E"]);
    }

    #[tokio::test]
    async fn blank_answer_is_an_error() {
        let g = HeadlineGenerator::new(
            Arc::new(MockModel::new("\n \n")),
            GenerationParams::from(&ModelCfg::default()),
        );
        assert!(g.generate().await.is_err());
    }
}
