//! Advisory topic labels for selected headlines. Never fails a candidate:
//! any model error yields [`Category::General`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::{DynTextModel, GenerationParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    Research,
    Industry,
    Product,
    Policy,
    Funding,
    #[default]
    General,
}

impl Category {
    /// Labels the model may choose from.
    pub const CHOICES: [Category; 5] = [
        Category::Research,
        Category::Industry,
        Category::Product,
        Category::Policy,
        Category::Funding,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Research => "Research",
            Category::Industry => "Industry",
            Category::Product => "Product",
            Category::Policy => "Policy",
            Category::Funding => "Funding",
            Category::General => "General",
        }
    }

    /// First word of `s` that names a label, case-insensitive.
    pub fn parse_label(s: &str) -> Option<Category> {
        s.split(|c: char| !c.is_ascii_alphabetic())
            .filter(|w| !w.is_empty())
            .find_map(|w| {
                Self::CHOICES
                    .iter()
                    .copied()
                    .find(|c| c.as_str().eq_ignore_ascii_case(w))
            })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn category_prompt(title: &str, description: &str) -> String {
    let labels = Category::CHOICES
        .iter()
        .map(Category::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Classify this AI news headline into exactly one category: {labels}.\n\
         Answer with the category name only.\n\
         Headline: {title}\n\
         Summary: {description}"
    )
}

/// Model-backed categorizer with an in-memory cache keyed by title.
pub struct Categorizer {
    model: DynTextModel,
    params: GenerationParams,
    cache: Mutex<HashMap<String, Category>>,
    cache_cap: usize,
}

impl Categorizer {
    pub fn new(model: DynTextModel, params: GenerationParams, cache_cap: usize) -> Self {
        // Labels are one word; keep answers short and stable.
        let params = GenerationParams {
            temperature: 0.0,
            max_output_tokens: params.max_output_tokens.min(16),
            ..params
        };
        Self {
            model,
            params,
            cache: Mutex::new(HashMap::new()),
            cache_cap: cache_cap.max(1),
        }
    }

    pub async fn categorize(&self, title: &str, description: &str) -> Category {
        let key = title.trim().to_lowercase();
        if let Some(hit) = self.cached(&key) {
            return hit;
        }

        let prompt = category_prompt(title, description);
        let answer = match self.model.generate(&prompt, self.params).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = ?e, provider = self.model.name(), "categorize failed");
                return Category::default();
            }
        };

        match Category::parse_label(&answer) {
            Some(cat) => {
                self.store(key, cat);
                cat
            }
            None => {
                tracing::debug!(answer = %answer.trim(), "unrecognized category label");
                Category::default()
            }
        }
    }

    fn cached(&self, key: &str) -> Option<Category> {
        self.cache.lock().ok()?.get(key).copied()
    }

    fn store(&self, key: String, cat: Category) {
        if let Ok(mut g) = self.cache.lock() {
            if g.len() >= self.cache_cap {
                g.clear();
            }
            g.insert(key, cat);
        }
    }
}
