// src/select.rs
//! Ranking, deduplication and padding of the merged candidate list.
//!
//! Both selection policies run through the same aggregator; a policy only
//! contributes an optional pre-filter and a comparator. Sorting is stable,
//! so ties beyond the comparator keep encounter order.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::SelectionPolicy;
use crate::ingest::types::Candidate;
use crate::relevance::KeywordScorer;

pub const QUEUE_LEN: usize = 5;

fn by_recency(a: &Candidate, b: &Candidate) -> Ordering {
    b.published_at.cmp(&a.published_at)
}

fn by_recency_then_score(a: &Candidate, b: &Candidate) -> Ordering {
    by_recency(a, b).then_with(|| b.relevance_score.cmp(&a.relevance_score))
}

struct Strategy {
    /// Scores candidates and drops irrelevant ones when set.
    relevance_gate: bool,
    compare: fn(&Candidate, &Candidate) -> Ordering,
}

impl From<SelectionPolicy> for Strategy {
    fn from(policy: SelectionPolicy) -> Self {
        match policy {
            SelectionPolicy::Recency => Strategy {
                relevance_gate: false,
                compare: by_recency,
            },
            SelectionPolicy::Relevance => Strategy {
                relevance_gate: true,
                compare: by_recency_then_score,
            },
        }
    }
}

/// Keep the first occurrence of each case-insensitive, trimmed title.
pub fn dedup_by_title(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.dedup_key()))
        .collect()
}

/// Rank the merged live candidates under `policy` and keep at most five.
pub fn select_live(
    mut candidates: Vec<Candidate>,
    policy: SelectionPolicy,
    scorer: &KeywordScorer,
) -> Vec<Candidate> {
    let strategy = Strategy::from(policy);

    candidates.retain(|c| !c.title.trim().is_empty());
    if strategy.relevance_gate {
        for c in candidates.iter_mut() {
            c.relevance_score = scorer.score_candidate(c);
        }
        let before = candidates.len();
        candidates.retain(|c| c.relevance_score > 0);
        tracing::debug!(dropped = before - candidates.len(), "irrelevant candidates dropped");
    }

    candidates.sort_by(strategy.compare);
    let mut out = dedup_by_title(candidates);
    out.truncate(QUEUE_LEN);
    out
}

/// Append catalog entries (in catalog order) until five are present.
/// Catalog titles already shown live are skipped. Returns the queue and
/// how many entries were padded.
pub fn fill_from_catalog(
    mut live: Vec<Candidate>,
    catalog: Vec<Candidate>,
) -> (Vec<Candidate>, usize) {
    live.truncate(QUEUE_LEN);
    let mut seen: HashSet<String> = live.iter().map(Candidate::dedup_key).collect();
    let mut padded = 0usize;
    for c in catalog {
        if live.len() >= QUEUE_LEN {
            break;
        }
        if seen.insert(c.dedup_key()) {
            live.push(c);
            padded += 1;
        }
    }
    (live, padded)
}
