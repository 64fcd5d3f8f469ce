//! Approximate matching of input against the normalized pattern corpus.
//!
//! Ranks corpus entries by a token-sort similarity ratio on a 0–100 scale
//! (word order insensitive, built on [`strsim::normalized_levenshtein`])
//! and bands the top score into hard match / suggestion / reject. The
//! banding thresholds are the contract; numeric parity with any particular
//! fuzzy library is not.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::kb::PatternEntry;

/// Scores strictly above this are accepted outright; exactly 85 is not.
pub const HARD_MATCH: f64 = 85.0;

/// Lower bound (inclusive) of the suggestion band.
pub const SUGGEST_MIN: f64 = 50.0;

/// Candidates returned per ranking, and the suggestion-set cap.
pub const TOP_CANDIDATES: usize = 3;

/// A ranked corpus entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyCandidate {
    /// Normalized pattern text.
    pub text: String,
    /// Owning intent tag.
    pub tag: String,
    /// Similarity to the input, 0–100.
    pub score: f64,
}

/// Decision band for a top similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// Accept the top candidate's tag outright, same as a rule hit.
    Hard,
    /// Too uncertain to auto-resolve; offer the candidates instead.
    Suggest,
    /// Fall through to the clarification fallback.
    Reject,
}

/// Classify a top score into its decision band.
pub fn band_for(score: f64) -> Band {
    if score > HARD_MATCH {
        Band::Hard
    } else if score >= SUGGEST_MIN {
        Band::Suggest
    } else {
        Band::Reject
    }
}

fn sort_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Token-sort similarity ratio of two strings, 0–100.
///
/// Both sides are re-joined from their sorted whitespace tokens before the
/// normalized edit distance, so word order never costs score.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&sort_tokens(a), &sort_tokens(b)) * 100.0
}

/// Rank the corpus against `input`, best first, truncated to
/// [`TOP_CANDIDATES`]. Equal scores keep corpus order (stable sort).
pub fn rank(input: &str, corpus: &[PatternEntry]) -> Vec<FuzzyCandidate> {
    let mut candidates: Vec<FuzzyCandidate> = corpus
        .iter()
        .map(|entry| FuzzyCandidate {
            text: entry.normalized.clone(),
            tag: entry.tag.clone(),
            score: token_sort_ratio(input, &entry.normalized),
        })
        .collect();

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    candidates.truncate(TOP_CANDIDATES);
    candidates
}

/// De-duplicated candidate texts for the suggestion band: first-seen
/// order, no empties, at most [`TOP_CANDIDATES`] entries.
pub fn suggestions(candidates: &[FuzzyCandidate]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for candidate in candidates {
        if candidate.text.is_empty() || !seen.insert(candidate.text.clone()) {
            continue;
        }
        unique.push(candidate.text.clone());
        if unique.len() == TOP_CANDIDATES {
            break;
        }
    }
    unique
}
