//! Knowledge-base structures and the derived pattern corpus.
//!
//! The knowledge base is supplied fully loaded before the first resolution
//! call and is immutable afterwards. [`KbIndex`] derives everything the
//! resolution stages need from it: the dual (raw + normalized) pattern
//! corpus, the tag lookup for response retrieval, and the request-intake
//! flag per tag.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::normalize::normalize;

/// Reply used when a tag has no responses or is unknown entirely.
pub const DEFAULT_NO_INFO: &str = "Bu konuda bilgim yok.";

// ---------------------------------------------------------------------------
// Input structures
// ---------------------------------------------------------------------------

/// A named category of user need, with example phrasings and candidate
/// responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    /// Unique identifier of this intent.
    pub tag: String,

    /// Example phrasings that belong to this intent.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Candidate responses; one is chosen per resolution.
    #[serde(default)]
    pub responses: Vec<String>,

    /// Marks an intent whose responses open the request-intake
    /// sub-dialogue (the next turn is consumed as confirm/cancel).
    #[serde(default)]
    pub opens_request: bool,
}

/// The pre-parsed knowledge base: a flat list of intents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub intents: Vec<Intent>,
}

impl KnowledgeBase {
    /// Parse a knowledge base from its JSON form (`{"intents": [...]}`).
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ---------------------------------------------------------------------------
// Derived index
// ---------------------------------------------------------------------------

/// One example phrasing with its owning tag, in raw and normalized form.
#[derive(Debug, Clone)]
pub struct PatternEntry {
    pub raw: String,
    pub normalized: String,
    pub tag: String,
}

/// Build-once, read-only index over the knowledge base.
pub struct KbIndex {
    intents: Vec<Intent>,
    by_tag: HashMap<String, usize>,
    corpus: Vec<PatternEntry>,
}

impl KbIndex {
    /// Build the index. Pattern order follows intent order, so "first
    /// entry wins" lookups are stable across runs.
    pub fn new(kb: KnowledgeBase) -> Self {
        let mut by_tag = HashMap::new();
        for (i, intent) in kb.intents.iter().enumerate() {
            by_tag.entry(intent.tag.clone()).or_insert(i);
        }

        let mut corpus = Vec::new();
        for intent in &kb.intents {
            for pattern in &intent.patterns {
                corpus.push(PatternEntry {
                    raw: pattern.clone(),
                    normalized: normalize(pattern),
                    tag: intent.tag.clone(),
                });
            }
        }

        tracing::debug!(
            intents = kb.intents.len(),
            patterns = corpus.len(),
            "knowledge base indexed"
        );

        Self {
            intents: kb.intents,
            by_tag,
            corpus,
        }
    }

    /// The full pattern corpus, also the classifier training set.
    pub fn corpus(&self) -> &[PatternEntry] {
        &self.corpus
    }

    /// Look up an intent by tag.
    pub fn intent(&self, tag: &str) -> Option<&Intent> {
        self.by_tag.get(tag).map(|&i| &self.intents[i])
    }

    /// Candidate responses for a tag.
    ///
    /// Unknown tags (or intents without responses) fall back to a single
    /// fixed "no information" reply — a lookup miss is recovered locally,
    /// never surfaced.
    pub fn responses_for(&self, tag: &str) -> Vec<&str> {
        match self.intent(tag) {
            Some(intent) if !intent.responses.is_empty() => {
                intent.responses.iter().map(String::as_str).collect()
            }
            _ => vec![DEFAULT_NO_INFO],
        }
    }

    /// Whether responses for `tag` open the request-intake sub-dialogue.
    pub fn opens_request(&self, tag: &str) -> bool {
        self.intent(tag).is_some_and(|intent| intent.opens_request)
    }

    /// Exact match of `text` against the normalized corpus; the first
    /// matching entry wins.
    pub fn lookup_tag_for_normalized(&self, text: &str) -> Option<&str> {
        self.corpus
            .iter()
            .find(|entry| entry.normalized == text)
            .map(|entry| entry.tag.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> KbIndex {
        let kb = KnowledgeBase {
            intents: vec![
                Intent {
                    tag: "vpn".into(),
                    patterns: vec!["VPN bağlanmıyor".into(), "vpn koptu".into()],
                    responses: vec!["VPN istemcisini yeniden başlatın.".into()],
                    opens_request: false,
                },
                Intent {
                    tag: "talep".into(),
                    patterns: vec!["talep açmak istiyorum".into()],
                    responses: vec!["Lütfen talebinizi buraya yazın.".into()],
                    opens_request: true,
                },
            ],
        };
        KbIndex::new(kb)
    }

    #[test]
    fn parses_json_with_default_flag() {
        let kb = KnowledgeBase::from_json_str(
            r#"{"intents": [{"tag": "selam", "patterns": ["merhaba"], "responses": ["Merhaba!"]}]}"#,
        )
        .unwrap();
        assert_eq!(kb.intents.len(), 1);
        assert!(!kb.intents[0].opens_request);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(KnowledgeBase::from_json_str("{not json").is_err());
    }

    #[test]
    fn corpus_holds_raw_and_normalized_twins() {
        let index = sample_index();
        assert_eq!(index.corpus().len(), 3);
        assert_eq!(index.corpus()[0].raw, "VPN bağlanmıyor");
        assert_eq!(index.corpus()[0].normalized, "vpn baglanmiyor");
        assert_eq!(index.corpus()[0].tag, "vpn");
    }

    #[test]
    fn responses_for_unknown_tag_falls_back() {
        let index = sample_index();
        assert_eq!(index.responses_for("boyle_bir_tag_yok"), vec![DEFAULT_NO_INFO]);
    }

    #[test]
    fn responses_for_known_tag() {
        let index = sample_index();
        assert_eq!(
            index.responses_for("vpn"),
            vec!["VPN istemcisini yeniden başlatın."]
        );
    }

    #[test]
    fn lookup_by_normalized_text() {
        let index = sample_index();
        assert_eq!(index.lookup_tag_for_normalized("vpn baglanmiyor"), Some("vpn"));
        assert_eq!(index.lookup_tag_for_normalized("VPN bağlanmıyor"), None);
        assert_eq!(index.lookup_tag_for_normalized("hic yok"), None);
    }

    #[test]
    fn opens_request_flag() {
        let index = sample_index();
        assert!(index.opens_request("talep"));
        assert!(!index.opens_request("vpn"));
        assert!(!index.opens_request("bilinmeyen"));
    }
}
