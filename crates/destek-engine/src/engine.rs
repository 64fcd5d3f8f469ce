//! Resolver orchestrator.
//!
//! Sequences the resolution cascade for one turn, first success wins:
//!
//! 1. log the inbound text,
//! 2. an open request consumes the whole turn ([`DialogueState`]),
//! 3. attachment marker → fixed acknowledgement,
//! 4. empty normalized input → random clarification,
//! 5. rule router,
//! 6. classifier, gated by the per-tag confidence threshold,
//! 7. fuzzy hard-match band,
//! 8. fuzzy suggestion band,
//! 9. clarification fallback.
//!
//! Whenever the chosen response belongs to an intent flagged
//! `opens_request`, the state flips to awaiting before the turn returns.
//! The cascade is total: every input yields a non-empty [`Resolution`].

use std::collections::HashSet;

use rand::Rng;
use tracing::debug;

use crate::classifier::IntentModel;
use crate::dialogue::DialogueState;
use crate::fuzzy::{self, Band};
use crate::kb::{KbIndex, KnowledgeBase};
use crate::logger::{NullTurnLogger, TurnKind, TurnLogger};
use crate::normalize::normalize;
use crate::rules::RuleRouter;

/// Reserved prefix for inbound attachment turns (`__ATTACH__::filename`).
pub const ATTACHMENT_MARKER: &str = "__ATTACH__::";

/// Fixed acknowledgement for attachment turns.
pub const ATTACHMENT_ACK: &str = "📎 Eki aldım. Gerekirse detayları soracağım.";

/// Reserved prefix of the disambiguation payload.
pub const SUGGEST_PREFIX: &str = "SUGGEST|";

/// Separator between suggestion entries in the payload.
pub const SUGGEST_SEPARATOR: char = '|';

/// Clarification pool for empty input and the bottom of the cascade.
pub const CLARIFICATIONS: [&str; 5] = [
    "❓ Tam anlayamadım. Sorununuzu biraz daha farklı bir şekilde yazabilir misiniz?",
    "🤔 Sanırım tam anlayamadım, lütfen sorunuzu biraz daha açık yazar mısınız?",
    "🙇 Bu konuda emin değilim. Daha net ifade edebilir misiniz?",
    "😕 Tam kavrayamadım. Biraz daha detay verebilir misiniz?",
    "📝 Rica etsem sorununuzu yeniden açıklayabilir misiniz?",
];

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds and the low-priority tag set for the classifier gate.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Default acceptance threshold for classifier predictions.
    pub confident_threshold: f64,

    /// Stricter threshold for low-priority (informational/trivia) tags,
    /// biasing ambiguous turns toward actionable support intents.
    pub low_priority_threshold: f64,

    /// Tags subject to the stricter threshold.
    pub low_priority_tags: HashSet<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confident_threshold: 0.60,
            low_priority_threshold: 0.75,
            low_priority_tags: HashSet::new(),
        }
    }
}

impl EngineConfig {
    /// The acceptance threshold that applies to `tag`.
    pub fn threshold_for(&self, tag: &str) -> f64 {
        if self.low_priority_tags.contains(tag) {
            self.low_priority_threshold
        } else {
            self.confident_threshold
        }
    }

    /// Whether a prediction clears its per-tag threshold.
    pub fn accepts(&self, tag: &str, confidence: f64) -> bool {
        confidence >= self.threshold_for(tag)
    }
}

// ---------------------------------------------------------------------------
// Resolution output
// ---------------------------------------------------------------------------

/// The outcome of one resolution turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A concrete response.
    Reply(String),

    /// Up to 3 normalized candidate texts for disambiguation; rendered
    /// differently from a plain reply by the caller.
    Suggestions(Vec<String>),
}

impl Resolution {
    /// Encode as the string-level wire form: a plain reply verbatim, or
    /// `SUGGEST|a|b|c` for suggestions.
    pub fn into_payload(self) -> String {
        match self {
            Self::Reply(text) => text,
            Self::Suggestions(items) => {
                let mut payload = String::from(SUGGEST_PREFIX);
                payload.push_str(&items.join(&SUGGEST_SEPARATOR.to_string()));
                payload
            }
        }
    }
}

/// Decode a disambiguation payload back into its candidate texts.
///
/// Returns `None` for plain replies. Empty entries are dropped and the
/// result is capped at 3, mirroring the encoder.
pub fn parse_suggestion_payload(payload: &str) -> Option<Vec<String>> {
    let rest = payload.strip_prefix(SUGGEST_PREFIX)?;
    let items: Vec<String> = rest
        .split(SUGGEST_SEPARATOR)
        .filter(|s| !s.is_empty())
        .take(fuzzy::TOP_CANDIDATES)
        .map(str::to_string)
        .collect();
    if items.is_empty() { None } else { Some(items) }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Pluggable choice function: given a pool size, return an index.
///
/// The default draws from [`rand::thread_rng`]; tests inject a
/// deterministic chooser instead of relying on global randomness.
pub type Chooser = Box<dyn FnMut(usize) -> usize + Send>;

/// The intent-resolution and dialogue-routing engine.
///
/// Owns the knowledge-base index, the rule router, the (possibly absent)
/// trained model, and one conversation's dialogue state. `resolve` takes
/// `&mut self`, so the state read-modify-write is exclusive by
/// construction; wrap the engine in a mutex for concurrent hosts.
pub struct Engine {
    index: KbIndex,
    router: RuleRouter,
    model: Option<IntentModel>,
    state: DialogueState,
    config: EngineConfig,
    chooser: Chooser,
    logger: Box<dyn TurnLogger>,
}

impl Engine {
    /// Build an engine: index the knowledge base and train the classifier
    /// once. A corpus below the training floor leaves the classifier
    /// absent, which is a valid state, not an error.
    pub fn new(kb: KnowledgeBase, router: RuleRouter, config: EngineConfig) -> Self {
        let index = KbIndex::new(kb);
        let model = IntentModel::train(index.corpus());
        Self {
            index,
            router,
            model,
            state: DialogueState::Idle,
            config,
            chooser: Box::new(|len| rand::thread_rng().gen_range(0..len)),
            logger: Box::new(NullTurnLogger),
        }
    }

    /// Replace the response chooser (e.g. "always pick index 0" in tests).
    #[must_use]
    pub fn with_chooser(mut self, chooser: Chooser) -> Self {
        self.chooser = chooser;
        self
    }

    /// Attach a conversation log sink.
    #[must_use]
    pub fn with_logger(mut self, logger: Box<dyn TurnLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Current dialogue state.
    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    /// Whether the classifier stage is active.
    pub fn classifier_ready(&self) -> bool {
        self.model.is_some()
    }

    /// Resolve one turn to its string wire form.
    pub fn resolve_text(&mut self, user_text: &str) -> String {
        self.resolve(user_text).into_payload()
    }

    /// Resolve one turn through the full cascade.
    pub fn resolve(&mut self, user_text: &str) -> Resolution {
        self.logger.log(TurnKind::User, user_text);

        let raw = user_text.trim();
        let normalized = normalize(raw);

        // (2) An open request consumes the whole turn; nothing below runs.
        if self.state.is_awaiting() {
            let pending = self.state.pending_tag().unwrap_or_default().to_string();
            if let Some(ack) = self.state.take_turn(&normalized) {
                debug!(tag = %pending, input = %normalized, "open request settled");
                self.logger.log(TurnKind::Bot, ack);
                return Resolution::Reply(ack.to_string());
            }
        }

        // (3) Attachment turns never reach normal resolution.
        if raw.starts_with(ATTACHMENT_MARKER) {
            debug!("attachment turn acknowledged");
            self.logger.log(TurnKind::Bot, ATTACHMENT_ACK);
            return Resolution::Reply(ATTACHMENT_ACK.to_string());
        }

        // (4) Nothing left after normalization.
        if normalized.is_empty() {
            return self.clarify("empty input");
        }

        // (5) Rules short-circuit all statistical stages.
        if let Some(tag) = self.router.route(raw, &normalized) {
            let tag = tag.to_string();
            debug!(tag = %tag, "rule hit");
            return self.respond_for(&tag, &format!("RULE->{tag}"));
        }

        // (6) Classifier, gated per tag. An absent model reads as low
        // confidence and falls through.
        if let Some(prediction) = self.model.as_ref().map(|m| m.predict(&normalized)) {
            let threshold = self.config.threshold_for(&prediction.tag);
            if self.config.accepts(&prediction.tag, prediction.confidence) {
                debug!(
                    tag = %prediction.tag,
                    confidence = prediction.confidence,
                    "classifier accepted"
                );
                return self.respond_for(
                    &prediction.tag,
                    &format!("NLU {:.2}->{}", prediction.confidence, prediction.tag),
                );
            }
            debug!(
                tag = %prediction.tag,
                confidence = prediction.confidence,
                threshold,
                "classifier below threshold"
            );
        }

        // (7)/(8) Fuzzy bands on the top score.
        let candidates = fuzzy::rank(&normalized, self.index.corpus());
        if let Some(top) = candidates.first() {
            match fuzzy::band_for(top.score) {
                Band::Hard => {
                    if let Some(tag) = self.index.lookup_tag_for_normalized(&top.text) {
                        let tag = tag.to_string();
                        let score = top.score;
                        debug!(tag = %tag, score, "fuzzy hard match");
                        return self.respond_for(&tag, &format!("FUZZY {score:.0}->{tag}"));
                    }
                }
                Band::Suggest => {
                    let unique = fuzzy::suggestions(&candidates);
                    if !unique.is_empty() {
                        debug!(score = top.score, count = unique.len(), "fuzzy suggestions");
                        let resolution = Resolution::Suggestions(unique);
                        self.logger
                            .log(TurnKind::Bot, &resolution.clone().into_payload());
                        return resolution;
                    }
                }
                Band::Reject => {}
            }
        }

        // (9) Bottom of the cascade.
        self.clarify("no stage resolved")
    }

    // -- Private helpers ----------------------------------------------------

    /// Pick a response for `tag`, open the sub-dialogue if the intent is
    /// flagged, and log the outcome with its stage annotation.
    fn respond_for(&mut self, tag: &str, stage: &str) -> Resolution {
        let responses = self.index.responses_for(tag);
        let pick = (self.chooser)(responses.len()).min(responses.len() - 1);
        let text = responses[pick].to_string();

        if self.index.opens_request(tag) {
            self.state.open_request(tag);
            debug!(tag = %tag, "request intake opened");
        }

        self.logger.log(TurnKind::Bot, &format!("[{stage}] {text}"));
        Resolution::Reply(text)
    }

    /// Random clarification from the fixed pool.
    fn clarify(&mut self, reason: &str) -> Resolution {
        debug!(reason, "clarification fallback");
        let pick = (self.chooser)(CLARIFICATIONS.len()).min(CLARIFICATIONS.len() - 1);
        let text = CLARIFICATIONS[pick].to_string();
        self.logger.log(TurnKind::Bot, &text);
        Resolution::Reply(text)
    }
}
