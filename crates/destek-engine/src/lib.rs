//! Destek — intent-resolution and dialogue-routing engine for a Turkish
//! IT-helpdesk bot.
//!
//! The engine turns one free-text user message into a single response (or a
//! disambiguation prompt) through a tiered resolution cascade:
//!
//! - **[`dialogue`]** -- Two-state conversation machine for the request-intake
//!   sub-dialogue; while a request is open it consumes the whole turn.
//! - **[`rules`]** -- Ordered, first-match-wins keyword rules ([`regex`]) for
//!   high-precision triggers that must never lose to statistical ambiguity.
//! - **[`classifier`]** -- Bag-of-n-grams tf-idf vectorizer plus a
//!   multinomial naive Bayes model, trained once from the pattern corpus and
//!   gated by per-tag confidence thresholds.
//! - **[`fuzzy`]** -- Token-sort similarity ([`strsim`]) over the normalized
//!   corpus, banded into hard match / suggestion / reject.
//! - **[`engine`]** -- Orchestrator that sequences the stages, applies the
//!   thresholds, and picks the final response.
//! - **[`normalize`]** -- Turkish case/diacritic folding shared by every
//!   stage.
//! - **[`kb`]** -- Knowledge-base structures and the derived pattern corpus.
//! - **[`logger`]** -- Fire-and-forget conversation log sink.
//! - **[`error`]** -- Unified error type via [`thiserror`].
//!
//! The whole cascade is synchronous and total: every input, however
//! degenerate, yields a non-empty response string.

pub mod classifier;
pub mod dialogue;
pub mod engine;
pub mod error;
pub mod fuzzy;
pub mod kb;
pub mod logger;
pub mod normalize;
pub mod rules;

// Re-export the most commonly used types at the crate root for convenience.
pub use classifier::{IntentModel, Prediction};
pub use dialogue::DialogueState;
pub use engine::{Engine, EngineConfig, Resolution, parse_suggestion_payload};
pub use error::{EngineError, Result};
pub use fuzzy::{Band, FuzzyCandidate};
pub use kb::{Intent, KbIndex, KnowledgeBase};
pub use logger::{FileTurnLogger, NullTurnLogger, TurnKind, TurnLogger};
pub use normalize::normalize;
pub use rules::{RuleRouter, builtin_rules};
