//! Two-state conversation machine for the request-intake sub-dialogue.
//!
//! When a chosen response opens a support request, the engine flips into
//! `AwaitingConfirmation` and the *next* input is consumed entirely here:
//! a cancel token closes the request with a cancellation acknowledgement,
//! anything else records it. Either way the state returns to `Idle` in the
//! same turn — exactly once.

/// Inputs (in normalized form) that cancel an open request.
pub const CANCEL_TOKENS: [&str; 4] = ["hayir", "iptal", "vazgec", "yok"];

/// Acknowledgement when an open request is cancelled.
pub const CANCEL_ACK: &str = "👍 Tamamdır, başka bir konuda yardımcı olabilir miyim?";

/// Acknowledgement when an open request is recorded.
pub const RECORDED_ACK: &str =
    "✅ Teşekkürler, talebiniz kaydedildi ve ilgili ekibe iletilecek.";

/// Conversation state, owned by the engine instance (one logical
/// conversation per engine; no process-wide globals).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DialogueState {
    /// No request open; turns flow through the normal cascade.
    #[default]
    Idle,

    /// A request-intake response was just issued; the next turn is a
    /// confirm/cancel follow-up for `tag`.
    AwaitingConfirmation { tag: String },
}

impl DialogueState {
    /// Whether a request is currently open.
    pub fn is_awaiting(&self) -> bool {
        matches!(self, Self::AwaitingConfirmation { .. })
    }

    /// The tag that opened the pending request, if any.
    pub fn pending_tag(&self) -> Option<&str> {
        match self {
            Self::AwaitingConfirmation { tag } => Some(tag),
            Self::Idle => None,
        }
    }

    /// Open the request-intake sub-dialogue for `tag`.
    pub fn open_request(&mut self, tag: &str) {
        *self = Self::AwaitingConfirmation { tag: tag.to_string() };
    }

    /// Consume a follow-up turn.
    ///
    /// Returns `None` while idle (the input is not for this machine —
    /// idle turns never touch the pending tag). While awaiting, returns
    /// the acknowledgement for the normalized input and resets to `Idle`.
    pub fn take_turn(&mut self, normalized_input: &str) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::AwaitingConfirmation { .. } => {
                *self = Self::Idle;
                if CANCEL_TOKENS.contains(&normalized_input) {
                    Some(CANCEL_ACK)
                } else {
                    Some(RECORDED_ACK)
                }
            }
        }
    }
}
