//! Ordered keyword rules that bypass statistical resolution.
//!
//! Rules exist for high-precision triggers — a literal product or system
//! name — that must never be overridden by classifier ambiguity. Each rule
//! pairs a case-insensitive, word-boundary-aware [`Regex`] with a forced
//! intent tag. Rules are evaluated in registration order against both the
//! raw and the normalized input; the first rule that fires against either
//! form wins and short-circuits every later stage. Binary hit/miss, no
//! scoring.

use regex::RegexBuilder;

use crate::error::{EngineError, Result};

/// One keyword rule: a compiled matcher and the tag it forces.
#[derive(Debug, Clone)]
pub struct Rule {
    matcher: regex::Regex,
    tag: String,
    pattern: String,
}

impl Rule {
    /// The tag this rule routes to.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The original pattern string (for diagnostics).
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Ordered, first-match-wins rule list.
#[derive(Debug, Default)]
pub struct RuleRouter {
    rules: Vec<Rule>,
}

impl RuleRouter {
    /// Create an empty router with no rules registered.
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Register a rule at the end of the list.
    ///
    /// The pattern is compiled case-insensitively. Returns an error if it
    /// fails to compile; rule order is never reordered afterwards.
    pub fn add(&mut self, pattern: &str, tag: impl Into<String>) -> Result<()> {
        let matcher = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| EngineError::InvalidRule {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        let tag = tag.into();
        tracing::debug!(pattern = %pattern, tag = %tag, "rule added");

        self.rules.push(Rule {
            matcher,
            tag,
            pattern: pattern.to_string(),
        });
        Ok(())
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the router has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule that fires against either the raw or the normalized
    /// input, if any.
    pub fn route(&self, raw: &str, normalized: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matcher.is_match(raw) || rule.matcher.is_match(normalized))
            .map(|rule| rule.tag.as_str())
    }
}

/// The shipped helpdesk rule set.
///
/// Every keyword tolerates both the dotted and the dotless spelling so the
/// rule fires on raw input as well as on the folded form.
pub fn builtin_rules() -> Result<RuleRouter> {
    let mut router = RuleRouter::new();
    router.add(r"\b(sap(\s+gui|\s+login)?|sapgui)\b", "sap")?;
    router.add(r"\b(outlook|e[- ]?posta|mail|parola|s(i|ı)fre)\b", "outlook_password")?;
    router.add(r"\b(yaz(i|ı)c(i|ı)|printer|c(i|ı)kt(i|ı)|offline)\b", "printer")?;
    router.add(r"\b(onedrive|senkron)\b", "onedrive")?;
    router.add(r"\b(teams|mikrofon|kamera|toplant(i|ı))\b", "teams")?;
    router.add(r"\b(vpn)\b", "vpn")?;
    router.add(r"\b(ceo|genel m(ü|u)d(ü|u)r)\b", "company_ceo")?;
    router.add(
        r"(bilgi (i|ı)(s|ş)lem|bilgi teknoloji|\b(bt|it)\b).*(nerede|yeri)",
        "it_department",
    )?;
    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn route_both<'a>(router: &'a RuleRouter, raw: &str) -> Option<&'a str> {
        router.route(raw, &normalize(raw))
    }

    #[test]
    fn first_match_wins_in_registration_order() {
        let mut router = RuleRouter::new();
        router.add(r"\bvpn\b", "first").unwrap();
        router.add(r"\bvpn\b", "second").unwrap();
        assert_eq!(router.route("vpn", "vpn"), Some("first"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let mut router = RuleRouter::new();
        let err = router.add("[invalid(", "tag");
        assert!(matches!(err, Err(EngineError::InvalidRule { .. })));
        assert!(router.is_empty());
    }

    #[test]
    fn miss_returns_none() {
        let router = builtin_rules().unwrap();
        assert_eq!(route_both(&router, "merhaba nasılsınız"), None);
    }

    #[test]
    fn builtin_vpn_and_sap() {
        let router = builtin_rules().unwrap();
        assert_eq!(route_both(&router, "VPN bağlanmıyor"), Some("vpn"));
        assert_eq!(route_both(&router, "sap gui açılmıyor"), Some("sap"));
        assert_eq!(route_both(&router, "SAPGUI hata veriyor"), Some("sap"));
    }

    #[test]
    fn builtin_tolerates_diacritic_variants() {
        let router = builtin_rules().unwrap();
        // Raw "yazıcı" and folded "yazici" must both hit.
        assert_eq!(route_both(&router, "yazıcı çıktı vermiyor"), Some("printer"));
        assert_eq!(route_both(&router, "yazici offline gorunuyor"), Some("printer"));
        assert_eq!(route_both(&router, "toplantı sesi gelmiyor teams"), Some("teams"));
    }

    #[test]
    fn matches_normalized_form_when_raw_misses() {
        let router = builtin_rules().unwrap();
        // Raw "ŞİFRE" never matches `s(i|ı)fre`; the normalized twin does.
        assert_eq!(route_both(&router, "ŞİFRE değiştirme"), Some("outlook_password"));
    }

    #[test]
    fn builtin_it_department_needs_location_suffix() {
        let router = builtin_rules().unwrap();
        assert_eq!(route_both(&router, "bilgi işlem nerede"), Some("it_department"));
        assert_eq!(route_both(&router, "bt nerede acaba"), Some("it_department"));
        assert_eq!(route_both(&router, "bilgi işlem raporu"), None);
    }

    #[test]
    fn word_boundaries_hold() {
        let router = builtin_rules().unwrap();
        // "vpn" embedded in a longer word must not fire.
        assert_eq!(route_both(&router, "ovpnx dosyası"), None);
    }
}
