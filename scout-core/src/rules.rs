//! Pattern rule tables
//!
//! Shallow and negative-signal detection is driven by tables of
//! `(pattern, weight, kind)` rules evaluated against headline text. A
//! [`RuleSet`] sums the weights of every matching rule and caps the total.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// What a rule detects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Product update, patch, release or version announcement
    ProductUpdate,
    /// Tech company paired with a release verb
    CompanyRelease,
    /// Plain shallow term (download, changelog, ...)
    ShallowTerm,
    /// Promotional language
    Promotional,
    /// Clickbait phrasing
    Clickbait,
    /// Vague pronoun opening ("This one thing...")
    PronominalGap,
    /// Number-led listicle title
    Listicle,
}

/// A single weighted pattern
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub name: String,
    pub pattern: Regex,
    pub weight: f64,
    pub kind: RuleKind,
}

impl PatternRule {
    /// Build a rule from a regex source
    pub fn new(name: &str, pattern: &str, weight: f64, kind: RuleKind) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.to_string(),
            pattern: Regex::new(pattern)?,
            weight,
            kind,
        })
    }

    /// Build a rule matching a literal phrase, case-insensitively
    pub fn term(term: &str, weight: f64, kind: RuleKind) -> Result<Self, regex::Error> {
        Self::new(term, &format!("(?i){}", regex::escape(term)), weight, kind)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Outcome of evaluating a rule table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuleEvaluation {
    /// Capped sum of matched weights
    pub penalty: f64,
    /// Names of the rules that matched
    pub matched: Vec<String>,
}

impl RuleEvaluation {
    pub fn matched_any(&self) -> bool {
        !self.matched.is_empty()
    }
}

/// Ordered rule table with a penalty cap
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<PatternRule>,
    cap: f64,
}

impl RuleSet {
    pub fn new(cap: f64) -> Self {
        Self {
            rules: Vec::new(),
            cap: cap.max(0.0),
        }
    }

    pub fn with_rule(mut self, rule: PatternRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn push(&mut self, rule: PatternRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn cap(&self) -> f64 {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule against `text`
    pub fn evaluate(&self, text: &str) -> RuleEvaluation {
        let mut total = 0.0;
        let mut matched = Vec::new();

        for rule in &self.rules {
            if rule.is_match(text) {
                total += rule.weight;
                matched.push(rule.name.clone());
            }
        }

        RuleEvaluation {
            penalty: total.min(self.cap),
            matched,
        }
    }

    /// Capped penalty for `text`
    pub fn penalty(&self, text: &str) -> f64 {
        self.evaluate(text).penalty
    }

    /// Whether any rule of `kind` matches
    pub fn matches_kind(&self, text: &str, kind: RuleKind) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.kind == kind && rule.is_match(text))
    }
}

const SHALLOW_CAP: f64 = 0.7;
const NEGATIVE_CAP: f64 = 0.4;

const PRODUCT_UPDATE_PATTERNS: &[(&str, &str)] = &[
    ("patch", r"(?i)\b(patch|patches|patched|patching)\b"),
    ("update_available", r"(?i)\b(update|updates|updated|updating)\s+(available|released|rolling|now)"),
    ("release_version", r"(?i)\b(release|releases|released|releasing)\s+(new|version|v\d)"),
    ("version", r"(?i)\b(version|v\d+\.\d+)"),
    ("bug_fix", r"(?i)\b(bug\s*fix|bugfix|hotfix|fix\s+for)\b"),
    ("feature_added", r"(?i)\b(feature|features)\s+(added|new|coming)\b"),
    ("app_update", r"(?i)\b(app|application)\s+(update|store)\b"),
    ("download_now", r"(?i)\b(download|available\s+now|out\s+now)\b"),
    ("os_version", r"(?i)\b(ios|android|macos|windows)\s+\d+(\.\d+)?\b"),
    ("prerelease", r"(?i)\b(beta|alpha|preview|rc\d*)\s+(available|released)"),
    ("release_notes", r"(?i)\b(changelog|release\s+notes)\b"),
    ("firmware", r"(?i)\b(security\s+patch|firmware\s+update)\b"),
    ("upgrade_to", r"(?i)\b(upgrade|upgrading)\s+(to|from)\s+v?\d"),
    ("new_version", r"(?i)\b(new\s+version|latest\s+version)\b"),
];

const COMPANY_RELEASE_PATTERNS: &[(&str, &str)] = &[
    ("company_launch", r"(?i)\b(apple|google|microsoft|meta|amazon|tesla|nvidia)\b.*\b(releases?|launch(es)?|announces?|unveils?)\b"),
    ("device_update", r"(?i)\b(iphone|ipad|mac|pixel|surface|galaxy)\b.*\b(update|new|release)"),
];

const SHALLOW_TERMS: &[&str] = &[
    "download", "install", "upgrade", "changelog", "patch notes",
    "bug fixes", "performance improvements", "stability",
];

const NEGATIVE_PATTERNS: &[(&str, &str, f64, RuleKind)] = &[
    ("promo_sale", r"(?i)\b(buy now|limited time|discount|sale|promo|deal|offer)\b", 0.12, RuleKind::Promotional),
    ("promo_sponsored", r"(?i)\b(sponsored|ad|advertisement|partner content)\b", 0.12, RuleKind::Promotional),
    ("promo_price", r"(?i)\b(exclusive offer|special price|save \d+%)", 0.12, RuleKind::Promotional),
    ("clickbait_shock", r"(?i)\b(you won't believe|shocking|mind-blowing|jaw-dropping)\b", 0.15, RuleKind::Clickbait),
    ("clickbait_trick", r"(?i)\b(this one weird trick|doctors hate|secret revealed)\b", 0.15, RuleKind::Clickbait),
    ("clickbait_tease", r"(?i)\b(what happens next|will shock you|changed everything)\b", 0.15, RuleKind::Clickbait),
    ("clickbait_reveal", r"(?i)\b(finally revealed|exposed|the truth about)\b", 0.15, RuleKind::Clickbait),
    ("gap_demonstrative", r"(?i)^(this|that|these|those)\s+(one|thing|trick|hack|reason|secret)", 0.40, RuleKind::PronominalGap),
    ("gap_what_they_did", r"(?i)^(what|why|how)\s+(they|he|she|it|we)\s+(did|found|discovered)", 0.40, RuleKind::PronominalGap),
    ("gap_heres_why", r"(?i)^here'?s?\s+(why|what|how)", 0.40, RuleKind::PronominalGap),
    ("gap_reason_why", r"(?i)^(the\s+)?reason\s+(why|that)\b", 0.40, RuleKind::PronominalGap),
    ("listicle_count", r"(?i)^\d+\s+(things|ways|reasons|tips|tricks|hacks|secrets|steps|rules|signs|facts)\b", 0.08, RuleKind::Listicle),
    ("listicle_top", r"(?i)^top\s+\d+\b", 0.08, RuleKind::Listicle),
    ("listicle_best", r"(?i)^best\s+\d+\b", 0.08, RuleKind::Listicle),
    ("listicle_the_n", r"(?i)^the\s+\d+\s+(best|top|most|worst)", 0.08, RuleKind::Listicle),
];

/// Default product-update / shallow-term table, capped at 0.7
pub fn default_shallow_rules() -> Result<RuleSet, regex::Error> {
    let mut set = RuleSet::new(SHALLOW_CAP);
    for (name, pattern) in PRODUCT_UPDATE_PATTERNS {
        set.push(PatternRule::new(name, pattern, 0.25, RuleKind::ProductUpdate)?);
    }
    for (name, pattern) in COMPANY_RELEASE_PATTERNS {
        set.push(PatternRule::new(name, pattern, 0.15, RuleKind::CompanyRelease)?);
    }
    for term in SHALLOW_TERMS {
        set.push(PatternRule::term(term, 0.1, RuleKind::ShallowTerm)?);
    }
    Ok(set)
}

/// Default promotional / clickbait / pronominal-gap / listicle table, capped at 0.4.
/// Anchored rules are meant to run against each title on its own.
pub fn default_negative_rules() -> Result<RuleSet, regex::Error> {
    let mut set = RuleSet::new(NEGATIVE_CAP);
    for (name, pattern, weight, kind) in NEGATIVE_PATTERNS {
        set.push(PatternRule::new(name, pattern, *weight, *kind)?);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listicle_only_when_number_leads() {
        let rules = default_negative_rules().unwrap();
        assert!(rules.matches_kind("7 things you should know about the euro", RuleKind::Listicle));
        assert!(rules.matches_kind("10 Ways Cities Are Adapting to Heat", RuleKind::Listicle));
        assert!(rules.matches_kind("3 reasons markets fell", RuleKind::Listicle));
        assert!(!rules.matches_kind("Company raises $5 million in seed round", RuleKind::Listicle));
        assert!(!rules.matches_kind("Ministers list 10 reasons for delay", RuleKind::Listicle));
    }

    #[test]
    fn test_listicle_penalty_value() {
        let rules = default_negative_rules().unwrap();
        assert!((rules.penalty("5 ways to invest") - 0.08).abs() < 1e-9);
        assert_eq!(rules.penalty("Company raises $5 million"), 0.0);
    }

    #[test]
    fn test_pronominal_gap_hits_cap() {
        let rules = default_negative_rules().unwrap();
        let eval = rules.evaluate("This one trick will shock you");
        assert!((eval.penalty - 0.4).abs() < 1e-9);
        assert!(eval.matched.contains(&"gap_demonstrative".to_string()));
    }

    #[test]
    fn test_shallow_penalty_capped() {
        let rules = default_shallow_rules().unwrap();
        let text = "Apple releases iOS 18.1 update available now with bug fixes, download the patch";
        let penalty = rules.penalty(text);
        assert!((penalty - 0.7).abs() < 1e-9);
        assert_eq!(rules.penalty("Parliament debates pension reform"), 0.0);
    }

    #[test]
    fn test_custom_rule_table() {
        let rules = RuleSet::new(0.5)
            .with_rule(PatternRule::term("rumor", 0.3, RuleKind::Clickbait).unwrap())
            .with_rule(PatternRule::term("leak", 0.3, RuleKind::Clickbait).unwrap());
        assert_eq!(rules.len(), 2);
        assert!((rules.penalty("Rumor: leak shows new phone") - 0.5).abs() < 1e-9);
    }
}
