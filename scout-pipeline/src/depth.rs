//! Depth scoring
//!
//! Pure text heuristics over a cluster's label and headline titles:
//! systemic impact, controversy and emerging-pattern keyword hits, reduced
//! by a shallow (product update) penalty. The negative-signal penalty for
//! promotional or clickbait phrasing is computed here too but applied by
//! the ranker.

use regex::Regex;

use scout_core::{
    default_negative_rules, default_shallow_rules, DepthScoreComponents, RuleSet, TopicCluster, MAX_SCORE,
};

const POLICY_TERMS: &[&str] = &[
    "policy", "law", "regulation", "legislation", "reform", "sanctions",
    "treaty", "agreement", "bill", "act", "mandate", "ruling", "verdict",
    "court", "supreme", "constitutional", "ban", "restrict", "legalize",
];

const ECONOMIC_TERMS: &[&str] = &[
    "economy", "gdp", "inflation", "recession", "trade", "tariff",
    "central bank", "interest rate", "debt", "deficit", "stimulus",
    "unemployment", "labor", "wage", "market", "crash", "crisis",
    "federal reserve", "treasury", "budget", "fiscal", "monetary",
];

const GEOPOLITICAL_TERMS: &[&str] = &[
    "war", "conflict", "crisis", "alliance", "diplomatic", "summit",
    "united nations", "nato", "sanctions", "invasion", "occupation",
    "ceasefire", "peace", "negotiate", "tension", "escalation",
    "military", "troops", "weapons", "nuclear", "missile",
];

const SOCIAL_TERMS: &[&str] = &[
    "population", "demographic", "health", "education", "inequality",
    "rights", "civil", "protest", "movement", "reform", "justice",
    "immigration", "refugee", "housing", "poverty", "welfare",
    "healthcare", "pandemic", "epidemic", "public health",
];

const CONTROVERSY_TERMS: &[&str] = &[
    "debate", "controversy", "controversial", "critics", "supporters",
    "opponents", "disagree", "dispute", "clash", "divided", "contested",
    "backlash", "opposition", "protest", "defend", "accuse", "blame",
    "outrage", "anger", "concern", "fear", "warn", "threat",
    "challenge", "question", "doubt", "skeptic",
];

const EMERGING_TERMS: &[&str] = &[
    "trend", "rising", "growing", "shift", "transition", "transformation",
    "unprecedented", "historic", "first time", "record", "surge", "spike",
    "breakthrough", "landmark", "milestone", "turning point", "paradigm",
    "emerging", "new era", "reshape", "redefine", "revolution",
    "accelerate", "momentum", "wave", "movement",
];

// Fiction and games whose titles collide with real-world keywords
const EXCLUSION_PATTERNS: &[&str] = &[
    r"(?i)star wars",
    r"(?i)game of thrones",
    r"(?i)call of duty",
    r"(?i)world of warcraft",
    r"(?i)war(craft|frame|hammer)",
    r"(?i)avengers.*war",
    r"(?i)infinity war",
    r"(?i)civil war.*marvel",
    r"(?i)fantasy (football|league|basketball)",
    r"(?i)market(place|ing)",
    r"(?i)stock market game",
];

const SYSTEMIC_SATURATION: f64 = 3.0;
const CONTROVERSY_SATURATION: f64 = 2.0;
const EMERGING_SATURATION: f64 = 2.0;
/// Tone standard deviation (raw, not normalized) treated as full controversy
const SENTIMENT_CONTROVERSY_NORM: f64 = 30.0;

/// Case-insensitive term list. A term matches at a word start, so "ban"
/// hits "bans" and "banned" but not "urban".
#[derive(Debug, Clone)]
pub struct KeywordList {
    patterns: Vec<Regex>,
}

impl KeywordList {
    pub fn new(terms: &[&str]) -> Result<Self, regex::Error> {
        let patterns = terms
            .iter()
            .map(|term| Regex::new(&format!(r"(?i)\b{}", regex::escape(term))))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Number of distinct terms present in `text`
    pub fn count_matches(&self, text: &str) -> usize {
        self.patterns.iter().filter(|p| p.is_match(text)).count()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn saturate(count: usize, saturation: f64) -> f64 {
    (count as f64 / saturation).min(1.0)
}

/// Depth scorer with pluggable rule tables
#[derive(Debug, Clone)]
pub struct DepthScorer {
    systemic: Vec<KeywordList>,
    controversy: KeywordList,
    emerging: KeywordList,
    exclusions: Vec<Regex>,
    shallow: RuleSet,
    negative: RuleSet,
}

impl DepthScorer {
    /// Scorer with the built-in keyword lists and rule tables
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            systemic: vec![
                KeywordList::new(POLICY_TERMS)?,
                KeywordList::new(ECONOMIC_TERMS)?,
                KeywordList::new(GEOPOLITICAL_TERMS)?,
                KeywordList::new(SOCIAL_TERMS)?,
            ],
            controversy: KeywordList::new(CONTROVERSY_TERMS)?,
            emerging: KeywordList::new(EMERGING_TERMS)?,
            exclusions: EXCLUSION_PATTERNS
                .iter()
                .map(|p| Regex::new(p))
                .collect::<Result<Vec<_>, _>>()?,
            shallow: default_shallow_rules()?,
            negative: default_negative_rules()?,
        })
    }

    /// Swap the shallow and negative-signal rule tables
    pub fn with_rules(mut self, shallow: RuleSet, negative: RuleSet) -> Self {
        self.shallow = shallow;
        self.negative = negative;
        self
    }

    pub fn shallow_rules(&self) -> &RuleSet {
        &self.shallow
    }

    pub fn negative_rules(&self) -> &RuleSet {
        &self.negative
    }

    fn is_excluded(&self, text: &str) -> bool {
        self.exclusions.iter().any(|p| p.is_match(text))
    }

    /// Keyword hits across the four impact lists; zero for fiction and games
    pub fn systemic_impact(&self, text: &str) -> f64 {
        if self.is_excluded(text) {
            return 0.0;
        }
        let hits = self.systemic.iter().map(|list| list.count_matches(text)).sum();
        saturate(hits, SYSTEMIC_SATURATION)
    }

    /// Debate-term density or tone spread, whichever is stronger
    pub fn controversy(&self, text: &str, sentiment_std_dev: Option<f64>) -> f64 {
        let keyword_score = saturate(self.controversy.count_matches(text), CONTROVERSY_SATURATION);
        let variance_score = sentiment_std_dev
            .map(|v| (v / SENTIMENT_CONTROVERSY_NORM).clamp(0.0, 1.0))
            .unwrap_or(0.0);
        keyword_score.max(variance_score)
    }

    pub fn emerging_pattern(&self, text: &str) -> f64 {
        saturate(self.emerging.count_matches(text), EMERGING_SATURATION)
    }

    pub fn shallow_penalty(&self, text: &str) -> f64 {
        self.shallow.penalty(text)
    }

    /// Score a topic label and its headlines. `sentiment_std_dev` is the
    /// raw tone standard deviation from enrichment, when available.
    pub fn score(&self, topic_text: &str, headlines: &[&str], sentiment_std_dev: Option<f64>) -> DepthScoreComponents {
        let text = std::iter::once(topic_text)
            .chain(headlines.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");

        let systemic_impact = self.systemic_impact(&text);
        let controversy = self.controversy(&text, sentiment_std_dev);
        let emerging_pattern = self.emerging_pattern(&text);
        let shallow_penalty = self.shallow_penalty(&text);

        let base = 0.5 * systemic_impact + 0.3 * controversy + 0.2 * emerging_pattern;
        let adjusted = base * (1.0 - shallow_penalty);
        let depth_score = ((adjusted * MAX_SCORE as f64).round() as u32).min(MAX_SCORE);

        DepthScoreComponents {
            systemic_impact,
            controversy,
            emerging_pattern,
            shallow_penalty,
            depth_score,
        }
    }

    pub fn score_cluster(&self, cluster: &TopicCluster, sentiment_std_dev: Option<f64>) -> DepthScoreComponents {
        let titles: Vec<&str> = cluster.headlines.iter().map(|h| h.title.as_str()).collect();
        self.score(&cluster.topic_label, &titles, sentiment_std_dev)
    }

    /// Attach a depth score to a cluster
    pub fn apply(&self, cluster: TopicCluster, sentiment_std_dev: Option<f64>) -> TopicCluster {
        let depth = self.score_cluster(&cluster, sentiment_std_dev);
        cluster.with_depth(depth)
    }

    /// Negative-signal penalty of a single title
    pub fn negative_penalty_for(&self, text: &str) -> f64 {
        self.negative.penalty(text.trim())
    }

    /// Strongest negative-signal penalty among the label and headline
    /// titles. Titles are checked one by one since several rules are
    /// anchored to the start of a title.
    pub fn negative_penalty(&self, cluster: &TopicCluster) -> f64 {
        std::iter::once(cluster.topic_label.as_str())
            .chain(cluster.headlines.iter().map(|h| h.title.as_str()))
            .map(|text| self.negative_penalty_for(text))
            .fold(0.0, f64::max)
    }
}
