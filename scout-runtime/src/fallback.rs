//! Evergreen fallback topics

use rand::seq::SliceRandom;

use scout_core::Category;

static GEOPOLITICS: &[&str] = &[
    "Current state of international diplomatic relations",
    "Global power dynamics and shifting alliances",
    "International security challenges and responses",
];

static ECONOMICS: &[&str] = &[
    "Global economic trends and market analysis",
    "Central bank policies and their global impact",
    "Trade dynamics and economic outlook",
];

static TECHNOLOGY: &[&str] = &[
    "Emerging technologies reshaping industries",
    "AI development and its societal implications",
    "Cybersecurity landscape and digital transformation",
];

static CLIMATE: &[&str] = &[
    "Climate change impacts and adaptation strategies",
    "Renewable energy transition progress",
    "Environmental policy developments worldwide",
];

static SOCIETY: &[&str] = &[
    "Social trends shaping modern communities",
    "Demographic shifts and their implications",
    "Public health and social welfare developments",
];

static SCIENCE: &[&str] = &[
    "Recent scientific breakthroughs and discoveries",
    "Space exploration and astronomical findings",
    "Medical research advances and health innovations",
];

static CONFLICT: &[&str] = &[
    "Global conflict zones and peace efforts",
    "Security challenges and international responses",
    "Humanitarian situations in conflict areas",
];

/// Fallback prompts for a category; unknown names get the Geopolitics list
pub fn fallback_topics(category: &str) -> &'static [&'static str] {
    match category.parse::<Category>() {
        Ok(Category::Geopolitics) | Err(_) => GEOPOLITICS,
        Ok(Category::Economics) => ECONOMICS,
        Ok(Category::Technology) => TECHNOLOGY,
        Ok(Category::Climate) => CLIMATE,
        Ok(Category::Society) => SOCIETY,
        Ok(Category::Science) => SCIENCE,
        Ok(Category::Conflict) => CONFLICT,
    }
}

/// Pick one fallback prompt uniformly at random
pub fn pick_fallback(category: &str) -> &'static str {
    let topics = fallback_topics(category);
    topics
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(GEOPOLITICS[0])
}
