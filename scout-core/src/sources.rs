//! Headline source registry
//!
//! Static per-category list of tiered sources with their fetch protocol.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::headline::FetchProtocol::{Feed, HackerNews, Reddit, RestJson};
use crate::{FetchProtocol, SourceDescriptor, SourceTier};

/// Known content categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Geopolitics,
    Economics,
    Technology,
    Climate,
    Society,
    Science,
    Conflict,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Geopolitics,
        Category::Economics,
        Category::Technology,
        Category::Climate,
        Category::Society,
        Category::Science,
        Category::Conflict,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Geopolitics => "Geopolitics",
            Category::Economics => "Economics",
            Category::Technology => "Technology",
            Category::Climate => "Climate",
            Category::Society => "Society",
            Category::Science => "Science",
            Category::Conflict => "Conflict",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

const fn source(
    name: &'static str,
    tier: SourceTier,
    protocol: FetchProtocol,
    endpoint: &'static str,
    applicable_categories: &'static [&'static str],
) -> SourceDescriptor {
    SourceDescriptor {
        name,
        tier,
        protocol,
        endpoint,
        applicable_categories,
    }
}

static GEOPOLITICS: &[SourceDescriptor] = &[
    source("Foreign Affairs", 0, Feed, "https://www.foreignaffairs.com/rss.xml", &["Geopolitics"]),
    source("Foreign Policy", 0, Feed, "https://foreignpolicy.com/feed/", &["Geopolitics"]),
    source("The Diplomat", 0, Feed, "https://thediplomat.com/feed/", &["Geopolitics"]),
    source("Reuters World", 1, Feed, "https://rsshub.app/reuters/world", &["Geopolitics"]),
    source("AP News", 1, Feed, "https://rsshub.app/apnews/topics/world-news", &["Geopolitics"]),
    source("BBC World", 1, Feed, "https://feeds.bbci.co.uk/news/world/rss.xml", &["Geopolitics"]),
    source("DW News", 2, Feed, "https://rss.dw.com/xml/rss-en-world", &["Geopolitics"]),
    source("Guardian World", 2, Feed, "https://www.theguardian.com/world/rss", &["Geopolitics"]),
    source("NPR World", 3, Feed, "https://feeds.npr.org/1004/rss.xml", &["Geopolitics"]),
];

static ECONOMICS: &[SourceDescriptor] = &[
    source("The Economist", 0, Feed, "https://www.economist.com/finance-and-economics/rss.xml", &["Economics"]),
    source("Project Syndicate", 0, Feed, "https://www.project-syndicate.org/rss", &["Economics"]),
    source("Brookings", 0, Feed, "https://www.brookings.edu/feed/", &["Economics"]),
    source("Reuters Business", 1, Feed, "https://rsshub.app/reuters/business", &["Economics"]),
    source("FT", 1, RestJson, "https://saurav.tech/NewsAPI/top-headlines/category/business/us.json", &["Economics"]),
    source("BBC Business", 2, Feed, "https://feeds.bbci.co.uk/news/business/rss.xml", &["Economics"]),
    source("CNBC", 2, RestJson, "https://saurav.tech/NewsAPI/top-headlines/category/business/us.json", &["Economics"]),
    source("NPR Economy", 3, Feed, "https://feeds.npr.org/1006/rss.xml", &["Economics"]),
];

static TECHNOLOGY: &[SourceDescriptor] = &[
    source("MIT Technology Review", 0, Feed, "https://www.technologyreview.com/feed/", &["Technology"]),
    source("Stratechery", 0, Feed, "https://stratechery.com/feed/", &["Technology"]),
    source("HackerNews", 1, HackerNews, "https://hacker-news.firebaseio.com/v0/topstories.json", &["Technology"]),
    source("Ars Technica", 1, Feed, "https://feeds.arstechnica.com/arstechnica/index", &["Technology"]),
    source("Wired", 1, Feed, "https://www.wired.com/feed/rss", &["Technology"]),
    source("TechCrunch", 2, Feed, "https://techcrunch.com/feed/", &["Technology"]),
    source("The Verge", 2, Feed, "https://www.theverge.com/rss/index.xml", &["Technology"]),
    source("Reddit Tech", 3, Reddit, "https://www.reddit.com/r/technology/top.json?t=day&limit=25", &["Technology"]),
];

static CLIMATE: &[SourceDescriptor] = &[
    source("Yale Climate Connections", 0, Feed, "https://yaleclimateconnections.org/feed/", &["Climate"]),
    source("Nature Climate", 1, Feed, "https://www.nature.com/nclimate.rss", &["Climate", "Science"]),
    source("Carbon Brief", 1, Feed, "https://www.carbonbrief.org/feed/", &["Climate"]),
    source("Guardian Environment", 2, Feed, "https://www.theguardian.com/environment/rss", &["Climate"]),
    source("Guardian Climate", 2, Feed, "https://www.theguardian.com/environment/climate-crisis/rss", &["Climate"]),
    source("BBC Environment", 2, Feed, "https://feeds.bbci.co.uk/news/science_and_environment/rss.xml", &["Climate", "Science"]),
    source("NPR Climate", 2, Feed, "https://feeds.npr.org/1025/rss.xml", &["Climate"]),
    source("Phys.org Climate", 3, Feed, "https://phys.org/rss-feed/earth-news/environment/", &["Climate"]),
];

static SOCIETY: &[SourceDescriptor] = &[
    source("The Atlantic", 0, Feed, "https://www.theatlantic.com/feed/all/", &["Society"]),
    source("The New Yorker", 0, Feed, "https://www.newyorker.com/feed/news", &["Society"]),
    source("Guardian", 1, Feed, "https://www.theguardian.com/society/rss", &["Society"]),
    source("Atlantic General", 1, RestJson, "https://saurav.tech/NewsAPI/top-headlines/category/general/us.json", &["Society"]),
    source("BBC", 2, Feed, "https://feeds.bbci.co.uk/news/rss.xml", &["Society"]),
    source("NPR", 2, Feed, "https://feeds.npr.org/1001/rss.xml", &["Society"]),
    source("Reddit News", 3, Reddit, "https://www.reddit.com/r/worldnews/top.json?t=day&limit=25", &["Society", "Geopolitics"]),
];

static SCIENCE: &[SourceDescriptor] = &[
    source("Quanta Magazine", 0, Feed, "https://api.quantamagazine.org/feed/", &["Science"]),
    source("Nautilus", 0, Feed, "https://nautil.us/feed/", &["Science"]),
    source("Nature", 1, Feed, "https://www.nature.com/nature.rss", &["Science"]),
    source("Science Mag", 1, Feed, "https://www.science.org/rss/news_current.xml", &["Science"]),
    source("Phys.org", 1, Feed, "https://phys.org/rss-feed/", &["Science"]),
    source("Scientific American", 2, Feed, "https://rss.sciam.com/ScientificAmerican-Global", &["Science"]),
    source("New Scientist", 2, Feed, "https://www.newscientist.com/feed/home/", &["Science"]),
    source("BBC Science", 2, Feed, "https://feeds.bbci.co.uk/news/science_and_environment/rss.xml", &["Science", "Climate"]),
    source("Guardian Science", 2, Feed, "https://www.theguardian.com/science/rss", &["Science"]),
    source("NPR Science", 2, Feed, "https://feeds.npr.org/1007/rss.xml", &["Science"]),
    source("Reddit Science", 3, Reddit, "https://www.reddit.com/r/science/top.json?t=day&limit=25", &["Science"]),
];

static CONFLICT: &[SourceDescriptor] = &[
    source("International Crisis Group", 0, Feed, "https://www.crisisgroup.org/rss.xml", &["Conflict", "Geopolitics"]),
    source("War on the Rocks", 0, Feed, "https://warontherocks.com/feed/", &["Conflict", "Geopolitics"]),
    source("Reuters", 1, Feed, "https://rsshub.app/reuters/world", &["Conflict", "Geopolitics"]),
    source("AP News", 1, Feed, "https://rsshub.app/apnews/topics/world-news", &["Conflict", "Geopolitics"]),
    source("BBC World", 1, Feed, "https://feeds.bbci.co.uk/news/world/rss.xml", &["Conflict"]),
    source("DW News", 2, Feed, "https://rss.dw.com/xml/rss-en-world", &["Conflict"]),
    source("France24", 2, Feed, "https://www.france24.com/en/rss", &["Conflict"]),
    source("Reddit WorldNews", 3, Reddit, "https://www.reddit.com/r/worldnews/top.json?t=day&limit=25", &["Conflict", "Geopolitics"]),
];

/// Sources used for categories without a dedicated list
pub static FALLBACK_SOURCES: &[SourceDescriptor] = &[
    source("NewsAPI General", 2, RestJson, "https://saurav.tech/NewsAPI/top-headlines/category/general/us.json", &["*"]),
    source("BBC Top", 2, Feed, "https://feeds.bbci.co.uk/news/rss.xml", &["*"]),
    source("Reuters Top", 1, Feed, "https://rsshub.app/reuters/world", &["*"]),
];

/// Sources configured for a known category
pub fn category_sources(category: Category) -> &'static [SourceDescriptor] {
    match category {
        Category::Geopolitics => GEOPOLITICS,
        Category::Economics => ECONOMICS,
        Category::Technology => TECHNOLOGY,
        Category::Climate => CLIMATE,
        Category::Society => SOCIETY,
        Category::Science => SCIENCE,
        Category::Conflict => CONFLICT,
    }
}

/// Sources for a category name; unknown names get the general fallback list
pub fn sources_for_category(category: &str) -> &'static [SourceDescriptor] {
    match category.parse::<Category>() {
        Ok(known) => category_sources(known),
        Err(_) => FALLBACK_SOURCES,
    }
}

/// Scoring weight of a quality tier
pub fn tier_weight(tier: SourceTier) -> f64 {
    match tier {
        0 => 15.0,
        1 => 10.0,
        2 => 7.0,
        _ => 4.0,
    }
}
