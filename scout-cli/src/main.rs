//! topic-scout CLI
//!
//! Finds the investigation-worthy story of the moment for a category.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

use scout_core::{category_sources, meat_label, sources_for_category, Category, ScoutConfig, TrendingTopic};
use scout_net::HttpConfig;
use scout_runtime::{HistoryProvider, InMemoryHistory, JsonFileHistory, Selector};

#[derive(Parser)]
#[command(name = "topic-scout")]
#[command(author, version, about = "topic-scout: investigation-worthy topic discovery", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,

    /// Tuning file replacing the built-in configuration
    #[arg(short, long, env = "SCOUT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// HTTP timeout per request in seconds
    #[arg(long, default_value = "15", global = true)]
    http_timeout: u64,

    /// Fixed user agent (random browser agent when unset)
    #[arg(long, env = "SCOUT_USER_AGENT", global = true)]
    user_agent: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Select the topic for a category
    Select {
        /// Category name (e.g. Geopolitics, Technology)
        #[arg(short = 'C', long)]
        category: String,

        /// JSON file of recently used topics
        #[arg(long, env = "SCOUT_HISTORY")]
        history: Option<PathBuf>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List ranked trending topics for review
    Trending {
        /// Category name
        #[arg(short = 'C', long)]
        category: String,

        /// JSON file of recently used topics
        #[arg(long, env = "SCOUT_HISTORY")]
        history: Option<PathBuf>,

        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the sources polled for a category
    Sources {
        /// Category name
        #[arg(short = 'C', long)]
        category: String,
    },

    /// List known categories and their tuning
    Categories,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let config = load_config(cli.config.as_ref())?;
    let http = HttpConfig {
        timeout_secs: cli.http_timeout,
        user_agent: cli.user_agent.clone(),
        ..HttpConfig::default()
    };

    match cli.command {
        Commands::Select { category, history, json } => {
            run_select(config, http, &category, history, json).await?;
        }
        Commands::Trending { category, history, json } => {
            run_trending(config, http, &category, history, json).await?;
        }
        Commands::Sources { category } => {
            show_sources(&category);
        }
        Commands::Categories => {
            show_categories(&config);
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<ScoutConfig> {
    match path {
        Some(path) => ScoutConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => ScoutConfig::embedded().context("Built-in config is invalid"),
    }
}

fn warn_unknown_category(config: &ScoutConfig, category: &str) {
    if let Err(e) = config.strict_tuning_for(category) {
        warn!("{}, using default tuning and general sources", e);
    }
}

fn history_provider(path: Option<PathBuf>) -> Box<dyn HistoryProvider> {
    match path {
        Some(path) => Box::new(JsonFileHistory::new(path)),
        None => Box::new(InMemoryHistory::empty()),
    }
}

async fn run_select(
    config: ScoutConfig,
    http: HttpConfig,
    category: &str,
    history: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    warn_unknown_category(&config, category);
    let selector = Selector::from_config(config, http)?;
    let history = history_provider(history);

    if json {
        let result = selector.aggregate(category, history.as_ref()).await;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("🔎 topic-scout - {}\n", category);
    let topic = selector.select_topic(category, history.as_ref()).await;

    if topic.is_fallback() {
        println!("⚠️  No trending topic qualified. Fallback:");
        println!("   {}", topic.topic);
    } else {
        println!("✅ Selected: {}", topic.topic);
        print_details(&topic);
    }

    Ok(())
}

async fn run_trending(
    config: ScoutConfig,
    http: HttpConfig,
    category: &str,
    history: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    warn_unknown_category(&config, category);
    let selector = Selector::from_config(config, http)?;
    let history = history_provider(history);
    let topics = selector.trending_topics(category, history.as_ref()).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&topics)?);
        return Ok(());
    }

    if topics.is_empty() {
        println!("No trending topics for {}.", category);
        return Ok(());
    }

    println!("🏆 Trending in {}\n", category);
    for (i, topic) in topics.iter().enumerate() {
        let meat = topic.meat_score.unwrap_or(0);
        println!(
            "{:>2}. [C:{} M:{} H:{}] {} ({} sources, {}, {})",
            i + 1,
            topic.combined_score.unwrap_or(0),
            meat,
            topic.hotness_score,
            topic.topic,
            topic.source_count,
            meat_label(meat),
            topic.depth_label.as_deref().unwrap_or("Unrated")
        );
    }

    Ok(())
}

fn print_details(topic: &TrendingTopic) {
    println!("   Hotness: {}", topic.hotness_score);
    if let Some(meat) = topic.meat_score {
        println!("   Meat-Score: {} ({})", meat, meat_label(meat));
    }
    if let Some(depth) = topic.depth_score {
        let label = topic.depth_label.as_deref().unwrap_or("Unrated");
        let shallow = if topic.is_shallow == Some(true) { " - shallow" } else { "" };
        println!("   Depth: {} ({}){}", depth, label, shallow);
    }
    if let Some(combined) = topic.combined_score {
        println!("   Combined: {}", combined);
    }
    println!(
        "   Sources ({}): {}",
        topic.source_count,
        topic.sources.join(", ")
    );
    println!("   First seen: {}h ago", topic.first_seen_hours_ago);
    for headline in &topic.sample_headlines {
        println!("   - {}", headline);
    }
}

fn show_sources(category: &str) {
    let sources = sources_for_category(category);
    if category.parse::<Category>().is_err() {
        println!("Unknown category \"{}\", using general sources\n", category);
    }
    for source in sources {
        println!(
            "T{} {:<28} {:<12} {}",
            source.tier,
            source.name,
            format!("{:?}", source.protocol),
            source.endpoint
        );
    }
}

fn show_categories(config: &ScoutConfig) {
    println!(
        "{:<12} {:>9} {:>11} {:>8} {:>9} {:>8}",
        "category", "threshold", "min sources", "gravity", "window h", "sources"
    );
    for category in Category::ALL {
        let tuning = config.tuning_for(category.as_str());
        println!(
            "{:<12} {:>9.3} {:>11} {:>8.3} {:>9.0} {:>8}",
            category.as_str(),
            tuning.similarity_threshold,
            tuning.min_sources,
            tuning.decay_gravity,
            tuning.recency_window_hours,
            category_sources(category).len()
        );
    }
}
