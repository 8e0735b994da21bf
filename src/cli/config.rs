use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::crawler::definition::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_PAGES};

pub const DEFAULT_CONFIG_FILE: &str = "crawler-studio.yaml";
pub const ENV_API_URL: &str = "CRAWLER_STUDIO_API_URL";
pub const ENV_USE_MOCK: &str = "CRAWLER_STUDIO_USE_MOCK_DATA";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "crawler-studio",
    version,
    about = "Design web crawlers from analysed page elements"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Backend base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Serve the bundled sample page instead of calling the backend
    #[arg(long, global = true)]
    pub mock: bool,

    /// Path to config file (default: crawler-studio.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyse a page and list its ids, classes and tags
    Analyze {
        /// Page to analyse
        #[arg(long)]
        url: String,

        /// Table to show: id, class, tag (default: all three)
        #[arg(long)]
        kind: Option<String>,

        /// Only show selectors containing this text
        #[arg(long)]
        search: Option<String>,

        /// Maximum rows per table
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Analyse a page and show the elements matching a selection
    Select {
        #[arg(long)]
        url: String,

        /// Selector in CSS shorthand (#id, .class, tag); repeatable
        #[arg(long = "selector", required = true)]
        selectors: Vec<String>,

        /// How selections combine: all or any
        #[arg(long, default_value = "all")]
        mode: String,
    },

    /// Build a flow from actions, analyse it and commit it under a name
    Flow {
        #[arg(long)]
        url: String,

        /// Action as type:selector[=value], e.g. click:#login or type:#q=shoes; repeatable
        #[arg(long = "action", required = true)]
        actions: Vec<String>,

        /// Name for the committed flow
        #[arg(long)]
        name: String,
    },

    /// Manage crawler definitions on the backend
    Crawler {
        #[command(subcommand)]
        command: CrawlerCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum CrawlerCommands {
    /// List crawlers
    List,

    /// Analyse a page, select elements and create a crawler
    Create {
        #[arg(long)]
        url: String,

        #[arg(long)]
        name: String,

        /// Selector in CSS shorthand; repeatable
        #[arg(long = "selector", required = true)]
        selectors: Vec<String>,

        #[arg(long)]
        max_depth: Option<u32>,

        #[arg(long)]
        max_pages: Option<u32>,

        /// daily, weekly or monthly (default: manual)
        #[arg(long)]
        schedule: Option<String>,
    },

    /// Change a crawler's settings
    Update {
        #[arg(long)]
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        max_depth: Option<u32>,

        #[arg(long)]
        max_pages: Option<u32>,

        #[arg(long)]
        schedule: Option<String>,
    },

    Delete {
        #[arg(long)]
        id: String,
    },

    Start {
        #[arg(long)]
        id: String,
    },

    Stop {
        #[arg(long)]
        id: String,
    },

    Status {
        #[arg(long)]
        id: String,
    },

    Results {
        #[arg(long)]
        id: String,
    },

    Export {
        #[arg(long)]
        id: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `crawler-studio.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub crawler: CrawlerDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub url: String,

    #[serde(default)]
    pub use_mock_data: bool,

    #[serde(default = "default_mock_delay")]
    pub mock_delay_ms: u64,

    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            use_mock_data: false,
            mock_delay_ms: default_mock_delay(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Mirror the analysis history to this JSON file
    pub persist_path: Option<PathBuf>,

    /// Append store events to this JSONL file
    pub journal_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerDefaults {
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

impl Default for CrawlerDefaults {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

// Serde default helpers
fn default_api_url() -> String { "http://localhost:3000".to_string() }
fn default_mock_delay() -> u64 { 500 }
fn default_max_depth() -> u32 { DEFAULT_MAX_DEPTH }
fn default_max_pages() -> u32 { DEFAULT_MAX_PAGES }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = config_path, %e, "malformed config, using defaults");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

/// Apply `CRAWLER_STUDIO_*` environment overrides on top of the file config.
pub fn apply_env(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
        config.api.url = url;
    }
    if let Some(flag) = lookup(ENV_USE_MOCK) {
        config.api.use_mock_data = flag.trim().eq_ignore_ascii_case("true");
    }
}

// ============================================================================
// Resolution (CLI > env > file > defaults)
// ============================================================================

pub fn resolve_config(cli: &Cli) -> AppConfig {
    let mut config = load_config(cli.config.as_deref());
    apply_env(&mut config, |key| std::env::var(key).ok());

    if let Some(url) = &cli.api_url {
        config.api.url = url.clone();
    }
    if cli.mock {
        config.api.use_mock_data = true;
    }
    config
}
