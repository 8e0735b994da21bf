use std::collections::HashMap;

use clap::Parser;
use crawler_studio::cli::commands::{build_backend, parse_action_spec, parse_schedule};
use crawler_studio::cli::config::{
    AppConfig, Cli, Commands, CrawlerCommands, ENV_API_URL, ENV_USE_MOCK, apply_env, load_config,
};
use crawler_studio::crawler::crawler_model::Schedule;
use crawler_studio::flow::flow_model::ActionType;

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_analyze_minimal() {
    let cli = Cli::parse_from(["crawler-studio", "analyze", "--url", "https://example.com"]);
    match cli.command {
        Commands::Analyze {
            url,
            kind,
            search,
            limit,
        } => {
            assert_eq!(url, "https://example.com");
            assert!(kind.is_none());
            assert!(search.is_none());
            assert_eq!(limit, 20);
        }
        _ => panic!("Expected Analyze command"),
    }
    assert_eq!(cli.verbose, 0);
    assert!(!cli.mock);
}

#[test]
fn cli_parse_select_repeated_selectors() {
    let cli = Cli::parse_from([
        "crawler-studio",
        "select",
        "--url",
        "https://example.com",
        "--selector",
        ".card",
        "--selector",
        "#main",
        "--mode",
        "any",
    ]);
    match cli.command {
        Commands::Select {
            selectors, mode, ..
        } => {
            assert_eq!(selectors, vec![".card", "#main"]);
            assert_eq!(mode, "any");
        }
        _ => panic!("Expected Select command"),
    }
}

#[test]
fn cli_parse_global_flags_after_subcommand() {
    let cli = Cli::parse_from([
        "crawler-studio",
        "flow",
        "--url",
        "https://example.com",
        "--action",
        "click:#login",
        "--name",
        "Login",
        "--mock",
        "-vv",
        "--api-url",
        "http://backend:4000",
    ]);
    assert!(cli.mock);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.api_url.as_deref(), Some("http://backend:4000"));
    assert!(matches!(cli.command, Commands::Flow { .. }));
}

#[test]
fn cli_parse_crawler_create() {
    let cli = Cli::parse_from([
        "crawler-studio",
        "crawler",
        "create",
        "--url",
        "https://shop.test",
        "--name",
        "Products",
        "--selector",
        ".product",
        "--max-depth",
        "2",
        "--schedule",
        "weekly",
    ]);
    match cli.command {
        Commands::Crawler {
            command:
                CrawlerCommands::Create {
                    name,
                    selectors,
                    max_depth,
                    max_pages,
                    schedule,
                    ..
                },
        } => {
            assert_eq!(name, "Products");
            assert_eq!(selectors, vec![".product"]);
            assert_eq!(max_depth, Some(2));
            assert!(max_pages.is_none());
            assert_eq!(schedule.as_deref(), Some("weekly"));
        }
        _ => panic!("Expected crawler create"),
    }
}

#[test]
fn cli_parse_crawler_export_output() {
    let cli = Cli::parse_from([
        "crawler-studio",
        "crawler",
        "export",
        "--id",
        "c1",
        "-o",
        "out.json",
    ]);
    match cli.command {
        Commands::Crawler {
            command: CrawlerCommands::Export { id, output },
        } => {
            assert_eq!(id, "c1");
            assert_eq!(output.as_deref(), Some("out.json"));
        }
        _ => panic!("Expected crawler export"),
    }
}

#[test]
fn cli_select_requires_selector() {
    let result = Cli::try_parse_from(["crawler-studio", "select", "--url", "https://example.com"]);
    assert!(result.is_err());
}

// ============================================================================
// Action spec parsing
// ============================================================================

#[test]
fn action_spec_click() {
    let (kind, selector, value) = parse_action_spec("click:#login").unwrap();
    assert_eq!(kind, ActionType::Click);
    assert_eq!(selector, "#login");
    assert!(value.is_none());
}

#[test]
fn action_spec_type_with_value() {
    let (kind, selector, value) = parse_action_spec("type:#q=red shoes").unwrap();
    assert_eq!(kind, ActionType::Type);
    assert_eq!(selector, "#q");
    assert_eq!(value.as_deref(), Some("red shoes"));
}

#[test]
fn action_spec_only_type_splits_on_equals() {
    let (_, selector, value) = parse_action_spec("extract:a=b").unwrap();
    assert_eq!(selector, "a=b");
    assert!(value.is_none());
}

#[test]
fn action_spec_errors() {
    assert!(parse_action_spec("click").is_err(), "missing colon");
    assert!(parse_action_spec("jump:#a").is_err(), "unknown type");
    assert!(parse_action_spec("type:#q").is_err(), "type needs a value");
    assert!(parse_action_spec("click:  ").is_err(), "empty selector");
}

#[test]
fn schedule_parsing() {
    assert_eq!(parse_schedule(None).unwrap(), None);
    assert_eq!(parse_schedule(Some("manual")).unwrap(), None);
    assert_eq!(parse_schedule(Some("Daily")).unwrap(), Some(Schedule::Daily));
    assert!(parse_schedule(Some("hourly")).is_err());
}

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn config_missing_file_returns_defaults() {
    let config = load_config(Some("/nonexistent/path/config.yaml"));
    assert_eq!(config.api.url, "http://localhost:3000");
    assert!(!config.api.use_mock_data);
    assert_eq!(config.api.mock_delay_ms, 500);
    assert!(config.api.timeout_secs.is_none());
    assert!(config.store.persist_path.is_none());
    assert_eq!(config.crawler.max_depth, 3);
    assert_eq!(config.crawler.max_pages, 1000);
}

#[test]
fn config_partial_yaml_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crawler-studio.yaml");
    std::fs::write(
        &path,
        "api:\n  use_mock_data: true\n  timeout_secs: 30\ncrawler:\n  max_pages: 50\n",
    )
    .unwrap();

    let config = load_config(path.to_str());
    assert!(config.api.use_mock_data);
    assert_eq!(config.api.timeout_secs, Some(30));
    assert_eq!(config.api.url, "http://localhost:3000");
    assert_eq!(config.crawler.max_pages, 50);
    assert_eq!(config.crawler.max_depth, 3);
}

#[test]
fn config_malformed_yaml_returns_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "api: [not: a map").unwrap();

    let config = load_config(path.to_str());
    assert_eq!(config.api.url, "http://localhost:3000");
}

#[test]
fn env_overrides_file_values() {
    let vars: HashMap<&str, &str> =
        HashMap::from([(ENV_API_URL, "http://env:9000"), (ENV_USE_MOCK, "TRUE")]);
    let mut config = AppConfig::default();
    apply_env(&mut config, |k| vars.get(k).map(|v| v.to_string()));

    assert_eq!(config.api.url, "http://env:9000");
    assert!(config.api.use_mock_data);
}

#[test]
fn env_blank_url_and_false_flag() {
    let vars: HashMap<&str, &str> = HashMap::from([(ENV_API_URL, "  "), (ENV_USE_MOCK, "false")]);
    let mut config = AppConfig::default();
    config.api.use_mock_data = true;
    apply_env(&mut config, |k| vars.get(k).map(|v| v.to_string()));

    assert_eq!(config.api.url, "http://localhost:3000");
    assert!(!config.api.use_mock_data);
}

#[test]
fn mock_flag_selects_mock_backend() {
    let mut config = AppConfig::default();
    config.api.use_mock_data = true;
    config.api.mock_delay_ms = 0;

    let backend = build_backend(&config).unwrap();
    let elements = backend.analyze_url("https://example.com").unwrap();
    assert_eq!(elements.len(), 36);
}
