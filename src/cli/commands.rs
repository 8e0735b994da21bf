use std::time::Duration;

use anyhow::{Context, anyhow, bail};

use crate::api::client::{BackendApi, HttpBackend};
use crate::api::mock::MockBackend;
use crate::cli::config::{AppConfig, CrawlerCommands};
use crate::crawler::crawler_model::{CrawlerPatch, Schedule};
use crate::crawler::definition::CrawlerDraft;
use crate::element::element_model::SelectorType;
use crate::element::summary::{search, summarize};
use crate::flow::flow_model::ActionType;
use crate::report::console::{
    format_crawlers, format_element, format_flow, format_selection, format_selector_table,
    format_stats, format_status,
};
use crate::selection::selection_set::MatchMode;
use crate::trace::logger::EventJournal;
use crate::workspace::workspace::Workspace;

// ============================================================================
// Setup
// ============================================================================

/// Pick the mock or HTTP backend according to config.
pub fn build_backend(config: &AppConfig) -> anyhow::Result<Box<dyn BackendApi>> {
    if config.api.use_mock_data {
        return Ok(Box::new(MockBackend::new(Duration::from_millis(
            config.api.mock_delay_ms,
        ))));
    }

    let timeout = config.api.timeout_secs.map(Duration::from_secs);
    let backend = HttpBackend::new(&config.api.url, timeout)
        .with_context(|| format!("cannot reach backend at {}", config.api.url))?;
    Ok(Box::new(backend))
}

pub fn build_workspace(config: &AppConfig) -> anyhow::Result<Workspace> {
    let mut workspace = Workspace::new(build_backend(config)?);

    if let Some(path) = &config.store.persist_path {
        workspace = workspace.with_persistence(path)?;
    }
    if let Some(path) = &config.store.journal_path {
        workspace.store_mut().subscribe(EventJournal::new(path));
    }

    Ok(workspace)
}

// ============================================================================
// analyze subcommand
// ============================================================================

pub fn cmd_analyze(
    config: &AppConfig,
    url: &str,
    kind: Option<&str>,
    term: Option<&str>,
    limit: usize,
) -> anyhow::Result<()> {
    let kinds = match kind {
        Some(k) => vec![k.parse::<SelectorType>().map_err(|e| anyhow!(e))?],
        None => vec![SelectorType::Id, SelectorType::Class, SelectorType::Tag],
    };

    let mut workspace = build_workspace(config)?;
    let stats = workspace.analyze_url(url)?;
    print!("{}", format_stats(&stats));

    let Some(parsed) = workspace.store().parsed_elements() else {
        return Ok(());
    };

    for kind in kinds {
        let rows = summarize(parsed, kind);
        let shown = search(&rows, term.unwrap_or(""));
        println!();
        print!("{}", format_selector_table(table_title(kind), &shown, limit));
    }

    Ok(())
}

fn table_title(kind: SelectorType) -> &'static str {
    match kind {
        SelectorType::Id => "IDs",
        SelectorType::Class => "Classes",
        SelectorType::Tag => "Tags",
    }
}

// ============================================================================
// select subcommand
// ============================================================================

pub fn cmd_select(
    config: &AppConfig,
    url: &str,
    selectors: &[String],
    mode: &str,
) -> anyhow::Result<()> {
    let mode: MatchMode = mode.parse().map_err(|e: String| anyhow!(e))?;

    let mut workspace = build_workspace(config)?;
    workspace.analyze_url(url)?;
    for selector in selectors {
        workspace.toggle_selector(selector);
    }

    print!("{}", format_selection(workspace.selection().items()));

    let matches = workspace.filtered_elements(mode);
    println!("\n{} matching elements ({:?}):", matches.len(), mode);
    for el in matches {
        println!("  {}", format_element(el));
    }

    Ok(())
}

// ============================================================================
// flow subcommand
// ============================================================================

pub fn cmd_flow(
    config: &AppConfig,
    url: &str,
    actions: &[String],
    name: &str,
) -> anyhow::Result<()> {
    let mut workspace = build_workspace(config)?;
    workspace.analyze_url(url)?;

    for spec in actions {
        let (action_type, selector, value) = parse_action_spec(spec).map_err(|e| anyhow!(e))?;
        workspace.add_action_for_selector(action_type, &selector, value)?;
    }

    workspace
        .analyze_flow()
        .context("flow analysis failed; staged tasks were kept")?;
    let flow = workspace.confirm_flow(name)?;

    print!("{}", format_flow(&flow));
    print!("{}", format_stats(&workspace.store().stats()));
    Ok(())
}

/// Parse `type:selector[=value]`. Only `type` actions take a value.
pub fn parse_action_spec(spec: &str) -> Result<(ActionType, String, Option<String>), String> {
    let (kind, rest) = spec
        .split_once(':')
        .ok_or_else(|| format!("expected type:selector, got '{}'", spec))?;
    let action_type: ActionType = kind.trim().parse()?;

    let (selector, value) = match (action_type, rest.split_once('=')) {
        (ActionType::Type, Some((sel, val))) => (sel, Some(val.to_string())),
        (ActionType::Type, None) => {
            return Err(format!("type action needs a value: '{}'", spec));
        }
        _ => (rest, None),
    };

    let selector = selector.trim();
    if selector.is_empty() {
        return Err(format!("missing selector in '{}'", spec));
    }
    Ok((action_type, selector.to_string(), value))
}

// ============================================================================
// crawler subcommand
// ============================================================================

pub fn cmd_crawler(config: &AppConfig, command: CrawlerCommands) -> anyhow::Result<()> {
    match command {
        CrawlerCommands::Create {
            url,
            name,
            selectors,
            max_depth,
            max_pages,
            schedule,
        } => {
            let mut workspace = build_workspace(config)?;
            workspace.analyze_url(&url)?;
            for selector in &selectors {
                workspace.toggle_selector(selector);
            }

            let draft = CrawlerDraft::new(name, url)
                .with_limits(
                    max_depth.unwrap_or(config.crawler.max_depth),
                    max_pages.unwrap_or(config.crawler.max_pages),
                )
                .with_schedule(parse_schedule(schedule.as_deref())?);

            let crawler = workspace.submit_crawler(draft)?;
            print!("{}", format_crawlers(std::slice::from_ref(&crawler)));
        }
        CrawlerCommands::Update {
            id,
            name,
            max_depth,
            max_pages,
            schedule,
        } => {
            let patch = CrawlerPatch {
                name,
                max_depth,
                max_pages,
                schedule: parse_schedule(schedule.as_deref())?,
            };
            if patch.is_empty() {
                bail!("nothing to update");
            }
            let crawler = build_backend(config)?.update_crawler(&id, &patch)?;
            print!("{}", format_crawlers(std::slice::from_ref(&crawler)));
        }
        CrawlerCommands::List => {
            print!("{}", format_crawlers(&build_backend(config)?.list_crawlers()?));
        }
        CrawlerCommands::Delete { id } => {
            build_backend(config)?.delete_crawler(&id)?;
            println!("Deleted {}", id);
        }
        CrawlerCommands::Start { id } => {
            print!("{}", format_status(&build_backend(config)?.start_crawler(&id)?));
        }
        CrawlerCommands::Stop { id } => {
            print!("{}", format_status(&build_backend(config)?.stop_crawler(&id)?));
        }
        CrawlerCommands::Status { id } => {
            print!("{}", format_status(&build_backend(config)?.crawler_status(&id)?));
        }
        CrawlerCommands::Results { id } => {
            let results = build_backend(config)?.crawler_results(&id)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        CrawlerCommands::Export { id, output } => {
            let exported = build_backend(config)?.export_crawler(&id)?;
            match output {
                Some(path) => std::fs::write(&path, &exported)
                    .with_context(|| format!("cannot write {}", path))?,
                None => println!("{}", exported),
            }
        }
    }

    Ok(())
}

pub fn parse_schedule(raw: Option<&str>) -> anyhow::Result<Option<Schedule>> {
    match raw {
        None => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("manual") || s.is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(|e: String| anyhow!(e)),
    }
}
