use crate::crawler::crawler_model::{Crawler, CrawlerStatusReport};
use crate::element::element_model::{ElementStats, RawElement, SelectedElement};
use crate::element::summary::SelectorSummary;
use crate::flow::flow_model::Flow;

// ============================================================================
// Console formatting for the CLI
// ============================================================================

/// Format the headline numbers for an analysed page.
///
/// ```text
/// Unique IDs: 3   Unique Classes: 5   Element Types: 4   Total Elements: 12
/// ```
pub fn format_stats(stats: &ElementStats) -> String {
    format!(
        "Unique IDs: {}   Unique Classes: {}   Element Types: {}   Total Elements: {}\n",
        stats.unique_ids, stats.unique_classes, stats.unique_tags, stats.total_elements
    )
}

/// Format one element table.
///
/// ```text
/// === Classes (2) ===
///   .card         4  <div class="card">...</div>
///   .price        3  <span class="price">...</span>
/// ```
pub fn format_selector_table(title: &str, rows: &[&SelectorSummary], limit: usize) -> String {
    let mut out = format!("=== {} ({}) ===\n", title, rows.len());

    if rows.is_empty() {
        out.push_str("  No elements found\n");
        return out;
    }

    let width = rows
        .iter()
        .take(limit)
        .map(|r| r.selector.len())
        .max()
        .unwrap_or(0);

    for row in rows.iter().take(limit) {
        out.push_str(&format!(
            "  {:<width$}  {:>5}  {}\n",
            row.selector,
            row.count,
            row.example,
            width = width
        ));
    }

    if rows.len() > limit {
        out.push_str(&format!("  ... {} more\n", rows.len() - limit));
    }

    out
}

pub fn format_element(el: &RawElement) -> String {
    let mut out = format!("<{}", el.tag);
    if let Some(id) = el.id_value() {
        out.push_str(&format!(" id=\"{}\"", id));
    }
    let classes: Vec<&str> = el.class_names().collect();
    if !classes.is_empty() {
        out.push_str(&format!(" class=\"{}\"", classes.join(" ")));
    }
    if let Some(name) = el.name.as_deref().filter(|n| !n.is_empty()) {
        out.push_str(&format!(" name=\"{}\"", name));
    }
    out.push('>');
    out
}

pub fn format_selection(selected: &[SelectedElement]) -> String {
    let mut out = format!("Selected Elements ({})\n", selected.len());
    for s in selected {
        out.push_str(&format!("  {}: {} ({})\n", s.kind, s.selector, s.count));
    }
    out
}

pub fn format_flow(flow: &Flow) -> String {
    let noun = if flow.tasks.len() == 1 { "task" } else { "tasks" };
    let mut out = format!(
        "[{}] {} ({} {}, {} elements)\n",
        flow.order,
        flow.name,
        flow.tasks.len(),
        noun,
        flow.metadata.element_count
    );
    for task in &flow.tasks {
        for action in &task.actions {
            out.push_str(&format!("    {}. {}\n", task.order + 1, action.description));
        }
    }
    out
}

pub fn format_crawlers(crawlers: &[Crawler]) -> String {
    if crawlers.is_empty() {
        return "No crawlers\n".to_string();
    }

    let mut out = String::new();
    for c in crawlers {
        out.push_str(&format!(
            "{}  {}  [{}]  {}  last run: {}  schedule: {}\n",
            c.id,
            c.name,
            c.status,
            c.url,
            c.last_run.as_deref().unwrap_or("Never"),
            c.schedule
                .map(|s| s.to_string())
                .unwrap_or_else(|| "Manual".to_string()),
        ));
    }
    out
}

pub fn format_status(report: &CrawlerStatusReport) -> String {
    let mut out = format!("{}: {}", report.id, report.status);
    if let Some(pages) = report.pages_crawled {
        out.push_str(&format!(" ({} pages)", pages));
    }
    if let Some(msg) = &report.message {
        out.push_str(&format!(": {}", msg));
    }
    out.push('\n');
    out
}
