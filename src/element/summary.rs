use std::collections::HashMap;

use serde::Serialize;
use sha1::{Digest, Sha1};

use crate::element::element_model::{
    ElementStats, ParsedElements, RawElement, SelectedElement, SelectorType,
};

// ============================================================================
// Selector rows
// ============================================================================

/// One row of an element table: a selector, how often it occurs, and a
/// markup snippet built from its first example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorSummary {
    pub selector: String,
    pub kind: SelectorType,
    pub count: usize,
    pub example: String,
}

impl SelectorSummary {
    pub fn to_selected(&self) -> SelectedElement {
        SelectedElement::new(self.selector.clone(), self.kind, self.count)
    }
}

/// Rows for one table, sorted by count (descending) then selector.
pub fn summarize(parsed: &ParsedElements, kind: SelectorType) -> Vec<SelectorSummary> {
    let mut rows: Vec<SelectorSummary> = parsed
        .table(kind)
        .iter()
        .map(|(key, info)| SelectorSummary {
            selector: kind.selector_for(key),
            kind,
            count: info.count,
            example: example_markup(kind, key, info.examples.first()),
        })
        .collect();

    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.selector.cmp(&b.selector)));
    rows
}

fn example_markup(kind: SelectorType, key: &str, example: Option<&RawElement>) -> String {
    let tag = example.map(|e| e.tag.as_str()).unwrap_or("div");
    match kind {
        SelectorType::Tag => {
            let inner = if key == "img" { "" } else { "..." };
            format!("<{}>{}</{}>", key, inner, key)
        }
        SelectorType::Id => format!("<{} id=\"{}\">...</{}>", tag, key, tag),
        SelectorType::Class => format!("<{} class=\"{}\">...</{}>", tag, key, tag),
    }
}

/// Case-insensitive substring filter over selector and example markup.
pub fn search<'a>(rows: &'a [SelectorSummary], term: &str) -> Vec<&'a SelectorSummary> {
    let term = term.to_lowercase();
    rows.iter()
        .filter(|r| {
            r.selector.to_lowercase().contains(&term) || r.example.to_lowercase().contains(&term)
        })
        .collect()
}

pub fn stats(parsed: &ParsedElements) -> ElementStats {
    ElementStats {
        total_elements: parsed.tags.values().map(|i| i.count).sum(),
        unique_ids: parsed.ids.len(),
        unique_classes: parsed.classes.len(),
        unique_tags: parsed.tags.len(),
    }
}

// ============================================================================
// Structural grouping
// ============================================================================

/// Elements sharing a tag and the same presence of id, class and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureGroup {
    pub key: String,
    pub element: RawElement,
    pub count: usize,
}

pub fn structure_key(el: &RawElement) -> String {
    let shape = format!(
        "{}|id={}|class={}|name={}",
        el.tag,
        el.id_value().is_some(),
        el.has_classes(),
        el.name.as_deref().is_some_and(|n| !n.is_empty()),
    );
    let mut hasher = Sha1::new();
    hasher.update(shape.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Group elements by structure, largest group first. Each group keeps the
/// first element seen with that shape.
pub fn group_by_structure(elements: &[RawElement]) -> Vec<StructureGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<StructureGroup> = Vec::new();

    for el in elements {
        let key = structure_key(el);
        match index.get(&key) {
            Some(&i) => groups[i].count += 1,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(StructureGroup {
                    key,
                    element: el.clone(),
                    count: 1,
                });
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}
