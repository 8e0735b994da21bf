use serde::{Deserialize, Serialize};

use crate::element::element_model::{RawElement, SelectedElement, SelectorType};

/// How multiple active selections combine when filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Element must match every active selection.
    All,
    /// Element must match at least one active selection.
    Any,
}

impl std::str::FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" | "and" => Ok(MatchMode::All),
            "any" | "or" => Ok(MatchMode::Any),
            other => Err(format!("unknown match mode '{}'", other)),
        }
    }
}

/// Active selections, unique by `(selector, type)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    items: Vec<SelectedElement>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the selection if absent, remove it if present.
    pub fn toggle(&mut self, element: SelectedElement) -> &[SelectedElement] {
        let before = self.items.len();
        self.items.retain(|e| !e.same_key(&element.selector, element.kind));
        if self.items.len() == before {
            self.items.push(element);
        }
        &self.items
    }

    pub fn remove(&mut self, selector: &str, kind: SelectorType) -> bool {
        let before = self.items.len();
        self.items.retain(|e| !e.same_key(selector, kind));
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_selected(&self, selector: &str, kind: SelectorType) -> bool {
        self.items.iter().any(|e| e.same_key(selector, kind))
    }

    pub fn items(&self) -> &[SelectedElement] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// AND semantics. An empty selection keeps every element.
    pub fn filter_all<'a>(&self, elements: &'a [RawElement]) -> Vec<&'a RawElement> {
        elements
            .iter()
            .filter(|el| self.items.iter().all(|s| s.matches(el)))
            .collect()
    }

    /// OR semantics. An empty selection keeps nothing.
    pub fn filter_any<'a>(&self, elements: &'a [RawElement]) -> Vec<&'a RawElement> {
        elements
            .iter()
            .filter(|el| self.items.iter().any(|s| s.matches(el)))
            .collect()
    }

    pub fn filter<'a>(&self, elements: &'a [RawElement], mode: MatchMode) -> Vec<&'a RawElement> {
        match mode {
            MatchMode::All => self.filter_all(elements),
            MatchMode::Any => self.filter_any(elements),
        }
    }
}
