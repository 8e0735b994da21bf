use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::element::element_model::{RawElement, SelectorType};

// ============================================================================
// Actions
// ============================================================================

/// Interactive step kinds the crawler can perform on a selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Click,
    Type,
    Extract,
    Wait,
    Hover,
}

impl ActionType {
    pub const ALL: [ActionType; 5] = [
        ActionType::Click,
        ActionType::Type,
        ActionType::Extract,
        ActionType::Wait,
        ActionType::Hover,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Click => "click",
            ActionType::Type => "type",
            ActionType::Extract => "extract",
            ActionType::Wait => "wait",
            ActionType::Hover => "hover",
        }
    }

    /// Human-readable name for menus.
    pub fn label(self) -> &'static str {
        match self {
            ActionType::Click => "Click",
            ActionType::Type => "Type Text",
            ActionType::Extract => "Extract Data",
            ActionType::Wait => "Wait",
            ActionType::Hover => "Hover",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionType::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown action type '{}'", s))
    }
}

/// One interactive step bound to a selector. Immutable once staged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub selector: String,
    pub selector_type: SelectorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub description: String,
}

impl TaskAction {
    pub fn new(
        action_type: ActionType,
        selector: impl Into<String>,
        selector_type: SelectorType,
        value: Option<String>,
    ) -> Self {
        let selector = selector.into();
        // only `type` carries a value, and it always carries one
        let value = match action_type {
            ActionType::Type => Some(value.unwrap_or_default()),
            _ => None,
        };
        let description = describe(action_type, &selector, value.as_deref());
        Self {
            action_type,
            selector,
            selector_type,
            value,
            description,
        }
    }

    /// Build an action for a raw element, preferring id, then first class,
    /// then tag as the selector.
    pub fn for_element(
        action_type: ActionType,
        element: &RawElement,
        value: Option<String>,
    ) -> Self {
        let (selector, kind) = best_selector(element);
        Self::new(action_type, selector, kind, value)
    }

    /// Build an action from CSS shorthand (`#id`, `.class`, `tag`).
    pub fn for_selector(action_type: ActionType, selector: &str, value: Option<String>) -> Self {
        Self::new(action_type, selector, SelectorType::infer(selector), value)
    }
}

pub fn best_selector(element: &RawElement) -> (String, SelectorType) {
    if let Some(id) = element.id_value() {
        (SelectorType::Id.selector_for(id), SelectorType::Id)
    } else if let Some(class) = element.class_names().next() {
        (SelectorType::Class.selector_for(class), SelectorType::Class)
    } else {
        (element.tag.clone(), SelectorType::Tag)
    }
}

fn describe(action_type: ActionType, selector: &str, value: Option<&str>) -> String {
    match value {
        Some(v) => format!("{} {} with \"{}\"", action_type, selector, v),
        None => format!("{} {}", action_type, selector),
    }
}

// ============================================================================
// Tasks and flows
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlerTask {
    pub id: String,
    pub actions: Vec<TaskAction>,
    pub order: usize,
}

impl CrawlerTask {
    pub fn single(action: TaskAction, order: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            actions: vec![action],
            order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMetadata {
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
    /// Number of elements the backend reported after running the flow.
    pub element_count: usize,
    /// Anything else the backend attached to the analysis.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub backend: serde_json::Value,
}

/// A named, ordered task sequence describing one path through a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub id: String,
    pub name: String,
    pub tasks: Vec<CrawlerTask>,
    pub order: usize,
    pub metadata: FlowMetadata,
}

/// Rewrite every `order` field to match list position.
pub fn renumber_tasks(tasks: &mut [CrawlerTask]) {
    for (i, task) in tasks.iter_mut().enumerate() {
        task.order = i;
    }
}

pub fn renumber_flows(flows: &mut [Flow]) {
    for (i, flow) in flows.iter_mut().enumerate() {
        flow.order = i;
    }
}

/// Move the item at `start` to `end`. Returns false, leaving the slice
/// untouched, when either index is out of range.
pub fn move_item<T>(items: &mut Vec<T>, start: usize, end: usize) -> bool {
    if start >= items.len() || end >= items.len() {
        return false;
    }
    let item = items.remove(start);
    items.insert(end, item);
    true
}
