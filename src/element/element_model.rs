use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of example elements retained per classified key.
pub const MAX_EXAMPLES: usize = 3;

/// One DOM node as reported by the backend analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawElement {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "class")]
    pub classes: Option<Vec<String>>,
    #[serde(default)]
    pub name: Option<String>,
}

impl RawElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            id: None,
            classes: None,
            name: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = Some(classes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Id value, ignoring empty strings.
    pub fn id_value(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Non-empty class names in document order.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|c| !c.is_empty())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_names().any(|c| c == class)
    }

    pub fn has_classes(&self) -> bool {
        self.class_names().next().is_some()
    }
}

/// Aggregate for one tag name, id value, or class name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub count: usize,
    pub examples: Vec<RawElement>,
}

impl ElementInfo {
    pub fn first(element: &RawElement) -> Self {
        Self {
            count: 1,
            examples: vec![element.clone()],
        }
    }

    pub fn record(&mut self, element: &RawElement) {
        self.count += 1;
        if self.examples.len() < MAX_EXAMPLES {
            self.examples.push(element.clone());
        }
    }
}

/// Frequency tables built by [`classify`](crate::element::classifier::classify).
///
/// Always rebuilt wholesale from a raw element list, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedElements {
    pub ids: HashMap<String, ElementInfo>,
    pub classes: HashMap<String, ElementInfo>,
    pub tags: HashMap<String, ElementInfo>,
    /// Input elements skipped because they carried no usable tag.
    #[serde(default)]
    pub rejected: usize,
}

impl ParsedElements {
    pub fn table(&self, kind: SelectorType) -> &HashMap<String, ElementInfo> {
        match kind {
            SelectorType::Id => &self.ids,
            SelectorType::Class => &self.classes,
            SelectorType::Tag => &self.tags,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorType {
    Id,
    Class,
    Tag,
}

impl SelectorType {
    pub fn prefix(self) -> &'static str {
        match self {
            SelectorType::Id => "#",
            SelectorType::Class => ".",
            SelectorType::Tag => "",
        }
    }

    /// Build a CSS shorthand selector for a raw key.
    pub fn selector_for(self, key: &str) -> String {
        format!("{}{}", self.prefix(), key)
    }

    /// Strip this kind's prefix from a selector, if present.
    pub fn key_of(self, selector: &str) -> &str {
        selector.strip_prefix(self.prefix()).unwrap_or(selector)
    }

    /// Infer the kind from CSS shorthand (`#x`, `.x`, else tag).
    pub fn infer(selector: &str) -> Self {
        if selector.starts_with('#') {
            SelectorType::Id
        } else if selector.starts_with('.') {
            SelectorType::Class
        } else {
            SelectorType::Tag
        }
    }
}

impl fmt::Display for SelectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SelectorType::Id => "id",
            SelectorType::Class => "class",
            SelectorType::Tag => "tag",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for SelectorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "id" | "ids" => Ok(SelectorType::Id),
            "class" | "classes" => Ok(SelectorType::Class),
            "tag" | "tags" => Ok(SelectorType::Tag),
            other => Err(format!("unknown selector type '{}'", other)),
        }
    }
}

/// A user's chosen filter criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedElement {
    pub selector: String,
    #[serde(rename = "type")]
    pub kind: SelectorType,
    pub count: usize,
}

impl SelectedElement {
    pub fn new(selector: impl Into<String>, kind: SelectorType, count: usize) -> Self {
        Self {
            selector: selector.into(),
            kind,
            count,
        }
    }

    /// Parse CSS shorthand, inferring the kind from its prefix.
    pub fn from_selector(selector: &str) -> Self {
        Self::new(selector, SelectorType::infer(selector), 0)
    }

    pub fn same_key(&self, selector: &str, kind: SelectorType) -> bool {
        self.kind == kind && self.kind.key_of(&self.selector) == kind.key_of(selector)
    }

    pub fn matches(&self, element: &RawElement) -> bool {
        let key = self.kind.key_of(&self.selector);
        match self.kind {
            SelectorType::Id => element.id_value() == Some(key),
            SelectorType::Class => element.has_class(key),
            SelectorType::Tag => element.tag.eq_ignore_ascii_case(key),
        }
    }
}

/// Headline numbers shown above the element tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStats {
    pub total_elements: usize,
    pub unique_ids: usize,
    pub unique_classes: usize,
    pub unique_tags: usize,
}
