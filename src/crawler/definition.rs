use thiserror::Error;
use url::Url;

use crate::crawler::crawler_model::{CrawlerDefinition, Schedule};
use crate::element::element_model::SelectedElement;
use crate::flow::flow_model::Flow;

pub const DEFAULT_MAX_DEPTH: u32 = 3;
pub const DEFAULT_MAX_PAGES: u32 = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CrawlerError {
    #[error("crawler name must not be empty")]
    EmptyName,

    #[error("invalid start URL '{0}'")]
    InvalidUrl(String),

    #[error("select at least one element before creating a crawler")]
    NoSelection,

    #[error("{field} must be at least 1")]
    ZeroLimit { field: &'static str },
}

/// Form values collected before a crawler is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlerDraft {
    pub name: String,
    pub start_url: String,
    pub max_depth: u32,
    pub max_pages: u32,
    pub schedule: Option<Schedule>,
}

impl CrawlerDraft {
    pub fn new(name: impl Into<String>, start_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_url: start_url.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
            schedule: None,
        }
    }

    pub fn with_limits(mut self, max_depth: u32, max_pages: u32) -> Self {
        self.max_depth = max_depth;
        self.max_pages = max_pages;
        self
    }

    pub fn with_schedule(mut self, schedule: Option<Schedule>) -> Self {
        self.schedule = schedule;
        self
    }

    /// Validate the draft and combine it with the current selection and
    /// committed flows.
    pub fn build(
        self,
        selected: &[SelectedElement],
        flows: &[Flow],
    ) -> Result<CrawlerDefinition, CrawlerError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CrawlerError::EmptyName);
        }

        validate_url(&self.start_url)?;

        if selected.is_empty() {
            return Err(CrawlerError::NoSelection);
        }
        if self.max_depth == 0 {
            return Err(CrawlerError::ZeroLimit { field: "max depth" });
        }
        if self.max_pages == 0 {
            return Err(CrawlerError::ZeroLimit { field: "max pages" });
        }

        Ok(CrawlerDefinition {
            name: name.to_string(),
            start_url: self.start_url,
            max_depth: self.max_depth,
            max_pages: self.max_pages,
            schedule: self.schedule,
            selected_elements: selected.to_vec(),
            flows: flows.to_vec(),
        })
    }
}

/// Accept only absolute http(s) URLs.
pub fn validate_url(raw: &str) -> Result<Url, CrawlerError> {
    match Url::parse(raw.trim()) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.host().is_some() => Ok(u),
        _ => Err(CrawlerError::InvalidUrl(raw.to_string())),
    }
}
