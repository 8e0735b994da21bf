use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::element_model::SelectedElement;
use crate::flow::flow_model::Flow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlerStatus {
    Idle,
    Running,
    Completed,
    Error,
}

impl fmt::Display for CrawlerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CrawlerStatus::Idle => "idle",
            CrawlerStatus::Running => "running",
            CrawlerStatus::Completed => "completed",
            CrawlerStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Recurring run schedule. Absent means manual runs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    Daily,
    Weekly,
    Monthly,
}

impl std::str::FromStr for Schedule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Schedule::Daily),
            "weekly" => Ok(Schedule::Weekly),
            "monthly" => Ok(Schedule::Monthly),
            other => Err(format!("unknown schedule '{}'", other)),
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Schedule::Daily => "daily",
            Schedule::Weekly => "weekly",
            Schedule::Monthly => "monthly",
        };
        f.write_str(s)
    }
}

/// A crawler as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crawler {
    pub id: String,
    pub name: String,
    pub url: String,
    pub status: CrawlerStatus,
    #[serde(default)]
    pub last_run: Option<String>,
    #[serde(default)]
    pub schedule: Option<Schedule>,
}

/// Everything needed to create a crawler (`POST /api/crawlers`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerDefinition {
    pub name: String,
    pub start_url: String,
    pub max_depth: u32,
    pub max_pages: u32,
    #[serde(default)]
    pub schedule: Option<Schedule>,
    pub selected_elements: Vec<SelectedElement>,
    pub flows: Vec<Flow>,
}

/// Partial update (`PATCH /api/crawlers/{id}`). Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
}

impl CrawlerPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.max_depth.is_none()
            && self.max_pages.is_none()
            && self.schedule.is_none()
    }
}

/// Answer of the status, start and stop endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerStatusReport {
    pub id: String,
    pub status: CrawlerStatus,
    #[serde(default)]
    pub last_run: Option<String>,
    #[serde(default)]
    pub pages_crawled: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}
