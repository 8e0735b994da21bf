use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::element::element_model::RawElement;

/// Page state captured after running zero or more flows.
///
/// `flow_id == None` marks the initial page load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementAnalysis {
    pub flow_id: Option<String>,
    pub elements: Vec<RawElement>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl ElementAnalysis {
    pub fn new(flow_id: Option<String>, elements: Vec<RawElement>) -> Self {
        Self {
            flow_id,
            elements,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn initial(elements: Vec<RawElement>) -> Self {
        Self::new(None, elements)
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// What changed in the store. Sent to every listener after the mutation
/// has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    AnalysisAdded { flow_id: Option<String>, elements: usize },
    AnalysisRemoved { flow_id: Option<String> },
    CurrentFlowChanged { flow_id: Option<String> },
    Cleared,
    RequestStarted,
    RequestFinished { error: Option<String> },
    Restored { analyses: usize },
}

/// Serializable copy of the store's history, used by the persistence layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub current_flow_id: Option<String>,
    pub analysis_history: Vec<ElementAnalysis>,
}
