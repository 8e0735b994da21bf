use serde::{Deserialize, Serialize};

use crate::element::element_model::SelectedElement;
use crate::flow::flow_model::{CrawlerTask, Flow};

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeUrlRequest<'a> {
    pub url: &'a str,
}

/// Page context sent with a flow analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowContext {
    /// Flow whose resulting page the new tasks start from (`None` = start URL)
    pub current_flow_id: Option<String>,
    pub selected_elements: Vec<SelectedElement>,
}

/// Body of `POST /api/flowcheck`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowCheckRequest {
    pub start_url: String,
    pub flows: Vec<Flow>,
    pub tasks: Vec<CrawlerTask>,
    pub context: FlowContext,
}

/// Result of `POST /api/flowcheck`. Elements are kept as raw JSON until
/// ingestion so one bad entry cannot sink the whole response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowCheckResponse {
    pub elements: Vec<serde_json::Value>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// The backend may answer a flow check with either the wrapped object or a
/// bare element array.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum FlowCheckPayload {
    Wrapped(FlowCheckResponse),
    Bare(Vec<serde_json::Value>),
}

impl From<FlowCheckPayload> for FlowCheckResponse {
    fn from(payload: FlowCheckPayload) -> Self {
        match payload {
            FlowCheckPayload::Wrapped(r) => r,
            FlowCheckPayload::Bare(elements) => FlowCheckResponse {
                elements,
                ..Default::default()
            },
        }
    }
}
