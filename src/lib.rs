//! Design web crawlers from analysed page elements.
//!
//! An external backend reports a page's DOM elements; this crate groups
//! them into id, class and tag tables, tracks the user's selections, builds
//! ordered action flows, and assembles everything into crawler definitions
//! the backend can run.
//!
//! - [`element`]: raw element ingestion, classification and summaries
//! - [`selection`]: selected selectors and AND/OR filtering
//! - [`flow`]: task/flow model, the flow builder state machine, committed flows
//! - [`store`]: analysis history with change notification and disk mirroring
//! - [`api`]: backend trait, HTTP client, and offline mock
//! - [`crawler`]: crawler definitions and validation
//! - [`workspace`]: the state owner tying the above together

pub mod api;
pub mod cli;
pub mod crawler;
pub mod element;
pub mod flow;
pub mod report;
pub mod selection;
pub mod store;
pub mod trace;
pub mod workspace;

pub use api::client::{BackendApi, HttpBackend};
pub use api::error::ApiError;
pub use api::mock::MockBackend;
pub use element::classifier::classify;
pub use element::element_model::{
    ElementInfo, ElementStats, ParsedElements, RawElement, SelectedElement, SelectorType,
};
pub use flow::builder::{BuilderError, BuilderState, FlowBuilder};
pub use flow::flow_model::{ActionType, CrawlerTask, Flow, TaskAction};
pub use selection::selection_set::{MatchMode, SelectionSet};
pub use store::analysis_store::AnalysisStore;
pub use store::store_model::{ElementAnalysis, StoreEvent};
pub use workspace::workspace::{Workspace, WorkspaceError};
