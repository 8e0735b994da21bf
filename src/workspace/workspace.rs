use std::path::PathBuf;

use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::api_model::FlowContext;
use crate::api::client::BackendApi;
use crate::api::error::ApiError;
use crate::crawler::crawler_model::{Crawler, CrawlerDefinition};
use crate::crawler::definition::{CrawlerDraft, CrawlerError, validate_url};
use crate::element::element_model::{ElementStats, RawElement, SelectedElement, SelectorType};
use crate::element::ingest::ingest_elements;
use crate::flow::builder::{BuilderError, FlowBuilder};
use crate::flow::flow_list::FlowList;
use crate::flow::flow_model::{ActionType, Flow, TaskAction};
use crate::selection::selection_set::{MatchMode, SelectionSet};
use crate::store::analysis_store::{AnalysisStore, StoreError};
use crate::store::persist::{PersistError, SessionSnapshot, load_session, save_session};
use crate::store::store_model::ElementAnalysis;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Builder(#[from] BuilderError),

    #[error(transparent)]
    Crawler(#[from] CrawlerError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("no page analysed yet")]
    NoPage,

    #[error("flow '{0}' not found")]
    FlowNotFound(String),
}

// ============================================================================
// Workspace
// ============================================================================

/// State owner for one crawler design session: the analysed page, the
/// user's selections, the flow being built, and the committed flows.
pub struct Workspace {
    api: Box<dyn BackendApi>,
    store: AnalysisStore,
    selection: SelectionSet,
    builder: FlowBuilder,
    flows: FlowList,
    start_url: Option<String>,
    persist_path: Option<PathBuf>,
}

impl Workspace {
    pub fn new(api: Box<dyn BackendApi>) -> Self {
        Self {
            api,
            store: AnalysisStore::new(),
            selection: SelectionSet::new(),
            builder: FlowBuilder::new(),
            flows: FlowList::new(),
            start_url: None,
            persist_path: None,
        }
    }

    /// Mirror the session to `path`, restoring whatever was saved there
    /// before.
    pub fn with_persistence(mut self, path: impl Into<PathBuf>) -> Result<Self, WorkspaceError> {
        let path = path.into();
        if let Some(session) = load_session(&path)? {
            info!(
                path = %path.display(),
                flows = session.flows.len(),
                analyses = session.history.analysis_history.len(),
                "restored session"
            );
            self.restore_session(session);
        }
        self.persist_path = Some(path);
        Ok(self)
    }

    /// Current session state as it is mirrored to disk.
    pub fn session_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            start_url: self.start_url.clone(),
            flows: self.flows.flows().to_vec(),
            history: self.store.snapshot(),
        }
    }

    fn restore_session(&mut self, session: SessionSnapshot) {
        let SessionSnapshot {
            start_url,
            flows,
            mut history,
        } = session;
        let flows = FlowList::from_flows(flows);

        // analyses and the current id must refer to a committed flow
        let before = history.analysis_history.len();
        history
            .analysis_history
            .retain(|a| a.flow_id.as_deref().is_none_or(|id| flows.get(id).is_some()));
        let dropped = before - history.analysis_history.len();
        if dropped > 0 {
            warn!(dropped, "discarded analyses of unknown flows");
        }
        if let Some(id) = history.current_flow_id.as_deref() {
            if flows.get(id).is_none() {
                warn!(flow_id = id, "current flow not found, showing start page");
                history.current_flow_id = None;
            }
        }

        self.start_url = start_url;
        self.flows = flows;
        self.selection.clear();
        self.builder = FlowBuilder::new();
        self.store.restore(history);
    }

    // ---- Accessors ----

    pub fn api(&self) -> &dyn BackendApi {
        self.api.as_ref()
    }

    pub fn store(&self) -> &AnalysisStore {
        &self.store
    }

    /// Mutable store access, e.g. to subscribe listeners.
    pub fn store_mut(&mut self) -> &mut AnalysisStore {
        &mut self.store
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn builder(&self) -> &FlowBuilder {
        &self.builder
    }

    pub fn flows(&self) -> &FlowList {
        &self.flows
    }

    pub fn start_url(&self) -> Option<&str> {
        self.start_url.as_deref()
    }

    fn persist(&self) {
        let Some(path) = &self.persist_path else {
            return;
        };
        if let Err(e) = save_session(path, &self.session_snapshot()) {
            warn!(%e, "could not mirror session");
        }
    }

    // ---- Page analysis ----

    /// Analyse a new start page. Starts the design over: selections, flows,
    /// staged tasks and history are all reset once the backend answers.
    pub fn analyze_url(&mut self, url: &str) -> Result<ElementStats, WorkspaceError> {
        validate_url(url)?;
        self.store.begin_request()?;

        let values = match self.api.analyze_url(url) {
            Ok(v) => v,
            Err(e) => {
                warn!(url, %e, "element analysis failed");
                self.store.end_request(Some(e.to_string()));
                return Err(e.into());
            }
        };

        let ingested = ingest_elements(values);
        let analysis = ElementAnalysis::initial(ingested.elements).with_metadata(json!({
            "url": url,
            "rejected": ingested.rejected.len(),
        }));

        self.selection.clear();
        self.flows.clear();
        self.builder = FlowBuilder::new();
        self.store.clear_elements();
        self.store.add_analysis(analysis);
        self.store.end_request(None);
        self.start_url = Some(url.to_string());
        self.persist();

        let stats = self.store.stats();
        info!(url, total = stats.total_elements, "page analysed");
        Ok(stats)
    }

    // ---- Selection ----

    pub fn toggle_selection(&mut self, element: SelectedElement) -> &[SelectedElement] {
        self.selection.toggle(element)
    }

    /// Toggle a selection given as CSS shorthand, filling in its count from
    /// the current element tables.
    pub fn toggle_selector(&mut self, selector: &str) -> &[SelectedElement] {
        let kind = SelectorType::infer(selector);
        let count = self
            .store
            .parsed_elements()
            .and_then(|p| p.table(kind).get(kind.key_of(selector)))
            .map(|info| info.count)
            .unwrap_or(0);
        self.selection.toggle(SelectedElement::new(selector, kind, count))
    }

    pub fn filtered_elements(&self, mode: MatchMode) -> Vec<&RawElement> {
        self.selection.filter(self.store.raw_elements(), mode)
    }

    // ---- Flow building ----

    pub fn add_action(
        &mut self,
        element: &RawElement,
        action_type: ActionType,
        value: Option<String>,
    ) -> Result<String, WorkspaceError> {
        let action = TaskAction::for_element(action_type, element, value);
        Ok(self.builder.add_action(action)?)
    }

    pub fn add_action_for_selector(
        &mut self,
        action_type: ActionType,
        selector: &str,
        value: Option<String>,
    ) -> Result<String, WorkspaceError> {
        let action = TaskAction::for_selector(action_type, selector, value);
        Ok(self.builder.add_action(action)?)
    }

    pub fn delete_task(&mut self, task_id: &str) -> Result<(), WorkspaceError> {
        Ok(self.builder.delete_task(task_id)?)
    }

    pub fn reorder_tasks(&mut self, start: usize, end: usize) -> Result<(), WorkspaceError> {
        Ok(self.builder.reorder(start, end)?)
    }

    /// Ask the backend to run the staged tasks from the current page.
    pub fn analyze_flow(&mut self) -> Result<(), WorkspaceError> {
        let start_url = self.start_url.clone().ok_or(WorkspaceError::NoPage)?;
        let context = FlowContext {
            current_flow_id: self.store.current_flow_id().map(str::to_string),
            selected_elements: self.selection.items().to_vec(),
        };

        self.builder
            .analyze(self.api.as_ref(), &start_url, self.flows.flows(), context)?;
        Ok(())
    }

    /// Name the analysed flow and commit it. Its page snapshot becomes the
    /// current analysis.
    pub fn confirm_flow(&mut self, name: &str) -> Result<Flow, WorkspaceError> {
        let (flow, analysis) = self.builder.confirm_name(name)?;
        self.store.add_analysis(analysis);
        let flow = self.flows.commit(flow).clone();
        self.persist();
        Ok(flow)
    }

    pub fn cancel_flow(&mut self) -> Result<(), WorkspaceError> {
        Ok(self.builder.cancel()?)
    }

    /// Switch the element view to a committed flow (`None` = start page).
    pub fn select_flow(&mut self, flow_id: Option<&str>) -> Result<(), WorkspaceError> {
        if let Some(id) = flow_id {
            if self.flows.get(id).is_none() {
                return Err(WorkspaceError::FlowNotFound(id.to_string()));
            }
        }
        self.store.set_current_flow(flow_id.map(str::to_string));
        self.persist();
        Ok(())
    }

    pub fn delete_flow(&mut self, flow_id: &str) -> Result<Flow, WorkspaceError> {
        let flow = self
            .flows
            .delete(flow_id)
            .ok_or_else(|| WorkspaceError::FlowNotFound(flow_id.to_string()))?;
        self.store.remove_analysis(Some(flow_id));
        self.persist();
        Ok(flow)
    }

    pub fn reorder_flows(&mut self, start: usize, end: usize) -> bool {
        let moved = self.flows.reorder(start, end);
        if moved {
            self.persist();
        }
        moved
    }

    // ---- Crawler assembly ----

    pub fn build_crawler(&self, draft: CrawlerDraft) -> Result<CrawlerDefinition, WorkspaceError> {
        Ok(draft.build(self.selection.items(), self.flows.flows())?)
    }

    pub fn submit_crawler(&self, draft: CrawlerDraft) -> Result<Crawler, WorkspaceError> {
        let definition = self.build_crawler(draft)?;
        let crawler = self.api.create_crawler(&definition)?;
        info!(id = %crawler.id, name = %crawler.name, "crawler created");
        Ok(crawler)
    }
}
