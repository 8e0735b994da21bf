use thiserror::Error;
use tracing::debug;

use crate::element::classifier::classify;
use crate::element::element_model::{ElementStats, ParsedElements, RawElement};
use crate::element::summary::stats;
use crate::store::store_model::{ElementAnalysis, StoreEvent, StoreSnapshot};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("an analysis request is already in flight")]
    RequestInFlight,
}

// ============================================================================
// Listeners
// ============================================================================

/// Receives a [`StoreEvent`] after every store mutation.
pub trait StoreListener {
    fn on_event(&self, event: &StoreEvent);
}

impl<F> StoreListener for F
where
    F: Fn(&StoreEvent),
{
    fn on_event(&self, event: &StoreEvent) {
        self(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

// ============================================================================
// Store
// ============================================================================

/// Sole owner of the analysis history and the element tables derived from it.
///
/// `parsed_elements` is recomputed on every mutation, so it always reflects
/// [`raw_elements`](Self::raw_elements) for the current flow.
#[derive(Default)]
pub struct AnalysisStore {
    history: Vec<ElementAnalysis>,
    current_flow_id: Option<String>,
    parsed: Option<ParsedElements>,
    is_analyzing: bool,
    error: Option<String>,
    listeners: Vec<(ListenerId, Box<dyn StoreListener>)>,
    next_listener: u64,
}

impl std::fmt::Debug for AnalysisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisStore")
            .field("history", &self.history.len())
            .field("current_flow_id", &self.current_flow_id)
            .field("is_analyzing", &self.is_analyzing)
            .field("error", &self.error)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl AnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Listeners ----

    pub fn subscribe(&mut self, listener: impl StoreListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    fn emit(&self, event: StoreEvent) {
        debug!(?event, "store event");
        for (_, listener) in &self.listeners {
            listener.on_event(&event);
        }
    }

    // ---- Commands ----

    /// Record an analysis, replacing any earlier one for the same flow, and
    /// make its flow current.
    pub fn add_analysis(&mut self, analysis: ElementAnalysis) {
        let flow_id = analysis.flow_id.clone();
        let elements = analysis.elements.len();

        self.history.retain(|a| a.flow_id != flow_id);
        self.history.push(analysis);
        self.current_flow_id = flow_id.clone();
        self.reparse();

        self.emit(StoreEvent::AnalysisAdded { flow_id, elements });
    }

    pub fn set_current_flow(&mut self, flow_id: Option<String>) {
        self.current_flow_id = flow_id.clone();
        self.reparse();
        self.emit(StoreEvent::CurrentFlowChanged { flow_id });
    }

    /// Drop the analysis for `flow_id`. If it was current, the initial page
    /// analysis becomes current.
    pub fn remove_analysis(&mut self, flow_id: Option<&str>) -> bool {
        let before = self.history.len();
        self.history.retain(|a| a.flow_id.as_deref() != flow_id);
        if self.history.len() == before {
            return false;
        }

        if self.current_flow_id.as_deref() == flow_id {
            self.current_flow_id = None;
        }
        self.reparse();
        self.emit(StoreEvent::AnalysisRemoved {
            flow_id: flow_id.map(str::to_string),
        });
        true
    }

    pub fn clear_elements(&mut self) {
        self.history.clear();
        self.current_flow_id = None;
        self.parsed = None;
        self.error = None;
        self.emit(StoreEvent::Cleared);
    }

    /// Mark a backend request as started. Rejects overlapping requests.
    pub fn begin_request(&mut self) -> Result<(), StoreError> {
        if self.is_analyzing {
            return Err(StoreError::RequestInFlight);
        }
        self.is_analyzing = true;
        self.error = None;
        self.emit(StoreEvent::RequestStarted);
        Ok(())
    }

    pub fn end_request(&mut self, error: Option<String>) {
        self.is_analyzing = false;
        self.error = error.clone();
        self.emit(StoreEvent::RequestFinished { error });
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            current_flow_id: self.current_flow_id.clone(),
            analysis_history: self.history.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: StoreSnapshot) {
        let analyses = snapshot.analysis_history.len();
        self.history = snapshot.analysis_history;
        self.current_flow_id = snapshot.current_flow_id;
        self.error = None;
        self.reparse();
        self.emit(StoreEvent::Restored { analyses });
    }

    fn reparse(&mut self) {
        self.parsed = if self.history.is_empty() {
            None
        } else {
            Some(classify(self.raw_elements()))
        };
    }

    // ---- Queries ----

    /// Elements for the current flow. Falls back to the most recent
    /// analysis when the current flow has none.
    pub fn raw_elements(&self) -> &[RawElement] {
        self.current_analysis()
            .or_else(|| self.history.last())
            .map(|a| a.elements.as_slice())
            .unwrap_or(&[])
    }

    pub fn current_analysis(&self) -> Option<&ElementAnalysis> {
        self.history
            .iter()
            .find(|a| a.flow_id == self.current_flow_id)
    }

    pub fn analysis_for(&self, flow_id: Option<&str>) -> Option<&ElementAnalysis> {
        self.history.iter().find(|a| a.flow_id.as_deref() == flow_id)
    }

    pub fn parsed_elements(&self) -> Option<&ParsedElements> {
        self.parsed.as_ref()
    }

    pub fn stats(&self) -> ElementStats {
        self.parsed.as_ref().map(stats).unwrap_or_default()
    }

    pub fn history(&self) -> &[ElementAnalysis] {
        &self.history
    }

    pub fn current_flow_id(&self) -> Option<&str> {
        self.current_flow_id.as_deref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.is_analyzing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
