use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::api_model::{FlowCheckRequest, FlowCheckResponse, FlowContext};
use crate::api::client::BackendApi;
use crate::api::error::ApiError;
use crate::element::ingest::ingest_elements;
use crate::flow::flow_model::{
    CrawlerTask, Flow, FlowMetadata, TaskAction, move_item, renumber_tasks,
};
use crate::store::store_model::ElementAnalysis;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuilderError {
    #[error("cannot {op} while {state}")]
    InvalidState {
        op: &'static str,
        state: &'static str,
    },

    #[error("a flow analysis is already in flight")]
    AlreadyAnalyzing,

    #[error("no tasks staged")]
    NothingStaged,

    #[error("task '{0}' not found")]
    TaskNotFound(String),

    #[error("cannot move task {start} to {end}: only {len} tasks staged")]
    IndexOutOfRange { start: usize, end: usize, len: usize },

    #[error("flow name must not be empty")]
    EmptyName,

    #[error("flow analysis failed: {0}")]
    Analysis(String),
}

// ============================================================================
// Builder state machine
// ============================================================================

/// Lifecycle of one in-progress flow.
///
/// ```text
/// Idle --add--> Accumulating --begin--> Analyzing --ok--> AwaitingName --confirm--> Idle
///                    ^                      |                   |
///                    +-------- err ---------+                   +--cancel--> Idle
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderState {
    Idle,
    Accumulating {
        tasks: Vec<CrawlerTask>,
    },
    Analyzing {
        tasks: Vec<CrawlerTask>,
        start_url: String,
    },
    AwaitingName {
        tasks: Vec<CrawlerTask>,
        start_url: String,
        analysis: ElementAnalysis,
    },
}

impl BuilderState {
    pub fn name(&self) -> &'static str {
        match self {
            BuilderState::Idle => "idle",
            BuilderState::Accumulating { .. } => "accumulating",
            BuilderState::Analyzing { .. } => "analyzing",
            BuilderState::AwaitingName { .. } => "awaiting a name",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowBuilder {
    state: BuilderState,
    error: Option<String>,
}

impl Default for FlowBuilder {
    fn default() -> Self {
        Self {
            state: BuilderState::Idle,
            error: None,
        }
    }
}

impl FlowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &BuilderState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, BuilderState::Analyzing { .. })
    }

    pub fn tasks(&self) -> &[CrawlerTask] {
        match &self.state {
            BuilderState::Idle => &[],
            BuilderState::Accumulating { tasks }
            | BuilderState::Analyzing { tasks, .. }
            | BuilderState::AwaitingName { tasks, .. } => tasks,
        }
    }

    /// Analysis waiting for a flow name, if any.
    pub fn pending_analysis(&self) -> Option<&ElementAnalysis> {
        match &self.state {
            BuilderState::AwaitingName { analysis, .. } => Some(analysis),
            _ => None,
        }
    }

    fn invalid(&self, op: &'static str) -> BuilderError {
        if self.is_analyzing() && op == "start an analysis" {
            return BuilderError::AlreadyAnalyzing;
        }
        BuilderError::InvalidState {
            op,
            state: self.state.name(),
        }
    }

    fn staged_mut(&mut self, op: &'static str) -> Result<&mut Vec<CrawlerTask>, BuilderError> {
        if !matches!(self.state, BuilderState::Accumulating { .. }) {
            return Err(self.invalid(op));
        }
        match &mut self.state {
            BuilderState::Accumulating { tasks } => Ok(tasks),
            _ => Err(BuilderError::NothingStaged),
        }
    }

    // ---- Staging ----

    /// Stage an action as a new task at the end of the list. Returns the
    /// new task's id.
    pub fn add_action(&mut self, action: TaskAction) -> Result<String, BuilderError> {
        let task = match &mut self.state {
            BuilderState::Idle => {
                let task = CrawlerTask::single(action, 0);
                self.state = BuilderState::Accumulating {
                    tasks: vec![task.clone()],
                };
                task
            }
            BuilderState::Accumulating { tasks } => {
                let task = CrawlerTask::single(action, tasks.len());
                tasks.push(task.clone());
                task
            }
            _ => return Err(self.invalid("add an action")),
        };
        self.error = None;
        Ok(task.id)
    }

    /// Remove a staged task and renumber the rest. Removing the last task
    /// returns the builder to idle.
    pub fn delete_task(&mut self, task_id: &str) -> Result<(), BuilderError> {
        let tasks = self.staged_mut("delete a task")?;
        let pos = tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| BuilderError::TaskNotFound(task_id.to_string()))?;

        tasks.remove(pos);
        renumber_tasks(tasks);

        if tasks.is_empty() {
            self.state = BuilderState::Idle;
        }
        Ok(())
    }

    /// Move the task at `start` to `end`, renumbering every task.
    pub fn reorder(&mut self, start: usize, end: usize) -> Result<(), BuilderError> {
        let tasks = self.staged_mut("reorder tasks")?;
        let len = tasks.len();
        if !move_item(tasks, start, end) {
            return Err(BuilderError::IndexOutOfRange { start, end, len });
        }
        renumber_tasks(tasks);
        Ok(())
    }

    // ---- Analysis ----

    /// Enter `Analyzing` and hand back the tasks to send. Fails while a
    /// previous analysis is still in flight.
    pub fn begin_analysis(&mut self, start_url: &str) -> Result<Vec<CrawlerTask>, BuilderError> {
        match std::mem::replace(&mut self.state, BuilderState::Idle) {
            BuilderState::Accumulating { tasks } => {
                self.state = BuilderState::Analyzing {
                    tasks: tasks.clone(),
                    start_url: start_url.to_string(),
                };
                self.error = None;
                Ok(tasks)
            }
            BuilderState::Idle => Err(BuilderError::NothingStaged),
            other => {
                self.state = other;
                Err(self.invalid("start an analysis"))
            }
        }
    }

    /// Apply the backend's answer. Success moves to `AwaitingName`; failure
    /// returns to `Accumulating` with the staged tasks intact and `error` set.
    pub fn finish_analysis(
        &mut self,
        result: Result<FlowCheckResponse, ApiError>,
    ) -> Result<(), BuilderError> {
        let (tasks, start_url) = match std::mem::replace(&mut self.state, BuilderState::Idle) {
            BuilderState::Analyzing { tasks, start_url } => (tasks, start_url),
            other => {
                self.state = other;
                return Err(self.invalid("finish an analysis"));
            }
        };

        let response = match result {
            Ok(r) if r.errors.as_ref().is_some_and(|e| !e.is_empty()) => {
                Err(ApiError::Flow(r.errors.unwrap_or_default()).to_string())
            }
            Ok(r) => Ok(r),
            Err(e) => Err(e.to_string()),
        };

        match response {
            Ok(response) => {
                let ingested = ingest_elements(response.elements);
                let analysis =
                    ElementAnalysis::new(None, ingested.elements).with_metadata(response.metadata);
                self.state = BuilderState::AwaitingName {
                    tasks,
                    start_url,
                    analysis,
                };
                Ok(())
            }
            Err(message) => {
                warn!(%message, "flow analysis failed");
                self.state = BuilderState::Accumulating { tasks };
                self.error = Some(message.clone());
                Err(BuilderError::Analysis(message))
            }
        }
    }

    /// Run a full analysis round trip against `api`.
    pub fn analyze(
        &mut self,
        api: &dyn BackendApi,
        start_url: &str,
        flows: &[Flow],
        context: FlowContext,
    ) -> Result<(), BuilderError> {
        let tasks = self.begin_analysis(start_url)?;
        let request = FlowCheckRequest {
            start_url: start_url.to_string(),
            flows: flows.to_vec(),
            tasks,
            context,
        };
        let result = api.analyze_flow(&request);
        self.finish_analysis(result)
    }

    // ---- Naming ----

    /// Commit the analysed tasks as a named flow. The returned analysis is
    /// tagged with the new flow's id. The builder returns to idle.
    pub fn confirm_name(&mut self, name: &str) -> Result<(Flow, ElementAnalysis), BuilderError> {
        if !matches!(self.state, BuilderState::AwaitingName { .. }) {
            return Err(self.invalid("name a flow"));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(BuilderError::EmptyName);
        }

        let BuilderState::AwaitingName {
            tasks,
            start_url,
            mut analysis,
        } = std::mem::replace(&mut self.state, BuilderState::Idle)
        else {
            return Err(BuilderError::NothingStaged);
        };

        let id = Uuid::new_v4().to_string();
        analysis.flow_id = Some(id.clone());

        let flow = Flow {
            id,
            name: name.to_string(),
            tasks,
            order: 0,
            metadata: FlowMetadata {
                created_at: Utc::now(),
                start_url: Some(start_url),
                element_count: analysis.elements.len(),
                backend: analysis.metadata.clone(),
            },
        };

        info!(flow = %flow.name, tasks = flow.tasks.len(), "flow committed");
        self.error = None;
        Ok((flow, analysis))
    }

    /// Discard staged tasks and any pending analysis.
    pub fn cancel(&mut self) -> Result<(), BuilderError> {
        if self.is_analyzing() {
            return Err(self.invalid("cancel"));
        }
        self.state = BuilderState::Idle;
        self.error = None;
        Ok(())
    }
}
