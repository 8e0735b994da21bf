use crate::flow::flow_model::{Flow, move_item, renumber_flows};

/// Committed flows, kept densely ordered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowList {
    flows: Vec<Flow>,
}

impl FlowList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt previously committed flows, renumbering them by position.
    pub fn from_flows(mut flows: Vec<Flow>) -> Self {
        renumber_flows(&mut flows);
        Self { flows }
    }

    /// Append a flow; its `order` becomes its position.
    pub fn commit(&mut self, mut flow: Flow) -> &Flow {
        flow.order = self.flows.len();
        self.flows.push(flow);
        &self.flows[self.flows.len() - 1]
    }

    pub fn delete(&mut self, flow_id: &str) -> Option<Flow> {
        let pos = self.flows.iter().position(|f| f.id == flow_id)?;
        let removed = self.flows.remove(pos);
        renumber_flows(&mut self.flows);
        Some(removed)
    }

    pub fn reorder(&mut self, start: usize, end: usize) -> bool {
        if !move_item(&mut self.flows, start, end) {
            return false;
        }
        renumber_flows(&mut self.flows);
        true
    }

    pub fn get(&self, flow_id: &str) -> Option<&Flow> {
        self.flows.iter().find(|f| f.id == flow_id)
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn clear(&mut self) {
        self.flows.clear();
    }
}
