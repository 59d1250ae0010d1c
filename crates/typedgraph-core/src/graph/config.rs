//! Store configuration.

/// Configuration for a [`Graph`](super::Graph).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphConfig {
    /// Initial capacity for nodes.
    pub initial_node_capacity: usize,
    /// Initial capacity for edges.
    pub initial_edge_capacity: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            initial_node_capacity: 1024,
            initial_edge_capacity: 4096,
        }
    }
}

impl GraphConfig {
    /// Sets the initial node capacity.
    #[must_use]
    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.initial_node_capacity = capacity;
        self
    }

    /// Sets the initial edge capacity.
    #[must_use]
    pub fn with_edge_capacity(mut self, capacity: usize) -> Self {
        self.initial_edge_capacity = capacity;
        self
    }
}
