//! Next-step result from a graph node: continue, jump to a node, or end.

/// Next step after running a node.
///
/// Ignored for nodes that have conditional edges; there the router decides.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    /// Follow the node's outgoing edge (or linear order); END if there is none.
    Continue,
    /// Run the node with the given id next.
    Node(String),
    /// Stop and return the current state.
    End,
}
