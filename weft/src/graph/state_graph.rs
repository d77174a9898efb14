//! State graph: nodes + explicit edges (from → to) and optional conditional edges.
//!
//! Add nodes with `add_node`, wire them with `add_edge(from, to)` using `START` and
//! `END` for entry/exit, and use `add_conditional_edges` to route on state. Then
//! `compile` to get a `CompiledStateGraph`.
//!
//! A node must have either one outgoing `add_edge` or `add_conditional_edges`, not
//! both. Without conditional edges the edges must form a single linear chain.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut graph = StateGraph::<CalculatorState>::new();
//! graph.add_node("agent", think).add_node("tools", act);
//! graph.add_edge(START, "agent");
//! graph.add_conditional_edges("agent", tools_router, Some(path_map));
//! graph.add_edge("tools", "agent");
//! let compiled = graph.compile()?;
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::CompiledStateGraph;
use crate::graph::conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
use crate::graph::node::Node;
use crate::graph::node_middleware::NodeMiddleware;

/// Sentinel for graph entry: use as `from_id` in `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: use as `to_id` in `add_edge(last_node_id, END)` or as a
/// router result.
pub const END: &str = "__end__";

/// State graph builder, generic over state type `S`.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: Vec<(String, String)>,
    conditional_edges: HashMap<String, ConditionalRouter<S>>,
    middleware: Option<Arc<dyn NodeMiddleware<S>>>,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            conditional_edges: HashMap::new(),
            middleware: None,
        }
    }

    /// Attaches node middleware; `compile()` wires it around every node run.
    pub fn with_middleware(self, middleware: Arc<dyn NodeMiddleware<S>>) -> Self {
        Self {
            middleware: Some(middleware),
            ..self
        }
    }

    /// Adds a node; replaces an existing node with the same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Adds an edge from `from_id` to `to_id` (`START` / `END` allowed).
    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// Adds conditional edges from `source`: after it runs, `path(state)` picks the
    /// next node, translated through `path_map` when one is given.
    pub fn add_conditional_edges(
        &mut self,
        source: impl Into<String>,
        path: ConditionalRouterFn<S>,
        path_map: Option<HashMap<String, String>>,
    ) -> &mut Self {
        self.conditional_edges
            .insert(source.into(), ConditionalRouter::new(path, path_map));
        self
    }

    /// Validates the graph and builds the executable form.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        for (from, to) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if to != END && !self.nodes.contains_key(to) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }
        for (source, router) in &self.conditional_edges {
            if !self.nodes.contains_key(source) {
                return Err(CompilationError::NodeNotFound(source.clone()));
            }
            if let Some(path_map) = &router.path_map {
                if let Some(bad) = path_map
                    .values()
                    .find(|t| t.as_str() != END && !self.nodes.contains_key(t.as_str()))
                {
                    return Err(CompilationError::InvalidConditionalPathMap(bad.clone()));
                }
            }
        }

        let mut start_edges = self
            .edges
            .iter()
            .filter(|(f, _)| f == START)
            .map(|(_, t)| t.clone());
        let first = match (start_edges.next(), start_edges.next()) {
            (None, _) => return Err(CompilationError::MissingStart),
            (Some(first), None) => first,
            (Some(_), Some(_)) => {
                return Err(CompilationError::InvalidChain(
                    "multiple edges from START (branch)".into(),
                ))
            }
        };

        let has_end = self.edges.iter().any(|(_, t)| t == END)
            || self.conditional_edges.values().any(|r| {
                r.path_map
                    .as_ref()
                    .map_or(true, |m| m.values().any(|v| v == END))
            });
        if !has_end {
            return Err(CompilationError::MissingEnd);
        }

        let outgoing: Vec<&(String, String)> =
            self.edges.iter().filter(|(f, _)| f != START).collect();
        let edge_froms: HashSet<&str> = outgoing.iter().map(|(f, _)| f.as_str()).collect();
        if edge_froms.len() != outgoing.len() {
            return Err(CompilationError::InvalidChain(
                "duplicate from (branch)".into(),
            ));
        }
        if let Some(source) = self
            .conditional_edges
            .keys()
            .find(|s| edge_froms.contains(s.as_str()))
        {
            return Err(CompilationError::NodeHasBothEdgeAndConditional(
                source.clone(),
            ));
        }

        let mut next_map: HashMap<String, NextEntry<S>> = outgoing
            .iter()
            .map(|(f, t)| (f.clone(), NextEntry::Unconditional(t.clone())))
            .collect();
        for (source, router) in &self.conditional_edges {
            next_map.insert(source.clone(), NextEntry::Conditional(router.clone()));
        }

        let mut edge_order = vec![first.clone()];
        if self.conditional_edges.is_empty() {
            let linear_next: HashMap<&str, &str> = outgoing
                .iter()
                .map(|(f, t)| (f.as_str(), t.as_str()))
                .collect();
            let mut visited: HashSet<&str> = HashSet::from([first.as_str()]);
            let mut current = first.as_str();
            while let Some(&next) = linear_next.get(current) {
                if next == END {
                    break;
                }
                if !visited.insert(next) {
                    return Err(CompilationError::InvalidChain("cycle detected".into()));
                }
                edge_order.push(next.to_string());
                current = next;
            }
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            first_node_id: first,
            edge_order,
            next_map,
            middleware: self.middleware,
        })
    }
}
