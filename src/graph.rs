//! The automation graph: node and edge storage plus the mutation API.
//!
//! The graph is the only place nodes and edges are created. It enforces the structural
//! invariants of an automation: no self-loops, no duplicate `(source, handle, target)`
//! triples, endpoints that exist, and the handle topology of each node kind.

use crate::templates::NodeTemplate;
use crate::types::*;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Reasons a graph mutation is refused. A refused mutation leaves the graph untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The referenced node is not in the graph
    #[error("node '{0}' does not exist")]
    UnknownNode(NodeId),

    /// Source and target are the same node
    #[error("node '{0}' cannot be connected to itself")]
    SelfLoop(NodeId),

    /// An edge with the same `(source, handle, target)` triple exists
    #[error("edge '{0}' already exists")]
    DuplicateEdge(EdgeId),

    /// The source node's kind does not offer this outgoing handle
    #[error("{kind} node '{node}' has no outgoing handle '{handle}'")]
    IllegalSourceHandle {
        /// Source node
        node: NodeId,
        /// Kind of the source node
        kind: NodeKind,
        /// Handle that was requested
        handle: String,
    },

    /// The target node's kind has no incoming handle
    #[error("{kind} node '{node}' does not accept incoming edges")]
    NoIncomingHandle {
        /// Target node
        node: NodeId,
        /// Kind of the target node
        kind: NodeKind,
    },
}

/// Generates node identifiers from a millisecond timestamp and a per-graph counter.
#[derive(Debug, Clone, Default)]
struct IdGenerator {
    counter: u64,
}

impl IdGenerator {
    fn next(&mut self, prefix: &str) -> NodeId {
        self.counter += 1;
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        format!("{prefix}_{millis}_{}", self.counter)
    }
}

/// All nodes and edges of one automation.
///
/// Nodes keep insertion order, which is also the render order (later nodes are drawn on top).
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    ids: IdGenerator,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts a persisted `(nodes, edges)` pair.
    ///
    /// Loaded data passes the same rules as interactive edits: a node whose id is already
    /// taken is dropped, and so is any edge `add_edge` would refuse (missing endpoint,
    /// self-loop, duplicate triple, illegal topology). Kept edges get their id re-derived
    /// from the triple.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut graph = Self {
            nodes: Vec::with_capacity(nodes.len()),
            edges: Vec::with_capacity(edges.len()),
            ids: IdGenerator::default(),
        };
        for node in nodes {
            if graph.node(&node.id).is_some() {
                log::warn!("dropping node with duplicate id '{}'", node.id);
                continue;
            }
            graph.nodes.push(node);
        }
        for edge in edges {
            match graph.check_edge(&edge.source, edge.source_handle, &edge.target) {
                Ok(()) => graph
                    .edges
                    .push(Edge::new(edge.source, edge.source_handle, edge.target)),
                Err(err) => log::warn!("dropping edge '{}': {err}", edge.id),
            }
        }
        graph
    }

    /// Consumes the graph, returning the flat pair handed to persistence.
    pub fn into_parts(self) -> (Vec<Node>, Vec<Edge>) {
        (self.nodes, self.edges)
    }

    /// All nodes in render order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in creation order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    /// Creates a node from `template` at `position` and returns its fresh id.
    pub fn add_node(&mut self, template: &NodeTemplate, position: Position) -> NodeId {
        let prefix = template.kind.label().to_lowercase();
        let id = loop {
            let candidate = self.ids.next(&prefix);
            if self.node(&candidate).is_none() {
                break candidate;
            }
        };
        self.nodes.push(Node {
            id: id.clone(),
            kind: template.kind,
            subtype: template.subtype.to_string(),
            position,
            data: template.default_data.clone(),
        });
        log::debug!("added {} node '{}' at ({}, {})", template.subtype, id, position.x, position.y);
        id
    }

    /// Moves a node to a new canvas position.
    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), GraphError> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;
        node.position = position;
        Ok(())
    }

    /// Replaces a node's data bag. Used by the node configuration editor.
    pub fn set_node_data(&mut self, id: &str, data: NodeData) -> Result<(), GraphError> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;
        node.data = data;
        Ok(())
    }

    /// Whether an edge with exactly this triple exists.
    pub fn has_edge(&self, source: &str, source_handle: Option<Branch>, target: &str) -> bool {
        self.edges
            .iter()
            .any(|edge| edge.connects(source, source_handle, target))
    }

    /// Checks whether `add_edge` would accept the triple, without mutating.
    pub fn check_edge(
        &self,
        source: &str,
        source_handle: Option<Branch>,
        target: &str,
    ) -> Result<(), GraphError> {
        if source == target {
            return Err(GraphError::SelfLoop(source.to_string()));
        }
        let source_node = self
            .node(source)
            .ok_or_else(|| GraphError::UnknownNode(source.to_string()))?;
        let target_node = self
            .node(target)
            .ok_or_else(|| GraphError::UnknownNode(target.to_string()))?;
        if !source_node.kind.offers_source_handle(source_handle) {
            return Err(GraphError::IllegalSourceHandle {
                node: source.to_string(),
                kind: source_node.kind,
                handle: source_handle.map_or_else(|| "default".to_string(), |b| b.to_string()),
            });
        }
        if !target_node.kind.accepts_incoming() {
            return Err(GraphError::NoIncomingHandle {
                node: target.to_string(),
                kind: target_node.kind,
            });
        }
        if self.has_edge(source, source_handle, target) {
            return Err(GraphError::DuplicateEdge(Edge::id_for(
                source,
                source_handle,
                target,
            )));
        }
        Ok(())
    }

    /// Connects `source`'s outgoing handle to `target`'s incoming handle.
    ///
    /// Returns the new edge id, or the reason the edge was refused. Fan-out from one
    /// handle to several targets is allowed.
    pub fn add_edge(
        &mut self,
        source: &str,
        source_handle: Option<Branch>,
        target: &str,
    ) -> Result<EdgeId, GraphError> {
        self.check_edge(source, source_handle, target)?;
        let edge = Edge::new(source.to_string(), source_handle, target.to_string());
        let id = edge.id.clone();
        self.edges.push(edge);
        log::debug!("added edge '{id}'");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates;

    fn template(kind: NodeKind) -> &'static NodeTemplate {
        templates::for_kind(kind).next().expect("template exists")
    }

    fn graph_with(kinds: &[NodeKind]) -> (Graph, Vec<NodeId>) {
        let mut graph = Graph::new();
        let ids = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| graph.add_node(template(*kind), Position::new(i as f32 * 300.0, 0.0)))
            .collect();
        (graph, ids)
    }

    #[test]
    fn test_add_node_copies_template_defaults() {
        let mut graph = Graph::new();
        let create_task = templates::find(NodeKind::Action, "create_task").unwrap();
        let id = graph.add_node(create_task, Position::new(10.0, 20.0));

        let node = graph.node(&id).unwrap();
        assert_eq!(node.kind, NodeKind::Action);
        assert_eq!(node.subtype, "create_task");
        assert_eq!(node.position, Position::new(10.0, 20.0));
        assert_eq!(node.data, create_task.default_data);
    }

    #[test]
    fn test_node_ids_are_unique() {
        let mut graph = Graph::new();
        let t = template(NodeKind::Trigger);
        let ids: std::collections::HashSet<_> =
            (0..50).map(|_| graph.add_node(t, Position::default())).collect();
        assert_eq!(ids.len(), 50);
        assert_eq!(graph.nodes().len(), 50);
    }

    #[test]
    fn test_move_node() {
        let (mut graph, ids) = graph_with(&[NodeKind::Action]);
        graph.move_node(&ids[0], Position::new(7.0, 9.0)).unwrap();
        assert_eq!(graph.node(&ids[0]).unwrap().position, Position::new(7.0, 9.0));

        assert_eq!(
            graph.move_node("missing", Position::default()),
            Err(GraphError::UnknownNode("missing".into()))
        );
    }

    #[test]
    fn test_self_loop_rejected_for_every_handle() {
        let (mut graph, ids) = graph_with(&[NodeKind::Trigger, NodeKind::Condition, NodeKind::Action]);
        for id in &ids {
            for handle in [None, Some(Branch::True), Some(Branch::False)] {
                assert_eq!(
                    graph.add_edge(id, handle, id),
                    Err(GraphError::SelfLoop(id.clone()))
                );
            }
        }
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_duplicate_edge_rejected() {
        let (mut graph, ids) = graph_with(&[NodeKind::Trigger, NodeKind::Action]);
        let first = graph.add_edge(&ids[0], None, &ids[1]).unwrap();
        let second = graph.add_edge(&ids[0], None, &ids[1]);

        assert_eq!(second, Err(GraphError::DuplicateEdge(first)));
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn test_fan_out_allowed() {
        let (mut graph, ids) =
            graph_with(&[NodeKind::Condition, NodeKind::Action, NodeKind::Action]);
        let a = graph.add_edge(&ids[0], Some(Branch::True), &ids[1]).unwrap();
        let b = graph.add_edge(&ids[0], Some(Branch::True), &ids[2]).unwrap();
        let c = graph.add_edge(&ids[0], Some(Branch::False), &ids[1]).unwrap();

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(graph.edges().len(), 3);
    }

    #[test]
    fn test_topology_is_enforced() {
        let (mut graph, ids) = graph_with(&[NodeKind::Trigger, NodeKind::Condition, NodeKind::Action]);
        let (trigger, condition, action) = (&ids[0], &ids[1], &ids[2]);

        // Actions are leaves.
        assert!(matches!(
            graph.add_edge(action, None, condition),
            Err(GraphError::IllegalSourceHandle { .. })
        ));
        // Triggers are roots.
        assert!(matches!(
            graph.add_edge(condition, Some(Branch::True), trigger),
            Err(GraphError::NoIncomingHandle { .. })
        ));
        // Conditions only have named handles, triggers only the unnamed one.
        assert!(matches!(
            graph.add_edge(condition, None, action),
            Err(GraphError::IllegalSourceHandle { .. })
        ));
        assert!(matches!(
            graph.add_edge(trigger, Some(Branch::False), action),
            Err(GraphError::IllegalSourceHandle { .. })
        ));
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_edge_requires_existing_endpoints() {
        let (mut graph, ids) = graph_with(&[NodeKind::Trigger]);
        assert_eq!(
            graph.add_edge(&ids[0], None, "ghost"),
            Err(GraphError::UnknownNode("ghost".into()))
        );
        assert_eq!(
            graph.add_edge("ghost", None, &ids[0]),
            Err(GraphError::UnknownNode("ghost".into()))
        );
    }

    #[test]
    fn test_from_parts_drops_dangling_edges() {
        let (graph, ids) = graph_with(&[NodeKind::Trigger, NodeKind::Action]);
        let (nodes, _) = graph.into_parts();
        let edges = vec![
            Edge::new(ids[0].clone(), None, ids[1].clone()),
            Edge::new(ids[0].clone(), None, "ghost".into()),
        ];

        let graph = Graph::from_parts(nodes, edges);
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edges()[0].target, ids[1]);
    }

    #[test]
    fn test_from_parts_applies_edge_rules() {
        let (graph, ids) = graph_with(&[NodeKind::Trigger, NodeKind::Action]);
        let (nodes, _) = graph.into_parts();
        let (t, a) = (ids[0].clone(), ids[1].clone());
        let stored = |id: &str, source: &NodeId, target: &NodeId| Edge {
            id: id.into(),
            source: source.clone(),
            target: target.clone(),
            source_handle: None,
        };
        let edges = vec![
            stored("e1", &t, &a),
            stored("e2", &t, &a), // duplicate triple
            stored("e3", &a, &a), // self-loop
            stored("e4", &a, &t), // action source into a trigger
        ];

        let graph = Graph::from_parts(nodes, edges);
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edges()[0].id, Edge::id_for(&t, None, &a));
        assert!(graph.has_edge(&t, None, &a));
    }

    #[test]
    fn test_from_parts_drops_duplicate_node_ids() {
        let (graph, ids) = graph_with(&[NodeKind::Action]);
        let (mut nodes, _) = graph.into_parts();
        let mut copy = nodes[0].clone();
        copy.position = Position::new(999.0, 999.0);
        nodes.push(copy);

        let graph = Graph::from_parts(nodes, Vec::new());
        assert_eq!(graph.nodes().len(), 1);
        assert_eq!(graph.node(&ids[0]).unwrap().position, Position::new(0.0, 0.0));
    }

    #[test]
    fn test_separator_characters_in_node_ids_keep_edges_distinct() {
        let mut nodes = Vec::new();
        for (id, kind) in [
            ("a", NodeKind::Trigger),
            ("a:out:x", NodeKind::Trigger),
            ("x:out:y", NodeKind::Action),
            ("y", NodeKind::Action),
        ] {
            nodes.push(Node {
                id: id.into(),
                kind,
                subtype: "any".into(),
                position: Position::default(),
                data: NodeData::new(),
            });
        }
        let mut graph = Graph::from_parts(nodes, Vec::new());

        let first = graph.add_edge("a", None, "x:out:y").unwrap();
        let second = graph.add_edge("a:out:x", None, "y").unwrap();
        assert_ne!(first, second);
        assert_eq!(graph.edges().len(), 2);
    }

    #[test]
    fn test_set_node_data() {
        let (mut graph, ids) = graph_with(&[NodeKind::Action]);
        let mut data = NodeData::new();
        data.insert("title".into(), serde_json::json!("Call back"));
        graph.set_node_data(&ids[0], data.clone()).unwrap();
        assert_eq!(graph.node(&ids[0]).unwrap().data, data);
    }
}
