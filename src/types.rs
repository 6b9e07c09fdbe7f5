//! Core data types for automation graphs.
//!
//! This module defines the fundamental structures shared by the graph model, the
//! interaction engine and the persisted workflow record: node kinds and their handle
//! topology, nodes, edges and canvas positions.

use crate::constants::{HANDLE_CENTER_Y, HANDLE_FALSE_Y, HANDLE_TRUE_Y, NODE_HEIGHT, NODE_WIDTH};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for graph nodes.
pub type NodeId = String;

/// Unique identifier for graph edges.
pub type EdgeId = String;

/// Opaque configuration bag attached to every node.
pub type NodeData = serde_json::Map<String, serde_json::Value>;

/// The role a node plays in an automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Root of an automation; starts a run when an event occurs
    Trigger,
    /// Branch point with a `true` and a `false` outgoing handle
    Condition,
    /// Terminal step that performs work
    Action,
}

impl NodeKind {
    /// All kinds, in palette order.
    pub const ALL: [NodeKind; 3] = [NodeKind::Trigger, NodeKind::Condition, NodeKind::Action];

    /// Whether nodes of this kind expose an incoming (target) handle.
    pub fn accepts_incoming(self) -> bool {
        !matches!(self, NodeKind::Trigger)
    }

    /// Outgoing handles offered by nodes of this kind.
    ///
    /// `None` is the unnamed handle of a trigger. Actions are leaves and offer none.
    pub fn source_handles(self) -> &'static [Option<Branch>] {
        match self {
            NodeKind::Trigger => &[None],
            NodeKind::Condition => &[Some(Branch::True), Some(Branch::False)],
            NodeKind::Action => &[],
        }
    }

    /// Whether `handle` is one of this kind's outgoing handles.
    pub fn offers_source_handle(self, handle: Option<Branch>) -> bool {
        self.source_handles().contains(&handle)
    }

    /// Human readable name used by the palette and properties panel.
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Trigger => "Trigger",
            NodeKind::Condition => "Condition",
            NodeKind::Action => "Action",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named outgoing handle of a condition node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    /// Followed when the condition holds
    True,
    /// Followed when the condition does not hold
    False,
}

impl Branch {
    /// Wire name of the handle.
    pub fn as_str(self) -> &'static str {
        match self {
            Branch::True => "true",
            Branch::False => "false",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Position {
    /// Creates a new canvas position.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rounds both coordinates to whole canvas units.
    pub fn rounded(self) -> Self {
        Self::new(self.x.round(), self.y.round())
    }

    /// Returns this position shifted by `(dx, dy)`.
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Position) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<(f32, f32)> for Position {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// One automation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,
    /// Trigger, condition or action; fixed at creation
    #[serde(alias = "type")]
    pub kind: NodeKind,
    /// Concrete variant, e.g. `contact_created` or `create_task`
    pub subtype: String,
    /// Top-left corner in canvas space
    pub position: Position,
    /// Subtype specific configuration, never inspected by the engine
    #[serde(default)]
    pub data: NodeData,
}

impl Node {
    /// Anchor of the incoming handle, or `None` for kinds without one.
    pub fn target_anchor(&self) -> Option<Position> {
        self.kind
            .accepts_incoming()
            .then(|| self.position.offset(0.0, HANDLE_CENTER_Y))
    }

    /// Anchor of the given outgoing handle, or `None` if this node does not offer it.
    pub fn source_anchor(&self, handle: Option<Branch>) -> Option<Position> {
        if !self.kind.offers_source_handle(handle) {
            return None;
        }
        let dy = match handle {
            None => HANDLE_CENTER_Y,
            Some(Branch::True) => HANDLE_TRUE_Y,
            Some(Branch::False) => HANDLE_FALSE_Y,
        };
        Some(self.position.offset(NODE_WIDTH, dy))
    }

    /// Whether `point` lies inside the node's footprint.
    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.position.x
            && point.x <= self.position.x + NODE_WIDTH
            && point.y >= self.position.y
            && point.y <= self.position.y + NODE_HEIGHT
    }
}

/// A directed link from one node's outgoing handle to another node's incoming handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Identifier derived from `(source, source_handle, target)`
    pub id: EdgeId,
    /// ID of the source node
    pub source: NodeId,
    /// ID of the target node
    pub target: NodeId,
    /// Outgoing handle of the source; `None` for the unnamed trigger handle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<Branch>,
}

impl Edge {
    /// Creates an edge whose id is derived from its endpoints.
    pub fn new(source: NodeId, source_handle: Option<Branch>, target: NodeId) -> Self {
        Self {
            id: Self::id_for(&source, source_handle, &target),
            source,
            target,
            source_handle,
        }
    }

    /// Deterministic id for the `(source, source_handle, target)` triple.
    ///
    /// The source is length-prefixed and the handle name contains no `:`, so distinct
    /// triples never share an id whatever characters the node ids contain.
    pub fn id_for(source: &str, source_handle: Option<Branch>, target: &str) -> EdgeId {
        let handle = source_handle.map_or("out", Branch::as_str);
        format!("edge:{}:{source}:{handle}:{target}", source.len())
    }

    /// Whether this edge connects exactly the given triple.
    pub fn connects(&self, source: &str, source_handle: Option<Branch>, target: &str) -> bool {
        self.source == source && self.source_handle == source_handle && self.target == target
    }
}
