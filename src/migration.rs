//! Persisted workflow records and the one-way legacy upgrade.
//!
//! Older workflows were stored as a single trigger/action pair. Loading such a record
//! synthesizes an equivalent two-node graph; saving always writes the graph shape with the
//! legacy fields cleared, so editing an old workflow permanently upgrades its storage.
//! There is no conversion back to the legacy shape.

use crate::constants::{LEGACY_ACTION_POSITION, LEGACY_TRIGGER_POSITION};
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Fixed id of the trigger node synthesized from a legacy record.
pub const LEGACY_TRIGGER_ID: &str = "legacy-trigger";
/// Fixed id of the action node synthesized from a legacy record.
pub const LEGACY_ACTION_ID: &str = "legacy-action";

/// A workflow as exchanged with persistence.
///
/// Either shape may be present on input; on output only `nodes`/`edges` are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowRecord {
    /// Graph nodes (canonical shape)
    pub nodes: Vec<Node>,
    /// Graph edges (canonical shape)
    pub edges: Vec<Edge>,
    /// Legacy trigger subtype
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    /// Legacy trigger configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_condition: Option<serde_json::Value>,
    /// Legacy action subtype
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Legacy action configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_details: Option<serde_json::Value>,
}

/// Canonical `(nodes, edges)` form of a workflow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphRecord {
    /// All nodes
    pub nodes: Vec<Node>,
    /// All edges
    pub edges: Vec<Edge>,
}

/// The pre-graph single trigger/action representation.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyRecord {
    /// Trigger subtype
    pub trigger: String,
    /// Trigger configuration, copied verbatim into the trigger node
    pub trigger_condition: NodeData,
    /// Action subtype
    pub action: String,
    /// Action configuration, copied verbatim into the action node
    pub action_details: NodeData,
}

/// Which shape a stored record is in.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordShape {
    /// Already a graph
    Graph(GraphRecord),
    /// Needs upgrading
    Legacy(LegacyRecord),
    /// Nothing usable; a brand-new automation
    Empty,
}

impl WorkflowRecord {
    /// Deserialize a record from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the record to a pretty JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Builds the record written on save: graph shape only, legacy fields cleared.
    pub fn from_graph(graph: GraphRecord) -> Self {
        Self {
            nodes: graph.nodes,
            edges: graph.edges,
            ..Self::default()
        }
    }

    /// Whether any legacy field is still present.
    pub fn has_legacy_fields(&self) -> bool {
        self.trigger.is_some()
            || self.trigger_condition.is_some()
            || self.action.is_some()
            || self.action_details.is_some()
    }

    /// Classifies the record.
    ///
    /// A non-empty node list always wins. A legacy record needs both a trigger and an
    /// action subtype; anything less is treated as empty.
    pub fn shape(&self) -> RecordShape {
        if !self.nodes.is_empty() {
            return RecordShape::Graph(GraphRecord {
                nodes: self.nodes.clone(),
                edges: self.edges.clone(),
            });
        }
        match (non_blank(&self.trigger), non_blank(&self.action)) {
            (Some(trigger), Some(action)) => RecordShape::Legacy(LegacyRecord {
                trigger,
                trigger_condition: as_data(self.trigger_condition.as_ref()),
                action,
                action_details: as_data(self.action_details.as_ref()),
            }),
            _ => {
                if self.has_legacy_fields() {
                    log::warn!("incomplete legacy workflow record; starting from an empty graph");
                }
                RecordShape::Empty
            }
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Turns a legacy configuration value into a data bag.
///
/// Objects are taken as they are, `null` becomes an empty bag, and any other value is kept
/// under a `value` key so nothing is lost.
fn as_data(value: Option<&serde_json::Value>) -> NodeData {
    match value {
        None | Some(serde_json::Value::Null) => NodeData::new(),
        Some(serde_json::Value::Object(map)) => map.clone(),
        Some(other) => {
            let mut data = NodeData::new();
            data.insert("value".to_string(), other.clone());
            data
        }
    }
}

impl LegacyRecord {
    /// Synthesizes the equivalent trigger → action graph.
    pub fn into_graph(self) -> GraphRecord {
        let trigger = Node {
            id: LEGACY_TRIGGER_ID.to_string(),
            kind: NodeKind::Trigger,
            subtype: self.trigger,
            position: LEGACY_TRIGGER_POSITION.into(),
            data: self.trigger_condition,
        };
        let action = Node {
            id: LEGACY_ACTION_ID.to_string(),
            kind: NodeKind::Action,
            subtype: self.action,
            position: LEGACY_ACTION_POSITION.into(),
            data: self.action_details,
        };
        let edge = Edge::new(trigger.id.clone(), None, action.id.clone());
        GraphRecord {
            nodes: vec![trigger, action],
            edges: vec![edge],
        }
    }
}

/// Produces the canonical graph for any stored record.
pub fn materialize(record: &WorkflowRecord) -> GraphRecord {
    match record.shape() {
        RecordShape::Graph(graph) => graph,
        RecordShape::Legacy(legacy) => {
            log::info!(
                "upgrading legacy workflow ({} -> {}) to graph form",
                legacy.trigger,
                legacy.action
            );
            legacy.into_graph()
        }
        RecordShape::Empty => GraphRecord::default(),
    }
}
