//! Node template registry.
//!
//! A static catalogue of every `(kind, subtype)` the palette offers, together with the
//! default data bag a freshly dropped node starts with. Handle topology is implied by the
//! template's kind (see [`NodeKind::source_handles`]).

use crate::types::{Node, NodeData, NodeKind};
use once_cell::sync::Lazy;
use serde_json::json;

/// A palette entry: everything needed to create a node of one subtype.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTemplate {
    /// Kind of node this template creates
    pub kind: NodeKind,
    /// Subtype slug stored on the node
    pub subtype: &'static str,
    /// Label shown in the palette and on the canvas
    pub label: &'static str,
    /// Initial configuration copied into the node's data bag
    pub default_data: NodeData,
}

impl NodeTemplate {
    fn new(kind: NodeKind, subtype: &'static str, label: &'static str, data: serde_json::Value) -> Self {
        let default_data = match data {
            serde_json::Value::Object(map) => map,
            _ => NodeData::new(),
        };
        Self {
            kind,
            subtype,
            label,
            default_data,
        }
    }
}

static TEMPLATES: Lazy<Vec<NodeTemplate>> = Lazy::new(|| {
    use NodeKind::*;
    vec![
        // Triggers
        NodeTemplate::new(Trigger, "contact_created", "Contact created", json!({})),
        NodeTemplate::new(
            Trigger,
            "contact_updated",
            "Contact updated",
            json!({ "field": "" }),
        ),
        NodeTemplate::new(
            Trigger,
            "deal_stage_changed",
            "Deal stage changed",
            json!({ "pipelineId": "", "toStage": "" }),
        ),
        NodeTemplate::new(Trigger, "form_submitted", "Form submitted", json!({ "formId": "" })),
        NodeTemplate::new(Trigger, "tag_added", "Tag added", json!({ "tag": "" })),
        // Conditions
        NodeTemplate::new(Condition, "tag_equals", "Tag equals", json!({ "tag": "" })),
        NodeTemplate::new(
            Condition,
            "field_equals",
            "Field equals",
            json!({ "field": "", "value": "" }),
        ),
        NodeTemplate::new(
            Condition,
            "deal_value_above",
            "Deal value above",
            json!({ "amount": 0 }),
        ),
        // Actions
        NodeTemplate::new(
            Action,
            "create_task",
            "Create task",
            json!({ "title": "", "assigneeId": null, "dueInDays": 1 }),
        ),
        NodeTemplate::new(
            Action,
            "send_email",
            "Send email",
            json!({ "templateId": "", "subject": "" }),
        ),
        NodeTemplate::new(Action, "add_tag", "Add tag", json!({ "tag": "" })),
        NodeTemplate::new(
            Action,
            "update_field",
            "Update field",
            json!({ "field": "", "value": "" }),
        ),
        NodeTemplate::new(Action, "assign_owner", "Assign owner", json!({ "ownerId": null })),
    ]
});

/// Every template, grouped by kind in palette order.
pub fn all() -> &'static [NodeTemplate] {
    &TEMPLATES
}

/// Templates of a single kind.
pub fn for_kind(kind: NodeKind) -> impl Iterator<Item = &'static NodeTemplate> {
    TEMPLATES.iter().filter(move |t| t.kind == kind)
}

/// Looks up the template for a `(kind, subtype)` pair.
pub fn find(kind: NodeKind, subtype: &str) -> Option<&'static NodeTemplate> {
    TEMPLATES
        .iter()
        .find(|t| t.kind == kind && t.subtype == subtype)
}

/// Display label for a node; falls back to the raw subtype for unknown variants.
pub fn label_for(node: &Node) -> &str {
    find(node.kind, &node.subtype).map_or(node.subtype.as_str(), |t| t.label)
}
