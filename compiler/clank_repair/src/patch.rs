//! The closed set of machine-executable AST edits.
//!
//! Consumers apply patches; the compiler only proposes them. Nodes are
//! referenced by id, never by pointer. Replacement payloads are serialized
//! AST fragments.

use serde::Serialize;
use serde_json::Value;

use clank_ir::NodeId;

/// A single edit operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PatchOp {
    ReplaceNode {
        node_id: NodeId,
        new_node: Value,
    },
    InsertBefore {
        node_id: NodeId,
        new_node: Value,
    },
    InsertAfter {
        node_id: NodeId,
        new_node: Value,
    },
    /// Wrap the node in a construct. `wrapper` is source text with
    /// `hole_ref` marking where the original node goes.
    Wrap {
        node_id: NodeId,
        wrapper: String,
        hole_ref: String,
    },
    DeleteNode {
        node_id: NodeId,
    },
    AddField {
        node_id: NodeId,
        name: String,
        value: Value,
    },
    AddParam {
        fn_id: NodeId,
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        ty: Option<String>,
    },
    AddRefinement {
        node_id: NodeId,
        predicate: String,
    },
    WidenEffect {
        fn_id: NodeId,
        add_effects: Vec<String>,
    },
    Rename {
        node_id: NodeId,
        new_name: String,
    },
    /// Rename every occurrence of a symbol within the node's scope.
    RenameSymbol {
        node_id: NodeId,
        from: String,
        to: String,
    },
    RenameField {
        node_id: NodeId,
        from: String,
        to: String,
    },
}

impl PatchOp {
    /// The node this edit anchors to.
    pub fn anchor(&self) -> NodeId {
        match self {
            PatchOp::ReplaceNode { node_id, .. }
            | PatchOp::InsertBefore { node_id, .. }
            | PatchOp::InsertAfter { node_id, .. }
            | PatchOp::Wrap { node_id, .. }
            | PatchOp::DeleteNode { node_id }
            | PatchOp::AddField { node_id, .. }
            | PatchOp::AddRefinement { node_id, .. }
            | PatchOp::Rename { node_id, .. }
            | PatchOp::RenameSymbol { node_id, .. }
            | PatchOp::RenameField { node_id, .. } => *node_id,
            PatchOp::AddParam { fn_id, .. } | PatchOp::WidenEffect { fn_id, .. } => *fn_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_with_op_tag() {
        let op = PatchOp::WidenEffect {
            fn_id: NodeId::from_raw(7),
            add_effects: vec!["IO".to_string()],
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "widen_effect");
        assert_eq!(json["fn_id"], 7);
        assert_eq!(json["add_effects"][0], "IO");
    }

    #[test]
    fn wrap_carries_hole_ref() {
        let op = PatchOp::Wrap {
            node_id: NodeId::from_raw(3),
            wrapper: "if n > 0 { @ }".to_string(),
            hole_ref: "@".to_string(),
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "wrap");
        assert_eq!(json["wrapper"], "if n > 0 { @ }");
        assert_eq!(json["hole_ref"], "@");
    }
}
