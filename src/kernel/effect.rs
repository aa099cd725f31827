use crate::models::NodeId;
use serde_json::Value;

/// Work the state machine cannot do on its own; executed by the tree view service.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ExecuteCommand {
        id: String,
        arguments: Vec<Value>,
    },
    ToggleExpansion(NodeId),
    ShowContextMenu(ContextMenuTarget),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenuTarget {
    pub anchor: (i32, i32),
    /// `viewItem` context key of the clicked node.
    pub context_value: Option<String>,
    /// `[{treeViewId, treeItemId}, [{treeViewId, treeItemId}, ...]]`
    pub args: Vec<Value>,
}
