use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Group name of menu entries rendered inline on the row instead of in the context menu.
pub const INLINE_GROUP: &str = "inline";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub command_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl MenuItem {
    pub fn is_inline(&self) -> bool {
        self.group.as_deref() == Some(INLINE_GROUP)
    }
}

/// Splits contributed entries into `(inline, context)`.
pub fn split_inline(items: Vec<MenuItem>) -> (Vec<MenuItem>, Vec<MenuItem>) {
    items.into_iter().partition(MenuItem::is_inline)
}

/// Resolves the `view/item/context` entries for a view and a `viewItem` value.
pub trait MenuService: Send + Sync {
    fn menu_items(&self, view_id: &str, context_value: Option<&str>) -> Vec<MenuItem>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenuRequest {
    pub anchor: (i32, i32),
    pub menu_nodes: Vec<MenuItem>,
    pub args: Vec<Value>,
}

pub trait ContextMenuRenderer: Send + Sync {
    fn show(&self, request: ContextMenuRequest);
}
