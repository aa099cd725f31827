//! 树视图数据模型

use compact_str::CompactString;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::fmt;

new_key_type! { pub struct NodeId; }

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Leaf,
    Composite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeCommand {
    pub id: String,
    #[serde(default)]
    pub arguments: Vec<serde_json::Value>,
}

/// An item as handed out by a tree data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeViewItem {
    pub id: CompactString,
    pub label: CompactString,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<TreeCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl TreeViewItem {
    pub fn leaf(id: impl Into<CompactString>, label: impl Into<CompactString>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: NodeKind::Leaf,
            command: None,
            context_value: None,
            tooltip: None,
        }
    }

    pub fn composite(id: impl Into<CompactString>, label: impl Into<CompactString>) -> Self {
        Self {
            kind: NodeKind::Composite,
            ..Self::leaf(id, label)
        }
    }

    pub fn with_command(mut self, command: TreeCommand) -> Self {
        self.command = Some(command);
        self
    }

    pub fn with_context_value(mut self, value: impl Into<String>) -> Self {
        self.context_value = Some(value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    InvalidNodeId,
    NotComposite,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::InvalidNodeId => write!(f, "invalid node id"),
            TreeError::NotComposite => write!(f, "node cannot hold children"),
        }
    }
}

impl std::error::Error for TreeError {}

#[derive(Debug, Clone)]
struct Node {
    item: TreeViewItem,
    parent: Option<NodeId>,
    children: Option<Vec<NodeId>>,
}

/// Arena backed tree. Parents are stored as keys, so there are no ownership cycles;
/// the root is a synthetic composite node that never shows up in the flattened view.
pub struct TreeModel {
    arena: SlotMap<NodeId, Node>,
    root: NodeId,
    expanded: FxHashSet<NodeId>,
    id_by_item: FxHashMap<CompactString, NodeId>,
    rows: Vec<NodeId>,
    index_by_id: FxHashMap<NodeId, usize>,
}

impl TreeModel {
    pub fn new(root: TreeViewItem) -> Self {
        let mut arena = SlotMap::with_key();
        let mut id_by_item = FxHashMap::default();
        let root_item_id = root.id.clone();
        let root = arena.insert(Node {
            item: TreeViewItem {
                kind: NodeKind::Composite,
                ..root
            },
            parent: None,
            children: None,
        });
        id_by_item.insert(root_item_id, root);

        let mut expanded = FxHashSet::default();
        expanded.insert(root);

        Self {
            arena,
            root,
            expanded,
            id_by_item,
            rows: Vec::new(),
            index_by_id: FxHashMap::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() <= 1
    }

    pub fn item(&self, id: NodeId) -> Option<&TreeViewItem> {
        self.arena.get(id).map(|n| &n.item)
    }

    pub fn item_id(&self, id: NodeId) -> Option<&str> {
        self.arena.get(id).map(|n| n.item.id.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|n| n.parent)
    }

    pub fn is_composite(&self, id: NodeId) -> bool {
        self.arena
            .get(id)
            .is_some_and(|n| n.item.kind == NodeKind::Composite)
    }

    /// Children already resolved for `id`; `None` until the provider has been asked.
    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        self.arena.get(id)?.children.as_deref()
    }

    pub fn is_resolved(&self, id: NodeId) -> bool {
        self.arena.get(id).is_some_and(|n| n.children.is_some())
    }

    pub fn node_by_item_id(&self, item_id: &str) -> Option<NodeId> {
        self.id_by_item.get(item_id).copied()
    }

    /// Item ids from the root down to `id`, both ends included.
    pub fn path(&self, id: NodeId) -> Vec<CompactString> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.arena.get(node_id) else {
                break;
            };
            path.push(node.item.id.clone());
            current = node.parent;
        }
        path.reverse();
        path
    }

    pub fn node_by_path(&self, path: &[CompactString]) -> Option<NodeId> {
        let (first, rest) = path.split_first()?;
        if self.arena.get(self.root)?.item.id != *first {
            return None;
        }
        let mut current = self.root;
        for segment in rest {
            current = self
                .children(current)?
                .iter()
                .copied()
                .find(|&child| self.arena.get(child).is_some_and(|n| n.item.id == *segment))?;
        }
        Some(current)
    }

    /// Replaces the children of `parent` and returns the ids that were dropped.
    ///
    /// Children whose item id and kind survive keep their node, subtree and
    /// expansion state. Dropped subtrees lose theirs; callers remap any state
    /// that referenced them.
    pub fn set_children(
        &mut self,
        parent: NodeId,
        items: Vec<TreeViewItem>,
    ) -> Result<Vec<NodeId>, TreeError> {
        let node = self.arena.get(parent).ok_or(TreeError::InvalidNodeId)?;
        if node.item.kind != NodeKind::Composite {
            return Err(TreeError::NotComposite);
        }

        let wanted: FxHashMap<&str, NodeKind> =
            items.iter().map(|item| (item.id.as_str(), item.kind)).collect();
        let mut removed = Vec::new();
        let mut kept: FxHashMap<CompactString, NodeId> = FxHashMap::default();
        let old = self
            .arena
            .get_mut(parent)
            .and_then(|n| n.children.take())
            .unwrap_or_default();
        for child in old {
            let survivor = self.arena.get(child).and_then(|n| {
                (wanted.get(n.item.id.as_str()) == Some(&n.item.kind)).then(|| n.item.id.clone())
            });
            match survivor {
                Some(item_id) => {
                    kept.insert(item_id, child);
                }
                None => self.remove_subtree(child, &mut removed),
            }
        }

        let mut children = Vec::with_capacity(items.len());
        for item in items {
            if let Some(existing) = kept.remove(&item.id) {
                if let Some(node) = self.arena.get_mut(existing) {
                    node.item = item;
                }
                children.push(existing);
                continue;
            }
            if self.id_by_item.contains_key(&item.id) {
                tracing::warn!(item_id = %item.id, "duplicate tree item id, skipping");
                continue;
            }
            let item_id = item.id.clone();
            let id = self.arena.insert(Node {
                item,
                parent: Some(parent),
                children: None,
            });
            self.id_by_item.insert(item_id, id);
            children.push(id);
        }

        if let Some(node) = self.arena.get_mut(parent) {
            node.children = Some(children);
        }
        self.rebuild_rows();
        Ok(removed)
    }

    /// Removes a node and its descendants. The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        if id == self.root || !self.arena.contains_key(id) {
            return Err(TreeError::InvalidNodeId);
        }
        if let Some(parent) = self.parent(id) {
            if let Some(children) = self.arena.get_mut(parent).and_then(|n| n.children.as_mut()) {
                children.retain(|&c| c != id);
            }
        }
        let mut removed = Vec::new();
        self.remove_subtree(id, &mut removed);
        self.rebuild_rows();
        Ok(removed)
    }

    fn remove_subtree(&mut self, id: NodeId, removed: &mut Vec<NodeId>) {
        let mut stack = vec![id];
        while let Some(node_id) = stack.pop() {
            let Some(node) = self.arena.remove(node_id) else {
                continue;
            };
            if self.id_by_item.get(&node.item.id) == Some(&node_id) {
                self.id_by_item.remove(&node.item.id);
            }
            self.expanded.remove(&node_id);
            if let Some(children) = node.children {
                stack.extend(children);
            }
            removed.push(node_id);
        }
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }

    /// Returns true if the state changed.
    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) -> bool {
        if !self.is_composite(id) || id == self.root {
            return false;
        }
        let changed = if expanded {
            self.expanded.insert(id)
        } else {
            self.expanded.remove(&id)
        };
        if changed {
            self.rebuild_rows();
        }
        changed
    }

    /// Collapses every composite node below the root, returning the nodes that were open.
    pub fn collapse_all(&mut self) -> Vec<NodeId> {
        let root = self.root;
        let mut collapsed: Vec<NodeId> = self
            .expanded
            .iter()
            .copied()
            .filter(|&id| id != root)
            .collect();
        collapsed.sort_by_key(|id| self.index_by_id.get(id).copied().unwrap_or(usize::MAX));
        self.expanded.retain(|&id| id == root);
        self.rebuild_rows();
        collapsed
    }

    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            out.push(parent);
            current = self.parent(parent);
        }
        out.reverse();
        out
    }

    fn rebuild_rows(&mut self) {
        self.rows.clear();
        self.index_by_id.clear();

        let mut stack: Vec<NodeId> = Vec::new();
        if let Some(children) = self.children(self.root) {
            stack.extend(children.iter().rev().copied());
        }
        while let Some(id) = stack.pop() {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            self.index_by_id.insert(id, self.rows.len());
            self.rows.push(id);
            if self.expanded.contains(&id) {
                if let Some(children) = &node.children {
                    stack.extend(children.iter().rev().copied());
                }
            }
        }
    }

    /// Visible nodes in display order.
    pub fn rows(&self) -> &[NodeId] {
        &self.rows
    }

    pub fn node_at_index(&self, index: usize) -> Option<NodeId> {
        self.rows.get(index).copied()
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index_by_id.get(&id).copied()
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len().saturating_sub(1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/tree.rs"]
mod tests;
