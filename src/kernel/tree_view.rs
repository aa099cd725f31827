//! Selection/focus state machine of a tree view.
//!
//! Every operation keeps the selected list, the focused node and the
//! decorations in step, and reports changes through [`TreeViewEvent`]s.
//! Operations on the root or on dead nodes are silently ignored.

use super::click::ClickTracker;
use super::effect::{ContextMenuTarget, Effect};
use super::event::{TreeViewEvent, TreeViewEventSender};
use crate::kernel::services::ports::settings::{OpenMode, Settings};
use crate::models::{
    Decoration, DecorationSet, DecorationsManager, NodeId, NodeKind, TreeError, TreeModel,
    TreeViewItem,
};
use compact_str::CompactString;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{json, Value};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeRow {
    pub id: NodeId,
    pub tree_item_id: CompactString,
    pub label: CompactString,
    pub depth: u16,
    pub kind: NodeKind,
    pub is_expanded: bool,
    pub decorations: DecorationSet,
}

#[derive(Debug, Clone, Copy)]
struct ContextFocus {
    node: NodeId,
    was_selected: bool,
}

pub struct TreeViewModel {
    view_id: CompactString,
    tree: TreeModel,
    decorations: DecorationsManager,
    focused: Option<NodeId>,
    selected: Vec<NodeId>,
    context_focus: Option<ContextFocus>,
    pre_context_focused: Option<NodeId>,
    multi_selected: bool,
    clicks: ClickTracker,
    open_mode: OpenMode,
    events: TreeViewEventSender,
}

impl TreeViewModel {
    pub fn new(
        view_id: impl Into<CompactString>,
        root: TreeViewItem,
        settings: &Settings,
        events: TreeViewEventSender,
    ) -> Self {
        Self {
            view_id: view_id.into(),
            tree: TreeModel::new(root),
            decorations: DecorationsManager::new(),
            focused: None,
            selected: Vec::new(),
            context_focus: None,
            pre_context_focused: None,
            multi_selected: false,
            clicks: ClickTracker::new(settings.tree_view.click_coalesce()),
            open_mode: settings.open_mode,
            events,
        }
    }

    pub fn view_id(&self) -> &str {
        &self.view_id
    }

    pub fn tree(&self) -> &TreeModel {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn selected(&self) -> &[NodeId] {
        &self.selected
    }

    pub fn focused_item_id(&self) -> Option<CompactString> {
        self.focused.and_then(|id| self.item_id(id))
    }

    pub fn selected_item_ids(&self) -> Vec<CompactString> {
        self.selected.iter().filter_map(|&id| self.item_id(id)).collect()
    }

    pub fn is_multi_selected(&self) -> bool {
        self.multi_selected
    }

    pub fn open_mode(&self) -> OpenMode {
        self.open_mode
    }

    pub fn decorations_of(&self, id: NodeId) -> DecorationSet {
        self.decorations.decorations_of(id)
    }

    pub fn node_by_item_id(&self, item_id: &str) -> Option<NodeId> {
        self.tree.node_by_item_id(item_id)
    }

    pub fn rows(&self) -> Vec<TreeRow> {
        self.tree
            .rows()
            .iter()
            .filter_map(|&id| {
                let item = self.tree.item(id)?;
                Some(TreeRow {
                    id,
                    tree_item_id: item.id.clone(),
                    label: item.label.clone(),
                    depth: self.tree.depth(id).min(u16::MAX as usize) as u16,
                    kind: item.kind,
                    is_expanded: self.tree.is_expanded(id),
                    decorations: self.decorations.decorations_of(id),
                })
            })
            .collect()
    }

    fn item_id(&self, id: NodeId) -> Option<CompactString> {
        self.tree.item(id).map(|item| item.id.clone())
    }

    fn is_selectable(&self, id: NodeId) -> bool {
        id != self.tree.root() && self.tree.contains(id)
    }

    fn emit_focus(&self) {
        self.events
            .send(TreeViewEvent::FocusChanged(self.focused_item_id()));
    }

    fn emit_selection(&self) {
        self.events
            .send(TreeViewEvent::SelectionChanged(self.selected_item_ids()));
    }

    fn dispatch_change(&self) {
        self.events.send(TreeViewEvent::DidChange);
    }

    fn strip_context_focus(&mut self) {
        if let Some(ctx) = self.context_focus.take() {
            self.decorations.remove_target(Decoration::Focused, ctx.node);
            self.decorations.remove_target(Decoration::Selected, ctx.node);
        }
        self.pre_context_focused = None;
    }

    fn strip_selection(&mut self) {
        for id in self.selected.drain(..) {
            self.decorations.remove_target(Decoration::Selected, id);
        }
    }

    /// Selects `target` alone without focusing it.
    pub fn select_single(&mut self, target: NodeId) -> bool {
        if !self.is_selectable(target) {
            return false;
        }

        self.strip_context_focus();
        self.strip_selection();
        if let Some(prev) = self.focused.take() {
            self.decorations.remove_target(Decoration::Focused, prev);
            self.emit_focus();
        }

        self.decorations.add_target(Decoration::Selected, target);
        self.selected.push(target);
        self.emit_selection();
        self.dispatch_change();
        true
    }

    /// Plain activation: `target` becomes the only selected node and the focused one.
    pub fn focus_and_select_single(&mut self, target: NodeId) -> bool {
        if !self.is_selectable(target) {
            return false;
        }

        self.strip_context_focus();
        self.strip_selection();
        if let Some(prev) = self.focused {
            self.decorations.remove_target(Decoration::Focused, prev);
        }

        self.decorations.add_target(Decoration::Selected, target);
        self.decorations.add_target(Decoration::Focused, target);
        self.focused = Some(target);
        self.selected.push(target);
        self.emit_focus();
        self.emit_selection();
        self.dispatch_change();
        true
    }

    /// Moves focus to `target` and adds it to the selection.
    ///
    /// With `preserve` the move is treated as a context-menu focus: the focus that
    /// was active before is remembered for [`Self::restore_context_focus`] and the
    /// context-focused node is stripped by the next activation.
    pub fn toggle_focus_with_preserve(&mut self, target: NodeId, preserve: bool) -> bool {
        if !self.is_selectable(target) {
            return false;
        }

        if self.focused != Some(target) {
            if preserve {
                if let Some(ctx) = self.context_focus.take() {
                    self.decorations.remove_target(Decoration::Focused, ctx.node);
                    if !ctx.was_selected {
                        self.decorations.remove_target(Decoration::Selected, ctx.node);
                        self.selected.retain(|&id| id != ctx.node);
                    }
                } else {
                    if let Some(prev) = self.focused {
                        self.decorations.remove_target(Decoration::Focused, prev);
                    }
                    self.pre_context_focused = self.focused;
                }
                self.context_focus = Some(ContextFocus {
                    node: target,
                    was_selected: self.selected.contains(&target),
                });
            } else {
                if let Some(prev) = self.focused {
                    self.decorations.remove_target(Decoration::Focused, prev);
                }
                self.context_focus = None;
                self.pre_context_focused = None;
            }

            self.decorations.add_target(Decoration::Selected, target);
            self.decorations.add_target(Decoration::Focused, target);
            self.focused = Some(target);
            if !self.selected.contains(&target) {
                self.selected.push(target);
            }
            self.emit_focus();
            self.emit_selection();
        }
        self.dispatch_change();
        true
    }

    /// Returns false when `target` was already selected; nothing is emitted then.
    pub fn add_to_selection(&mut self, target: NodeId) -> bool {
        if !self.is_selectable(target) || self.selected.contains(&target) {
            return false;
        }
        self.selected.push(target);
        self.decorations.add_target(Decoration::Selected, target);
        self.emit_selection();
        self.dispatch_change();
        true
    }

    /// Selects the visible rows between both indices, inclusive, in either order.
    pub fn select_range(&mut self, begin: usize, end: usize) {
        let (lo, hi) = if begin <= end {
            (begin, end)
        } else {
            (end, begin)
        };

        self.strip_selection();
        self.context_focus = None;
        self.pre_context_focused = None;

        for index in lo..=hi {
            let Some(id) = self.tree.node_at_index(index) else {
                break;
            };
            self.decorations.add_target(Decoration::Selected, id);
            self.selected.push(id);
        }

        self.emit_selection();
        self.dispatch_change();
    }

    pub fn clear_focus(&mut self) -> bool {
        let Some(prev) = self.focused.take() else {
            return false;
        };
        self.decorations.remove_target(Decoration::Focused, prev);
        self.emit_focus();
        self.dispatch_change();
        true
    }

    pub fn clear_selection(&mut self) {
        self.strip_selection();
        self.emit_selection();
        self.dispatch_change();
    }

    /// Undoes the focus move of a context menu that closed without running anything.
    pub fn restore_context_focus(&mut self) -> bool {
        let Some(ctx) = self.context_focus.take() else {
            return false;
        };
        self.decorations.remove_target(Decoration::Focused, ctx.node);
        if !ctx.was_selected {
            self.decorations.remove_target(Decoration::Selected, ctx.node);
            self.selected.retain(|&id| id != ctx.node);
        }
        self.focused = None;

        if let Some(prev) = self.pre_context_focused.take() {
            if self.is_selectable(prev) {
                self.decorations.add_target(Decoration::Focused, prev);
                self.decorations.add_target(Decoration::Selected, prev);
                if !self.selected.contains(&prev) {
                    self.selected.push(prev);
                }
                self.focused = Some(prev);
            }
        }

        self.emit_focus();
        self.emit_selection();
        self.dispatch_change();
        true
    }

    pub fn handle_tree_blur(&mut self) {
        self.clear_focus();
    }

    pub fn handle_item_click(&mut self, target: NodeId, now: Instant) -> Vec<Effect> {
        let Some(item) = self.tree.item(target) else {
            return Vec::new();
        };
        let kind = item.kind;
        let command = item.command.clone();

        self.multi_selected = false;
        self.focus_and_select_single(target);

        if let Some(command) = command {
            return vec![Effect::ExecuteCommand {
                id: command.id,
                arguments: command.arguments,
            }];
        }

        let mut effects = Vec::new();
        if kind == NodeKind::Composite && self.open_mode == OpenMode::SingleClick {
            effects.push(Effect::ToggleExpansion(target));
        }
        self.clicks.click(target, kind, now);
        effects
    }

    /// Deadline of the pending click gesture, if any.
    pub fn click_deadline(&self) -> Option<Instant> {
        self.clicks.deadline()
    }

    /// Resolves a click gesture whose coalescing window has elapsed.
    pub fn poll_click_timer(&mut self, now: Instant) -> Vec<Effect> {
        let Some(gesture) = self.clicks.poll(now) else {
            return Vec::new();
        };
        if gesture.clicks > 1
            && gesture.kind == NodeKind::Composite
            && self.open_mode == OpenMode::DoubleClick
            && self.tree.contains(gesture.node)
        {
            return vec![Effect::ToggleExpansion(gesture.node)];
        }
        Vec::new()
    }

    pub fn handle_item_range_click(&mut self, target: NodeId, now: Instant) -> Vec<Effect> {
        let Some(focused) = self.focused else {
            return self.handle_item_click(target, now);
        };
        if focused == target || !self.is_selectable(target) {
            return Vec::new();
        }

        let (Some(target_index), Some(focused_index)) =
            (self.tree.index_of(target), self.tree.index_of(focused))
        else {
            tracing::debug!("range click on a row that is not visible");
            return Vec::new();
        };
        self.multi_selected = true;
        self.select_range(focused_index, target_index);
        Vec::new()
    }

    pub fn handle_item_toggle_click(&mut self, target: NodeId) {
        if !self.is_selectable(target) {
            return;
        }
        self.multi_selected = true;

        if self.selected.contains(&target) {
            if self.focused == Some(target) {
                self.clear_focus();
            } else {
                self.toggle_focus_with_preserve(target, false);
            }
        } else {
            self.add_to_selection(target);
        }
    }

    /// `target` is `None` for a click on empty space, which targets the root.
    pub fn handle_context_menu(&mut self, target: Option<NodeId>, anchor: (i32, i32)) -> Effect {
        let target = target.filter(|&id| self.tree.contains(id));
        match target {
            Some(id) => {
                self.toggle_focus_with_preserve(id, true);
            }
            None => {
                self.clear_focus();
            }
        }

        let root = self.tree.root();
        let (node, nodes) = match target {
            None => (root, vec![root]),
            Some(id) if self.multi_selected => (id, self.selected.clone()),
            Some(id) => (id, vec![id]),
        };

        let node_arg = |id: NodeId| -> Value {
            json!({
                "treeViewId": self.view_id.as_str(),
                "treeItemId": self.tree.item_id(id).unwrap_or_default(),
            })
        };
        let args = vec![
            node_arg(node),
            Value::Array(nodes.iter().map(|&id| node_arg(id)).collect()),
        ];

        Effect::ShowContextMenu(ContextMenuTarget {
            anchor,
            context_value: self.tree.item(node).and_then(|i| i.context_value.clone()),
            args,
        })
    }

    pub fn collapse_all(&mut self) {
        let collapsed = self.tree.collapse_all();
        if collapsed.is_empty() {
            return;
        }
        for id in collapsed {
            if let Some(tree_item_id) = self.item_id(id) {
                self.events.send(TreeViewEvent::ExpansionChanged {
                    tree_item_id,
                    expanded: false,
                });
            }
        }
        self.dispatch_change();
    }

    pub fn set_expanded(&mut self, id: NodeId, expanded: bool, notify: bool) -> bool {
        if !self.tree.set_expanded(id, expanded) {
            return false;
        }
        if notify {
            if let Some(tree_item_id) = self.item_id(id) {
                self.events.send(TreeViewEvent::ExpansionChanged {
                    tree_item_id,
                    expanded,
                });
            }
        }
        self.dispatch_change();
        true
    }

    /// Reveals `id`: opens its ancestors, tells the view to scroll to it and selects it.
    pub fn reveal(&mut self, id: NodeId) -> Option<usize> {
        let index = self.ensure_visible(id)?;
        let tree_item_id = self.item_id(id)?;
        self.events
            .send(TreeViewEvent::Revealed { tree_item_id, index });
        self.select_single(id);
        Some(index)
    }

    /// Item ids of the expanded nodes below `id`.
    pub fn expanded_item_ids_under(&self, id: NodeId) -> FxHashSet<CompactString> {
        let mut out = FxHashSet::default();
        let mut stack: Vec<NodeId> = self
            .tree
            .children(id)
            .map(<[NodeId]>::to_vec)
            .unwrap_or_default();
        while let Some(node) = stack.pop() {
            if !self.tree.is_expanded(node) {
                continue;
            }
            if let Some(item_id) = self.item_id(node) {
                out.insert(item_id);
            }
            if let Some(children) = self.tree.children(node) {
                stack.extend_from_slice(children);
            }
        }
        out
    }

    /// Expands every collapsed ancestor so `id` gets a row, returning its index.
    pub fn ensure_visible(&mut self, id: NodeId) -> Option<usize> {
        if !self.is_selectable(id) {
            return None;
        }
        for ancestor in self.tree.ancestors(id) {
            if ancestor != self.tree.root() && !self.tree.is_expanded(ancestor) {
                self.set_expanded(ancestor, true, true);
            }
        }
        self.tree.index_of(id)
    }

    pub fn cut(&mut self, nodes: &[NodeId]) {
        self.decorations.clear(Decoration::Cut);
        for &id in nodes {
            if self.is_selectable(id) {
                self.decorations.add_target(Decoration::Cut, id);
            }
        }
        self.dispatch_change();
    }

    pub fn clear_cut(&mut self) {
        self.decorations.clear(Decoration::Cut);
        self.dispatch_change();
    }

    pub fn begin_resolve(&mut self, id: NodeId) {
        if self.tree.contains(id) && self.decorations.add_target(Decoration::Loading, id) {
            self.dispatch_change();
        }
    }

    pub fn end_resolve(&mut self, id: NodeId) {
        if self.decorations.remove_target(Decoration::Loading, id) {
            self.dispatch_change();
        }
    }

    /// Installs freshly resolved children of `parent`.
    ///
    /// State that pointed into the replaced subtree is moved onto the new node
    /// with the same tree item id, or dropped if the item is gone.
    pub fn apply_children(
        &mut self,
        parent: NodeId,
        items: Vec<TreeViewItem>,
    ) -> Result<(), TreeError> {
        let snapshot = self.stateful_item_ids();
        self.end_resolve(parent);
        let removed = self.tree.set_children(parent, items)?;
        self.remap_removed(&removed, &snapshot);
        self.dispatch_change();
        Ok(())
    }

    /// Drops a node the provider reported as gone.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), TreeError> {
        let snapshot = self.stateful_item_ids();
        let removed = self.tree.remove(id)?;
        self.remap_removed(&removed, &snapshot);
        self.dispatch_change();
        Ok(())
    }

    /// Item ids of every node referenced by selection state or a decoration.
    fn stateful_item_ids(&self) -> FxHashMap<NodeId, CompactString> {
        let mut ids: FxHashSet<NodeId> = self.selected.iter().copied().collect();
        ids.extend(self.focused);
        ids.extend(self.context_focus.map(|ctx| ctx.node));
        ids.extend(self.pre_context_focused);
        for decoration in Decoration::ALL {
            ids.extend(self.decorations.targets(decoration));
        }
        ids.into_iter()
            .filter_map(|id| Some((id, self.item_id(id)?)))
            .collect()
    }

    fn remap_removed(&mut self, removed: &[NodeId], snapshot: &FxHashMap<NodeId, CompactString>) {
        if removed.is_empty() {
            return;
        }
        let removed: FxHashSet<NodeId> = removed.iter().copied().collect();
        let remap = |tree: &TreeModel, id: NodeId| -> Option<NodeId> {
            if !removed.contains(&id) {
                return Some(id);
            }
            snapshot
                .get(&id)
                .and_then(|item_id| tree.node_by_item_id(item_id))
        };

        let prev_selected = self.selected_item_ids_from(snapshot);
        let prev_focused = self.focused.and_then(|id| snapshot.get(&id).cloned());

        for &id in snapshot.keys().filter(|id| removed.contains(*id)) {
            let carried = self.decorations.decorations_of(id);
            self.decorations.purge(id);
            if let Some(new_id) = remap(&self.tree, id) {
                for decoration in carried.iter().filter(|d| *d != Decoration::Loading) {
                    self.decorations.add_target(decoration, new_id);
                }
            }
        }

        let mut selected = Vec::with_capacity(self.selected.len());
        for id in self.selected.drain(..) {
            if let Some(new_id) = remap(&self.tree, id) {
                if !selected.contains(&new_id) {
                    selected.push(new_id);
                }
            }
        }
        self.selected = selected;
        self.focused = self.focused.and_then(|id| remap(&self.tree, id));
        self.context_focus = self.context_focus.and_then(|ctx| {
            remap(&self.tree, ctx.node).map(|node| ContextFocus {
                node,
                was_selected: ctx.was_selected,
            })
        });
        self.pre_context_focused = self.pre_context_focused.and_then(|id| remap(&self.tree, id));

        if self.focused_item_id() != prev_focused {
            tracing::debug!(view = %self.view_id, "focused node dropped by reload");
            self.emit_focus();
        }
        if self.selected_item_ids() != prev_selected {
            tracing::debug!(view = %self.view_id, "selected nodes dropped by reload");
            self.emit_selection();
        }
    }

    fn selected_item_ids_from(
        &self,
        snapshot: &FxHashMap<NodeId, CompactString>,
    ) -> Vec<CompactString> {
        self.selected
            .iter()
            .filter_map(|id| snapshot.get(id).cloned())
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/tree_view.rs"]
mod tests;
