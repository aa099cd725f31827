//! 节点装饰器

use super::tree::NodeId;
use rustc_hash::FxHashSet;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Decoration {
    Selected,
    Focused,
    Loading,
    Cut,
}

impl Decoration {
    pub const ALL: [Decoration; 4] = [
        Decoration::Selected,
        Decoration::Focused,
        Decoration::Loading,
        Decoration::Cut,
    ];

    /// CSS-like class name a renderer can map to a style.
    pub fn class_name(self) -> &'static str {
        match self {
            Decoration::Selected => "mod_selected",
            Decoration::Focused => "mod_focused",
            Decoration::Loading => "mod_loading",
            Decoration::Cut => "mod_cut",
        }
    }

    fn slot(self) -> usize {
        match self {
            Decoration::Selected => 0,
            Decoration::Focused => 1,
            Decoration::Loading => 2,
            Decoration::Cut => 3,
        }
    }
}

/// Decorations carried by a single node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DecorationSet(u8);

impl DecorationSet {
    pub fn contains(self, decoration: Decoration) -> bool {
        self.0 & (1 << decoration.slot()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn insert(&mut self, decoration: Decoration) {
        self.0 |= 1 << decoration.slot();
    }

    pub fn iter(self) -> impl Iterator<Item = Decoration> {
        Decoration::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

/// Many-to-many association between decorations and nodes, one per tree root.
#[derive(Debug, Default)]
pub struct DecorationsManager {
    targets: [FxHashSet<NodeId>; 4],
}

impl DecorationsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the node did not carry the decoration yet.
    pub fn add_target(&mut self, decoration: Decoration, node: NodeId) -> bool {
        self.targets[decoration.slot()].insert(node)
    }

    pub fn remove_target(&mut self, decoration: Decoration, node: NodeId) -> bool {
        self.targets[decoration.slot()].remove(&node)
    }

    pub fn has(&self, decoration: Decoration, node: NodeId) -> bool {
        self.targets[decoration.slot()].contains(&node)
    }

    pub fn targets(&self, decoration: Decoration) -> impl Iterator<Item = NodeId> + '_ {
        self.targets[decoration.slot()].iter().copied()
    }

    pub fn clear(&mut self, decoration: Decoration) {
        self.targets[decoration.slot()].clear();
    }

    pub fn decorations_of(&self, node: NodeId) -> DecorationSet {
        let mut set = DecorationSet::default();
        for decoration in Decoration::ALL {
            if self.has(decoration, node) {
                set.insert(decoration);
            }
        }
        set
    }

    /// Drops every association of a node that no longer exists.
    pub fn purge(&mut self, node: NodeId) {
        for targets in &mut self.targets {
            targets.remove(&node);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/decoration.rs"]
mod tests;
