use std::time::Instant;

use crate::models::NodeId;

/// Modifier held during a row click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClickModifier {
    #[default]
    None,
    /// Shift: extend the selection from the focused row.
    Range,
    /// Ctrl/Cmd: add or remove a single row.
    Toggle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ClickRow {
        row: usize,
        modifier: ClickModifier,
        now: Instant,
    },
    ClickNode {
        node: NodeId,
        modifier: ClickModifier,
        now: Instant,
    },
    ContextMenuOpen {
        row: Option<usize>,
        x: i32,
        y: i32,
    },
    ContextMenuClose,
    Blur,
    CollapseAll,
    Tick {
        now: Instant,
    },
}
