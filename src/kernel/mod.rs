//! Headless tree view core (state machine, effects, events, services).

pub mod action;
pub mod click;
pub mod effect;
pub mod event;
pub mod services;
pub mod tree_view;

pub use action::{Action, ClickModifier};
pub use click::ClickGesture;
pub use effect::{ContextMenuTarget, Effect};
pub use event::{tree_view_events, TreeViewEvent, TreeViewEventReceiver, TreeViewEventSender};
pub use tree_view::{TreeRow, TreeViewModel};
