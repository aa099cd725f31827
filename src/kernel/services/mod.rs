//! Services layer (ports + adapters).
//!
//! - `ports`: contracts the tree view consumes (provider, menus, commands, settings).
//! - `adapters`: filesystem/in-process implementations of those contracts.

pub mod adapters;
pub mod ports;
pub mod throttle;
pub mod tree_view_service;

pub use throttle::ThrottledDelayer;
pub use tree_view_service::{TreeViewCollaborators, TreeViewOptions, TreeViewService};
