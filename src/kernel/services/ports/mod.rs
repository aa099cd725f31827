//! Service ports: traits + data contracts.

pub mod command;
pub mod menu;
pub mod provider;
pub mod settings;

pub use command::{collapse_all_command_id, CommandHandler, CommandRegistry, CommandService};
pub use menu::{split_inline, ContextMenuRenderer, ContextMenuRequest, MenuItem, MenuService};
pub use provider::{ProviderError, ProviderNotification, TreeDataProvider};
pub use settings::{OpenMode, Settings, TreeViewSettings};
