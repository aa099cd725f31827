use crate::kernel::services::ports::{
    CommandHandler, CommandRegistry, CommandService, MenuItem, MenuService,
};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};

type SharedHandler = Arc<dyn Fn(Vec<Value>) + Send + Sync>;

/// In-process command table; handlers run on the caller's thread.
#[derive(Default)]
pub struct LocalCommands {
    handlers: Mutex<FxHashMap<String, SharedHandler>>,
}

impl LocalCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_command(&self, id: &str) -> bool {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }
}

impl CommandRegistry for LocalCommands {
    fn register_command(&self, id: &str, handler: CommandHandler) {
        let previous = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), Arc::from(handler));
        if previous.is_some() {
            tracing::debug!(command = %id, "command handler replaced");
        }
    }
}

impl CommandService for LocalCommands {
    fn execute_command(&self, id: &str, arguments: Vec<Value>) {
        let handler = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned();
        match handler {
            Some(handler) => handler(arguments),
            None => tracing::warn!(command = %id, "no handler for command"),
        }
    }
}

/// Menu contributions keyed by `(view, viewItem)`; entries without a `viewItem`
/// match every item of their view.
#[derive(Default)]
pub struct StaticMenus {
    entries: Vec<(String, Option<String>, MenuItem)>,
}

impl StaticMenus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, view_id: &str, view_item: Option<&str>, item: MenuItem) -> Self {
        self.entries
            .push((view_id.to_string(), view_item.map(str::to_string), item));
        self
    }
}

impl MenuService for StaticMenus {
    fn menu_items(&self, view_id: &str, context_value: Option<&str>) -> Vec<MenuItem> {
        self.entries
            .iter()
            .filter(|(view, key, _)| {
                view == view_id && (key.is_none() || key.as_deref() == context_value)
            })
            .map(|(_, _, item)| item.clone())
            .collect()
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/commands.rs"]
mod tests;
