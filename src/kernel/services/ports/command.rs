use serde_json::Value;

pub type CommandHandler = Box<dyn Fn(Vec<Value>) + Send + Sync>;

pub trait CommandService: Send + Sync {
    fn execute_command(&self, id: &str, arguments: Vec<Value>);
}

pub trait CommandRegistry: Send + Sync {
    fn register_command(&self, id: &str, handler: CommandHandler);
}

/// Id of the "collapse all" command contributed for a view.
pub fn collapse_all_command_id(view_id: &str) -> String {
    format!("workbench.actions.treeView.{view_id}.collapseAll")
}
