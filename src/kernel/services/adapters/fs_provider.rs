//! Tree data provider over a directory, plus a watcher feeding refreshes.

use crate::kernel::services::ports::{ProviderError, ProviderNotification, TreeDataProvider};
use crate::models::{TreeCommand, TreeViewItem};
use compact_str::CompactString;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

const WATCHER_POLL_INTERVAL: Duration = Duration::from_millis(250);
pub const OPEN_COMMAND: &str = "vscode.open";

pub fn should_ignore(name: &str) -> bool {
    matches!(
        name,
        ".DS_Store"
            | ".Spotlight-V100"
            | ".Trashes"
            | ".fseventsd"
            | ".TemporaryItems"
            | "Thumbs.db"
            | "desktop.ini"
            | ".git"
            | "node_modules"
            | "target"
    )
}

fn item_id_for(path: &Path) -> CompactString {
    CompactString::from(path.to_string_lossy())
}

fn label_for(path: &Path) -> CompactString {
    path.file_name()
        .map(|name| CompactString::from(name.to_string_lossy()))
        .unwrap_or_else(|| item_id_for(path))
}

pub struct FsTreeProvider {
    root: PathBuf,
}

impl FsTreeProvider {
    pub fn new(root: &Path) -> Self {
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_dir_items(&self, dir: &Path) -> Result<Vec<TreeViewItem>, ProviderError> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if should_ignore(&name) {
                continue;
            }
            let path = entry.path();
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                dirs.push(
                    TreeViewItem::composite(item_id_for(&path), name).with_context_value("folder"),
                );
            } else {
                let command = TreeCommand {
                    id: OPEN_COMMAND.to_string(),
                    arguments: vec![serde_json::Value::String(path.to_string_lossy().into())],
                };
                files.push(
                    TreeViewItem::leaf(item_id_for(&path), name)
                        .with_context_value("file")
                        .with_command(command),
                );
            }
        }
        dirs.sort_by(|a, b| a.label.cmp(&b.label));
        files.sort_by(|a, b| a.label.cmp(&b.label));
        dirs.extend(files);
        Ok(dirs)
    }
}

impl TreeDataProvider for FsTreeProvider {
    async fn resolve_children(
        &self,
        parent: Option<&TreeViewItem>,
    ) -> Result<Vec<TreeViewItem>, ProviderError> {
        match parent {
            None => Ok(vec![TreeViewItem::composite(
                item_id_for(&self.root),
                label_for(&self.root),
            )
            .with_context_value("folder")]),
            Some(item) => self.read_dir_items(Path::new(item.id.as_str())).await,
        }
    }
}

/// Turns filesystem changes into `TreeDataChanged` for the containing directory.
pub struct FsWatcher {
    _watcher: RecommendedWatcher,
}

impl FsWatcher {
    pub fn spawn(
        root: &Path,
        tx: UnboundedSender<ProviderNotification>,
    ) -> Result<Self, notify::Error> {
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                let Ok(event) = res else { return };
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(_)
                ) {
                    return;
                }
                for path in &event.paths {
                    let Some(parent) = path.parent() else {
                        continue;
                    };
                    let ignored = path
                        .file_name()
                        .is_some_and(|name| should_ignore(&name.to_string_lossy()));
                    if ignored {
                        continue;
                    }
                    let _ = tx.send(ProviderNotification::TreeDataChanged(Some(item_id_for(
                        parent,
                    ))));
                }
            },
            Config::default().with_poll_interval(WATCHER_POLL_INTERVAL),
        )?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(Self { _watcher: watcher })
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/fs_provider.rs"]
mod tests;
