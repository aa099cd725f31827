use crate::models::TreeViewItem;
use compact_str::CompactString;
use std::fmt;
use std::future::Future;
use std::io;

#[derive(Debug)]
pub enum ProviderError {
    /// Resolving the top level returned nothing to use as root.
    EmptyRoot,
    Io(io::Error),
    Failed(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::EmptyRoot => write!(f, "tree data provider returned no root"),
            ProviderError::Io(e) => write!(f, "io error: {e}"),
            ProviderError::Failed(msg) => write!(f, "provider failed: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ProviderError {
    fn from(e: io::Error) -> Self {
        ProviderError::Io(e)
    }
}

/// Lazily resolves tree items.
///
/// `resolve_children(None)` returns the top level; its first element becomes
/// the root of the view.
pub trait TreeDataProvider: Send + Sync + 'static {
    fn resolve_children(
        &self,
        parent: Option<&TreeViewItem>,
    ) -> impl Future<Output = Result<Vec<TreeViewItem>, ProviderError>> + Send;
}

/// Notifications a provider pushes at the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderNotification {
    /// `None` refreshes the whole tree.
    TreeDataChanged(Option<CompactString>),
    RevealRequested(CompactString),
}
