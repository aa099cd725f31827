use super::*;
use crate::models::NodeKind;
use std::fs;
use tempfile::tempdir;

fn labels(items: &[TreeViewItem]) -> Vec<&str> {
    items.iter().map(|item| item.label.as_str()).collect()
}

#[test]
fn test_should_ignore() {
    assert!(should_ignore(".git"));
    assert!(should_ignore("node_modules"));
    assert!(should_ignore("target"));
    assert!(!should_ignore("src"));
    assert!(!should_ignore(".gitignore"));
}

#[tokio::test]
async fn test_root_item_is_the_directory() {
    let dir = tempdir().unwrap();
    let provider = FsTreeProvider::new(dir.path());

    let roots = provider.resolve_children(None).await.unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].kind, NodeKind::Composite);
    assert_eq!(roots[0].id, item_id_for(provider.root()));
    assert_eq!(roots[0].context_value.as_deref(), Some("folder"));
}

#[tokio::test]
async fn test_children_list_dirs_first() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("zeta")).unwrap();
    fs::create_dir(dir.path().join("alpha")).unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    fs::write(dir.path().join("b.txt"), "b").unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();

    let provider = FsTreeProvider::new(dir.path());
    let root = provider.resolve_children(None).await.unwrap().remove(0);
    let children = provider.resolve_children(Some(&root)).await.unwrap();

    assert_eq!(labels(&children), vec!["alpha", "zeta", "a.txt", "b.txt"]);
    assert_eq!(children[0].kind, NodeKind::Composite);
    assert!(children[0].command.is_none());

    let file = &children[2];
    assert_eq!(file.kind, NodeKind::Leaf);
    assert_eq!(file.context_value.as_deref(), Some("file"));
    let command = file.command.as_ref().unwrap();
    assert_eq!(command.id, OPEN_COMMAND);
    assert_eq!(command.arguments, vec![serde_json::json!(file.id.as_str())]);
}

#[tokio::test]
async fn test_nested_directory_resolves() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/bin")).unwrap();
    fs::write(dir.path().join("src/lib.rs"), "").unwrap();

    let provider = FsTreeProvider::new(dir.path());
    let root = provider.resolve_children(None).await.unwrap().remove(0);
    let src = provider.resolve_children(Some(&root)).await.unwrap().remove(0);
    let nested = provider.resolve_children(Some(&src)).await.unwrap();
    assert_eq!(labels(&nested), vec!["bin", "lib.rs"]);
}

#[tokio::test]
async fn test_missing_directory_is_an_error() {
    let dir = tempdir().unwrap();
    let provider = FsTreeProvider::new(dir.path());
    let gone = TreeViewItem::composite(
        dir.path().join("gone").to_string_lossy().to_string(),
        "gone",
    );
    assert!(matches!(
        provider.resolve_children(Some(&gone)).await,
        Err(ProviderError::Io(_))
    ));
}
