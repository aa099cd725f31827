use super::*;

fn sample() -> (TreeModel, NodeId, NodeId, NodeId) {
    let mut tree = TreeModel::new(TreeViewItem::composite("root", "root"));
    let root = tree.root();
    tree.set_children(
        root,
        vec![
            TreeViewItem::composite("src", "src"),
            TreeViewItem::leaf("readme", "README.md"),
        ],
    )
    .unwrap();
    let src = tree.node_by_item_id("src").unwrap();
    let readme = tree.node_by_item_id("readme").unwrap();
    tree.set_children(
        src,
        vec![
            TreeViewItem::leaf("main", "main.rs"),
            TreeViewItem::leaf("lib", "lib.rs"),
        ],
    )
    .unwrap();
    (tree, root, src, readme)
}

#[test]
fn test_new_tree() {
    let tree = TreeModel::new(TreeViewItem::leaf("root", "root"));
    assert!(tree.is_composite(tree.root()));
    assert!(tree.is_expanded(tree.root()));
    assert!(tree.rows().is_empty());
    assert!(tree.is_empty());
}

#[test]
fn test_rows_follow_expansion() {
    let (mut tree, _, src, readme) = sample();
    assert_eq!(tree.rows(), &[src, readme]);

    assert!(tree.set_expanded(src, true));
    let main = tree.node_by_item_id("main").unwrap();
    let lib = tree.node_by_item_id("lib").unwrap();
    assert_eq!(tree.rows(), &[src, main, lib, readme]);
    assert_eq!(tree.index_of(readme), Some(3));
    assert_eq!(tree.node_at_index(1), Some(main));
    assert_eq!(tree.node_at_index(4), None);
    assert_eq!(tree.depth(main), 1);

    assert!(tree.set_expanded(src, false));
    assert_eq!(tree.index_of(main), None);
}

#[test]
fn test_leaf_and_root_cannot_expand() {
    let (mut tree, root, _, readme) = sample();
    assert!(!tree.set_expanded(readme, true));
    assert!(!tree.set_expanded(root, false));
    assert!(tree.is_expanded(root));
}

#[test]
fn test_path_round_trips_through_lookup() {
    let (tree, _, _, _) = sample();
    let main = tree.node_by_item_id("main").unwrap();
    let path = tree.path(main);
    assert_eq!(path, vec!["root", "src", "main"]);
    assert_eq!(tree.node_by_path(&path), Some(main));
    assert_eq!(tree.node_by_path(&["root".into(), "nope".into()]), None);
}

#[test]
fn test_set_children_keeps_surviving_nodes() {
    let (mut tree, _, src, _) = sample();
    let main = tree.node_by_item_id("main").unwrap();
    let lib = tree.node_by_item_id("lib").unwrap();
    let removed = tree
        .set_children(
            src,
            vec![
                TreeViewItem::leaf("main", "main.rs"),
                TreeViewItem::leaf("mod", "mod.rs"),
            ],
        )
        .unwrap();

    assert_eq!(removed, vec![lib]);
    assert!(!tree.contains(lib));
    assert_eq!(tree.node_by_item_id("main"), Some(main));
    assert!(tree.node_by_item_id("mod").is_some());
    assert!(tree.node_by_item_id("lib").is_none());
}

#[test]
fn test_set_children_keeps_expanded_subtree() {
    let (mut tree, root, src, _) = sample();
    tree.set_expanded(src, true);
    tree.set_children(
        root,
        vec![
            TreeViewItem::composite("src", "source"),
            TreeViewItem::leaf("license", "LICENSE"),
        ],
    )
    .unwrap();

    assert!(tree.is_expanded(src));
    assert_eq!(tree.item(src).unwrap().label, "source");
    assert_eq!(tree.rows().len(), 4);
    assert!(tree.node_by_item_id("readme").is_none());
}

#[test]
fn test_set_children_replaces_node_whose_kind_changed() {
    let (mut tree, root, src, _) = sample();
    let removed = tree
        .set_children(root, vec![TreeViewItem::leaf("src", "src")])
        .unwrap();

    assert_eq!(removed.len(), 4);
    assert!(removed.contains(&src));
    let new_src = tree.node_by_item_id("src").unwrap();
    assert_ne!(new_src, src);
    assert!(!tree.is_composite(new_src));
}

#[test]
fn test_set_children_on_leaf_fails() {
    let (mut tree, _, _, readme) = sample();
    assert_eq!(
        tree.set_children(readme, Vec::new()),
        Err(TreeError::NotComposite)
    );
}

#[test]
fn test_duplicate_item_ids_are_skipped() {
    let mut tree = TreeModel::new(TreeViewItem::composite("root", "root"));
    let root = tree.root();
    tree.set_children(
        root,
        vec![TreeViewItem::leaf("a", "a"), TreeViewItem::leaf("a", "again")],
    )
    .unwrap();
    assert_eq!(tree.rows().len(), 1);
}

#[test]
fn test_remove_drops_descendants() {
    let (mut tree, root, src, _) = sample();
    tree.set_expanded(src, true);
    let removed = tree.remove(src).unwrap();
    assert_eq!(removed.len(), 3);
    assert_eq!(tree.rows().len(), 1);
    assert!(tree.node_by_item_id("main").is_none());
    assert_eq!(tree.remove(root), Err(TreeError::InvalidNodeId));
}

#[test]
fn test_collapse_all() {
    let (mut tree, root, src, _) = sample();
    tree.set_expanded(src, true);
    let collapsed = tree.collapse_all();
    assert_eq!(collapsed, vec![src]);
    assert!(tree.is_expanded(root));
    assert_eq!(tree.rows().len(), 2);
}
