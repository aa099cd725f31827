use super::*;
use slotmap::SlotMap;

fn ids(n: usize) -> Vec<NodeId> {
    let mut arena: SlotMap<NodeId, ()> = SlotMap::with_key();
    (0..n).map(|_| arena.insert(())).collect()
}

#[test]
fn node_can_carry_several_decorations() {
    let nodes = ids(2);
    let mut manager = DecorationsManager::new();
    assert!(manager.add_target(Decoration::Selected, nodes[0]));
    assert!(manager.add_target(Decoration::Focused, nodes[0]));
    assert!(!manager.add_target(Decoration::Selected, nodes[0]));

    let set = manager.decorations_of(nodes[0]);
    assert!(set.contains(Decoration::Selected));
    assert!(set.contains(Decoration::Focused));
    assert!(!set.contains(Decoration::Cut));
    assert_eq!(
        set.iter().collect::<Vec<_>>(),
        vec![Decoration::Selected, Decoration::Focused]
    );
    assert!(manager.decorations_of(nodes[1]).is_empty());
}

#[test]
fn remove_and_purge() {
    let nodes = ids(1);
    let mut manager = DecorationsManager::new();
    manager.add_target(Decoration::Loading, nodes[0]);
    manager.add_target(Decoration::Cut, nodes[0]);

    assert!(manager.remove_target(Decoration::Loading, nodes[0]));
    assert!(!manager.remove_target(Decoration::Loading, nodes[0]));
    assert!(manager.has(Decoration::Cut, nodes[0]));

    manager.purge(nodes[0]);
    assert!(manager.decorations_of(nodes[0]).is_empty());
}

#[test]
fn clear_only_touches_one_kind() {
    let nodes = ids(2);
    let mut manager = DecorationsManager::new();
    manager.add_target(Decoration::Cut, nodes[0]);
    manager.add_target(Decoration::Cut, nodes[1]);
    manager.add_target(Decoration::Selected, nodes[1]);

    manager.clear(Decoration::Cut);
    assert_eq!(manager.targets(Decoration::Cut).count(), 0);
    assert!(manager.has(Decoration::Selected, nodes[1]));
}
