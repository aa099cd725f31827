use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn item(command_id: &str) -> MenuItem {
    MenuItem {
        command_id: command_id.to_string(),
        title: command_id.to_string(),
        group: None,
    }
}

fn command_ids(items: Vec<MenuItem>) -> Vec<String> {
    items.into_iter().map(|m| m.command_id).collect()
}

#[test]
fn menus_are_scoped_to_their_view() {
    let menus = StaticMenus::new()
        .with_entry("explorer", Some("file"), item("open"))
        .with_entry("explorer", None, item("refresh"))
        .with_entry("outline", None, item("outline.sort"));

    assert_eq!(
        command_ids(menus.menu_items("explorer", Some("file"))),
        vec!["open", "refresh"]
    );
    assert_eq!(
        command_ids(menus.menu_items("explorer", Some("folder"))),
        vec!["refresh"]
    );
    assert_eq!(
        command_ids(menus.menu_items("outline", Some("file"))),
        vec!["outline.sort"]
    );
    assert!(menus.menu_items("timeline", None).is_empty());
}

#[test]
fn registered_command_runs_with_arguments() {
    let calls = Arc::new(AtomicUsize::new(0));
    let commands = LocalCommands::new();
    let seen = calls.clone();
    commands.register_command(
        "count",
        Box::new(move |args| {
            assert_eq!(args, vec![Value::from(1)]);
            seen.fetch_add(1, Ordering::SeqCst);
        }),
    );

    assert!(commands.has_command("count"));
    commands.execute_command("count", vec![Value::from(1)]);
    commands.execute_command("missing", Vec::new());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
