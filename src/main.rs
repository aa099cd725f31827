mod logging;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ztree::kernel::services::adapters::fs_provider::OPEN_COMMAND;
use ztree::kernel::services::adapters::{
    ensure_settings_file, load_settings, FsTreeProvider, FsWatcher, LocalCommands, StaticMenus,
};
use ztree::kernel::services::ports::{
    CommandRegistry, ContextMenuRenderer, ContextMenuRequest, MenuItem,
};
use ztree::kernel::services::{TreeViewCollaborators, TreeViewOptions, TreeViewService};
use ztree::kernel::{TreeRow, TreeViewEvent};
use ztree::models::NodeKind;

const VIEW_ID: &str = "explorer";

struct PrintMenuRenderer;

impl ContextMenuRenderer for PrintMenuRenderer {
    fn show(&self, request: ContextMenuRequest) {
        let titles: Vec<&str> = request.menu_nodes.iter().map(|m| m.title.as_str()).collect();
        println!("context menu at {:?}: {}", request.anchor, titles.join(", "));
    }
}

fn main() -> io::Result<()> {
    let mut watch = false;
    let mut root: Option<PathBuf> = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--watch" | "-w" => watch = true,
            _ => root = Some(PathBuf::from(arg)),
        }
    }
    let root = match root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    let logging = logging::init();
    if let Some(guard) = &logging {
        tracing::debug!(log_dir = %guard.log_dir().display(), "logging to file");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    runtime.block_on(run(root, watch))
}

async fn run(root: PathBuf, watch: bool) -> io::Result<()> {
    if let Err(e) = ensure_settings_file() {
        tracing::warn!(error = %e, "cannot create settings file");
    }
    let settings = load_settings();
    let commands = Arc::new(LocalCommands::new());
    commands.register_command(
        OPEN_COMMAND,
        Box::new(|args| {
            tracing::info!(?args, "open requested");
        }),
    );
    let menus = StaticMenus::new()
        .with_entry(
            VIEW_ID,
            Some("file"),
            MenuItem {
                command_id: OPEN_COMMAND.to_string(),
                title: "Open".to_string(),
                group: Some("navigation".to_string()),
            },
        )
        .with_entry(
            VIEW_ID,
            None,
            MenuItem {
                command_id: ztree::kernel::services::ports::collapse_all_command_id(VIEW_ID),
                title: "Collapse All".to_string(),
                group: Some("inline".to_string()),
            },
        );
    let collaborators = TreeViewCollaborators {
        commands: commands.clone(),
        registry: commands.clone(),
        menus: Arc::new(menus),
        menu_renderer: Arc::new(PrintMenuRenderer),
    };

    let provider = FsTreeProvider::new(&root);
    let watch_root = provider.root().to_path_buf();
    let (service, mut events) = TreeViewService::new(
        VIEW_ID,
        TreeViewOptions {
            show_collapse_all: true,
        },
        provider,
        collaborators,
        settings,
    );
    service.init_tree_model().await.map_err(io::Error::other)?;
    print_rows(&service.rows());

    if !watch {
        return Ok(());
    }

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let _watcher = FsWatcher::spawn(&watch_root, tx).map_err(io::Error::other)?;
    let pump = service.clone();
    tokio::spawn(async move { pump.run_notifications(rx).await });

    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let changed = events
                    .drain()
                    .iter()
                    .any(|event| matches!(event, TreeViewEvent::DidChange));
                if changed {
                    print_rows(&service.rows());
                }
            }
        }
    }
    Ok(())
}

fn print_rows(rows: &[TreeRow]) {
    for row in rows {
        let marker = match (row.kind, row.is_expanded) {
            (NodeKind::Composite, true) => "v ",
            (NodeKind::Composite, false) => "> ",
            (NodeKind::Leaf, _) => "  ",
        };
        let decorations: Vec<&str> = row.decorations.iter().map(|d| d.class_name()).collect();
        let indent = "  ".repeat(row.depth as usize);
        if decorations.is_empty() {
            println!("{indent}{marker}{}", row.label);
        } else {
            println!("{indent}{marker}{} [{}]", row.label, decorations.join(" "));
        }
    }
    println!();
}
