//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod commands;
pub mod fs_provider;
pub mod settings;

pub use commands::{LocalCommands, StaticMenus};
pub use fs_provider::{should_ignore, FsTreeProvider, FsWatcher};
pub use settings::{
    ensure_log_dir, ensure_settings_file, get_settings_path, load_settings, load_settings_from,
    SettingsError,
};
