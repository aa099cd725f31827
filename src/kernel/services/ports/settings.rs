use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpenMode {
    #[default]
    SingleClick,
    DoubleClick,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "workbench.list.openMode", default)]
    pub open_mode: OpenMode,
    #[serde(default)]
    pub tree_view: TreeViewSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeViewSettings {
    #[serde(default = "default_click_coalesce_ms")]
    pub click_coalesce_ms: u64,
    #[serde(default = "default_delay_ms")]
    pub refresh_delay_ms: u64,
    #[serde(default = "default_delay_ms")]
    pub reveal_delay_ms: u64,
}

fn default_click_coalesce_ms() -> u64 {
    200
}

fn default_delay_ms() -> u64 {
    500
}

impl TreeViewSettings {
    pub fn click_coalesce(&self) -> Duration {
        Duration::from_millis(self.click_coalesce_ms)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

impl Default for TreeViewSettings {
    fn default() -> Self {
        Self {
            click_coalesce_ms: default_click_coalesce_ms(),
            refresh_delay_ms: default_delay_ms(),
            reveal_delay_ms: default_delay_ms(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            open_mode: OpenMode::default(),
            tree_view: TreeViewSettings::default(),
        }
    }
}
