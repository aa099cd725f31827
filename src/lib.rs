//! ztree - 扩展树视图模型库
//!
//! 模块结构：
//! - models: 数据模型（TreeModel, DecorationsManager）
//! - kernel: 选择/焦点状态机、事件、点击合并
//! - kernel::services: 端口（Provider, Menu, Command, Settings）与适配器、节流调度

pub mod kernel;
pub mod models;
