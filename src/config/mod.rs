// ==========================================
// 周课表排课系统 - 配置层
// ==========================================
// 职责: 排课参数管理 (天数 / 节次 / 节次时间 / 课间休息)
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod timetable_config;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager};
pub use timetable_config::{DaySlot, TimetableConfig, TimetableConfigReader};
