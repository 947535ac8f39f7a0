// ==========================================
// 周课表排课系统 - API 层
// ==========================================
// 职责: 提供 solve() 调用契约与课表查询接口
// ==========================================

pub mod error;
pub mod timetable_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use timetable_api::TimetableApi;
