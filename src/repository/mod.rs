// ==========================================
// 周课表排课系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含排课逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod reference_repo;
pub mod schedule_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use reference_repo::{ReferenceDataRepository, MAX_SUBJECTS_PER_FACULTY};
pub use schedule_repo::{ScheduleRepository, ScheduledClassDetail};
