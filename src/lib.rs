// ==========================================
// 周课表排课系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + SAT (rustsat / batsat)
// 系统定位: 约束求解排课核心，solve() 为唯一排课入口
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 约束建模与求解
pub mod engine;

// 配置层 - 排课参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 调用契约
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ClassType, Responsibility};

// 领域实体
pub use domain::{
    Classroom, CourseOffering, Faculty, FacultyAssignment, ScheduledClass, Section,
    SectionTimetable, SessionRequirement, Subject,
};

// 配置
pub use config::{ConfigManager, TimetableConfig};

// 引擎
pub use engine::{
    ConstraintEncoder, DecisionModel, RequirementDeriver, ResultMaterializer, ScheduleError,
    SolveDriver, SolveOutcome, TimetableOrchestrator,
};

// API
pub use api::{ApiError, TimetableApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "周课表排课系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
