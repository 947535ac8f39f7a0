// ==========================================
// 周课表排课系统 - 引擎层
// ==========================================
// 职责: 排课约束建模与求解,不拼 SQL
// 红线: Engine 不拼 SQL, 所有失败必须输出 reason
// ==========================================

pub mod encoder;
pub mod error;
pub mod materializer;
pub mod model;
pub mod orchestrator;
pub mod repositories;
pub mod requirement;
pub mod sat_backend;
pub mod solve_driver;
pub mod validation;

// 重导出核心引擎
pub use encoder::{ConstraintEncoder, EncodingStats};
pub use error::{ScheduleError, ScheduleResult};
pub use materializer::ResultMaterializer;
pub use model::{DecisionModel, Placement};
pub use orchestrator::{ModelStats, SolveOutcome, TimetableOrchestrator, SUCCESS_MESSAGE};
pub use repositories::TimetableRepositories;
pub use requirement::RequirementDeriver;
pub use sat_backend::{BatsatBackend, SatBackend, SolveStatus};
pub use solve_driver::SolveDriver;
pub use validation::{validate_schedule, ScheduleViolation, ViolationKind};
