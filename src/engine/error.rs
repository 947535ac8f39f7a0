// ==========================================
// 周课表排课系统 - 引擎层错误类型
// ==========================================
// 职责: 排课失败分类，每类都必须给出可读原因
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 排课引擎错误类型
#[derive(Error, Debug)]
pub enum ScheduleError {
    // ===== 结构性预检失败（不调用求解器） =====
    #[error("没有可排的课时需求 (no requirements): 请检查开课记录及其授课教师分配")]
    NoRequirements,

    #[error("课时需求超出可用时段容量: 需求 {required} 个课时，可用 {available} 个 (教室 × 天 × 节次)")]
    CapacityExceeded { required: usize, available: usize },

    #[error("决策变量规模过大: {variables} 个变量超出求解后端上限")]
    ModelTooLarge { variables: usize },

    #[error("排课参数无效: {0}")]
    InvalidConfig(String),

    // ===== 求解失败 =====
    #[error("求解失败，求解器状态: {status}")]
    Infeasible { status: String },

    #[error("求解后端错误: {0}")]
    Backend(String),

    #[error("求解结果校验失败: {0}")]
    InvalidSolution(String),

    // ===== 持久化失败（原样向上传播） =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ScheduleError {
    /// 是否为持久化失败（由存储协作方负责，不折算为 (false, message)）
    pub fn is_persistence(&self) -> bool {
        matches!(self, ScheduleError::Repository(_))
    }
}

/// Result 类型别名
pub type ScheduleResult<T> = Result<T, ScheduleError>;
