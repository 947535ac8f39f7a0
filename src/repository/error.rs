// ==========================================
// 周课表排课系统 - 仓储层错误类型
// ==========================================
// 职责: 把 SQLite 失败归类为可读的仓储错误
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 查询与连接 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("数据库事务提交失败: {0}")]
    DatabaseTransactionError(String),

    // ===== 存储层约束 =====
    /// 含课表三条唯一约束: (天, 节次, 教室/班级/教师)
    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    /// 课时数为负、职责/课型代码非法等
    #[error("取值约束违反: {0}")]
    CheckConstraintViolation(String),

    // ===== 业务规则 =====
    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ===== 已存数据无法解析 =====
    #[error("存储值无法解析 (column={column}): {message}")]
    CorruptValue { column: usize, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else if msg.contains("CHECK") {
                    RepositoryError::CheckConstraintViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            rusqlite::Error::FromSqlConversionFailure(column, _, cause) => {
                RepositoryError::CorruptValue {
                    column,
                    message: cause.to_string(),
                }
            }
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
