// ==========================================
// 周课表排课系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合排课引擎所需的 Repository
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::repository::{ReferenceDataRepository, ScheduleRepository};

/// 排课引擎仓储集合
///
/// # 包含的仓储
/// - `reference_repo`: 基础档案（只读输入）
/// - `schedule_repo`: 课表（唯一写出口）
#[derive(Clone)]
pub struct TimetableRepositories {
    /// 基础档案仓储
    pub reference_repo: Arc<ReferenceDataRepository>,
    /// 课表仓储
    pub schedule_repo: Arc<ScheduleRepository>,
}

impl TimetableRepositories {
    /// 创建新的仓储集合
    pub fn new(
        reference_repo: Arc<ReferenceDataRepository>,
        schedule_repo: Arc<ScheduleRepository>,
    ) -> Self {
        Self {
            reference_repo,
            schedule_repo,
        }
    }

    /// 基于同一连接创建全部仓储
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            reference_repo: Arc::new(ReferenceDataRepository::new(conn.clone())),
            schedule_repo: Arc::new(ScheduleRepository::new(conn)),
        }
    }

    /// 获取基础档案仓储
    pub fn reference_repo(&self) -> &Arc<ReferenceDataRepository> {
        &self.reference_repo
    }

    /// 获取课表仓储
    pub fn schedule_repo(&self) -> &Arc<ScheduleRepository> {
        &self.schedule_repo
    }
}
