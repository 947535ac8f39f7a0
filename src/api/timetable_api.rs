// ==========================================
// 周课表排课系统 - 排课 API
// ==========================================
// 职责: solve() 调用契约、班级周课表查询
// 红线: 除持久化失败外，排课失败一律以 (false, 原因) 返回
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, DaySlot, TimetableConfig, TimetableConfigReader};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::resource::Section;
use crate::domain::schedule::{day_label, SectionTimetable, TimetableCell, TimetableRow};
use crate::engine::{SolveOutcome, TimetableOrchestrator, TimetableRepositories};
use crate::repository::{
    ReferenceDataRepository, RepositoryError, ScheduleRepository, ScheduledClassDetail,
};

// ==========================================
// TimetableApi - 排课 API
// ==========================================

/// 排课API
///
/// 职责：
/// 1. 一键排课（整体替换已有课表）
/// 2. 班级周课表查询（节次 × 星期网格）
/// 3. 暴露基础档案仓储，供数据录入方使用
pub struct TimetableApi {
    config_manager: Arc<ConfigManager>,
    repos: TimetableRepositories,
    orchestrator: TimetableOrchestrator<ConfigManager>,
}

impl TimetableApi {
    /// 打开数据库文件并创建 API（自动建表）
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 基于已有连接创建 API（自动建表，幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ApiError::DatabaseConnectionError(format!("锁获取失败: {}", e)))?;
            init_schema(&guard).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        }

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?,
        );
        let repos = TimetableRepositories::from_connection(conn);
        let orchestrator = TimetableOrchestrator::new(config_manager.clone(), repos.clone());

        Ok(Self {
            config_manager,
            repos,
            orchestrator,
        })
    }

    // ==========================================
    // 排课
    // ==========================================

    /// 排课入口
    ///
    /// # 返回
    /// - `Ok((true, 成功提示))`: 新课表已整体替换旧课表
    /// - `Ok((false, 原因))`: 结构预检失败 / 无解 / 参数无效，旧课表保持不变
    /// - `Err`: 持久化失败
    pub fn solve(&self) -> Result<(bool, String), RepositoryError> {
        self.generate_timetable().map(|outcome| outcome.as_pair())
    }

    /// 排课并返回完整结果（含模型规模）
    pub fn generate_timetable(&self) -> Result<SolveOutcome, RepositoryError> {
        let outcome = self.orchestrator.solve()?;
        info!(
            success = outcome.success,
            scheduled_count = outcome.scheduled_count,
            "排课请求完成"
        );
        Ok(outcome)
    }

    // ==========================================
    // 课表查询
    // ==========================================

    /// 查询某班级的周课表
    ///
    /// # 返回
    /// - 行 = 节次（含起止时间）及配置的课间休息行，列 = 星期
    /// - 班级不存在时返回 `ApiError::NotFound`
    pub fn section_timetable(&self, section_id: i64) -> ApiResult<SectionTimetable> {
        let section = self
            .repos
            .reference_repo()
            .find_section(section_id)?
            .ok_or_else(|| ApiError::NotFound(format!("section(id={})不存在", section_id)))?;

        let config = self.load_config()?;
        let details = self.repos.schedule_repo().list_section_details(section_id)?;
        Ok(build_grid(&section, &details, &config))
    }

    /// 查询全部班级的周课表（按班级ID排序）
    pub fn all_section_timetables(&self) -> ApiResult<Vec<SectionTimetable>> {
        let config = self.load_config()?;
        let sections = self.repos.reference_repo().list_sections()?;

        sections
            .iter()
            .map(|section| -> ApiResult<SectionTimetable> {
                let details = self
                    .repos
                    .schedule_repo()
                    .list_section_details(section.section_id)?;
                Ok(build_grid(section, &details, &config))
            })
            .collect()
    }

    fn load_config(&self) -> ApiResult<TimetableConfig> {
        self.config_manager
            .load_timetable_config()
            .map_err(|e| ApiError::InvalidConfig(e.to_string()))
    }

    // ==========================================
    // 仓储访问
    // ==========================================

    pub fn reference_repo(&self) -> &ReferenceDataRepository {
        self.repos.reference_repo()
    }

    pub fn schedule_repo(&self) -> &ScheduleRepository {
        self.repos.schedule_repo()
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }
}

/// 组装节次 × 星期网格
///
/// 超出当前网格的记录（网格参数在上次排课后被调小）跳过并告警
fn build_grid(
    section: &Section,
    details: &[ScheduledClassDetail],
    config: &TimetableConfig,
) -> SectionTimetable {
    let days = config.days_per_week as usize;

    let mut rows: Vec<TimetableRow> = config
        .day_slots()
        .into_iter()
        .map(|slot| {
            let (period, cells) = match slot {
                DaySlot::Period { period, .. } => (Some(period), vec![None; days]),
                DaySlot::Break { .. } => (None, Vec::new()),
            };
            TimetableRow {
                period,
                label: slot.label(),
                start_time: slot.start(),
                end_time: slot.end(),
                cells,
            }
        })
        .collect();

    for detail in details {
        let class = &detail.class;
        let slot = rows
            .iter_mut()
            .find(|r| r.period == Some(class.period))
            .and_then(|r| (class.day as usize).checked_sub(1).and_then(|i| r.cells.get_mut(i)));

        match slot {
            Some(cell) => {
                *cell = Some(TimetableCell {
                    subject_code: detail.subject_code.clone(),
                    subject_name: detail.subject_name.clone(),
                    faculty_name: detail.faculty_name.clone(),
                    classroom_name: detail.classroom_name.clone(),
                    class_type: class.class_type,
                });
            }
            None => warn!(
                section_id = section.section_id,
                day = class.day,
                period = class.period,
                "课表记录超出当前网格，已跳过"
            ),
        }
    }

    SectionTimetable {
        section_id: section.section_id,
        section_name: section.name.clone(),
        day_labels: (1..=config.days_per_week).map(day_label).collect(),
        rows,
    }
}
