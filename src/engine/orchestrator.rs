// ==========================================
// 周课表排课系统 - 引擎编排器
// ==========================================
// 计算主流程:
//   需求展开 → 决策模型 → 约束编码 → 求解 → 结果落库
// 同步、无状态: 每次 solve 从头展开、建模、求解，无热启动
// 失败分类:
// - 结构预检 / 无解 / 参数无效 → (false, 原因)，不触碰已有课表
// - 持久化失败 → 原样向上传播
// ==========================================

use crate::config::TimetableConfigReader;
use crate::engine::encoder::{ConstraintEncoder, EncodingStats};
use crate::engine::error::{ScheduleError, ScheduleResult};
use crate::engine::materializer::ResultMaterializer;
use crate::engine::model::DecisionModel;
use crate::engine::repositories::TimetableRepositories;
use crate::engine::requirement::RequirementDeriver;
use crate::engine::sat_backend::{BatsatBackend, SatBackend};
use crate::engine::solve_driver::SolveDriver;
use crate::engine::validation::validate_schedule;
use crate::repository::RepositoryError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// 求解成功的固定提示
pub const SUCCESS_MESSAGE: &str = "课表生成成功 (timetable generated successfully)";

// ==========================================
// ModelStats - 模型规模
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStats {
    pub requirements: usize,
    pub decision_variables: usize,
    pub auxiliary_variables: usize,
    pub clauses: usize,
}

// ==========================================
// SolveOutcome - 求解结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveOutcome {
    pub success: bool,
    pub message: String,
    pub scheduled_count: usize,
    pub stats: Option<ModelStats>,
}

impl SolveOutcome {
    fn succeeded(scheduled_count: usize, stats: Option<ModelStats>) -> Self {
        Self {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            scheduled_count,
            stats,
        }
    }

    fn failed(message: String, stats: Option<ModelStats>) -> Self {
        Self {
            success: false,
            message,
            scheduled_count: 0,
            stats,
        }
    }

    /// (success, message) 调用契约
    pub fn as_pair(&self) -> (bool, String) {
        (self.success, self.message.clone())
    }
}

// ==========================================
// TimetableOrchestrator - 引擎编排器
// ==========================================
pub struct TimetableOrchestrator<C>
where
    C: TimetableConfigReader,
{
    config: Arc<C>,
    repos: TimetableRepositories,
    deriver: RequirementDeriver,
    driver: SolveDriver,
    materializer: ResultMaterializer,
}

impl<C> TimetableOrchestrator<C>
where
    C: TimetableConfigReader,
{
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - config: 排课参数读取器
    /// - repos: 仓储集合
    pub fn new(config: Arc<C>, repos: TimetableRepositories) -> Self {
        Self {
            config,
            repos,
            deriver: RequirementDeriver::new(),
            driver: SolveDriver::new(),
            materializer: ResultMaterializer::new(),
        }
    }

    /// 使用默认后端 (batsat) 求解
    pub fn solve(&self) -> Result<SolveOutcome, RepositoryError> {
        self.solve_with(BatsatBackend::new())
    }

    /// 使用指定后端求解
    ///
    /// # 返回
    /// - `Ok(outcome)`: 成功或可解释的失败（outcome.success 区分）
    /// - `Err`: 持久化失败
    pub fn solve_with<B: SatBackend>(&self, backend: B) -> Result<SolveOutcome, RepositoryError> {
        let start = Instant::now();
        let mut stats = None;

        let result = self.execute(backend, &mut stats);
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(scheduled_count) => {
                info!(scheduled_count, elapsed_ms, "排课流程完成");
                Ok(SolveOutcome::succeeded(scheduled_count, stats))
            }
            Err(ScheduleError::Repository(e)) => {
                error!(error = %e, elapsed_ms, "排课流程持久化失败");
                Err(e)
            }
            Err(e) => {
                warn!(reason = %e, elapsed_ms, "排课失败");
                Ok(SolveOutcome::failed(e.to_string(), stats))
            }
        }
    }

    fn execute<B: SatBackend>(
        &self,
        mut backend: B,
        stats: &mut Option<ModelStats>,
    ) -> ScheduleResult<usize> {
        // ==========================================
        // 步骤1: 读取参数与输入数据
        // ==========================================
        let config = self
            .config
            .load_timetable_config()
            .map_err(|e| ScheduleError::InvalidConfig(e.to_string()))?;

        let reference = self.repos.reference_repo();
        let offerings = reference.fetch_offerings_with_assignments()?;
        let classrooms = reference.list_classrooms()?;
        let sections = reference.list_sections()?;
        let faculty = reference.list_faculty()?;

        info!(
            offerings = offerings.len(),
            classrooms = classrooms.len(),
            sections = sections.len(),
            faculty = faculty.len(),
            days = config.days_per_week,
            periods = config.periods_per_day,
            "开始执行排课流程"
        );

        // ==========================================
        // 步骤2: 需求展开
        // ==========================================
        debug!("步骤2: 展开课时需求");
        let requirements = self.deriver.derive(&offerings);

        // ==========================================
        // 步骤3: 决策模型（含结构预检）
        // ==========================================
        debug!("步骤3: 构建决策模型");
        let mut model = DecisionModel::build(requirements, &classrooms, &config)?;

        // ==========================================
        // 步骤4: 约束编码
        // ==========================================
        debug!("步骤4: 编码硬约束");
        let encoding: EncodingStats = ConstraintEncoder::new(&mut model, &mut backend).encode_all()?;
        *stats = Some(ModelStats {
            requirements: model.requirements().len(),
            decision_variables: model.decision_variable_count(),
            auxiliary_variables: model.aux_variable_count(),
            clauses: encoding.clauses,
        });

        // ==========================================
        // 步骤5: 求解
        // ==========================================
        debug!("步骤5: 调用求解后端");
        self.driver.run(&mut backend)?;

        // ==========================================
        // 步骤6: 结果复核与落库
        // ==========================================
        debug!("步骤6: 提取并写入课表");
        let classes = self.materializer.collect(&model, &backend, &config)?;

        validate_schedule(&classes, model.requirements(), &config).map_err(|violations| {
            ScheduleError::InvalidSolution(
                violations
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;

        self.materializer
            .persist(self.repos.schedule_repo(), &classes)
    }
}
