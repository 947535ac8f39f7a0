// ==========================================
// 周课表排课系统 - 决策模型
// ==========================================
// 每个 (需求, 天, 节次, 教室) 一个布尔决策变量
// 变量总数 = 需求数 × 天数 × 节次数 × 教室数（主要内存/时间开销，必须记录日志）
// 变量编号: 决策变量连续占用 [0, N)，辅助变量由 BasicVarManager 从 N 起分配
// ==========================================

use crate::config::TimetableConfig;
use crate::domain::resource::Classroom;
use crate::domain::schedule::SessionRequirement;
use crate::engine::error::{ScheduleError, ScheduleResult};
use rustsat::instances::{BasicVarManager, ManageVars};
use rustsat::types::Var;
use tracing::{debug, info};

/// 一个决策变量对应的排课位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub requirement: usize, // 需求下标（= SessionRequirement::id）
    pub day: u32,           // 1 起
    pub period: u32,        // 1 起
    pub room: usize,        // 教室下标
}

// ==========================================
// DecisionModel
// ==========================================
#[derive(Debug)]
pub struct DecisionModel {
    requirements: Vec<SessionRequirement>,
    classroom_ids: Vec<i64>,
    days: u32,
    periods: u32,
    decision_vars: u32,
    var_manager: BasicVarManager,
}

impl DecisionModel {
    /// 构建决策模型
    ///
    /// # 预检（在分配任何变量之前）
    /// - 需求为空 → NoRequirements
    /// - 需求数 > 教室数 × 天数 × 节次数 → CapacityExceeded
    /// - 变量数超出后端编号上限 → ModelTooLarge
    pub fn build(
        requirements: Vec<SessionRequirement>,
        classrooms: &[Classroom],
        config: &TimetableConfig,
    ) -> ScheduleResult<Self> {
        if requirements.is_empty() {
            return Err(ScheduleError::NoRequirements);
        }

        let available = classrooms.len() * config.slots_per_week();
        if requirements.len() > available {
            return Err(ScheduleError::CapacityExceeded {
                required: requirements.len(),
                available,
            });
        }

        let total = requirements.len() * available;
        if total > Var::MAX_IDX as usize {
            return Err(ScheduleError::ModelTooLarge { variables: total });
        }

        info!(
            requirements = requirements.len(),
            days = config.days_per_week,
            periods = config.periods_per_day,
            classrooms = classrooms.len(),
            decision_variables = total,
            "决策变量已分配"
        );
        debug!("教室容量未参与约束（仅存储）");

        Ok(Self {
            requirements,
            classroom_ids: classrooms.iter().map(|c| c.classroom_id).collect(),
            days: config.days_per_week,
            periods: config.periods_per_day,
            decision_vars: total as u32,
            var_manager: BasicVarManager::from_next_free(Var::new(total as u32)),
        })
    }

    pub fn requirements(&self) -> &[SessionRequirement] {
        &self.requirements
    }

    pub fn classroom_ids(&self) -> &[i64] {
        &self.classroom_ids
    }

    pub fn room_count(&self) -> usize {
        self.classroom_ids.len()
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn periods(&self) -> u32 {
        self.periods
    }

    /// 决策变量
    ///
    /// day / period 均从 1 起
    pub fn decision_var(&self, requirement: usize, day: u32, period: u32, room: usize) -> Var {
        debug_assert!(requirement < self.requirements.len());
        debug_assert!((1..=self.days).contains(&day));
        debug_assert!((1..=self.periods).contains(&period));
        debug_assert!(room < self.classroom_ids.len());

        let idx = ((requirement * self.days as usize + (day - 1) as usize) * self.periods as usize
            + (period - 1) as usize)
            * self.classroom_ids.len()
            + room;
        Var::new(idx as u32)
    }

    /// 决策变量 → 排课位置；辅助变量返回 None
    pub fn placement_of(&self, var: Var) -> Option<Placement> {
        let mut idx = var.idx32();
        if idx >= self.decision_vars {
            return None;
        }

        let rooms = self.classroom_ids.len() as u32;
        let room = idx % rooms;
        idx /= rooms;
        let period = idx % self.periods + 1;
        idx /= self.periods;
        let day = idx % self.days + 1;
        let requirement = idx / self.days;

        Some(Placement {
            requirement: requirement as usize,
            day,
            period,
            room: room as usize,
        })
    }

    /// 某需求在某 (天, 节次) 的全部教室变量
    pub fn slot_vars(&self, requirement: usize, day: u32, period: u32) -> Vec<Var> {
        (0..self.room_count())
            .map(|room| self.decision_var(requirement, day, period, room))
            .collect()
    }

    /// 某需求的全部变量
    pub fn requirement_vars(&self, requirement: usize) -> Vec<Var> {
        let mut vars = Vec::with_capacity(self.days as usize * self.periods as usize * self.room_count());
        for day in 1..=self.days {
            for period in 1..=self.periods {
                vars.extend(self.slot_vars(requirement, day, period));
            }
        }
        vars
    }

    /// 全部决策变量
    pub fn decision_vars(&self) -> impl Iterator<Item = Var> {
        (0..self.decision_vars).map(Var::new)
    }

    /// 分配一个辅助变量
    pub fn new_aux_var(&mut self) -> ScheduleResult<Var> {
        self.reserve_aux_vars(1)?;
        Ok(self.var_manager.new_var())
    }

    /// 确认还能再分配 `count` 个辅助变量（编号不得超过后端上限）
    pub fn reserve_aux_vars(&self, count: usize) -> ScheduleResult<()> {
        let needed = self.var_manager.n_used() as usize + count;
        if needed > Var::MAX_IDX as usize + 1 {
            return Err(ScheduleError::ModelTooLarge { variables: needed });
        }
        Ok(())
    }

    /// 交给 rustsat 编码分配辅助变量
    pub fn var_manager_mut(&mut self) -> &mut BasicVarManager {
        &mut self.var_manager
    }

    pub fn decision_variable_count(&self) -> usize {
        self.decision_vars as usize
    }

    pub fn aux_variable_count(&self) -> usize {
        (self.var_manager.n_used() - self.decision_vars) as usize
    }
}
