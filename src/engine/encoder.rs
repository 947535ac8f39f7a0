// ==========================================
// 周课表排课系统 - 约束编码器
// ==========================================
// 硬约束:
// 1. 每个需求恰好落在一个 (天, 节次, 教室)
// 2. 班级互斥: 同一 (天, 节次) 同一班级至多一节课
// 3. 教室互斥: 同一 (天, 节次, 教室) 至多一节课
// 4. 教师互斥: 同一 (天, 节次) 同一教师至多一节课（无需求的教师不产生约束）
// 5. 同一班级同一科目不得在同一天相邻两节连续上课
//
// 约束 5 的编码: 每个 (班级, 科目, 天, 节次) 一个“占用”辅助变量 a，
//   x → a (对每个教室变量 x)，a → OR(x)，再对相邻节次加 ¬a_p ∨ ¬a_{p+1}。
//   由于约束 2，同一 (班级, 天, 节次) 至多一个 x 为真，故 a 等价于 Σx。
//
// 至多一个: rustsat am1 编码（小组 Pairwise，大组 Ladder），子句经 BackendSink 直接写入后端
// ==========================================

use crate::engine::error::{ScheduleError, ScheduleResult};
use crate::engine::model::DecisionModel;
use crate::engine::sat_backend::SatBackend;
use rustsat::encodings::am1::{Encode, Ladder, Pairwise};
use rustsat::encodings::CollectClauses;
use rustsat::types::{Clause, Lit, Var};
use rustsat::OutOfMemory;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// 变量数不超过该值时用 Pairwise 编码，否则用 Ladder 编码（n - 1 个辅助变量）
pub const PAIRWISE_THRESHOLD: usize = 6;

// ==========================================
// BackendSink - rustsat 编码 → SatBackend
// ==========================================
// 后端错误先暂存，再以 OutOfMemory::ExternalApi 中断编码，由调用方取回
struct BackendSink<'b, B: SatBackend> {
    backend: &'b mut B,
    added: usize,
    error: Option<ScheduleError>,
}

impl<'b, B: SatBackend> BackendSink<'b, B> {
    fn new(backend: &'b mut B) -> Self {
        Self {
            backend,
            added: 0,
            error: None,
        }
    }

    /// 编码结束后归并错误，返回写入的子句数
    fn finish(self, result: Result<(), OutOfMemory>) -> ScheduleResult<usize> {
        match (self.error, result) {
            (Some(err), _) => Err(err),
            (None, Err(oom)) => Err(ScheduleError::Backend(oom.to_string())),
            (None, Ok(())) => Ok(self.added),
        }
    }
}

impl<B: SatBackend> CollectClauses for BackendSink<'_, B> {
    fn n_clauses(&self) -> usize {
        self.added
    }

    fn extend_clauses<T>(&mut self, cl_iter: T) -> Result<(), OutOfMemory>
    where
        T: IntoIterator<Item = Clause>,
    {
        for cl in cl_iter {
            let lits: &[Lit] = (*cl).as_ref();
            if let Err(err) = self.backend.add_clause(lits) {
                self.error = Some(err);
                return Err(OutOfMemory::ExternalApi);
            }
            self.added += 1;
        }
        Ok(())
    }
}

/// 编码统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodingStats {
    pub exactly_one: usize,
    pub at_most_one: usize,
    pub activity_vars: usize,
    pub clauses: usize,
}

// ==========================================
// ConstraintEncoder
// ==========================================
pub struct ConstraintEncoder<'a, B: SatBackend> {
    model: &'a mut DecisionModel,
    backend: &'a mut B,
    stats: EncodingStats,
}

impl<'a, B: SatBackend> ConstraintEncoder<'a, B> {
    pub fn new(model: &'a mut DecisionModel, backend: &'a mut B) -> Self {
        Self {
            model,
            backend,
            stats: EncodingStats::default(),
        }
    }

    /// 写入全部硬约束
    pub fn encode_all(mut self) -> ScheduleResult<EncodingStats> {
        self.encode_exactly_one_placement()?;
        self.encode_section_exclusivity()?;
        self.encode_classroom_exclusivity()?;
        self.encode_faculty_exclusivity()?;
        self.encode_no_consecutive_repetition()?;

        info!(
            exactly_one = self.stats.exactly_one,
            at_most_one = self.stats.at_most_one,
            activity_vars = self.stats.activity_vars,
            aux_variables = self.model.aux_variable_count(),
            clauses = self.stats.clauses,
            "约束编码完成"
        );

        Ok(self.stats)
    }

    // ===== 约束 1 =====
    fn encode_exactly_one_placement(&mut self) -> ScheduleResult<()> {
        for req in 0..self.model.requirements().len() {
            let vars = self.model.requirement_vars(req);
            self.exactly_one(&vars)?;
        }
        debug!(count = self.model.requirements().len(), "约束1: 恰好一次");
        Ok(())
    }

    // ===== 约束 2 =====
    fn encode_section_exclusivity(&mut self) -> ScheduleResult<()> {
        let groups = self.group_requirements(|r| r.section_id);
        self.encode_group_exclusivity(&groups)?;
        debug!(sections = groups.len(), "约束2: 班级互斥");
        Ok(())
    }

    // ===== 约束 3 =====
    fn encode_classroom_exclusivity(&mut self) -> ScheduleResult<()> {
        let req_count = self.model.requirements().len();
        for day in 1..=self.model.days() {
            for period in 1..=self.model.periods() {
                for room in 0..self.model.room_count() {
                    let vars: Vec<Var> = (0..req_count)
                        .map(|req| self.model.decision_var(req, day, period, room))
                        .collect();
                    self.at_most_one(&vars)?;
                }
            }
        }
        debug!(rooms = self.model.room_count(), "约束3: 教室互斥");
        Ok(())
    }

    // ===== 约束 4 =====
    fn encode_faculty_exclusivity(&mut self) -> ScheduleResult<()> {
        // 仅对有需求的教师分组，零需求教师自然不出现
        let groups = self.group_requirements(|r| r.faculty_id);
        self.encode_group_exclusivity(&groups)?;
        debug!(faculty = groups.len(), "约束4: 教师互斥");
        Ok(())
    }

    // ===== 约束 5 =====
    fn encode_no_consecutive_repetition(&mut self) -> ScheduleResult<()> {
        if self.model.periods() < 2 {
            return Ok(());
        }

        let mut groups: BTreeMap<(i64, i64), Vec<usize>> = BTreeMap::new();
        for r in self.model.requirements() {
            groups.entry((r.section_id, r.subject_id)).or_default().push(r.id);
        }

        for reqs in groups.values() {
            for day in 1..=self.model.days() {
                let mut activity = Vec::with_capacity(self.model.periods() as usize);
                for period in 1..=self.model.periods() {
                    let terms: Vec<Var> = reqs
                        .iter()
                        .flat_map(|&req| self.model.slot_vars(req, day, period))
                        .collect();
                    activity.push(self.activity_var(&terms)?);
                }

                for pair in activity.windows(2) {
                    self.clause(&[pair[0].neg_lit(), pair[1].neg_lit()])?;
                    self.stats.at_most_one += 1;
                }
            }
        }

        debug!(pairs = groups.len(), "约束5: 同科目不连堂");
        Ok(())
    }

    // ==========================================
    // 编码原语
    // ==========================================

    /// 按键分组的需求，在每个 (天, 节次) 上至多一个变量为真
    fn encode_group_exclusivity(&mut self, groups: &BTreeMap<i64, Vec<usize>>) -> ScheduleResult<()> {
        for reqs in groups.values() {
            for day in 1..=self.model.days() {
                for period in 1..=self.model.periods() {
                    let vars: Vec<Var> = reqs
                        .iter()
                        .flat_map(|&req| self.model.slot_vars(req, day, period))
                        .collect();
                    self.at_most_one(&vars)?;
                }
            }
        }
        Ok(())
    }

    fn group_requirements<F>(&self, key: F) -> BTreeMap<i64, Vec<usize>>
    where
        F: Fn(&crate::domain::schedule::SessionRequirement) -> i64,
    {
        let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for r in self.model.requirements() {
            groups.entry(key(r)).or_default().push(r.id);
        }
        groups
    }

    /// 占用变量 a ⇔ OR(terms)
    fn activity_var(&mut self, terms: &[Var]) -> ScheduleResult<Var> {
        let a = self.model.new_aux_var()?;
        self.stats.activity_vars += 1;

        for t in terms {
            self.clause(&[t.neg_lit(), a.pos_lit()])?;
        }
        let mut back: Vec<Lit> = terms.iter().map(|t| t.pos_lit()).collect();
        back.push(a.neg_lit());
        self.clause(&back)?;

        Ok(a)
    }

    /// 恰好一个为真
    fn exactly_one(&mut self, vars: &[Var]) -> ScheduleResult<()> {
        let at_least: Vec<Lit> = vars.iter().map(|v| v.pos_lit()).collect();
        self.clause(&at_least)?;
        self.encode_at_most_one(vars)?;
        self.stats.exactly_one += 1;
        Ok(())
    }

    /// 至多一个为真
    fn at_most_one(&mut self, vars: &[Var]) -> ScheduleResult<()> {
        self.encode_at_most_one(vars)?;
        self.stats.at_most_one += 1;
        Ok(())
    }

    fn encode_at_most_one(&mut self, vars: &[Var]) -> ScheduleResult<()> {
        if vars.len() <= 1 {
            return Ok(());
        }

        let lits = vars.iter().map(|v| v.pos_lit());
        if vars.len() <= PAIRWISE_THRESHOLD {
            self.encode_am1(Pairwise::from_iter(lits))
        } else {
            self.model.reserve_aux_vars(vars.len() - 1)?;
            self.encode_am1(Ladder::from_iter(lits))
        }
    }

    fn encode_am1<E: Encode>(&mut self, mut encoding: E) -> ScheduleResult<()> {
        let mut sink = BackendSink::new(&mut *self.backend);
        let result = encoding.encode(&mut sink, self.model.var_manager_mut());
        self.stats.clauses += sink.finish(result)?;
        Ok(())
    }

    fn clause(&mut self, lits: &[Lit]) -> ScheduleResult<()> {
        self.backend.add_clause(lits)?;
        self.stats.clauses += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimetableConfig;
    use crate::domain::resource::Classroom;
    use crate::domain::schedule::SessionRequirement;
    use crate::domain::types::ClassType;
    use crate::engine::model::Placement;
    use crate::engine::sat_backend::{BatsatBackend, SolveStatus};

    fn req(id: usize, subject: i64, section: i64, faculty: i64) -> SessionRequirement {
        SessionRequirement {
            id,
            subject_id: subject,
            section_id: section,
            faculty_id: faculty,
            class_type: ClassType::Theory,
        }
    }

    fn rooms(n: usize) -> Vec<Classroom> {
        (0..n)
            .map(|i| Classroom {
                classroom_id: i as i64 + 1,
                name: format!("R{}", i),
                capacity: 30,
            })
            .collect()
    }

    fn solve(
        reqs: Vec<SessionRequirement>,
        rooms_n: usize,
        config: TimetableConfig,
    ) -> (SolveStatus, Vec<Placement>) {
        let mut model = DecisionModel::build(reqs, &rooms(rooms_n), &config).unwrap();
        let mut backend = BatsatBackend::new();
        ConstraintEncoder::new(&mut model, &mut backend).encode_all().unwrap();
        let status = backend.solve().unwrap();
        let placements = model
            .decision_vars()
            .filter(|v| backend.value(*v))
            .filter_map(|v| model.placement_of(v))
            .collect();
        (status, placements)
    }

    #[test]
    fn test_each_requirement_placed_exactly_once() {
        let reqs = (0..5).map(|i| req(i, 1 + i as i64, 1, 1)).collect();
        let (status, placements) = solve(reqs, 2, TimetableConfig::with_grid(2, 4));
        assert_eq!(status, SolveStatus::Feasible);
        assert_eq!(placements.len(), 5);
        for r in 0..5 {
            assert_eq!(placements.iter().filter(|p| p.requirement == r).count(), 1);
        }
    }

    #[test]
    fn test_section_and_faculty_never_double_booked() {
        // 两个班级共用一位教师，三个教室
        let reqs = vec![
            req(0, 1, 1, 9),
            req(1, 2, 1, 9),
            req(2, 3, 2, 9),
            req(3, 4, 2, 9),
        ];
        let (status, placements) = solve(reqs.clone(), 3, TimetableConfig::with_grid(1, 4));
        assert_eq!(status, SolveStatus::Feasible);

        let mut slots = std::collections::HashSet::new();
        for p in &placements {
            // 同一教师 → 所有 (day, period) 两两不同
            assert!(slots.insert((p.day, p.period)));
        }
    }

    #[test]
    fn test_single_room_forces_distinct_slots() {
        let reqs = vec![req(0, 1, 1, 1), req(1, 2, 2, 2), req(2, 3, 3, 3)];
        let (status, placements) = solve(reqs, 1, TimetableConfig::with_grid(1, 3));
        assert_eq!(status, SolveStatus::Feasible);
        let mut slots: Vec<u32> = placements.iter().map(|p| p.period).collect();
        slots.sort_unstable();
        assert_eq!(slots, vec![1, 2, 3]);
    }

    #[test]
    fn test_consecutive_same_subject_is_avoided() {
        // 同一班级同一科目 2 节，1 天 3 节 → 只能排在第 1、3 节
        let reqs = vec![req(0, 1, 1, 1), req(1, 1, 1, 1)];
        let (status, placements) = solve(reqs, 2, TimetableConfig::with_grid(1, 3));
        assert_eq!(status, SolveStatus::Feasible);
        let mut periods: Vec<u32> = placements.iter().map(|p| p.period).collect();
        periods.sort_unstable();
        assert_eq!(periods, vec![1, 3]);
    }

    #[test]
    fn test_consecutive_only_option_is_infeasible() {
        // 1 天 2 节，同科目 2 节 → 必然连堂 → 无解
        let reqs = vec![req(0, 1, 1, 1), req(1, 1, 1, 1)];
        let (status, placements) = solve(reqs, 2, TimetableConfig::with_grid(1, 2));
        assert_eq!(status, SolveStatus::Infeasible);
        assert!(placements.is_empty());
    }

    #[test]
    fn test_different_subjects_may_be_adjacent() {
        let reqs = vec![req(0, 1, 1, 1), req(1, 2, 1, 2)];
        let (status, _) = solve(reqs, 1, TimetableConfig::with_grid(1, 2));
        assert_eq!(status, SolveStatus::Feasible);
    }

    #[test]
    fn test_ladder_used_for_large_groups() {
        let reqs = vec![req(0, 1, 1, 1)];
        let config = TimetableConfig::with_grid(2, 4);
        let mut model = DecisionModel::build(reqs, &rooms(2), &config).unwrap();
        let mut backend = BatsatBackend::new();
        let stats = ConstraintEncoder::new(&mut model, &mut backend).encode_all().unwrap();

        // 16 个变量的恰好一次 → Ladder 15 个辅助变量，另有 2 天 × 4 节 的占用变量
        assert_eq!(stats.exactly_one, 1);
        assert_eq!(stats.activity_vars, 8);
        assert_eq!(model.aux_variable_count(), 15 + 8);
        assert_eq!(stats.clauses, backend.num_clauses());
    }

    #[test]
    fn test_section_exclusivity_alone_blocks_shared_slot() {
        // 同一班级两门课、两位教师、两个教室，只有 1 个时段 → 仅班级互斥即可判无解
        let reqs = vec![req(0, 1, 1, 1), req(1, 2, 1, 2)];
        let (status, placements) = solve(reqs, 2, TimetableConfig::with_grid(1, 1));
        assert_eq!(status, SolveStatus::Infeasible);
        assert!(placements.is_empty());
    }

    #[test]
    fn test_ladder_at_most_one_rejects_two_true() {
        let config = TimetableConfig::with_grid(1, 8);
        let mut model = DecisionModel::build(vec![req(0, 1, 1, 1)], &rooms(1), &config).unwrap();
        let vars: Vec<Var> = model.decision_vars().collect();
        assert_eq!(vars.len(), 8);

        let mut backend = BatsatBackend::new();
        {
            let mut encoder = ConstraintEncoder::new(&mut model, &mut backend);
            encoder.at_most_one(&vars).unwrap();
            assert_eq!(encoder.stats.clauses, encoder.backend.num_clauses());
        }
        assert_eq!(model.aux_variable_count(), 7);

        backend.add_clause(&[vars[0].pos_lit()]).unwrap();
        backend.add_clause(&[vars[7].pos_lit()]).unwrap();
        assert_eq!(backend.solve().unwrap(), SolveStatus::Infeasible);
    }

    #[test]
    fn test_ladder_at_most_one_allows_single_true() {
        let config = TimetableConfig::with_grid(1, 8);
        let mut model = DecisionModel::build(vec![req(0, 1, 1, 1)], &rooms(1), &config).unwrap();
        let vars: Vec<Var> = model.decision_vars().collect();

        let mut backend = BatsatBackend::new();
        ConstraintEncoder::new(&mut model, &mut backend)
            .at_most_one(&vars)
            .unwrap();
        backend.add_clause(&[vars[3].pos_lit()]).unwrap();

        assert_eq!(backend.solve().unwrap(), SolveStatus::Feasible);
        let chosen: Vec<Var> = vars.iter().copied().filter(|v| backend.value(*v)).collect();
        assert_eq!(chosen, vec![vars[3]]);
    }
}
