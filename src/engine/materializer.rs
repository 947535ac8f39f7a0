// ==========================================
// 周课表排课系统 - 求解结果落库
// ==========================================
// 职责: 取值为真的决策变量 → 已排课程记录 → 整体替换旧课表
// 红线: 只在求解状态确认成功后调用；整体替换在单一事务内完成
// ==========================================

use crate::config::TimetableConfig;
use crate::domain::schedule::NewScheduledClass;
use crate::engine::error::{ScheduleError, ScheduleResult};
use crate::engine::model::DecisionModel;
use crate::engine::sat_backend::SatBackend;
use crate::repository::ScheduleRepository;
use tracing::info;

/// 求解结果落库器
#[derive(Debug, Default)]
pub struct ResultMaterializer;

impl ResultMaterializer {
    pub fn new() -> Self {
        Self
    }

    /// 从求解结果提取课表
    ///
    /// 记录按 (需求, 天, 节次, 教室) 顺序产生，字段取自来源需求
    pub fn collect<B: SatBackend>(
        &self,
        model: &DecisionModel,
        backend: &B,
        config: &TimetableConfig,
    ) -> ScheduleResult<Vec<NewScheduledClass>> {
        let period_times = config.period_times();
        let mut classes = Vec::with_capacity(model.requirements().len());

        for var in model.decision_vars().filter(|v| backend.value(*v)) {
            let placement = model.placement_of(var).ok_or_else(|| {
                ScheduleError::InvalidSolution(format!("变量 {} 不是决策变量", var.idx()))
            })?;
            let req = &model.requirements()[placement.requirement];
            let (start_time, end_time) =
                period_times.get(&placement.period).copied().ok_or_else(|| {
                    ScheduleError::InvalidSolution(format!("节次 {} 无起止时间", placement.period))
                })?;

            classes.push(NewScheduledClass {
                day: placement.day,
                period: placement.period,
                classroom_id: model.classroom_ids()[placement.room],
                faculty_id: req.faculty_id,
                subject_id: req.subject_id,
                section_id: req.section_id,
                class_type: req.class_type,
                start_time,
                end_time,
            });
        }

        Ok(classes)
    }

    /// 整体替换已持久化课表
    ///
    /// # 返回
    /// - 写入的记录数
    pub fn persist(
        &self,
        repo: &ScheduleRepository,
        classes: &[NewScheduledClass],
    ) -> ScheduleResult<usize> {
        let (deleted, inserted) = repo.replace_all(classes)?;
        info!(deleted, inserted, "课表已整体替换");
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resource::Classroom;
    use crate::domain::schedule::SessionRequirement;
    use crate::domain::types::ClassType;
    use crate::engine::encoder::ConstraintEncoder;
    use crate::engine::sat_backend::BatsatBackend;
    use chrono::NaiveTime;

    #[test]
    fn test_collect_copies_requirement_fields_and_period_times() {
        let reqs = vec![SessionRequirement {
            id: 0,
            subject_id: 7,
            section_id: 3,
            faculty_id: 11,
            class_type: ClassType::Tutorial,
        }];
        let rooms = vec![Classroom {
            classroom_id: 42,
            name: "Lab".to_string(),
            capacity: 30,
        }];
        let config = TimetableConfig::with_grid(1, 2);

        let mut model = DecisionModel::build(reqs, &rooms, &config).unwrap();
        let mut backend = BatsatBackend::new();
        ConstraintEncoder::new(&mut model, &mut backend).encode_all().unwrap();
        assert!(backend.solve().unwrap().is_success());

        let classes = ResultMaterializer::new().collect(&model, &backend, &config).unwrap();
        assert_eq!(classes.len(), 1);
        let c = &classes[0];
        assert_eq!((c.day, c.classroom_id), (1, 42));
        assert_eq!((c.subject_id, c.section_id, c.faculty_id), (7, 3, 11));
        assert_eq!(c.class_type, ClassType::Tutorial);

        let expected_start = if c.period == 1 { "09:00" } else { "09:45" };
        assert_eq!(c.start_time, NaiveTime::parse_from_str(expected_start, "%H:%M").unwrap());
        assert_eq!((c.end_time - c.start_time).num_minutes(), 45);
    }
}
