// ==========================================
// 周课表排课系统 - 课表校验
// ==========================================
// 职责: 写库前对求解结果做独立复核
// 检查:
// - 教室 / 班级 / 教师 在同一 (天, 节次) 无冲突
// - 每个 (科目, 班级, 教师, 课型) 的排课数 = 需求数
// - 同一班级同一科目在同一天无相邻节次
// - 天 / 节次 在配置范围内
// ==========================================

use crate::config::TimetableConfig;
use crate::domain::schedule::{NewScheduledClass, SessionRequirement};
use crate::domain::types::ClassType;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// 违规类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    ClassroomClash,
    SectionClash,
    FacultyClash,
    CountMismatch,
    ConsecutiveRepetition,
    OutOfRange,
}

/// 单条违规
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleViolation {
    pub kind: ViolationKind,
    pub message: String,
}

impl ScheduleViolation {
    fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ScheduleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

type SessionKey = (i64, i64, i64, ClassType); // (subject, section, faculty, class_type)

/// 校验课表
///
/// # 返回
/// - `Ok(())`: 全部通过
/// - `Err(violations)`: 全部违规项
pub fn validate_schedule(
    classes: &[NewScheduledClass],
    requirements: &[SessionRequirement],
    config: &TimetableConfig,
) -> Result<(), Vec<ScheduleViolation>> {
    let mut violations = Vec::new();

    let mut rooms = HashSet::new();
    let mut sections = HashSet::new();
    let mut faculty = HashSet::new();

    for c in classes {
        if !(1..=config.days_per_week).contains(&c.day)
            || !(1..=config.periods_per_day).contains(&c.period)
        {
            violations.push(ScheduleViolation::new(
                ViolationKind::OutOfRange,
                format!("day={} period={} 超出排课范围", c.day, c.period),
            ));
        }
        if !rooms.insert((c.day, c.period, c.classroom_id)) {
            violations.push(ScheduleViolation::new(
                ViolationKind::ClassroomClash,
                format!("教室 {} 在 day={} period={} 重复占用", c.classroom_id, c.day, c.period),
            ));
        }
        if !sections.insert((c.day, c.period, c.section_id)) {
            violations.push(ScheduleViolation::new(
                ViolationKind::SectionClash,
                format!("班级 {} 在 day={} period={} 重复上课", c.section_id, c.day, c.period),
            ));
        }
        if !faculty.insert((c.day, c.period, c.faculty_id)) {
            violations.push(ScheduleViolation::new(
                ViolationKind::FacultyClash,
                format!("教师 {} 在 day={} period={} 重复授课", c.faculty_id, c.day, c.period),
            ));
        }
    }

    // 需求数对账
    let mut expected: BTreeMap<SessionKey, usize> = BTreeMap::new();
    for r in requirements {
        *expected
            .entry((r.subject_id, r.section_id, r.faculty_id, r.class_type))
            .or_default() += 1;
    }
    let mut actual: BTreeMap<SessionKey, usize> = BTreeMap::new();
    for c in classes {
        *actual
            .entry((c.subject_id, c.section_id, c.faculty_id, c.class_type))
            .or_default() += 1;
    }
    for key in expected.keys().chain(actual.keys()).collect::<HashSet<_>>() {
        let want = expected.get(key).copied().unwrap_or(0);
        let got = actual.get(key).copied().unwrap_or(0);
        if want != got {
            violations.push(ScheduleViolation::new(
                ViolationKind::CountMismatch,
                format!(
                    "subject={} section={} faculty={} {}: 需求 {} 节，实排 {} 节",
                    key.0, key.1, key.2, key.3, want, got
                ),
            ));
        }
    }

    // 相邻节次同科目
    let occupied: HashSet<(i64, i64, u32, u32)> = classes
        .iter()
        .map(|c| (c.section_id, c.subject_id, c.day, c.period))
        .collect();
    for &(section, subject, day, period) in &occupied {
        if occupied.contains(&(section, subject, day, period + 1)) {
            violations.push(ScheduleViolation::new(
                ViolationKind::ConsecutiveRepetition,
                format!(
                    "班级 {} 科目 {} 在 day={} 第 {}、{} 节连堂",
                    section,
                    subject,
                    day,
                    period,
                    period + 1
                ),
            ));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
