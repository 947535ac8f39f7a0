// ==========================================
// 课表性质断言
// ==========================================
// 对落库课表检查: 资源互斥、课时数、同科目不连排
// ==========================================

use std::collections::{BTreeMap, HashSet};

use timetable_aps::domain::types::ClassType;
use timetable_aps::domain::ScheduledClass;

/// 任意 (天, 节次) 上教室 / 班级 / 教师均不重复
pub fn assert_no_clashes(classes: &[ScheduledClass]) {
    let mut rooms = HashSet::new();
    let mut sections = HashSet::new();
    let mut faculty = HashSet::new();

    for c in classes {
        assert!(
            rooms.insert((c.day, c.period, c.classroom_id)),
            "教室冲突: day={} period={} classroom={}",
            c.day,
            c.period,
            c.classroom_id
        );
        assert!(
            sections.insert((c.day, c.period, c.section_id)),
            "班级冲突: day={} period={} section={}",
            c.day,
            c.period,
            c.section_id
        );
        assert!(
            faculty.insert((c.day, c.period, c.faculty_id)),
            "教师冲突: day={} period={} faculty={}",
            c.day,
            c.period,
            c.faculty_id
        );
    }
}

/// 同一班级同一科目在同一天不出现在相邻两节
pub fn assert_no_adjacent_repeat(classes: &[ScheduledClass]) {
    let occupied: HashSet<(i64, i64, u32, u32)> = classes
        .iter()
        .map(|c| (c.section_id, c.subject_id, c.day, c.period))
        .collect();

    for &(section, subject, day, period) in &occupied {
        assert!(
            !occupied.contains(&(section, subject, day, period + 1)),
            "同科目连排: section={} subject={} day={} periods {}-{}",
            section,
            subject,
            day,
            period,
            period + 1
        );
    }
}

/// 按 (班级, 科目, 课型) 统计落库课时数
pub fn count_by_offering(classes: &[ScheduledClass]) -> BTreeMap<(i64, i64, ClassType), usize> {
    let mut counts = BTreeMap::new();
    for c in classes {
        *counts.entry((c.section_id, c.subject_id, c.class_type)).or_insert(0) += 1;
    }
    counts
}

pub fn assert_valid_schedule(classes: &[ScheduledClass]) {
    assert_no_clashes(classes);
    assert_no_adjacent_repeat(classes);
}
