// ==========================================
// 周课表排课系统 - 课表领域模型
// ==========================================
// 职责: 课时需求 (求解内部) / 已排课程 (求解输出) / 班级课表读模型
// ==========================================

use crate::domain::types::ClassType;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

// ==========================================
// SessionRequirement - 课时需求
// ==========================================
// 每个课时单元一条，id 仅在单次求解内稳定（从 0 递增）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionRequirement {
    pub id: usize,
    pub subject_id: i64,
    pub section_id: i64,
    pub faculty_id: i64,
    pub class_type: ClassType,
}

// ==========================================
// NewScheduledClass - 待写入的已排课程
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScheduledClass {
    pub day: u32,    // 1..=days_per_week
    pub period: u32, // 1..=periods_per_day
    pub classroom_id: i64,
    pub faculty_id: i64,
    pub subject_id: i64,
    pub section_id: i64,
    pub class_type: ClassType,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

// ==========================================
// ScheduledClass - 已排课程
// ==========================================
// 唯一约束 (存储层):
// - (day, period, classroom_id)
// - (day, period, section_id)
// - (day, period, faculty_id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledClass {
    pub scheduled_class_id: i64,
    pub day: u32,
    pub period: u32,
    pub classroom_id: i64,
    pub faculty_id: i64,
    pub subject_id: i64,
    pub section_id: i64,
    pub class_type: ClassType,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

// ==========================================
// SectionTimetable - 班级周课表读模型
// ==========================================
// 行 = 节次或课间休息（按时间先后），列 = 星期；不含任何渲染逻辑

/// 单元格: 某节次某天的课程
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableCell {
    pub subject_code: String,
    pub subject_name: String,
    pub faculty_name: String,
    pub classroom_name: String,
    pub class_type: ClassType,
}

/// 一个节次的整行；课间休息行 period 为 None 且没有单元格
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableRow {
    pub period: Option<u32>,
    pub label: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub cells: Vec<Option<TimetableCell>>, // 下标 = day - 1
}

impl TimetableRow {
    pub fn is_break(&self) -> bool {
        self.period.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTimetable {
    pub section_id: i64,
    pub section_name: String,
    pub day_labels: Vec<String>,
    pub rows: Vec<TimetableRow>,
}

impl SectionTimetable {
    /// 已排课程数
    pub fn scheduled_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.cells.iter().filter(|c| c.is_some()).count())
            .sum()
    }

    /// 取某天某节的单元格
    pub fn cell(&self, day: u32, period: u32) -> Option<&TimetableCell> {
        let row = self.rows.iter().find(|r| r.period == Some(period))?;
        let idx = (day as usize).checked_sub(1)?;
        row.cells.get(idx)?.as_ref()
    }
}

/// 星期标签（周一开始）
pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// 第 day 天（1 起）的标签，超出一周时退化为 "Day N"
pub fn day_label(day: u32) -> String {
    day.checked_sub(1)
        .and_then(|i| DAY_NAMES.get(i as usize))
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("Day {}", day))
}
