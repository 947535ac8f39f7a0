// ==========================================
// 周课表排课系统 - 教学资源领域模型
// ==========================================
// 职责: 教师 / 教室 / 班级 / 科目 基础档案
// 红线: 只读输入，排课核心不修改
// ==========================================

use serde::{Deserialize, Serialize};

/// 教师
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    pub faculty_id: i64,
    pub name: String, // 唯一
}

/// 教室
///
/// capacity 目前不参与任何约束（见 DESIGN.md 开放问题）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    pub classroom_id: i64,
    pub name: String,  // 如 Room 101, Lab A
    pub capacity: u32, // 默认 30
}

/// 班级（一起上课的学生群体）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub section_id: i64,
    pub name: String,
}

/// 科目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub subject_id: i64,
    pub code: String, // 唯一
    pub name: String,
}

/// 教室默认容量
pub const DEFAULT_CLASSROOM_CAPACITY: u32 = 30;
