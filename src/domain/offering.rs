// ==========================================
// 周课表排课系统 - 开课与授课分配领域模型
// ==========================================
// 职责: CourseOffering (科目 × 班级 的周课时需求)
//       FacultyAssignment (开课 × 教师 × 职责)
// ==========================================

use crate::domain::resource::{Section, Subject};
use crate::domain::types::{ClassType, Responsibility};
use serde::{Deserialize, Serialize};

// ==========================================
// CourseOffering - 开课记录
// ==========================================
// 唯一键: (subject_id, section_id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOffering {
    pub offering_id: i64,
    pub subject_id: i64,
    pub section_id: i64,
    pub required_theory_hours: u32,   // 每周理论课时 (默认 3)
    pub required_tutorial_hours: u32, // 每周辅导课时 (默认 1)
}

impl CourseOffering {
    /// 指定课型的周课时数
    pub fn required_hours(&self, class_type: ClassType) -> u32 {
        match class_type {
            ClassType::Theory => self.required_theory_hours,
            ClassType::Tutorial => self.required_tutorial_hours,
        }
    }
}

/// 默认理论课时
pub const DEFAULT_THEORY_HOURS: u32 = 3;
/// 默认辅导课时
pub const DEFAULT_TUTORIAL_HOURS: u32 = 1;

// ==========================================
// FacultyAssignment - 授课分配
// ==========================================
// 唯一键: (offering_id, faculty_id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultyAssignment {
    pub assignment_id: i64,
    pub offering_id: i64,
    pub faculty_id: i64,
    pub responsibility: Responsibility,
}

// ==========================================
// OfferingWithAssignments - 开课读模型
// ==========================================
// 排课输入契约: 开课 + 科目 + 班级 + 全部授课分配（预先 JOIN）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferingWithAssignments {
    pub offering: CourseOffering,
    pub subject: Subject,
    pub section: Section,
    pub assignments: Vec<FacultyAssignment>,
}

impl OfferingWithAssignments {
    /// 负责指定课型的教师
    ///
    /// 多个分配同时满足时取 faculty_id 最小者，结果与查询顺序无关。
    pub fn responsible_faculty(&self, class_type: ClassType) -> Option<i64> {
        self.assignments
            .iter()
            .filter(|a| a.responsibility.covers(class_type))
            .map(|a| a.faculty_id)
            .min()
    }
}
