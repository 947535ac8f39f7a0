// ==========================================
// 周课表排课系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod offering;
pub mod resource;
pub mod schedule;
pub mod types;

// 重导出核心类型
pub use offering::{
    CourseOffering, FacultyAssignment, OfferingWithAssignments, DEFAULT_THEORY_HOURS,
    DEFAULT_TUTORIAL_HOURS,
};
pub use resource::{Classroom, Faculty, Section, Subject};
pub use schedule::{
    day_label, NewScheduledClass, ScheduledClass, SectionTimetable, SessionRequirement,
    TimetableCell, TimetableRow,
};
pub use types::{ClassType, Responsibility};
