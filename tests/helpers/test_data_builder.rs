// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================
// 按名称录入基础档案，重复名称复用已有记录
// ==========================================

use std::collections::HashMap;

use timetable_aps::domain::types::Responsibility;
use timetable_aps::repository::ReferenceDataRepository;

pub struct TimetableSeed<'a> {
    repo: &'a ReferenceDataRepository,
    faculty: HashMap<String, i64>,
    sections: HashMap<String, i64>,
    subjects: HashMap<String, i64>,
}

impl<'a> TimetableSeed<'a> {
    pub fn new(repo: &'a ReferenceDataRepository) -> Self {
        Self {
            repo,
            faculty: HashMap::new(),
            sections: HashMap::new(),
            subjects: HashMap::new(),
        }
    }

    pub fn classroom(&mut self, name: &str) -> i64 {
        self.repo.insert_classroom(name, 30).expect("插入教室失败")
    }

    pub fn classrooms(&mut self, count: usize) -> Vec<i64> {
        (1..=count)
            .map(|i| self.classroom(&format!("Room-{}", 100 + i)))
            .collect()
    }

    pub fn faculty(&mut self, name: &str) -> i64 {
        if let Some(id) = self.faculty.get(name) {
            return *id;
        }
        let id = self.repo.insert_faculty(name).expect("插入教师失败");
        self.faculty.insert(name.to_string(), id);
        id
    }

    pub fn section(&mut self, name: &str) -> i64 {
        if let Some(id) = self.sections.get(name) {
            return *id;
        }
        let id = self.repo.insert_section(name).expect("插入班级失败");
        self.sections.insert(name.to_string(), id);
        id
    }

    pub fn subject(&mut self, code: &str) -> i64 {
        if let Some(id) = self.subjects.get(code) {
            return *id;
        }
        let id = self
            .repo
            .insert_subject(code, &format!("{} Fundamentals", code))
            .expect("插入科目失败");
        self.subjects.insert(code.to_string(), id);
        id
    }

    /// 新增开课记录（不含教师分配）
    pub fn offering(&mut self, subject_code: &str, section_name: &str, theory: u32, tutorial: u32) -> i64 {
        let subject_id = self.subject(subject_code);
        let section_id = self.section(section_name);
        self.repo
            .insert_course_offering(subject_id, section_id, theory, tutorial)
            .expect("插入开课记录失败")
    }

    pub fn assign(&mut self, offering_id: i64, faculty_name: &str, responsibility: Responsibility) -> i64 {
        let faculty_id = self.faculty(faculty_name);
        self.repo
            .add_faculty_assignment(offering_id, faculty_id, responsibility)
            .expect("插入授课分配失败")
    }

    /// 开课 + 单一教师负责全部课型
    pub fn taught_offering(
        &mut self,
        subject_code: &str,
        section_name: &str,
        faculty_name: &str,
        theory: u32,
        tutorial: u32,
    ) -> i64 {
        let offering_id = self.offering(subject_code, section_name, theory, tutorial);
        self.assign(offering_id, faculty_name, Responsibility::All);
        offering_id
    }
}
