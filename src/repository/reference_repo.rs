// ==========================================
// 周课表排课系统 - 基础档案数据仓储
// ==========================================
// 职责: 教师 / 教室 / 班级 / 科目 / 开课 / 授课分配 的写入与读取
// 红线: Repository 不含排课逻辑
// ==========================================

use crate::domain::offering::{
    CourseOffering, FacultyAssignment, OfferingWithAssignments, DEFAULT_THEORY_HOURS,
    DEFAULT_TUTORIAL_HOURS,
};
use crate::domain::resource::{Classroom, Faculty, Section, Subject};
use crate::domain::types::Responsibility;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

/// 单个教师最多可教授的不同科目数
pub const MAX_SUBJECTS_PER_FACULTY: usize = 2;

// ==========================================
// ReferenceDataRepository - 基础档案仓储
// ==========================================
pub struct ReferenceDataRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReferenceDataRepository {
    /// 创建新的ReferenceDataRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== 写入 =====

    pub fn insert_faculty(&self, name: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute("INSERT INTO faculty (name) VALUES (?1)", params![name.trim()])?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_classroom(&self, name: &str, capacity: u32) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO classroom (name, capacity) VALUES (?1, ?2)",
            params![name.trim(), capacity],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_section(&self, name: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute("INSERT INTO section (name) VALUES (?1)", params![name.trim()])?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_subject(&self, code: &str, name: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO subject (code, name) VALUES (?1, ?2)",
            params![code.trim(), name.trim()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 新增开课记录
    ///
    /// # 返回
    /// - `Err(UniqueConstraintViolation)`: 同一 (科目, 班级) 已开课
    pub fn insert_course_offering(
        &self,
        subject_id: i64,
        section_id: i64,
        required_theory_hours: u32,
        required_tutorial_hours: u32,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO course_offering (
                    subject_id, section_id, required_theory_hours, required_tutorial_hours
                ) VALUES (?1, ?2, ?3, ?4)"#,
            params![subject_id, section_id, required_theory_hours, required_tutorial_hours],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 按默认周课时（理论 3 / 辅导 1）新增开课记录
    pub fn insert_default_course_offering(
        &self,
        subject_id: i64,
        section_id: i64,
    ) -> RepositoryResult<i64> {
        self.insert_course_offering(
            subject_id,
            section_id,
            DEFAULT_THEORY_HOURS,
            DEFAULT_TUTORIAL_HOURS,
        )
    }

    /// 新增授课分配
    ///
    /// # 红线
    /// - 一名教师最多教授 2 门不同科目（跨全部分配统计）
    /// - 同一 (开课, 教师) 只能分配一次（存储层唯一约束）
    pub fn add_faculty_assignment(
        &self,
        offering_id: i64,
        faculty_id: i64,
        responsibility: Responsibility,
    ) -> RepositoryResult<i64> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let subject_id: i64 = tx
            .query_row(
                "SELECT subject_id FROM course_offering WHERE offering_id = ?1",
                params![offering_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "CourseOffering".to_string(),
                id: offering_id.to_string(),
            })?;

        let taught_subjects: BTreeSet<i64> = {
            let mut stmt = tx.prepare(
                r#"SELECT DISTINCT co.subject_id
                   FROM faculty_assignment fa
                   JOIN course_offering co ON co.offering_id = fa.offering_id
                   WHERE fa.faculty_id = ?1"#,
            )?;
            let ids = stmt
                .query_map(params![faculty_id], |row| row.get::<_, i64>(0))?
                .collect::<Result<BTreeSet<i64>, _>>()?;
            ids
        };

        if !taught_subjects.contains(&subject_id)
            && taught_subjects.len() >= MAX_SUBJECTS_PER_FACULTY
        {
            return Err(RepositoryError::BusinessRuleViolation(format!(
                "教师 faculty_id={} 已教授 {} 门不同科目，不能再分配新科目 subject_id={}（上限 {} 门）",
                faculty_id,
                taught_subjects.len(),
                subject_id,
                MAX_SUBJECTS_PER_FACULTY
            )));
        }

        tx.execute(
            r#"INSERT INTO faculty_assignment (offering_id, faculty_id, responsibility)
               VALUES (?1, ?2, ?3)"#,
            params![offering_id, faculty_id, responsibility.as_db_str()],
        )?;
        let assignment_id = tx.last_insert_rowid();

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(assignment_id)
    }

    // ===== 读取 =====

    pub fn list_faculty(&self) -> RepositoryResult<Vec<Faculty>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT faculty_id, name FROM faculty ORDER BY faculty_id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Faculty {
                    faculty_id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn list_classrooms(&self) -> RepositoryResult<Vec<Classroom>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT classroom_id, name, capacity FROM classroom ORDER BY classroom_id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Classroom {
                    classroom_id: row.get(0)?,
                    name: row.get(1)?,
                    capacity: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn list_sections(&self) -> RepositoryResult<Vec<Section>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT section_id, name FROM section ORDER BY section_id")?;
        let rows = stmt
            .query_map([], map_section)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn list_subjects(&self) -> RepositoryResult<Vec<Subject>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT subject_id, code, name FROM subject ORDER BY subject_id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Subject {
                    subject_id: row.get(0)?,
                    code: row.get(1)?,
                    name: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 按ID查询班级
    pub fn find_section(&self, section_id: i64) -> RepositoryResult<Option<Section>> {
        let conn = self.get_conn()?;
        let section = conn
            .query_row(
                "SELECT section_id, name FROM section WHERE section_id = ?1",
                params![section_id],
                map_section,
            )
            .optional()?;
        Ok(section)
    }

    /// 查询全部开课记录（预先 JOIN 科目、班级、授课分配）
    ///
    /// # 排序
    /// - 开课按 offering_id
    /// - 授课分配按 faculty_id（与教师选取的平局规则一致）
    pub fn fetch_offerings_with_assignments(&self) -> RepositoryResult<Vec<OfferingWithAssignments>> {
        let conn = self.get_conn()?;

        let mut assignments_by_offering: HashMap<i64, Vec<FacultyAssignment>> = HashMap::new();
        {
            let mut stmt = conn.prepare(
                r#"SELECT assignment_id, offering_id, faculty_id, responsibility
                   FROM faculty_assignment
                   ORDER BY offering_id, faculty_id"#,
            )?;
            let rows = stmt.query_map([], |row| {
                let raw: String = row.get(3)?;
                let responsibility = raw.parse::<Responsibility>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into())
                })?;
                Ok(FacultyAssignment {
                    assignment_id: row.get(0)?,
                    offering_id: row.get(1)?,
                    faculty_id: row.get(2)?,
                    responsibility,
                })
            })?;
            for row in rows {
                let assignment = row?;
                assignments_by_offering
                    .entry(assignment.offering_id)
                    .or_default()
                    .push(assignment);
            }
        }

        let mut stmt = conn.prepare(
            r#"SELECT co.offering_id, co.subject_id, co.section_id,
                      co.required_theory_hours, co.required_tutorial_hours,
                      su.code, su.name, se.name
               FROM course_offering co
               JOIN subject su ON su.subject_id = co.subject_id
               JOIN section se ON se.section_id = co.section_id
               ORDER BY co.offering_id"#,
        )?;

        let offerings = stmt
            .query_map([], |row| {
                let offering = CourseOffering {
                    offering_id: row.get(0)?,
                    subject_id: row.get(1)?,
                    section_id: row.get(2)?,
                    required_theory_hours: row.get(3)?,
                    required_tutorial_hours: row.get(4)?,
                };
                let subject = Subject {
                    subject_id: offering.subject_id,
                    code: row.get(5)?,
                    name: row.get(6)?,
                };
                let section = Section {
                    section_id: offering.section_id,
                    name: row.get(7)?,
                };
                Ok((offering, subject, section))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(offerings
            .into_iter()
            .map(|(offering, subject, section)| {
                let assignments = assignments_by_offering
                    .remove(&offering.offering_id)
                    .unwrap_or_default();
                OfferingWithAssignments {
                    offering,
                    subject,
                    section,
                    assignments,
                }
            })
            .collect())
    }
}

fn map_section(row: &Row<'_>) -> rusqlite::Result<Section> {
    Ok(Section {
        section_id: row.get(0)?,
        name: row.get(1)?,
    })
}
