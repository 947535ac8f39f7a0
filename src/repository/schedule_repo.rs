// ==========================================
// 周课表排课系统 - 课表数据仓储
// ==========================================
// 职责: scheduled_class 表的整体替换与查询
// 红线: 删除旧课表 + 批量写入新课表 必须在同一事务内完成
// ==========================================

use crate::config::timetable_config::TIME_FORMAT;
use crate::domain::schedule::{NewScheduledClass, ScheduledClass};
use crate::domain::types::ClassType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};
use tracing::debug;

const SELECT_COLUMNS: &str = r#"sc.scheduled_class_id, sc.day, sc.period, sc.classroom_id,
       sc.faculty_id, sc.subject_id, sc.section_id, sc.class_type,
       sc.start_time, sc.end_time"#;

/// 课表明细（附带名称，供课表读模型使用）
#[derive(Debug, Clone)]
pub struct ScheduledClassDetail {
    pub class: ScheduledClass,
    pub subject_code: String,
    pub subject_name: String,
    pub faculty_name: String,
    pub classroom_name: String,
}

// ==========================================
// ScheduleRepository - 课表仓储
// ==========================================
pub struct ScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleRepository {
    /// 创建新的ScheduleRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 整体替换课表
    ///
    /// # 参数
    /// - `classes`: 新课表全部记录
    ///
    /// # 返回
    /// - `Ok((deleted, inserted))`: 删除的旧记录数、写入的新记录数
    /// - `Err`: 数据库错误（事务回滚，旧课表保持不变）
    ///
    /// # 红线
    /// - 删除 + 写入在同一事务中完成，不存在“课表为空”的中间状态
    /// - 整体替换，不合并、不保留历史
    pub fn replace_all(&self, classes: &[NewScheduledClass]) -> RepositoryResult<(usize, usize)> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let deleted = tx.execute("DELETE FROM scheduled_class", [])?;

        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO scheduled_class (
                        day, period, classroom_id, faculty_id, subject_id, section_id,
                        class_type, start_time, end_time
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )?;

            for class in classes {
                stmt.execute(params![
                    class.day,
                    class.period,
                    class.classroom_id,
                    class.faculty_id,
                    class.subject_id,
                    class.section_id,
                    class.class_type.as_db_str(),
                    class.start_time.format(TIME_FORMAT).to_string(),
                    class.end_time.format(TIME_FORMAT).to_string(),
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(deleted, inserted = classes.len(), "课表整体替换完成");
        Ok((deleted, classes.len()))
    }

    /// 查询全部课表，按 (day, period, section) 排序
    pub fn list_all(&self) -> RepositoryResult<Vec<ScheduledClass>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM scheduled_class sc ORDER BY sc.day, sc.period, sc.section_id",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], map_scheduled_class)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 查询某班级的课表
    pub fn list_by_section(&self, section_id: i64) -> RepositoryResult<Vec<ScheduledClass>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM scheduled_class sc WHERE sc.section_id = ?1 ORDER BY sc.day, sc.period",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![section_id], map_scheduled_class)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 查询某班级课表明细（附科目/教师/教室名称）
    pub fn list_section_details(&self, section_id: i64) -> RepositoryResult<Vec<ScheduledClassDetail>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"SELECT {}, su.code, su.name, f.name, c.name
               FROM scheduled_class sc
               JOIN subject su ON su.subject_id = sc.subject_id
               JOIN faculty f ON f.faculty_id = sc.faculty_id
               JOIN classroom c ON c.classroom_id = sc.classroom_id
               WHERE sc.section_id = ?1
               ORDER BY sc.day, sc.period"#,
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![section_id], |row| {
                Ok(ScheduledClassDetail {
                    class: map_scheduled_class(row)?,
                    subject_code: row.get(10)?,
                    subject_name: row.get(11)?,
                    faculty_name: row.get(12)?,
                    classroom_name: row.get(13)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 课表记录总数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM scheduled_class", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

fn parse_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveTime> {
    let raw: String = row.get(idx)?;
    NaiveTime::parse_from_str(&raw, TIME_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn map_scheduled_class(row: &Row<'_>) -> rusqlite::Result<ScheduledClass> {
    let raw_type: String = row.get(7)?;
    let class_type = raw_type
        .parse::<ClassType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, e.into()))?;

    Ok(ScheduledClass {
        scheduled_class_id: row.get(0)?,
        day: row.get(1)?,
        period: row.get(2)?,
        classroom_id: row.get(3)?,
        faculty_id: row.get(4)?,
        subject_id: row.get(5)?,
        section_id: row.get(6)?,
        class_type,
        start_time: parse_time(row, 8)?,
        end_time: parse_time(row, 9)?,
    })
}
