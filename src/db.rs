// ==========================================
// 周课表排课系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 / busy_timeout）
// - 统一建表语句，课表三个唯一约束在存储层兜底
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS faculty (
            faculty_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS classroom (
            classroom_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            capacity INTEGER NOT NULL DEFAULT 30 CHECK (capacity >= 0)
        );

        CREATE TABLE IF NOT EXISTS section (
            section_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS subject (
            subject_id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS course_offering (
            offering_id INTEGER PRIMARY KEY AUTOINCREMENT,
            subject_id INTEGER NOT NULL REFERENCES subject(subject_id) ON DELETE CASCADE,
            section_id INTEGER NOT NULL REFERENCES section(section_id) ON DELETE CASCADE,
            required_theory_hours INTEGER NOT NULL DEFAULT 3 CHECK (required_theory_hours >= 0),
            required_tutorial_hours INTEGER NOT NULL DEFAULT 1 CHECK (required_tutorial_hours >= 0),
            UNIQUE (subject_id, section_id)
        );

        CREATE TABLE IF NOT EXISTS faculty_assignment (
            assignment_id INTEGER PRIMARY KEY AUTOINCREMENT,
            offering_id INTEGER NOT NULL REFERENCES course_offering(offering_id) ON DELETE CASCADE,
            faculty_id INTEGER NOT NULL REFERENCES faculty(faculty_id) ON DELETE CASCADE,
            responsibility TEXT NOT NULL DEFAULT 'ALL'
                CHECK (responsibility IN ('ALL', 'THEORY', 'TUTORIAL')),
            UNIQUE (offering_id, faculty_id)
        );

        CREATE TABLE IF NOT EXISTS scheduled_class (
            scheduled_class_id INTEGER PRIMARY KEY AUTOINCREMENT,
            day INTEGER NOT NULL,
            period INTEGER NOT NULL,
            faculty_id INTEGER NOT NULL REFERENCES faculty(faculty_id) ON DELETE RESTRICT,
            subject_id INTEGER NOT NULL REFERENCES subject(subject_id) ON DELETE RESTRICT,
            section_id INTEGER NOT NULL REFERENCES section(section_id) ON DELETE RESTRICT,
            classroom_id INTEGER NOT NULL REFERENCES classroom(classroom_id) ON DELETE RESTRICT,
            class_type TEXT NOT NULL CHECK (class_type IN ('THEORY', 'TUTORIAL')),
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            UNIQUE (day, period, classroom_id),
            UNIQUE (day, period, section_id),
            UNIQUE (day, period, faculty_id)
        );

        CREATE INDEX IF NOT EXISTS idx_scheduled_class_section
            ON scheduled_class (section_id, day, period);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
