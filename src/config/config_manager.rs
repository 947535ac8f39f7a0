// ==========================================
// 周课表排课系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::timetable_config::{TimetableConfig, TimetableConfigReader, TIME_FORMAT};
use crate::db::open_sqlite_connection;
use chrono::NaiveTime;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::debug;

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const DAYS_PER_WEEK: &str = "timetable/days_per_week";
    pub const PERIODS_PER_DAY: &str = "timetable/periods_per_day";
    pub const DAY_START: &str = "timetable/day_start";
    pub const PERIOD_MINUTES: &str = "timetable/period_minutes";
    /// JSON 对象: {"第N节": 休息分钟}，如 {"4": 60}
    pub const BREAKS: &str = "timetable/breaks";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值 (UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        Ok(())
    }

    /// 读取并解析配置值；缺省返回 default，格式错误报错
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_config_value(key)? {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map_err(|e| format!("配置格式错误 (key={}, value={}): {}", key, raw, e).into()),
            None => Ok(default),
        }
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 在求解日志中记录本次使用的配置
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key",
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    // ===== 排课参数 =====

    /// 获取每周上课天数（默认 6）
    pub fn get_days_per_week(&self) -> Result<u32, Box<dyn Error>> {
        self.get_parsed_or_default(config_keys::DAYS_PER_WEEK, TimetableConfig::default().days_per_week)
    }

    /// 获取每天节次数（默认 8）
    pub fn get_periods_per_day(&self) -> Result<u32, Box<dyn Error>> {
        self.get_parsed_or_default(
            config_keys::PERIODS_PER_DAY,
            TimetableConfig::default().periods_per_day,
        )
    }

    /// 获取每节时长（分钟，默认 45）
    pub fn get_period_minutes(&self) -> Result<u32, Box<dyn Error>> {
        self.get_parsed_or_default(
            config_keys::PERIOD_MINUTES,
            TimetableConfig::default().period_minutes,
        )
    }

    /// 获取首节开始时间（HH:MM，默认 09:00）
    pub fn get_day_start(&self) -> Result<NaiveTime, Box<dyn Error>> {
        match self.get_config_value(config_keys::DAY_START)? {
            Some(raw) => NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT).map_err(|e| {
                format!("配置格式错误 (key={}, value={}): {}", config_keys::DAY_START, raw, e).into()
            }),
            None => Ok(TimetableConfig::default().day_start),
        }
    }

    /// 获取课间休息（第 N 节之后 → 分钟，默认无）
    pub fn get_breaks(&self) -> Result<BTreeMap<u32, u32>, Box<dyn Error>> {
        match self.get_config_value(config_keys::BREAKS)? {
            Some(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Some(raw) => serde_json::from_str(raw.trim()).map_err(|e| {
                format!("配置格式错误 (key={}, value={}): {}", config_keys::BREAKS, raw, e).into()
            }),
            None => Ok(TimetableConfig::default().breaks),
        }
    }
}

impl TimetableConfigReader for ConfigManager {
    fn load_timetable_config(&self) -> Result<TimetableConfig, Box<dyn Error>> {
        let config = TimetableConfig {
            days_per_week: self.get_days_per_week()?,
            periods_per_day: self.get_periods_per_day()?,
            day_start: self.get_day_start()?,
            period_minutes: self.get_period_minutes()?,
            breaks: self.get_breaks()?,
        };
        config.validate()?;

        debug!(
            days_per_week = config.days_per_week,
            periods_per_day = config.periods_per_day,
            day_start = %config.day_start.format(TIME_FORMAT),
            period_minutes = config.period_minutes,
            breaks = ?config.breaks,
            "排课参数已加载"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_table_empty() {
        let cfg = manager().load_timetable_config().unwrap();
        assert_eq!(cfg, TimetableConfig::default());
    }

    #[test]
    fn test_overrides_are_read() {
        let mgr = manager();
        mgr.set_global_config_value(config_keys::DAYS_PER_WEEK, "5").unwrap();
        mgr.set_global_config_value(config_keys::PERIODS_PER_DAY, "6").unwrap();
        mgr.set_global_config_value(config_keys::DAY_START, "08:30").unwrap();
        mgr.set_global_config_value(config_keys::PERIOD_MINUTES, "50").unwrap();

        let cfg = mgr.load_timetable_config().unwrap();
        assert_eq!(cfg.days_per_week, 5);
        assert_eq!(cfg.periods_per_day, 6);
        assert_eq!(cfg.day_start, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(cfg.period_minutes, 50);
    }

    #[test]
    fn test_upsert_overwrites() {
        let mgr = manager();
        mgr.set_global_config_value(config_keys::PERIODS_PER_DAY, "6").unwrap();
        mgr.set_global_config_value(config_keys::PERIODS_PER_DAY, "7").unwrap();
        assert_eq!(mgr.get_periods_per_day().unwrap(), 7);

        let snapshot = mgr.get_config_snapshot().unwrap();
        assert!(snapshot.contains("timetable/periods_per_day"));
    }

    #[test]
    fn test_malformed_value_is_error() {
        let mgr = manager();
        mgr.set_global_config_value(config_keys::PERIODS_PER_DAY, "eight").unwrap();
        assert!(mgr.load_timetable_config().is_err());

        let mgr = manager();
        mgr.set_global_config_value(config_keys::DAY_START, "9am").unwrap();
        assert!(mgr.load_timetable_config().is_err());
    }

    #[test]
    fn test_breaks_are_read_as_json() {
        let mgr = manager();
        mgr.set_global_config_value(config_keys::BREAKS, r#"{"4": 60, "2": 10}"#).unwrap();

        let cfg = mgr.load_timetable_config().unwrap();
        assert_eq!(cfg.breaks.get(&4), Some(&60));
        assert_eq!(cfg.breaks.get(&2), Some(&10));
        assert_eq!(cfg.period_times()[&5].0, NaiveTime::from_hms_opt(13, 10, 0).unwrap());
    }

    #[test]
    fn test_malformed_or_out_of_range_breaks_rejected() {
        let mgr = manager();
        mgr.set_global_config_value(config_keys::BREAKS, "4:60").unwrap();
        assert!(mgr.load_timetable_config().is_err());

        let mgr = manager();
        mgr.set_global_config_value(config_keys::BREAKS, r#"{"8": 30}"#).unwrap();
        assert!(mgr.load_timetable_config().is_err());
    }

    #[test]
    fn test_zero_periods_rejected() {
        let mgr = manager();
        mgr.set_global_config_value(config_keys::PERIODS_PER_DAY, "0").unwrap();
        assert!(mgr.load_timetable_config().is_err());
    }
}
