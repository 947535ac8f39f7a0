// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供基于临时数据库文件的 TimetableApi 测试环境
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

use timetable_aps::api::TimetableApi;
use timetable_aps::config::config_keys;
use timetable_aps::domain::ScheduledClass;
use timetable_aps::repository::ReferenceDataRepository;

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// API 与测试代码共用同一连接，便于直接检查落库结果
pub struct ApiTestEnv {
    pub db_path: String,
    pub conn: Arc<Mutex<Connection>>,
    pub api: TimetableApi,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建默认网格（6 天 × 8 节）的测试环境
    pub fn new() -> Result<Self, String> {
        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("创建测试数据库失败: {}", e))?;

        let conn = test_helpers::open_test_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;

        let api = TimetableApi::from_connection(conn.clone())
            .map_err(|e| format!("无法创建TimetableApi: {}", e))?;

        Ok(Self {
            db_path,
            conn,
            api,
            _temp_file: temp_file,
        })
    }

    /// 创建指定网格的测试环境（通过 config_kv 写入）
    pub fn with_grid(days_per_week: u32, periods_per_day: u32) -> Result<Self, String> {
        let env = Self::new()?;
        env.set_config(config_keys::DAYS_PER_WEEK, &days_per_week.to_string())?;
        env.set_config(config_keys::PERIODS_PER_DAY, &periods_per_day.to_string())?;
        Ok(env)
    }

    pub fn set_config(&self, key: &str, value: &str) -> Result<(), String> {
        self.api
            .config_manager()
            .set_global_config_value(key, value)
            .map_err(|e| format!("写入配置 {} 失败: {}", key, e))
    }

    pub fn repo(&self) -> &ReferenceDataRepository {
        self.api.reference_repo()
    }

    /// 当前已落库的全部课表
    pub fn scheduled(&self) -> Vec<ScheduledClass> {
        self.api.schedule_repo().list_all().expect("查询课表失败")
    }
}
