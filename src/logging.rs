// ==========================================
// 周课表排课系统 - 日志初始化
// ==========================================
// 使用 tracing + tracing-subscriber，RUST_LOG 优先于默认过滤器
//
// 常用过滤器:
// - RUST_LOG=info                         排课结果、决策变量规模、子句数
// - RUST_LOG=timetable_aps::engine=debug  逐条约束的编码明细（分组数、占用变量）
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 默认过滤器
pub const DEFAULT_FILTER: &str = "info";

/// 求解诊断过滤器：引擎层打开 debug，其余保持 info
pub const SOLVER_DIAGNOSTICS_FILTER: &str = "info,timetable_aps::engine=debug";

fn env_filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// 初始化日志系统（文本格式）
///
/// # 示例
/// ```no_run
/// use timetable_aps::logging;
/// logging::init();
/// ```
pub fn init() {
    fmt()
        .with_env_filter(env_filter_or(DEFAULT_FILTER))
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 以 JSON 行格式初始化日志，未设置 RUST_LOG 时带上引擎诊断
///
/// 大规模求解时用于采集变量数、子句数、耗时
pub fn init_json() {
    fmt()
        .json()
        .with_env_filter(env_filter_or(SOLVER_DIAGNOSTICS_FILTER))
        .with_target(true)
        .init();
}

/// 测试用；重复调用无副作用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("timetable_aps=debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_parse() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        assert!(EnvFilter::try_new(SOLVER_DIAGNOSTICS_FILTER).is_ok());
    }
}
