// ==========================================
// 周课表排课系统 - 求解驱动
// ==========================================
// 每次调用只求解一次，无热启动、无增量求解
// 非 FEASIBLE 状态一律视为失败，并带上状态名
// ==========================================

use crate::engine::error::{ScheduleError, ScheduleResult};
use crate::engine::sat_backend::{SatBackend, SolveStatus};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct SolveDriver;

impl SolveDriver {
    pub fn new() -> Self {
        Self
    }

    /// 调用后端求解
    ///
    /// # 返回
    /// - `Ok(Feasible)`: 可进入落库
    /// - `Err(Infeasible { status })`: 无解 / 未知
    pub fn run<B: SatBackend>(&self, backend: &mut B) -> ScheduleResult<SolveStatus> {
        let start = Instant::now();
        let status = backend.solve()?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        if status.is_success() {
            info!(backend = backend.name(), status = %status, elapsed_ms, "求解完成");
            Ok(status)
        } else {
            warn!(backend = backend.name(), status = %status, elapsed_ms, "求解未找到可行解");
            Err(ScheduleError::Infeasible {
                status: status.name().to_string(),
            })
        }
    }
}
