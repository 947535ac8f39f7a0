// ==========================================
// 周课表排课系统 - SAT 求解后端
// ==========================================
// 职责: 屏蔽具体 SAT 求解器，编码器只面向 SatBackend
// 默认实现: rustsat + batsat (纯 Rust CDCL)
// 说明: 求解预算取后端默认值，本层不另行配置
// ==========================================

use crate::engine::error::{ScheduleError, ScheduleResult};
use rustsat::solvers::{Solve, SolverResult};
use rustsat::types::{Assignment, Clause, Lit, TernaryVal, Var};
use rustsat_batsat::BasicSolver;
use std::fmt;

// ==========================================
// SolveStatus - 求解状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Feasible,   // 找到满足全部硬约束的解
    Infeasible, // 证明无解
    Unknown,    // 被中断 / 预算耗尽
}

impl SolveStatus {
    /// 状态名
    pub fn name(&self) -> &'static str {
        match self {
            SolveStatus::Feasible => "FEASIBLE",
            SolveStatus::Infeasible => "INFEASIBLE",
            SolveStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ==========================================
// SatBackend Trait
// ==========================================
pub trait SatBackend {
    /// 后端名称（日志用）
    fn name(&self) -> &'static str;

    /// 添加一条子句（析取）
    fn add_clause(&mut self, lits: &[Lit]) -> ScheduleResult<()>;

    /// 求解一次
    fn solve(&mut self) -> ScheduleResult<SolveStatus>;

    /// 读取变量取值；仅在 Feasible 之后有意义，其余情况返回 false
    fn value(&self, var: Var) -> bool;

    /// 已添加的子句数
    fn num_clauses(&self) -> usize;
}

// ==========================================
// BatsatBackend - 默认后端
// ==========================================
pub struct BatsatBackend {
    solver: BasicSolver,
    max_var: Option<Var>,
    num_clauses: usize,
    assignment: Option<Assignment>,
}

impl Default for BatsatBackend {
    fn default() -> Self {
        Self {
            solver: BasicSolver::default(),
            max_var: None,
            num_clauses: 0,
            assignment: None,
        }
    }
}

impl BatsatBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SatBackend for BatsatBackend {
    fn name(&self) -> &'static str {
        "batsat"
    }

    fn add_clause(&mut self, lits: &[Lit]) -> ScheduleResult<()> {
        for lit in lits {
            let var = lit.var();
            if self.max_var.map_or(true, |m| var > m) {
                self.max_var = Some(var);
            }
        }

        self.solver
            .add_clause(Clause::from(lits))
            .map_err(|e| ScheduleError::Backend(e.to_string()))?;
        self.num_clauses += 1;
        Ok(())
    }

    fn solve(&mut self) -> ScheduleResult<SolveStatus> {
        self.assignment = None;

        let result = self
            .solver
            .solve()
            .map_err(|e| ScheduleError::Backend(e.to_string()))?;

        let status = match result {
            SolverResult::Sat => SolveStatus::Feasible,
            SolverResult::Unsat => SolveStatus::Infeasible,
            _ => SolveStatus::Unknown,
        };

        if status.is_success() {
            if let Some(max_var) = self.max_var {
                let assignment = self
                    .solver
                    .solution(max_var)
                    .map_err(|e| ScheduleError::Backend(e.to_string()))?;
                self.assignment = Some(assignment);
            }
        }

        Ok(status)
    }

    fn value(&self, var: Var) -> bool {
        match (&self.assignment, self.max_var) {
            (Some(assignment), Some(max_var)) if var <= max_var => {
                matches!(assignment.var_value(var), TernaryVal::True)
            }
            _ => false,
        }
    }

    fn num_clauses(&self) -> usize {
        self.num_clauses
    }
}
