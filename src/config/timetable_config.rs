// ==========================================
// 周课表排课系统 - 排课参数
// ==========================================
// 职责: 决策模型的 天 / 节次 轴边界，节次与课间休息的起止时间
// 默认: 每周 6 天，每天 8 节，09:00 开始，每节 45 分钟，无课间休息
// 课间休息只影响钟点，不占用节次编号，求解器看不到
// ==========================================

use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;

/// 默认每周上课天数
pub const DEFAULT_DAYS_PER_WEEK: u32 = 6;
/// 默认每天节次数
pub const DEFAULT_PERIODS_PER_DAY: u32 = 8;
/// 默认每节时长（分钟）
pub const DEFAULT_PERIOD_MINUTES: u32 = 45;
/// 默认首节开始时间
pub const DEFAULT_DAY_START: &str = "09:00";

/// 时间格式 (HH:MM)
pub const TIME_FORMAT: &str = "%H:%M";

/// 不短于该时长、且位于第 4 节之后的休息显示为午休
pub const LUNCH_BREAK_MIN_MINUTES: u32 = 30;
pub const LUNCH_AFTER_PERIOD: u32 = 4;

// ==========================================
// DaySlot - 一天中的时间段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySlot {
    Period {
        period: u32,
        start: NaiveTime,
        end: NaiveTime,
    },
    Break {
        after_period: u32,
        start: NaiveTime,
        end: NaiveTime,
    },
}

impl DaySlot {
    pub fn start(&self) -> NaiveTime {
        match self {
            DaySlot::Period { start, .. } | DaySlot::Break { start, .. } => *start,
        }
    }

    pub fn end(&self) -> NaiveTime {
        match self {
            DaySlot::Period { end, .. } | DaySlot::Break { end, .. } => *end,
        }
    }

    /// 显示名: "Period N" / "Lunch Break" / "Break after N"
    pub fn label(&self) -> String {
        match self {
            DaySlot::Period { period, .. } => format!("Period {}", period),
            DaySlot::Break {
                after_period,
                start,
                end,
            } => {
                let minutes = (*end - *start).num_minutes();
                if *after_period == LUNCH_AFTER_PERIOD && minutes >= LUNCH_BREAK_MIN_MINUTES as i64 {
                    "Lunch Break".to_string()
                } else {
                    format!("Break after {}", after_period)
                }
            }
        }
    }
}

// ==========================================
// TimetableConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableConfig {
    pub days_per_week: u32,
    pub periods_per_day: u32,
    pub day_start: NaiveTime,
    pub period_minutes: u32,
    /// 第 N 节之后的休息分钟数
    #[serde(default)]
    pub breaks: BTreeMap<u32, u32>,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            days_per_week: DEFAULT_DAYS_PER_WEEK,
            periods_per_day: DEFAULT_PERIODS_PER_DAY,
            day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            period_minutes: DEFAULT_PERIOD_MINUTES,
            breaks: BTreeMap::new(),
        }
    }
}

impl TimetableConfig {
    /// 以 天数 × 节次数 构造，其余取默认
    pub fn with_grid(days_per_week: u32, periods_per_day: u32) -> Self {
        Self {
            days_per_week,
            periods_per_day,
            ..Self::default()
        }
    }

    /// 每周可用时段数 (days × periods)
    pub fn slots_per_week(&self) -> usize {
        self.days_per_week as usize * self.periods_per_day as usize
    }

    /// 在第 `after_period` 节之后插入 `minutes` 分钟休息
    pub fn with_break(mut self, after_period: u32, minutes: u32) -> Self {
        self.breaks.insert(after_period, minutes);
        self
    }

    /// 参数校验
    ///
    /// # 返回
    /// - Err: 天数/节次/时长为 0，休息位置越界或时长为 0，或最后一节跨过午夜
    pub fn validate(&self) -> Result<(), String> {
        if self.days_per_week == 0 {
            return Err("days_per_week 必须大于 0".to_string());
        }
        if self.periods_per_day == 0 {
            return Err("periods_per_day 必须大于 0".to_string());
        }
        if self.period_minutes == 0 {
            return Err("period_minutes 必须大于 0".to_string());
        }

        for (&after_period, &minutes) in &self.breaks {
            if after_period == 0 || after_period >= self.periods_per_day {
                return Err(format!(
                    "课间休息位置无效: 第 {} 节之后（须在第 1..{} 节之后）",
                    after_period,
                    self.periods_per_day.saturating_sub(1)
                ));
            }
            if minutes == 0 {
                return Err(format!("课间休息时长必须大于 0 (第 {} 节之后)", after_period));
            }
        }

        let start_minutes = self.day_start.num_seconds_from_midnight() / 60;
        let break_minutes: u64 = self.breaks.values().map(|&m| m as u64).sum();
        let end_minutes = start_minutes as u64
            + self.periods_per_day as u64 * self.period_minutes as u64
            + break_minutes;
        if end_minutes > 24 * 60 {
            return Err(format!(
                "节次跨过午夜: 开始={}, {} 节 × {} 分钟, 休息 {} 分钟",
                self.day_start.format(TIME_FORMAT),
                self.periods_per_day,
                self.period_minutes,
                break_minutes
            ));
        }

        Ok(())
    }

    /// 一天的时间段序列（节次与休息按时间先后）
    pub fn day_slots(&self) -> Vec<DaySlot> {
        let step = Duration::minutes(self.period_minutes as i64);
        let mut slots = Vec::with_capacity(self.periods_per_day as usize + self.breaks.len());
        let mut start = self.day_start;

        for period in 1..=self.periods_per_day {
            let end = start + step;
            slots.push(DaySlot::Period { period, start, end });
            start = end;

            if let Some(&minutes) = self.breaks.get(&period) {
                let end = start + Duration::minutes(minutes as i64);
                slots.push(DaySlot::Break {
                    after_period: period,
                    start,
                    end,
                });
                start = end;
            }
        }

        slots
    }

    /// 节次起止时间表
    ///
    /// # 返回
    /// - period (1 起) → (开始, 结束)；无休息时各节首尾相接，休息之后的节次顺延
    pub fn period_times(&self) -> BTreeMap<u32, (NaiveTime, NaiveTime)> {
        self.day_slots()
            .into_iter()
            .filter_map(|slot| match slot {
                DaySlot::Period { period, start, end } => Some((period, (start, end))),
                DaySlot::Break { .. } => None,
            })
            .collect()
    }
}

// ==========================================
// TimetableConfigReader Trait
// ==========================================
// 用途: 编排器读取排课参数的接口
// 实现者: ConfigManager（config_kv 表）/ TimetableConfig（静态参数）
pub trait TimetableConfigReader: Send + Sync {
    /// 读取并校验排课参数
    fn load_timetable_config(&self) -> Result<TimetableConfig, Box<dyn Error>>;
}

impl TimetableConfigReader for TimetableConfig {
    fn load_timetable_config(&self) -> Result<TimetableConfig, Box<dyn Error>> {
        self.validate()?;
        Ok(self.clone())
    }
}
