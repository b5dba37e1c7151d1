// ==========================================
// 车队预测性维护系统 - 时钟注入
// ==========================================
// 红线: 引擎不读取系统时间，"今天" 由调用方注入
// ==========================================

use chrono::{Local, NaiveDate, NaiveDateTime};

/// 时钟提供者
pub trait Clock: Send + Sync {
    /// 当前日期（逾期判定用）
    fn today(&self) -> NaiveDate;

    /// 当前时间（记录创建时间用）
    fn now(&self) -> NaiveDateTime;
}

/// 系统本地时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// 固定时钟（测试/回放用）
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// 指定日期的 08:00
    pub fn at_date(date: NaiveDate) -> Self {
        let now = date
            .and_hms_opt(8, 0, 0)
            .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN));
        Self { now }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.now.date()
    }

    fn now(&self) -> NaiveDateTime {
        self.now
    }
}
