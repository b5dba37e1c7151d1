use crate::config::fleet_profile::PriorityProfile;
use crate::domain::maintenance::{MaintenanceItem, NewMaintenanceItem};
use crate::domain::types::{MaintenanceStatus, MaintenanceType};
use crate::engine::error::{EngineError, EngineResult};
use chrono::{Datelike, Duration, NaiveDate};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::instrument;

// ==========================================
// MaintenancePrioritizer - 维修优先级引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct MaintenancePrioritizer {
    profile: PriorityProfile,
}

impl MaintenancePrioritizer {
    pub fn new(profile: PriorityProfile) -> Self {
        Self { profile }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 排序待处理维修项
    ///
    /// 排序键:
    /// 1) 逾期优先
    /// 2) 类型层级: corretiva > preditiva(p >= 阈值) > preditiva(p < 阈值) > preventiva
    /// 3) preditiva 按失效概率降序
    /// 4) 排期日期升序
    /// 5) vehicle_id 升序
    /// 6) id 升序
    ///
    /// # 返回
    /// 排序后的维修项列表（按优先级从高到低）
    #[instrument(skip(self, items), fields(count = items.len(), today = %today))]
    pub fn rank(&self, mut items: Vec<MaintenanceItem>, today: NaiveDate) -> Vec<MaintenanceItem> {
        items.sort_by(|a, b| self.compare(a, b, today));
        items
    }

    /// 按周分桶（周一开始），周外的维修项不计入
    ///
    /// # 返回
    /// BTreeMap<日期, 当日维修项>，始终包含 7 个键
    pub fn weekly_view(
        &self,
        items: &[MaintenanceItem],
        week_start: NaiveDate,
    ) -> BTreeMap<NaiveDate, Vec<MaintenanceItem>> {
        let (monday, sunday) = week_bounds(week_start);

        let mut buckets: BTreeMap<NaiveDate, Vec<MaintenanceItem>> = (0..7)
            .map(|offset| (monday + Duration::days(offset), Vec::new()))
            .collect();

        for item in items {
            if item.scheduled_date < monday || item.scheduled_date > sunday {
                continue;
            }
            if let Some(bucket) = buckets.get_mut(&item.scheduled_date) {
                bucket.push(item.clone());
            }
        }

        // 当日内: 层级 → vehicle_id → id
        for bucket in buckets.values_mut() {
            bucket.sort_by(|a, b| {
                self.tier(a)
                    .cmp(&self.tier(b))
                    .then_with(|| a.vehicle_id.cmp(&b.vehicle_id))
                    .then_with(|| a.id.cmp(&b.id))
            });
        }

        buckets
    }

    // ==========================================
    // 状态判定
    // ==========================================

    /// 是否逾期: 已标记 atrasada，或仍为 agendada 且排期早于今天
    pub fn is_overdue(&self, item: &MaintenanceItem, today: NaiveDate) -> bool {
        match item.status {
            MaintenanceStatus::Atrasada => true,
            MaintenanceStatus::Agendada => item.scheduled_date < today,
            MaintenanceStatus::Concluida => false,
        }
    }

    /// 需要由 agendada 转为 atrasada 的维修项 id
    pub fn overdue_transitions(&self, items: &[MaintenanceItem], today: NaiveDate) -> Vec<i64> {
        items
            .iter()
            .filter(|item| item.status == MaintenanceStatus::Agendada && item.scheduled_date < today)
            .map(|item| item.id)
            .collect()
    }

    /// 类型层级（越小越紧急）
    pub fn tier(&self, item: &MaintenanceItem) -> u8 {
        match item.item_type {
            MaintenanceType::Corretiva => 0,
            MaintenanceType::Preditiva => match item.failure_probability {
                Some(p) if p >= self.profile.predictive_high_threshold => 1,
                _ => 2,
            },
            MaintenanceType::Preventiva => 3,
        }
    }

    // ==========================================
    // 入库校验
    // ==========================================

    /// 校验排期请求
    ///
    /// # 返回
    /// - Ok(NaiveDate): 排期日期
    /// - Err(IncompleteSchedule): 缺少排期日期
    /// - Err(InvalidInput): 描述为空或概率越界
    pub fn validate_schedule(&self, item: &NewMaintenanceItem) -> EngineResult<NaiveDate> {
        if item.description.trim().is_empty() {
            return Err(EngineError::InvalidInput("维修描述不能为空".to_string()));
        }
        if let Some(p) = item.failure_probability {
            if !(0.0..=1.0).contains(&p) {
                return Err(EngineError::InvalidInput(format!(
                    "失效概率超出范围 [0,1]: {}",
                    p
                )));
            }
        }
        item.scheduled_date.ok_or_else(|| {
            EngineError::IncompleteSchedule(format!(
                "车辆 {} 的 {} 维修缺少排期日期",
                item.vehicle_id, item.item_type
            ))
        })
    }

    // ==========================================
    // 比较方法
    // ==========================================

    /// 比较两个维修项的优先级
    ///
    /// # 返回
    /// Ordering::Less 表示 a 优先于 b
    fn compare(&self, a: &MaintenanceItem, b: &MaintenanceItem, today: NaiveDate) -> Ordering {
        // 1. 逾期优先
        let overdue_a = self.is_overdue(a, today);
        let overdue_b = self.is_overdue(b, today);
        match overdue_b.cmp(&overdue_a) {
            Ordering::Equal => {}
            other => return other,
        }

        // 2. 类型层级
        let tier_a = self.tier(a);
        match tier_a.cmp(&self.tier(b)) {
            Ordering::Equal => {}
            other => return other,
        }

        // 3. 预测性: 概率降序
        if a.item_type == MaintenanceType::Preditiva {
            let p_a = a.failure_probability.unwrap_or(0.0);
            let p_b = b.failure_probability.unwrap_or(0.0);
            match p_b.total_cmp(&p_a) {
                Ordering::Equal => {}
                other => return other,
            }
        }

        // 4-6. 排期日期 → 车辆 → id
        a.scheduled_date
            .cmp(&b.scheduled_date)
            .then_with(|| a.vehicle_id.cmp(&b.vehicle_id))
            .then_with(|| a.id.cmp(&b.id))
    }
}

impl Default for MaintenancePrioritizer {
    fn default() -> Self {
        Self::new(PriorityProfile::default())
    }
}

/// 包含给定日期的那一周 (周一, 周日)
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(6))
}
