// ==========================================
// 车队预测性维护系统 - 报表 API
// ==========================================
// 职责: 驾驶舱统计与成本报表（只读）
// 说明: 停用车辆不计入统计
// ==========================================

use chrono::NaiveDate;

use crate::api::error::ApiResult;
use crate::domain::report::{CostReport, DashboardStats};
use crate::domain::types::AlertType;
use crate::engine::FleetRepositories;

/// 成本报表中列出的车辆数
const TOP_VEHICLE_LIMIT: usize = 5;

pub struct ReportApi {
    repos: FleetRepositories,
}

impl ReportApi {
    pub fn new(repos: FleetRepositories) -> Self {
        Self { repos }
    }

    /// 驾驶舱统计
    ///
    /// # 参数
    /// - `today`: 统计 "今日维修" 所用日期
    pub fn dashboard_stats(&self, today: NaiveDate) -> ApiResult<DashboardStats> {
        let breakdown = self.repos.report_repo.status_breakdown()?;
        let total = breakdown.total();
        let availability_pct = if total > 0 {
            let available = (breakdown.ok + breakdown.atencao) as f64;
            (available / total as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };

        Ok(DashboardStats {
            active_vehicles: total,
            status_ok: breakdown.ok,
            status_atencao: breakdown.atencao,
            status_critico: breakdown.critico,
            unread_alerts: self.repos.alert_repo.count_unread(None)?,
            unread_critical_alerts: self
                .repos
                .alert_repo
                .count_unread(Some(AlertType::Critico))?,
            maintenance_today: self.repos.report_repo.count_pending_on(today)?,
            availability_pct,
        })
    }

    /// 成本报表
    pub fn cost_report(&self) -> ApiResult<CostReport> {
        let by_type = self.repos.report_repo.cost_by_type()?;
        let total_cost = (by_type.iter().map(|t| t.total).sum::<f64>() * 100.0).round() / 100.0;

        Ok(CostReport {
            total_cost,
            by_type,
            top_vehicles: self
                .repos
                .report_repo
                .top_vehicles_by_cost(TOP_VEHICLE_LIMIT)?,
            estimated_savings: self.repos.report_repo.total_estimated_savings()?,
        })
    }
}
