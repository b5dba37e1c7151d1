// ==========================================
// 车队预测性维护系统 - 报表视图模型
// ==========================================

use crate::domain::types::MaintenanceType;
use serde::{Deserialize, Serialize};

/// 驾驶舱统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub active_vehicles: i64,
    pub status_ok: i64,
    pub status_atencao: i64,
    pub status_critico: i64,
    pub unread_alerts: i64,
    pub unread_critical_alerts: i64,
    pub maintenance_today: i64,
    /// (ok + atencao) / 在役车辆，百分比保留一位小数
    pub availability_pct: f64,
}

/// 按维修类型汇总的完工成本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostByType {
    pub item_type: MaintenanceType,
    pub count: i64,
    pub total: f64,
    pub average: f64,
}

/// 单车完工成本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleCost {
    pub vehicle_id: i64,
    pub plate: String,
    pub model: String,
    pub total: f64,
}

/// 成本报表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    pub total_cost: f64,
    pub by_type: Vec<CostByType>,
    pub top_vehicles: Vec<VehicleCost>,
    /// 全部诊断的预计节省之和
    pub estimated_savings: f64,
}
