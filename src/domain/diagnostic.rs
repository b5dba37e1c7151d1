// ==========================================
// 车队预测性维护系统 - 诊断领域模型
// ==========================================
// 红线: 诊断一经计算不可修改; 重新诊断产生新记录
// ==========================================

use crate::domain::types::{Severity, VehicleSystem};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// DiagnosticDraft - 引擎输出 (尚未持久化)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticDraft {
    pub vehicle_id: i64,
    pub system: VehicleSystem,
    pub health_component: String,          // 健康度查询所用部件名
    pub component: String,                 // 诊断目标部件
    pub failure_probability: f64,          // 失效概率 [0,1]
    pub severity: Severity,                // 与概率区间一致
    pub horizon_days: u32,                 // 预计失效天数 (>=1)
    pub correlated_symptoms: Vec<String>,
    pub recommended_parts: Vec<String>,
    pub estimated_savings: f64,            // 预计节省金额 (BRL)
    pub recommendation: String,
    pub model_version: String,
    pub justification: String,             // 历史依据
}

// ==========================================
// Diagnostic - 已持久化诊断
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub id: i64,
    pub occurrence_id: i64,
    pub vehicle_id: i64,
    pub system: VehicleSystem,
    pub health_component: String,
    pub component: String,
    pub failure_probability: f64,
    pub severity: Severity,
    pub horizon_days: u32,
    pub correlated_symptoms: Vec<String>,
    pub recommended_parts: Vec<String>,
    pub estimated_savings: f64,
    pub recommendation: String,
    pub model_version: String,
    pub justification: String,
    pub created_at: NaiveDateTime,
}

impl Diagnostic {
    /// 由草稿与持久化元数据组装
    pub fn from_draft(
        draft: DiagnosticDraft,
        id: i64,
        occurrence_id: i64,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            occurrence_id,
            vehicle_id: draft.vehicle_id,
            system: draft.system,
            health_component: draft.health_component,
            component: draft.component,
            failure_probability: draft.failure_probability,
            severity: draft.severity,
            horizon_days: draft.horizon_days,
            correlated_symptoms: draft.correlated_symptoms,
            recommended_parts: draft.recommended_parts,
            estimated_savings: draft.estimated_savings,
            recommendation: draft.recommendation,
            model_version: draft.model_version,
            justification: draft.justification,
            created_at,
        }
    }
}
