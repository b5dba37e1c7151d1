// ==========================================
// 车队预测性维护系统 - 事件 (Occurrence) 领域模型
// ==========================================
// 红线: 事件内容一经写入不可修改（只追加台账）
// ==========================================

use crate::domain::types::{OccurrenceStatus, Severity, VehicleSystem};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Occurrence - 已入账事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: i64,
    pub vehicle_id: i64,
    pub system: VehicleSystem,       // 受影响系统
    pub symptoms: Vec<String>,       // 症状 (规范拼写)
    pub description: String,         // 描述
    pub severity: Severity,          // 上报严重度
    pub odometer_km: f64,            // 发生时里程
    pub occurred_on: NaiveDate,      // 发生日期
    pub status: OccurrenceStatus,    // 处理状态
}

impl Occurrence {
    /// 是否与给定症状集合至少共享一个症状（大小写不敏感）
    pub fn shares_symptom_with(&self, symptoms: &[String]) -> bool {
        self.symptoms.iter().any(|own| {
            let own = own.trim().to_lowercase();
            symptoms.iter().any(|other| other.trim().to_lowercase() == own)
        })
    }
}

// ==========================================
// OccurrenceSubmission - 上报请求 (未校验)
// ==========================================
// system 保持原始字符串: 未知系统需返回 UnmappedSystem 而非反序列化失败
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccurrenceSubmission {
    pub vehicle_id: i64,
    pub system: String,
    pub symptoms: Vec<String>,
    pub description: String,
    pub severity: Severity,
    pub odometer_km: f64,
}

/// 校验通过、待入账的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOccurrence {
    pub vehicle_id: i64,
    pub system: VehicleSystem,
    pub symptoms: Vec<String>,
    pub description: String,
    pub severity: Severity,
    pub odometer_km: f64,
    pub occurred_on: NaiveDate,
}

impl NewOccurrence {
    /// 入账后的视图（用于诊断计算，id 尚未分配时为 0）
    pub fn as_occurrence(&self, id: i64) -> Occurrence {
        Occurrence {
            id,
            vehicle_id: self.vehicle_id,
            system: self.system,
            symptoms: self.symptoms.clone(),
            description: self.description.clone(),
            severity: self.severity,
            odometer_km: self.odometer_km,
            occurred_on: self.occurred_on,
            status: OccurrenceStatus::EmAnalise,
        }
    }
}
