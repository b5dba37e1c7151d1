// ==========================================
// 车队预测性维护系统 - 告警领域模型
// ==========================================
// 去重键: (vehicle_id, component) 同时至多一条未读告警
// 已读告警不再改写
// ==========================================

use crate::domain::types::AlertType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub vehicle_id: i64,
    pub component: String,                 // 去重键的部件部分
    pub diagnostic_id: Option<i64>,        // 指向最新诊断
    pub alert_type: AlertType,
    pub message: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub read: bool,
}

/// 待新建的告警
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    pub vehicle_id: i64,
    pub component: String,
    pub diagnostic_id: Option<i64>,
    pub alert_type: AlertType,
    pub message: String,
    pub created_at: NaiveDateTime,
}

/// 告警查询过滤条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertFilter {
    #[serde(default)]
    pub read: Option<bool>,
}

/// 分发结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlertDecision {
    /// 无未读告警：新建
    Create(NewAlert),
    /// 已有未读告警：就地更新
    Update {
        alert_id: i64,
        alert_type: AlertType,
        message: String,
        diagnostic_id: Option<i64>,
        updated_at: NaiveDateTime,
    },
}

impl AlertDecision {
    /// 挂接刚入库的诊断 id（诊断与告警同一事务写入时使用）
    pub fn link_diagnostic(&mut self, id: i64) {
        match self {
            AlertDecision::Create(alert) => alert.diagnostic_id = Some(id),
            AlertDecision::Update { diagnostic_id, .. } => *diagnostic_id = Some(id),
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, AlertDecision::Update { .. })
    }
}
