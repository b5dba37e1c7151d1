// ==========================================
// 车队预测性维护系统 - 告警分发引擎
// ==========================================
// 职责: 诊断 / 健康越界 → 告警记录 (新建或就地更新)
// 红线: 同一 (车辆, 部件) 同时至多一条未读告警
// 红线: 已读告警不再改写
// ==========================================

use crate::domain::alert::{Alert, NewAlert};
pub use crate::domain::alert::AlertDecision;
use crate::domain::diagnostic::DiagnosticDraft;
use crate::domain::types::{AlertType, Severity};
use crate::domain::vehicle::Vehicle;
use crate::engine::health::HealthBreach;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 消息中建议文本的最大字符数
const RECOMMENDATION_PREFIX_CHARS: usize = 80;

/// 待分发的告警信号（去重前）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSignal {
    pub vehicle_id: i64,
    /// 去重键的部件部分（健康度部件名）
    pub component: String,
    pub alert_type: AlertType,
    pub message: String,
    pub diagnostic_id: Option<i64>,
}

// ==========================================
// AlertDispatcher
// ==========================================
pub struct AlertDispatcher {
    // 无状态引擎
}

impl AlertDispatcher {
    pub fn new() -> Self {
        Self {}
    }

    /// 诊断严重度 → 告警类型
    pub fn alert_type_for(severity: Severity) -> AlertType {
        match severity {
            Severity::Alta | Severity::Critica => AlertType::Critico,
            Severity::Media => AlertType::Atencao,
            Severity::Baixa => AlertType::Info,
        }
    }

    /// 由诊断构造告警信号
    pub fn signal_from_diagnostic(
        &self,
        draft: &DiagnosticDraft,
        vehicle: &Vehicle,
        diagnostic_id: Option<i64>,
    ) -> AlertSignal {
        let alert_type = Self::alert_type_for(draft.severity);
        let percent = (draft.failure_probability * 100.0).round() as i64;
        let message = format!(
            "{}: {} no {} ({}). Probabilidade de falha {}% em {} dias. {}",
            type_label(alert_type),
            draft.component,
            vehicle.plate,
            vehicle.model,
            percent,
            draft.horizon_days,
            recommendation_prefix(&draft.recommendation)
        );

        AlertSignal {
            vehicle_id: draft.vehicle_id,
            component: draft.health_component.clone(),
            alert_type,
            message,
            diagnostic_id,
        }
    }

    /// 由健康越界构造告警信号
    pub fn signal_from_breach(&self, breach: &HealthBreach, vehicle: &Vehicle) -> AlertSignal {
        let message = format!(
            "{}: {} no {} ({}) com saúde em {}%. Agendar inspeção.",
            type_label(breach.alert_type),
            breach.component,
            vehicle.plate,
            vehicle.model,
            breach.health_pct
        );

        AlertSignal {
            vehicle_id: breach.vehicle_id,
            component: breach.component.clone(),
            alert_type: breach.alert_type,
            message,
            diagnostic_id: None,
        }
    }

    /// 去重分发
    ///
    /// # 参数
    /// - `signal`: 告警信号
    /// - `open_alert`: 同 (车辆, 部件) 当前的未读告警
    /// - `now`: 记录时间
    pub fn dispatch(
        &self,
        signal: AlertSignal,
        open_alert: Option<&Alert>,
        now: NaiveDateTime,
    ) -> AlertDecision {
        match open_alert {
            Some(open)
                if !open.read
                    && open.vehicle_id == signal.vehicle_id
                    && open.component.eq_ignore_ascii_case(&signal.component) =>
            {
                AlertDecision::Update {
                    alert_id: open.id,
                    alert_type: signal.alert_type,
                    message: signal.message,
                    diagnostic_id: signal.diagnostic_id.or(open.diagnostic_id),
                    updated_at: now,
                }
            }
            _ => AlertDecision::Create(NewAlert {
                vehicle_id: signal.vehicle_id,
                component: signal.component,
                diagnostic_id: signal.diagnostic_id,
                alert_type: signal.alert_type,
                message: signal.message,
                created_at: now,
            }),
        }
    }
}

impl Default for AlertDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn type_label(alert_type: AlertType) -> &'static str {
    match alert_type {
        AlertType::Critico => "CRÍTICO",
        AlertType::Atencao => "ATENÇÃO",
        AlertType::Info => "INFO",
    }
}

fn recommendation_prefix(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= RECOMMENDATION_PREFIX_CHARS {
        return trimmed.to_string();
    }
    let prefix: String = trimmed.chars().take(RECOMMENDATION_PREFIX_CHARS).collect();
    format!("{}...", prefix.trim_end())
}
