// ==========================================
// 车队预测性维护系统 - 告警与诊断查询 API
// ==========================================
// 职责: 告警列表、已读标记、诊断详情
// 红线: 已读为告警唯一的可变字段
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::alert::{Alert, AlertFilter};
use crate::domain::diagnostic::Diagnostic;
use crate::engine::{Clock, FleetEvent, FleetEventKind, FleetRepositories, OptionalEventPublisher};

pub struct AlertApi {
    repos: FleetRepositories,
    clock: Arc<dyn Clock>,
    events: OptionalEventPublisher,
}

impl AlertApi {
    pub fn new(repos: FleetRepositories, clock: Arc<dyn Clock>, events: OptionalEventPublisher) -> Self {
        Self {
            repos,
            clock,
            events,
        }
    }

    /// 告警列表（最近活动在前）
    pub fn list_alerts(&self, filter: AlertFilter) -> ApiResult<Vec<Alert>> {
        Ok(self.repos.alert_repo.list(filter)?)
    }

    /// 标记已读
    ///
    /// # 返回
    /// - Err(NotFound): 告警不存在
    pub fn mark_alert_read(&self, alert_id: i64) -> ApiResult<Alert> {
        self.repos.alert_repo.mark_read(alert_id)?;
        let alert = self
            .repos
            .alert_repo
            .find_by_id(alert_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Alert(id={})不存在", alert_id)))?;

        info!(alert_id, vehicle_id = alert.vehicle_id, "告警已读");
        self.events.publish(FleetEvent::new(
            FleetEventKind::AlertRead,
            Some(alert.vehicle_id),
            Some(alert_id),
            self.clock.now(),
        ));
        Ok(alert)
    }

    /// 诊断详情
    ///
    /// # 返回
    /// - Err(NotFound): 诊断不存在
    pub fn get_diagnostic(&self, diagnostic_id: i64) -> ApiResult<Diagnostic> {
        self.repos
            .diagnostic_repo
            .find_by_id(diagnostic_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Diagnostic(id={})不存在", diagnostic_id)))
    }

    /// 某事件的全部诊断（重新诊断产生新记录）
    pub fn list_diagnostics_for_occurrence(&self, occurrence_id: i64) -> ApiResult<Vec<Diagnostic>> {
        Ok(self.repos.diagnostic_repo.list_by_occurrence(occurrence_id)?)
    }
}
