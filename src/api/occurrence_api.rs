// ==========================================
// 车队预测性维护系统 - 事件上报 API
// ==========================================
// 职责: 事件上报 → 诊断 → 告警 → (可选) 预测性排期
// 红线: 校验失败不写入任何记录
// 红线: 同一车辆的上报串行执行，单次上报至多产生一对诊断/告警
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::vehicle_lock::{acquire, VehicleWriteLocks};
use crate::config::fleet_profile::SchedulingProfile;
use crate::domain::diagnostic::Diagnostic;
use crate::domain::occurrence::{Occurrence, OccurrenceSubmission};
use crate::domain::vehicle::Vehicle;
use crate::engine::{
    AlertDispatcher, Clock, DiagnosticEngine, FleetEvent, FleetEventKind, FleetRepositories,
    FleetSnapshotSource, MaintenancePrioritizer, OptionalEventPublisher,
};
use crate::repository::ScheduledFollowUp;

/// 上报结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOccurrenceResponse {
    pub occurrence_id: i64,
    pub diagnostic: Diagnostic,
    pub alert_id: i64,
    /// false 表示更新了已有的未读告警
    pub alert_created: bool,
    pub maintenance_id: Option<i64>,
}

// ==========================================
// OccurrenceApi
// ==========================================
pub struct OccurrenceApi {
    repos: FleetRepositories,
    diagnostic_engine: Arc<DiagnosticEngine>,
    prioritizer: Arc<MaintenancePrioritizer>,
    dispatcher: AlertDispatcher,
    scheduling: SchedulingProfile,
    clock: Arc<dyn Clock>,
    events: OptionalEventPublisher,
    locks: Arc<VehicleWriteLocks>,
}

impl OccurrenceApi {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repos: FleetRepositories,
        diagnostic_engine: Arc<DiagnosticEngine>,
        prioritizer: Arc<MaintenancePrioritizer>,
        scheduling: SchedulingProfile,
        clock: Arc<dyn Clock>,
        events: OptionalEventPublisher,
        locks: Arc<VehicleWriteLocks>,
    ) -> Self {
        Self {
            repos,
            diagnostic_engine,
            prioritizer,
            dispatcher: AlertDispatcher::new(),
            scheduling,
            clock,
            events,
            locks,
        }
    }

    /// 上报事件并生成诊断
    ///
    /// # 返回
    /// - Err(InvalidInput): 描述/症状/里程无效
    /// - Err(UnmappedSystem): 系统不在目录中
    /// - Err(NotFound): 车辆不存在或已停用
    #[instrument(skip(self, submission), fields(
        vehicle_id = submission.vehicle_id,
        system = %submission.system
    ))]
    pub fn submit_occurrence(
        &self,
        submission: OccurrenceSubmission,
    ) -> ApiResult<SubmitOccurrenceResponse> {
        self.submit_inner(&submission).inspect_err(|e| {
            warn!(kind = e.kind(), error = %e, "事件上报被拒绝");
        })
    }

    fn submit_inner(&self, submission: &OccurrenceSubmission) -> ApiResult<SubmitOccurrenceResponse> {
        let today = self.clock.today();
        let now = self.clock.now();

        // 1. 纯校验（不触库）
        let occurrence = self
            .diagnostic_engine
            .validate_submission(submission, today)?;

        // 2. 单车串行
        let handle = self.locks.handle(occurrence.vehicle_id)?;
        let _guard = acquire(&handle)?;

        let vehicle = self.active_vehicle(occurrence.vehicle_id)?;

        // 3. 取快照
        let system_profile = self
            .diagnostic_engine
            .catalog()
            .profile(occurrence.system)?;
        let current_health = self
            .repos
            .get_components(vehicle.id)?
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(system_profile.health_component))
            .map(|c| c.health_pct);
        let history = self
            .repos
            .get_occurrence_history(vehicle.id, occurrence.system)?;

        // 4. 诊断
        let draft = self.diagnostic_engine.diagnose(
            &occurrence.as_occurrence(0),
            current_health,
            &history,
        )?;

        // 5. 告警去重
        let open_alert = self
            .repos
            .alert_repo
            .find_open(vehicle.id, &draft.health_component)?;
        let signal = self.dispatcher.signal_from_diagnostic(&draft, &vehicle, None);
        let decision = self.dispatcher.dispatch(signal, open_alert.as_ref(), now);

        // 6. 诊断触发排期
        let follow_up = match self.diagnostic_engine.propose_maintenance(
            &draft,
            today,
            self.scheduling.auto_schedule_probability,
        ) {
            Some(item) => {
                let scheduled_date = self.prioritizer.validate_schedule(&item)?;
                Some(ScheduledFollowUp {
                    item,
                    scheduled_date,
                })
            }
            None => None,
        };

        // 7. 原子提交
        let receipt = self
            .repos
            .tx_repo
            .commit_occurrence(&occurrence, &draft, decision, follow_up, now)?;

        info!(
            occurrence_id = receipt.occurrence_id,
            diagnostic_id = receipt.diagnostic.id,
            probability = receipt.diagnostic.failure_probability,
            severity = %receipt.diagnostic.severity,
            alert_id = receipt.alert.alert_id,
            alert_created = receipt.alert.created,
            maintenance_id = ?receipt.maintenance_id,
            "事件上报完成"
        );

        // 8. 事件
        self.events.publish(FleetEvent::new(
            FleetEventKind::OccurrenceDiagnosed,
            Some(vehicle.id),
            Some(receipt.occurrence_id),
            now,
        ));
        let alert_kind = if receipt.alert.created {
            FleetEventKind::AlertCreated
        } else {
            FleetEventKind::AlertUpdated
        };
        self.events.publish(FleetEvent::new(
            alert_kind,
            Some(vehicle.id),
            Some(receipt.alert.alert_id),
            now,
        ));
        if let Some(maintenance_id) = receipt.maintenance_id {
            self.events.publish(FleetEvent::new(
                FleetEventKind::MaintenanceScheduled,
                Some(vehicle.id),
                Some(maintenance_id),
                now,
            ));
        }

        Ok(SubmitOccurrenceResponse {
            occurrence_id: receipt.occurrence_id,
            diagnostic: receipt.diagnostic,
            alert_id: receipt.alert.alert_id,
            alert_created: receipt.alert.created,
            maintenance_id: receipt.maintenance_id,
        })
    }

    /// 事件台账（最新在前）
    pub fn list_occurrences(&self) -> ApiResult<Vec<Occurrence>> {
        Ok(self.repos.occurrence_repo.list_all()?)
    }

    pub fn get_occurrence(&self, id: i64) -> ApiResult<Occurrence> {
        self.repos
            .occurrence_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Occurrence(id={})不存在", id)))
    }

    fn active_vehicle(&self, vehicle_id: i64) -> ApiResult<Vehicle> {
        match self.repos.get_vehicle(vehicle_id)? {
            Some(vehicle) if vehicle.active => Ok(vehicle),
            Some(_) => Err(ApiError::NotFound(format!(
                "Vehicle(id={})已停用",
                vehicle_id
            ))),
            None => Err(ApiError::NotFound(format!("Vehicle(id={})不存在", vehicle_id))),
        }
    }
}
