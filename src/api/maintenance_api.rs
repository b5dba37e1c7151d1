// ==========================================
// 车队预测性维护系统 - 维修排期 API
// ==========================================
// 职责: 排期、完工、逾期刷新、优先级队列与周视图
// 状态机: agendada → concluida | agendada → atrasada → concluida
// ==========================================

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::vehicle_lock::{acquire, VehicleWriteLocks};
use crate::domain::maintenance::{MaintenanceCompletion, MaintenanceItem, NewMaintenanceItem};
use crate::domain::types::{MaintenanceStatus, MaintenanceType};
use crate::engine::{
    Clock, FleetEvent, FleetEventKind, FleetRepositories, FleetSnapshotSource,
    MaintenancePrioritizer, OptionalEventPublisher,
};

pub struct MaintenanceApi {
    repos: FleetRepositories,
    prioritizer: Arc<MaintenancePrioritizer>,
    clock: Arc<dyn Clock>,
    events: OptionalEventPublisher,
    locks: Arc<VehicleWriteLocks>,
}

impl MaintenanceApi {
    pub fn new(
        repos: FleetRepositories,
        prioritizer: Arc<MaintenancePrioritizer>,
        clock: Arc<dyn Clock>,
        events: OptionalEventPublisher,
        locks: Arc<VehicleWriteLocks>,
    ) -> Self {
        Self {
            repos,
            prioritizer,
            clock,
            events,
            locks,
        }
    }

    // ==========================================
    // 排期
    // ==========================================

    /// 新建维修排期
    ///
    /// 关联诊断时沿用诊断的失效概率
    ///
    /// # 返回
    /// - Err(IncompleteSchedule): 缺少排期日期
    /// - Err(NotFound): 车辆或诊断不存在
    /// - Err(InvalidInput): 诊断不属于该车辆
    pub fn schedule_maintenance(&self, mut item: NewMaintenanceItem) -> ApiResult<MaintenanceItem> {
        self.require_active_vehicle(item.vehicle_id)?;

        if let Some(diagnostic_id) = item.diagnostic_id {
            let diagnostic = self
                .repos
                .diagnostic_repo
                .find_by_id(diagnostic_id)?
                .ok_or_else(|| {
                    ApiError::NotFound(format!("Diagnostic(id={})不存在", diagnostic_id))
                })?;
            if diagnostic.vehicle_id != item.vehicle_id {
                return Err(ApiError::InvalidInput(format!(
                    "诊断 {} 属于车辆 {}，不能排到车辆 {}",
                    diagnostic_id, diagnostic.vehicle_id, item.vehicle_id
                )));
            }
            item.failure_probability = Some(diagnostic.failure_probability);
        }

        let scheduled_date = self
            .prioritizer
            .validate_schedule(&item)
            .inspect_err(|e| warn!(vehicle_id = item.vehicle_id, error = %e, "排期被拒绝"))?;
        let id = self.repos.maintenance_repo.insert(&item, scheduled_date)?;

        info!(
            maintenance_id = id,
            vehicle_id = item.vehicle_id,
            item_type = %item.item_type,
            scheduled_date = %scheduled_date,
            "维修已排期"
        );
        self.events.publish(FleetEvent::new(
            FleetEventKind::MaintenanceScheduled,
            Some(item.vehicle_id),
            Some(id),
            self.clock.now(),
        ));

        self.find_item(id)
    }

    /// 完工登记
    ///
    /// 纠正性维修完工时，关联部件（无关联时整车）的未读告警置为已读
    ///
    /// # 返回
    /// - Err(NotFound): 维修项不存在
    /// - Err(InvalidInput): 已完工，或里程/费用无效
    pub fn complete_maintenance(
        &self,
        item_id: i64,
        completion: MaintenanceCompletion,
    ) -> ApiResult<MaintenanceItem> {
        let item = self.find_item(item_id)?;
        if item.status == MaintenanceStatus::Concluida {
            return Err(ApiError::InvalidInput(format!(
                "维修项 {} 已完工，不能重复登记",
                item_id
            )));
        }
        if let Some(km) = completion.completed_km {
            if !km.is_finite() || km < 0.0 {
                return Err(ApiError::InvalidInput(format!("完工里程无效: {}", km)));
            }
        }
        if let Some(cost) = completion.cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(ApiError::InvalidInput(format!("维修费用无效: {}", cost)));
            }
        }

        let clear_component = if item.item_type == MaintenanceType::Corretiva {
            let component = match item.diagnostic_id {
                Some(diagnostic_id) => self
                    .repos
                    .diagnostic_repo
                    .find_by_id(diagnostic_id)?
                    .map(|d| d.health_component),
                None => None,
            };
            Some(component)
        } else {
            None
        };

        let handle = self.locks.handle(item.vehicle_id)?;
        let _guard = acquire(&handle)?;

        let cleared = self.repos.tx_repo.commit_completion(
            item_id,
            &completion,
            clear_component
                .as_ref()
                .map(|component| (item.vehicle_id, component.as_deref())),
        )?;

        info!(
            maintenance_id = item_id,
            vehicle_id = item.vehicle_id,
            cleared_alerts = cleared,
            "维修已完工"
        );
        self.events.publish(FleetEvent::new(
            FleetEventKind::MaintenanceCompleted,
            Some(item.vehicle_id),
            Some(item_id),
            self.clock.now(),
        ));

        self.find_item(item_id)
    }

    // ==========================================
    // 逾期刷新
    // ==========================================

    /// 过期未完工的 agendada → atrasada
    ///
    /// # 返回
    /// 本次转为逾期的维修项 id
    #[instrument(skip(self))]
    pub fn refresh_overdue(&self, today: NaiveDate) -> ApiResult<Vec<i64>> {
        let pending = self.repos.maintenance_repo.list_pending()?;
        let ids = self.prioritizer.overdue_transitions(&pending, today);
        if ids.is_empty() {
            return Ok(ids);
        }

        let changed = self.repos.maintenance_repo.mark_overdue(&ids)?;
        info!(count = changed, "维修项转为逾期");

        let now = self.clock.now();
        for item in pending.iter().filter(|item| ids.contains(&item.id)) {
            self.events.publish(FleetEvent::new(
                FleetEventKind::MaintenanceOverdue,
                Some(item.vehicle_id),
                Some(item.id),
                now,
            ));
        }
        Ok(ids)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 优先级队列（先刷新逾期）
    pub fn get_priority_queue(&self) -> ApiResult<Vec<MaintenanceItem>> {
        let today = self.clock.today();
        self.refresh_overdue(today)?;
        let pending = self.repos.maintenance_repo.list_pending()?;
        Ok(self.prioritizer.rank(pending, today))
    }

    /// 周视图（周一至周日，始终 7 天）
    pub fn get_weekly_calendar(
        &self,
        week_start: NaiveDate,
    ) -> ApiResult<BTreeMap<NaiveDate, Vec<MaintenanceItem>>> {
        self.refresh_overdue(self.clock.today())?;
        let pending = self.repos.maintenance_repo.list_pending()?;
        Ok(self.prioritizer.weekly_view(&pending, week_start))
    }

    /// 待处理维修（按排期日期）
    pub fn list_scheduled(&self) -> ApiResult<Vec<MaintenanceItem>> {
        self.refresh_overdue(self.clock.today())?;
        Ok(self.repos.maintenance_repo.list_pending()?)
    }

    pub fn get_maintenance_item(&self, item_id: i64) -> ApiResult<MaintenanceItem> {
        self.find_item(item_id)
    }

    fn find_item(&self, item_id: i64) -> ApiResult<MaintenanceItem> {
        self.repos
            .maintenance_repo
            .find_by_id(item_id)?
            .ok_or_else(|| ApiError::NotFound(format!("MaintenanceItem(id={})不存在", item_id)))
    }

    fn require_active_vehicle(&self, vehicle_id: i64) -> ApiResult<()> {
        match self.repos.get_vehicle(vehicle_id)? {
            Some(vehicle) if vehicle.active => Ok(()),
            _ => Err(ApiError::NotFound(format!(
                "Vehicle(id={})不存在或已停用",
                vehicle_id
            ))),
        }
    }
}
