// ==========================================
// 车队预测性维护系统 - 车队台账 API
// ==========================================
// 职责: 车辆/部件登记、巡检、里程、停用、详情与列表
// 红线: 车辆状态始终由部件健康度推导，不接受外部直接写入
// 红线: 里程单调不减
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::vehicle_lock::{acquire, VehicleWriteLocks};
use crate::domain::types::VehicleStatus;
use crate::domain::vehicle::{
    Component, NewComponent, NewVehicle, Vehicle, VehicleDetail, VehicleSummary,
};
use crate::engine::{
    AlertDispatcher, Clock, FleetEvent, FleetEventKind, FleetRepositories, FleetSnapshotSource,
    HealthEvaluator, OptionalEventPublisher,
};
use crate::repository::{InspectionWrite, RepositoryError};

/// 车辆详情中的最近维修条数
const DETAIL_MAINTENANCE_LIMIT: usize = 10;
/// 车辆详情中的最近告警条数
const DETAIL_ALERT_LIMIT: usize = 5;

/// 巡检结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionResponse {
    pub component: Component,
    pub vehicle_status: VehicleStatus,
    /// 健康越界时写入/更新的告警
    pub alert_id: Option<i64>,
}

pub struct FleetApi {
    repos: FleetRepositories,
    health: Arc<HealthEvaluator>,
    dispatcher: AlertDispatcher,
    clock: Arc<dyn Clock>,
    events: OptionalEventPublisher,
    locks: Arc<VehicleWriteLocks>,
}

impl FleetApi {
    pub fn new(
        repos: FleetRepositories,
        health: Arc<HealthEvaluator>,
        clock: Arc<dyn Clock>,
        events: OptionalEventPublisher,
        locks: Arc<VehicleWriteLocks>,
    ) -> Self {
        Self {
            repos,
            health,
            dispatcher: AlertDispatcher::new(),
            clock,
            events,
            locks,
        }
    }

    // ==========================================
    // 登记
    // ==========================================

    /// 新车入队
    ///
    /// # 返回
    /// - Err(InvalidInput): 字段为空、里程无效或车牌重复
    pub fn register_vehicle(&self, vehicle: NewVehicle) -> ApiResult<Vehicle> {
        let plate = vehicle.plate.trim();
        if plate.is_empty() {
            return Err(ApiError::InvalidInput("车牌不能为空".to_string()));
        }
        if vehicle.model.trim().is_empty() {
            return Err(ApiError::InvalidInput("车型不能为空".to_string()));
        }
        if !vehicle.odometer_km.is_finite() || vehicle.odometer_km < 0.0 {
            return Err(ApiError::InvalidInput(format!(
                "里程无效: {}",
                vehicle.odometer_km
            )));
        }
        if let Some(km) = vehicle.last_oil_change_km {
            if !km.is_finite() || km < 0.0 || km > vehicle.odometer_km {
                return Err(ApiError::InvalidInput(format!("上次换油里程无效: {}", km)));
            }
        }
        if self.repos.vehicle_repo.find_by_plate(plate)?.is_some() {
            return Err(ApiError::InvalidInput(format!("车牌已存在: {}", plate)));
        }

        let id = self.repos.vehicle_repo.insert(&vehicle).map_err(|e| match e {
            RepositoryError::UniqueConstraintViolation(_) => {
                ApiError::InvalidInput(format!("车牌已存在: {}", plate))
            }
            other => other.into(),
        })?;

        info!(vehicle_id = id, plate, "车辆入队");
        self.events.publish(FleetEvent::new(
            FleetEventKind::VehicleRegistered,
            Some(id),
            Some(id),
            self.clock.now(),
        ));
        self.find_vehicle(id)
    }

    /// 登记部件，并重算车辆状态
    ///
    /// # 返回
    /// - Err(NotFound): 车辆不存在或已停用
    /// - Err(InvalidInput): 部件名为空、健康度越界或同名部件已存在
    pub fn register_component(&self, component: NewComponent) -> ApiResult<Component> {
        let vehicle = self.active_vehicle(component.vehicle_id)?;
        if component.name.trim().is_empty() {
            return Err(ApiError::InvalidInput("部件名不能为空".to_string()));
        }
        self.health.validate_health(component.health_pct)?;

        let handle = self.locks.handle(vehicle.id)?;
        let _guard = acquire(&handle)?;

        let id = self
            .repos
            .component_repo
            .insert(&component)
            .map_err(|e| match e {
                RepositoryError::UniqueConstraintViolation(_) => ApiError::InvalidInput(format!(
                    "车辆 {} 已有部件 {}",
                    vehicle.plate,
                    component.name.trim()
                )),
                other => other.into(),
            })?;

        let components = self.repos.get_components(vehicle.id)?;
        let status = self.health.vehicle_status(&components);
        self.repos.vehicle_repo.update_status(vehicle.id, status)?;

        info!(vehicle_id = vehicle.id, component_id = id, status = %status, "部件已登记");
        self.find_component(id)
    }

    // ==========================================
    // 巡检
    // ==========================================

    /// 记录部件巡检
    ///
    /// 健康度写入 + 车辆状态重算 + 越界告警在同一事务中提交
    ///
    /// # 返回
    /// - Err(NotFound): 部件或车辆不存在
    /// - Err(InvalidInput): 健康度越界或巡检日期早于已有记录
    pub fn record_inspection(
        &self,
        component_id: i64,
        health_pct: u8,
        inspected_on: chrono::NaiveDate,
    ) -> ApiResult<InspectionResponse> {
        let owner = self.find_component(component_id)?.vehicle_id;
        let handle = self.locks.handle(owner)?;
        let _guard = acquire(&handle)?;

        // 持锁后重新读取，校验基于最新巡检日期
        let component = self.find_component(component_id)?;
        let vehicle = self.active_vehicle(component.vehicle_id)?;

        self.health
            .validate_inspection(&component, health_pct, inspected_on)
            .inspect_err(|e| warn!(component_id, error = %e, "巡检被拒绝"))?;

        // 以新健康度重算车辆状态
        let mut updated = component.clone();
        updated.health_pct = health_pct;
        updated.last_inspection = Some(inspected_on);
        let components: Vec<Component> = self
            .repos
            .get_components(vehicle.id)?
            .into_iter()
            .map(|c| if c.id == component_id { updated.clone() } else { c })
            .collect();
        let vehicle_status = self.health.vehicle_status(&components);

        let now = self.clock.now();
        let decision = match self.health.detect_breach(&updated) {
            Some(breach) => {
                let open = self
                    .repos
                    .alert_repo
                    .find_open(vehicle.id, &breach.component)?;
                let signal = self.dispatcher.signal_from_breach(&breach, &vehicle);
                Some(self.dispatcher.dispatch(signal, open.as_ref(), now))
            }
            None => None,
        };

        let write = InspectionWrite {
            component_id,
            vehicle_id: vehicle.id,
            health_pct,
            inspected_on,
            vehicle_status,
        };
        let alert = self.repos.tx_repo.commit_inspection(&write, decision.as_ref())?;

        info!(
            vehicle_id = vehicle.id,
            component_id,
            health_pct,
            status = %vehicle_status,
            alert_id = ?alert.as_ref().map(|a| a.alert_id),
            "巡检已记录"
        );
        if let Some(alert) = &alert {
            let kind = if alert.created {
                FleetEventKind::AlertCreated
            } else {
                FleetEventKind::AlertUpdated
            };
            self.events
                .publish(FleetEvent::new(kind, Some(vehicle.id), Some(alert.alert_id), now));
        }

        Ok(InspectionResponse {
            component: self.find_component(component_id)?,
            vehicle_status,
            alert_id: alert.map(|a| a.alert_id),
        })
    }

    // ==========================================
    // 车辆维护
    // ==========================================

    /// 更新里程
    ///
    /// # 返回
    /// - Err(InvalidInput): 里程回退或无效
    pub fn update_odometer(&self, vehicle_id: i64, odometer_km: f64) -> ApiResult<Vehicle> {
        let handle = self.locks.handle(vehicle_id)?;
        let _guard = acquire(&handle)?;

        let vehicle = self.find_vehicle(vehicle_id)?;
        self.health
            .validate_odometer(&vehicle, odometer_km)
            .inspect_err(|e| warn!(vehicle_id, error = %e, "里程更新被拒绝"))?;
        self.repos
            .vehicle_repo
            .update_odometer(vehicle_id, odometer_km)?;

        info!(vehicle_id, odometer_km, "里程已更新");
        self.events.publish(FleetEvent::new(
            FleetEventKind::VehicleUpdated,
            Some(vehicle_id),
            Some(vehicle_id),
            self.clock.now(),
        ));
        self.find_vehicle(vehicle_id)
    }

    /// 停用车辆（不删除）
    pub fn deactivate_vehicle(&self, vehicle_id: i64) -> ApiResult<()> {
        self.repos.vehicle_repo.deactivate(vehicle_id)?;
        info!(vehicle_id, "车辆已停用");
        self.events.publish(FleetEvent::new(
            FleetEventKind::VehicleUpdated,
            Some(vehicle_id),
            Some(vehicle_id),
            self.clock.now(),
        ));
        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 车辆详情: 部件（最差在前）、最近维修、最近告警
    pub fn get_vehicle_detail(&self, vehicle_id: i64) -> ApiResult<VehicleDetail> {
        let vehicle = self.find_vehicle(vehicle_id)?;
        Ok(VehicleDetail {
            components: self.repos.get_components(vehicle_id)?,
            maintenance: self
                .repos
                .maintenance_repo
                .list_recent_by_vehicle(vehicle_id, DETAIL_MAINTENANCE_LIMIT)?,
            alerts: self
                .repos
                .alert_repo
                .list_recent_by_vehicle(vehicle_id, DETAIL_ALERT_LIMIT)?,
            vehicle,
        })
    }

    /// 在役车辆列表（critico → atencao → ok，再按车牌）
    pub fn list_vehicles(&self) -> ApiResult<Vec<VehicleSummary>> {
        Ok(self.repos.vehicle_repo.list_summaries()?)
    }

    fn find_vehicle(&self, vehicle_id: i64) -> ApiResult<Vehicle> {
        self.repos
            .get_vehicle(vehicle_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Vehicle(id={})不存在", vehicle_id)))
    }

    fn active_vehicle(&self, vehicle_id: i64) -> ApiResult<Vehicle> {
        let vehicle = self.find_vehicle(vehicle_id)?;
        if !vehicle.active {
            return Err(ApiError::NotFound(format!("Vehicle(id={})已停用", vehicle_id)));
        }
        Ok(vehicle)
    }

    fn find_component(&self, component_id: i64) -> ApiResult<Component> {
        self.repos
            .component_repo
            .find_by_id(component_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Component(id={})不存在", component_id)))
    }
}
