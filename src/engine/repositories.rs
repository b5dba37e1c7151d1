// ==========================================
// 车队预测性维护系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合 API 所需的全部 Repository，并提供只读快照端口
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::domain::occurrence::Occurrence;
use crate::domain::types::VehicleSystem;
use crate::domain::vehicle::{Component, Vehicle};
use crate::repository::{
    AlertRepository, ComponentRepository, DiagnosticRepository, FleetTransactionRepository,
    MaintenanceRepository, OccurrenceRepository, ReportRepository, RepositoryResult,
    VehicleRepository,
};

/// 诊断所需的只读快照端口
///
/// 引擎本身不访问存储；调用方通过此接口取数后传入纯计算。
pub trait FleetSnapshotSource: Send + Sync {
    fn get_vehicle(&self, id: i64) -> RepositoryResult<Option<Vehicle>>;

    fn get_components(&self, vehicle_id: i64) -> RepositoryResult<Vec<Component>>;

    /// 同车同系统的历史事件
    fn get_occurrence_history(
        &self,
        vehicle_id: i64,
        system: VehicleSystem,
    ) -> RepositoryResult<Vec<Occurrence>>;
}

/// 车队仓储集合
#[derive(Clone)]
pub struct FleetRepositories {
    pub vehicle_repo: Arc<VehicleRepository>,
    pub component_repo: Arc<ComponentRepository>,
    pub occurrence_repo: Arc<OccurrenceRepository>,
    pub diagnostic_repo: Arc<DiagnosticRepository>,
    pub alert_repo: Arc<AlertRepository>,
    pub maintenance_repo: Arc<MaintenanceRepository>,
    pub report_repo: Arc<ReportRepository>,
    pub tx_repo: Arc<FleetTransactionRepository>,
}

impl FleetRepositories {
    /// 所有仓储共享同一连接
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            vehicle_repo: Arc::new(VehicleRepository::from_connection(conn.clone())),
            component_repo: Arc::new(ComponentRepository::from_connection(conn.clone())),
            occurrence_repo: Arc::new(OccurrenceRepository::from_connection(conn.clone())),
            diagnostic_repo: Arc::new(DiagnosticRepository::from_connection(conn.clone())),
            alert_repo: Arc::new(AlertRepository::from_connection(conn.clone())),
            maintenance_repo: Arc::new(MaintenanceRepository::from_connection(conn.clone())),
            report_repo: Arc::new(ReportRepository::from_connection(conn.clone())),
            tx_repo: Arc::new(FleetTransactionRepository::from_connection(conn)),
        }
    }
}

impl FleetSnapshotSource for FleetRepositories {
    fn get_vehicle(&self, id: i64) -> RepositoryResult<Option<Vehicle>> {
        self.vehicle_repo.find_by_id(id)
    }

    fn get_components(&self, vehicle_id: i64) -> RepositoryResult<Vec<Component>> {
        self.component_repo.list_by_vehicle(vehicle_id)
    }

    fn get_occurrence_history(
        &self,
        vehicle_id: i64,
        system: VehicleSystem,
    ) -> RepositoryResult<Vec<Occurrence>> {
        self.occurrence_repo.list_history(vehicle_id, system)
    }
}
