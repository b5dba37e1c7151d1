// ==========================================
// 车队预测性维护系统 - 跨表事务写入
// ==========================================
// 职责: 需要原子提交的多表写入
// - 事件上报: 事件 + 诊断 + 告警 + (可选) 预测性维修
// - 部件巡检: 健康度 + 车辆状态 + (可选) 健康告警
// - 维修完工: 维修项 + 相关告警已读
// 红线: 任一步失败整体回滚，不留部分写入
// ==========================================

use crate::domain::alert::AlertDecision;
use crate::domain::diagnostic::{Diagnostic, DiagnosticDraft};
use crate::domain::maintenance::{MaintenanceCompletion, NewMaintenanceItem};
use crate::domain::occurrence::NewOccurrence;
use crate::domain::types::{OccurrenceStatus, VehicleStatus};
use crate::repository::alert_repo::{AlertRepository, AlertWrite};
use crate::repository::diagnostic_repo::DiagnosticRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::maintenance_repo::MaintenanceRepository;
use crate::repository::occurrence_repo::OccurrenceRepository;
use crate::repository::vehicle_repo::{ComponentRepository, VehicleRepository};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 事件上报提交结果
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub occurrence_id: i64,
    pub diagnostic: Diagnostic,
    pub alert: AlertWrite,
    pub maintenance_id: Option<i64>,
}

/// 诊断触发的排期（日期已校验）
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledFollowUp {
    pub item: NewMaintenanceItem,
    pub scheduled_date: NaiveDate,
}

/// 部件巡检写入内容
#[derive(Debug, Clone, PartialEq)]
pub struct InspectionWrite {
    pub component_id: i64,
    pub vehicle_id: i64,
    pub health_pct: u8,
    pub inspected_on: NaiveDate,
    pub vehicle_status: VehicleStatus,
}

pub struct FleetTransactionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FleetTransactionRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 事件上报原子提交
    ///
    /// 诊断 id 在事务内回填到告警与维修项
    pub fn commit_occurrence(
        &self,
        occurrence: &NewOccurrence,
        draft: &DiagnosticDraft,
        mut alert: AlertDecision,
        follow_up: Option<ScheduledFollowUp>,
        created_at: NaiveDateTime,
    ) -> RepositoryResult<SubmissionReceipt> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let occurrence_id = OccurrenceRepository::insert_with(
            &tx,
            occurrence,
            OccurrenceStatus::EmAnalise,
            created_at,
        )?;
        let diagnostic_id = DiagnosticRepository::insert_with(&tx, draft, occurrence_id, created_at)?;

        alert.link_diagnostic(diagnostic_id);
        let alert_write = AlertRepository::apply_with(&tx, &alert)?;

        let maintenance_id = match follow_up {
            Some(mut follow_up) => {
                follow_up.item.diagnostic_id = Some(diagnostic_id);
                Some(MaintenanceRepository::insert_with(
                    &tx,
                    &follow_up.item,
                    follow_up.scheduled_date,
                )?)
            }
            None => None,
        };

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(SubmissionReceipt {
            occurrence_id,
            diagnostic: Diagnostic::from_draft(draft.clone(), diagnostic_id, occurrence_id, created_at),
            alert: alert_write,
            maintenance_id,
        })
    }

    /// 部件巡检原子提交
    pub fn commit_inspection(
        &self,
        inspection: &InspectionWrite,
        alert: Option<&AlertDecision>,
    ) -> RepositoryResult<Option<AlertWrite>> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        ComponentRepository::update_inspection_with(
            &tx,
            inspection.component_id,
            inspection.health_pct,
            inspection.inspected_on,
        )?;
        VehicleRepository::update_status_with(&tx, inspection.vehicle_id, inspection.vehicle_status)?;
        let alert_write = match alert {
            Some(decision) => Some(AlertRepository::apply_with(&tx, decision)?),
            None => None,
        };

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(alert_write)
    }

    /// 维修完工原子提交
    ///
    /// # 参数
    /// - `clear_alerts`: Some((vehicle_id, component)) 时同时将告警置为已读；
    ///   component 为 None 表示整车
    ///
    /// # 返回
    /// 被置为已读的告警数
    pub fn commit_completion(
        &self,
        item_id: i64,
        completion: &MaintenanceCompletion,
        clear_alerts: Option<(i64, Option<&str>)>,
    ) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        MaintenanceRepository::complete_with(&tx, item_id, completion)?;
        let cleared = match clear_alerts {
            Some((vehicle_id, component)) => {
                AlertRepository::mark_read_for_vehicle_with(&tx, vehicle_id, component)?
            }
            None => 0,
        };

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(cleared)
    }
}
