// ==========================================
// 车队预测性维护系统 - 维修项仓储
// ==========================================
// 状态机: agendada → concluida | agendada → atrasada → concluida
// 红线: concluida 为终态
// ==========================================

use crate::domain::maintenance::{MaintenanceCompletion, MaintenanceItem, NewMaintenanceItem};
use crate::domain::types::{MaintenanceStatus, MaintenanceType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::decode_enum;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const ITEM_COLUMNS: &str = "id, vehicle_id, item_type, description, scheduled_date, status, \
     diagnostic_id, failure_probability, completed_on, completed_km, cost, parts, notes";

fn map_item(row: &Row<'_>) -> rusqlite::Result<MaintenanceItem> {
    Ok(MaintenanceItem {
        id: row.get(0)?,
        vehicle_id: row.get(1)?,
        item_type: decode_enum(2, &row.get::<_, String>(2)?, MaintenanceType::from_str)?,
        description: row.get(3)?,
        scheduled_date: row.get(4)?,
        status: decode_enum(5, &row.get::<_, String>(5)?, MaintenanceStatus::from_str)?,
        diagnostic_id: row.get(6)?,
        failure_probability: row.get(7)?,
        completed_on: row.get(8)?,
        completed_km: row.get(9)?,
        cost: row.get(10)?,
        parts: row.get(11)?,
        notes: row.get(12)?,
    })
}

pub struct MaintenanceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaintenanceRepository {
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

    // ==========================================
    // 写入
    // ==========================================

    /// 新建维修项（日期已校验）
    pub fn insert(&self, item: &NewMaintenanceItem, scheduled_date: NaiveDate) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_with(&conn, item, scheduled_date)
    }

    pub(crate) fn insert_with(
        conn: &Connection,
        item: &NewMaintenanceItem,
        scheduled_date: NaiveDate,
    ) -> RepositoryResult<i64> {
        conn.execute(
            r#"
            INSERT INTO maintenance_items (
                vehicle_id, item_type, description, scheduled_date, status,
                diagnostic_id, failure_probability
            ) VALUES (?1, ?2, ?3, ?4, 'agendada', ?5, ?6)
            "#,
            params![
                item.vehicle_id,
                item.item_type.to_db_str(),
                item.description.trim(),
                scheduled_date,
                item.diagnostic_id,
                item.failure_probability,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 批量标记逾期（仅 agendada）
    pub fn mark_overdue(&self, ids: &[i64]) -> RepositoryResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut changed = 0;
        {
            let mut stmt = tx.prepare(
                "UPDATE maintenance_items SET status = 'atrasada' WHERE id = ?1 AND status = 'agendada'",
            )?;
            for id in ids {
                changed += stmt.execute(params![id])?;
            }
        }
        tx.commit()?;
        Ok(changed)
    }

    /// 完工登记（事务内调用）
    ///
    /// # 返回
    /// - Err(InvalidStateTransition): 已完工
    pub(crate) fn complete_with(
        conn: &Connection,
        id: i64,
        completion: &MaintenanceCompletion,
    ) -> RepositoryResult<()> {
        let changed = conn.execute(
            r#"
            UPDATE maintenance_items
            SET status = 'concluida', completed_on = ?2, completed_km = ?3,
                cost = ?4, parts = ?5, notes = ?6
            WHERE id = ?1 AND status != 'concluida'
            "#,
            params![
                id,
                completion.completed_on,
                completion.completed_km,
                completion.cost,
                completion.parts,
                completion.notes,
            ],
        )?;
        if changed == 0 {
            return Err(RepositoryError::InvalidStateTransition {
                from: MaintenanceStatus::Concluida.to_db_str().to_string(),
                to: MaintenanceStatus::Concluida.to_db_str().to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<MaintenanceItem>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM maintenance_items WHERE id = ?1", ITEM_COLUMNS);
        let item = conn.query_row(&sql, params![id], map_item).optional()?;
        Ok(item)
    }

    /// 在役车辆的待处理维修项（按排期日期）
    pub fn list_pending(&self) -> RepositoryResult<Vec<MaintenanceItem>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM maintenance_items
            WHERE status != 'concluida'
              AND vehicle_id IN (SELECT id FROM vehicles WHERE active = 1)
            ORDER BY scheduled_date, id
            "#,
            ITEM_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_item)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// 车辆最近的维修记录（排期日期降序）
    pub fn list_recent_by_vehicle(
        &self,
        vehicle_id: i64,
        limit: usize,
    ) -> RepositoryResult<Vec<MaintenanceItem>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM maintenance_items WHERE vehicle_id = ?1 ORDER BY scheduled_date DESC, id DESC LIMIT ?2",
            ITEM_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![vehicle_id, limit as i64], map_item)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn list_by_diagnostic(&self, diagnostic_id: i64) -> RepositoryResult<Vec<MaintenanceItem>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM maintenance_items WHERE diagnostic_id = ?1 ORDER BY id",
            ITEM_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![diagnostic_id], map_item)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
