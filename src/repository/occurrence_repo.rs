// ==========================================
// 车队预测性维护系统 - 事件台账仓储
// ==========================================
// 红线: 只追加；内容字段写入后不再更新
// ==========================================

use crate::domain::occurrence::{NewOccurrence, Occurrence};
use crate::domain::types::{OccurrenceStatus, Severity, VehicleSystem};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{decode_enum, decode_list, encode_list};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const OCCURRENCE_COLUMNS: &str =
    "id, vehicle_id, system, symptoms, description, severity, odometer_km, occurred_on, status";

fn map_occurrence(row: &Row<'_>) -> rusqlite::Result<Occurrence> {
    Ok(Occurrence {
        id: row.get(0)?,
        vehicle_id: row.get(1)?,
        system: decode_enum(2, &row.get::<_, String>(2)?, VehicleSystem::from_label)?,
        symptoms: decode_list(3, &row.get::<_, String>(3)?)?,
        description: row.get(4)?,
        severity: decode_enum(5, &row.get::<_, String>(5)?, Severity::from_str)?,
        odometer_km: row.get(6)?,
        occurred_on: row.get(7)?,
        status: decode_enum(8, &row.get::<_, String>(8)?, OccurrenceStatus::from_str)?,
    })
}

pub struct OccurrenceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OccurrenceRepository {
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

    /// 写入事件（事务内调用）
    pub(crate) fn insert_with(
        conn: &Connection,
        occurrence: &NewOccurrence,
        status: OccurrenceStatus,
        created_at: NaiveDateTime,
    ) -> RepositoryResult<i64> {
        conn.execute(
            r#"
            INSERT INTO occurrences (
                vehicle_id, system, symptoms, description, severity,
                odometer_km, occurred_on, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                occurrence.vehicle_id,
                occurrence.system.label(),
                encode_list(&occurrence.symptoms),
                occurrence.description,
                occurrence.severity.to_db_str(),
                occurrence.odometer_km,
                occurrence.occurred_on,
                status.to_db_str(),
                created_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Occurrence>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM occurrences WHERE id = ?1", OCCURRENCE_COLUMNS);
        let occurrence = conn.query_row(&sql, params![id], map_occurrence).optional()?;
        Ok(occurrence)
    }

    /// 同车同系统的历史事件（按日期升序）
    pub fn list_history(
        &self,
        vehicle_id: i64,
        system: VehicleSystem,
    ) -> RepositoryResult<Vec<Occurrence>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM occurrences WHERE vehicle_id = ?1 AND system = ?2 ORDER BY occurred_on, id",
            OCCURRENCE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![vehicle_id, system.label()], map_occurrence)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// 全部事件（最新在前）
    pub fn list_all(&self) -> RepositoryResult<Vec<Occurrence>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM occurrences ORDER BY occurred_on DESC, id DESC",
            OCCURRENCE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_occurrence)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM occurrences", [], |row| row.get(0))?;
        Ok(n)
    }
}
