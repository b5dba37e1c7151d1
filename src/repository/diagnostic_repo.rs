// ==========================================
// 车队预测性维护系统 - 诊断仓储
// ==========================================
// 红线: 只新增不修改
// ==========================================

use crate::domain::diagnostic::{Diagnostic, DiagnosticDraft};
use crate::domain::types::{Severity, VehicleSystem};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::{decode_enum, decode_list, encode_list};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const DIAGNOSTIC_COLUMNS: &str = "id, occurrence_id, vehicle_id, system, health_component, component, \
     failure_probability, severity, horizon_days, correlated_symptoms, recommended_parts, \
     estimated_savings, recommendation, model_version, justification, created_at";

fn map_diagnostic(row: &Row<'_>) -> rusqlite::Result<Diagnostic> {
    Ok(Diagnostic {
        id: row.get(0)?,
        occurrence_id: row.get(1)?,
        vehicle_id: row.get(2)?,
        system: decode_enum(3, &row.get::<_, String>(3)?, VehicleSystem::from_label)?,
        health_component: row.get(4)?,
        component: row.get(5)?,
        failure_probability: row.get(6)?,
        severity: decode_enum(7, &row.get::<_, String>(7)?, Severity::from_str)?,
        horizon_days: row.get(8)?,
        correlated_symptoms: decode_list(9, &row.get::<_, String>(9)?)?,
        recommended_parts: decode_list(10, &row.get::<_, String>(10)?)?,
        estimated_savings: row.get(11)?,
        recommendation: row.get(12)?,
        model_version: row.get(13)?,
        justification: row.get(14)?,
        created_at: row.get(15)?,
    })
}

pub struct DiagnosticRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DiagnosticRepository {
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

    /// 写入诊断（事务内调用）
    pub(crate) fn insert_with(
        conn: &Connection,
        draft: &DiagnosticDraft,
        occurrence_id: i64,
        created_at: NaiveDateTime,
    ) -> RepositoryResult<i64> {
        conn.execute(
            r#"
            INSERT INTO diagnostics (
                occurrence_id, vehicle_id, system, health_component, component,
                failure_probability, severity, horizon_days, correlated_symptoms,
                recommended_parts, estimated_savings, recommendation, model_version,
                justification, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                occurrence_id,
                draft.vehicle_id,
                draft.system.label(),
                draft.health_component,
                draft.component,
                draft.failure_probability,
                draft.severity.to_db_str(),
                draft.horizon_days,
                encode_list(&draft.correlated_symptoms),
                encode_list(&draft.recommended_parts),
                draft.estimated_savings,
                draft.recommendation,
                draft.model_version,
                draft.justification,
                created_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Diagnostic>> {
        let conn = self.get_conn()?;
        Self::find_by_id_with(&conn, id)
    }

    pub(crate) fn find_by_id_with(conn: &Connection, id: i64) -> RepositoryResult<Option<Diagnostic>> {
        let sql = format!("SELECT {} FROM diagnostics WHERE id = ?1", DIAGNOSTIC_COLUMNS);
        let diagnostic = conn.query_row(&sql, params![id], map_diagnostic).optional()?;
        Ok(diagnostic)
    }

    /// 某事件的全部诊断（重新诊断会产生多条）
    pub fn list_by_occurrence(&self, occurrence_id: i64) -> RepositoryResult<Vec<Diagnostic>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM diagnostics WHERE occurrence_id = ?1 ORDER BY id",
            DIAGNOSTIC_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![occurrence_id], map_diagnostic)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row("SELECT COUNT(*) FROM diagnostics", [], |row| row.get(0))?;
        Ok(n)
    }
}
