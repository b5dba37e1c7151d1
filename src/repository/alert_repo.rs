// ==========================================
// 车队预测性维护系统 - 告警仓储
// ==========================================
// 红线: 已读告警只读；就地更新仅作用于未读告警
// 约束: ux_alerts_open 唯一索引保证 (vehicle_id, component) 至多一条未读
// ==========================================

use crate::domain::alert::{Alert, AlertDecision, AlertFilter, NewAlert};
use crate::domain::types::AlertType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::decode_enum;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const ALERT_COLUMNS: &str =
    "id, vehicle_id, component, diagnostic_id, alert_type, message, created_at, updated_at, read";

fn map_alert(row: &Row<'_>) -> rusqlite::Result<Alert> {
    Ok(Alert {
        id: row.get(0)?,
        vehicle_id: row.get(1)?,
        component: row.get(2)?,
        diagnostic_id: row.get(3)?,
        alert_type: decode_enum(4, &row.get::<_, String>(4)?, AlertType::from_str)?,
        message: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        read: row.get(8)?,
    })
}

/// 告警写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertWrite {
    pub alert_id: i64,
    pub created: bool,
}

pub struct AlertRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AlertRepository {
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

    /// 应用分发结果（事务内调用）
    pub(crate) fn apply_with(
        conn: &Connection,
        decision: &AlertDecision,
    ) -> RepositoryResult<AlertWrite> {
        match decision {
            AlertDecision::Create(alert) => {
                let alert_id = Self::insert_with(conn, alert)?;
                Ok(AlertWrite {
                    alert_id,
                    created: true,
                })
            }
            AlertDecision::Update {
                alert_id,
                alert_type,
                message,
                diagnostic_id,
                updated_at,
            } => {
                let changed = conn.execute(
                    r#"
                    UPDATE alerts
                    SET alert_type = ?2, message = ?3, diagnostic_id = ?4, updated_at = ?5
                    WHERE id = ?1 AND read = 0
                    "#,
                    params![
                        alert_id,
                        alert_type.to_db_str(),
                        message,
                        diagnostic_id,
                        updated_at,
                    ],
                )?;
                if changed == 0 {
                    return Err(RepositoryError::InvalidStateTransition {
                        from: "read".to_string(),
                        to: "updated".to_string(),
                    });
                }
                Ok(AlertWrite {
                    alert_id: *alert_id,
                    created: false,
                })
            }
        }
    }

    fn insert_with(conn: &Connection, alert: &NewAlert) -> RepositoryResult<i64> {
        conn.execute(
            r#"
            INSERT INTO alerts (
                vehicle_id, component, diagnostic_id, alert_type, message,
                created_at, updated_at, read
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, 0)
            "#,
            params![
                alert.vehicle_id,
                alert.component,
                alert.diagnostic_id,
                alert.alert_type.to_db_str(),
                alert.message,
                alert.created_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 标记已读
    ///
    /// # 返回
    /// - Err(NotFound): id 不存在
    pub fn mark_read(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let exists = conn
            .query_row("SELECT 1 FROM alerts WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        if exists.is_none() {
            return Err(RepositoryError::not_found("Alert", id));
        }
        conn.execute("UPDATE alerts SET read = 1 WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// 批量已读: 指定部件，或整车（component 为 None）
    pub(crate) fn mark_read_for_vehicle_with(
        conn: &Connection,
        vehicle_id: i64,
        component: Option<&str>,
    ) -> RepositoryResult<usize> {
        let changed = match component {
            Some(name) => conn.execute(
                "UPDATE alerts SET read = 1 WHERE vehicle_id = ?1 AND component = ?2 AND read = 0",
                params![vehicle_id, name],
            )?,
            None => conn.execute(
                "UPDATE alerts SET read = 1 WHERE vehicle_id = ?1 AND read = 0",
                params![vehicle_id],
            )?,
        };
        Ok(changed)
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Alert>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM alerts WHERE id = ?1", ALERT_COLUMNS);
        let alert = conn.query_row(&sql, params![id], map_alert).optional()?;
        Ok(alert)
    }

    /// (车辆, 部件) 当前的未读告警
    pub fn find_open(&self, vehicle_id: i64, component: &str) -> RepositoryResult<Option<Alert>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM alerts WHERE vehicle_id = ?1 AND component = ?2 AND read = 0",
            ALERT_COLUMNS
        );
        let alert = conn
            .query_row(&sql, params![vehicle_id, component], map_alert)
            .optional()?;
        Ok(alert)
    }

    /// 告警列表（按创建先后倒序: created_at 降序，再按 id 降序）
///
/// 就地更新只改 updated_at，不改变列表位置
    pub fn list(&self, filter: AlertFilter) -> RepositoryResult<Vec<Alert>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM alerts WHERE (?1 IS NULL OR read = ?1) ORDER BY created_at DESC, id DESC",
            ALERT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![filter.read], map_alert)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// 车辆最近的告警
    pub fn list_recent_by_vehicle(&self, vehicle_id: i64, limit: usize) -> RepositoryResult<Vec<Alert>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM alerts WHERE vehicle_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2",
            ALERT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![vehicle_id, limit as i64], map_alert)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn count_unread(&self, alert_type: Option<AlertType>) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row(
            r#"
            SELECT COUNT(*) FROM alerts a
            JOIN vehicles v ON v.id = a.vehicle_id
            WHERE a.read = 0 AND v.active = 1 AND (?1 IS NULL OR a.alert_type = ?1)
            "#,
            params![alert_type.map(|t| t.to_db_str())],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}
