// ==========================================
// 车队预测性维护系统 - 报表查询仓储
// ==========================================
// 职责: 驾驶舱与成本报表的聚合查询（只读）
// ==========================================

use crate::domain::report::{CostByType, VehicleCost};
use crate::domain::types::MaintenanceType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::decode_enum;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 在役车辆状态分布
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusBreakdown {
    pub ok: i64,
    pub atencao: i64,
    pub critico: i64,
}

impl StatusBreakdown {
    pub fn total(&self) -> i64 {
        self.ok + self.atencao + self.critico
    }
}

pub struct ReportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReportRepository {
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

    pub fn status_breakdown(&self) -> RepositoryResult<StatusBreakdown> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT status, COUNT(*) FROM vehicles WHERE active = 1 GROUP BY status")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

        let mut breakdown = StatusBreakdown::default();
        for row in rows {
            let (status, count) = row?;
            match status.as_str() {
                "ok" => breakdown.ok = count,
                "atencao" => breakdown.atencao = count,
                "critico" => breakdown.critico = count,
                other => {
                    tracing::warn!(status = other, "未知车辆状态，忽略");
                }
            }
        }
        Ok(breakdown)
    }

    /// 指定日期的待处理维修数
    pub fn count_pending_on(&self, date: NaiveDate) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let n = conn.query_row(
            r#"
            SELECT COUNT(*) FROM maintenance_items m
            JOIN vehicles v ON v.id = m.vehicle_id
            WHERE m.scheduled_date = ?1 AND m.status != 'concluida' AND v.active = 1
            "#,
            params![date],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    /// 完工成本按类型汇总（按类型名排序）
    pub fn cost_by_type(&self) -> RepositoryResult<Vec<CostByType>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT item_type, COUNT(*), COALESCE(SUM(cost), 0.0)
            FROM maintenance_items
            WHERE status = 'concluida'
            GROUP BY item_type
            ORDER BY item_type
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let count: i64 = row.get(1)?;
            let total: f64 = row.get(2)?;
            Ok(CostByType {
                item_type: decode_enum(0, &row.get::<_, String>(0)?, MaintenanceType::from_str)?,
                count,
                total: round_cents(total),
                average: if count > 0 {
                    round_cents(total / count as f64)
                } else {
                    0.0
                },
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// 完工成本最高的车辆
    pub fn top_vehicles_by_cost(&self, limit: usize) -> RepositoryResult<Vec<VehicleCost>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT v.id, v.plate, v.model, SUM(m.cost) AS total
            FROM maintenance_items m
            JOIN vehicles v ON v.id = m.vehicle_id
            WHERE m.status = 'concluida' AND m.cost IS NOT NULL
            GROUP BY v.id
            ORDER BY total DESC, v.id ASC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(VehicleCost {
                vehicle_id: row.get(0)?,
                plate: row.get(1)?,
                model: row.get(2)?,
                total: round_cents(row.get(3)?),
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn total_estimated_savings(&self) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;
        let total: f64 = conn.query_row(
            "SELECT COALESCE(SUM(estimated_savings), 0.0) FROM diagnostics",
            [],
            |row| row.get(0),
        )?;
        Ok(round_cents(total))
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
