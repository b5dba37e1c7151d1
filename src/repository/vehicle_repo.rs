// ==========================================
// 车队预测性维护系统 - 车辆与部件仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 车辆只停用不删除
// ==========================================

use crate::domain::types::VehicleStatus;
use crate::domain::vehicle::{Component, NewComponent, NewVehicle, Vehicle, VehicleSummary};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_codec::decode_enum;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const VEHICLE_COLUMNS: &str = "id, plate, model, year, engine, odometer_km, registered_on, \
                               last_oil_change_km, status, active";

const COMPONENT_COLUMNS: &str = "id, vehicle_id, name, health_pct, last_inspection";

fn map_vehicle(row: &Row<'_>) -> rusqlite::Result<Vehicle> {
    Ok(Vehicle {
        id: row.get(0)?,
        plate: row.get(1)?,
        model: row.get(2)?,
        year: row.get(3)?,
        engine: row.get(4)?,
        odometer_km: row.get(5)?,
        registered_on: row.get(6)?,
        last_oil_change_km: row.get(7)?,
        status: decode_enum(8, &row.get::<_, String>(8)?, VehicleStatus::from_str)?,
        active: row.get(9)?,
    })
}

fn map_component(row: &Row<'_>) -> rusqlite::Result<Component> {
    Ok(Component {
        id: row.get(0)?,
        vehicle_id: row.get(1)?,
        name: row.get(2)?,
        health_pct: row.get(3)?,
        last_inspection: row.get(4)?,
    })
}

// ==========================================
// VehicleRepository - 车辆仓储
// ==========================================
pub struct VehicleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl VehicleRepository {
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

    /// 新车入队
    ///
    /// # 返回
    /// - Ok(id)
    /// - Err(UniqueConstraintViolation): 车牌重复
    pub fn insert(&self, vehicle: &NewVehicle) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO vehicles (
                plate, model, year, engine, odometer_km, registered_on,
                last_oil_change_km, status, active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'ok', 1)
            "#,
            params![
                vehicle.plate.trim(),
                vehicle.model,
                vehicle.year,
                vehicle.engine,
                vehicle.odometer_km,
                vehicle.registered_on,
                vehicle.last_oil_change_km,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Vehicle>> {
        let conn = self.get_conn()?;
        Self::find_by_id_with(&conn, id)
    }

    pub(crate) fn find_by_id_with(conn: &Connection, id: i64) -> RepositoryResult<Option<Vehicle>> {
        let sql = format!("SELECT {} FROM vehicles WHERE id = ?1", VEHICLE_COLUMNS);
        let vehicle = conn.query_row(&sql, params![id], map_vehicle).optional()?;
        Ok(vehicle)
    }

    pub fn find_by_plate(&self, plate: &str) -> RepositoryResult<Option<Vehicle>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM vehicles WHERE plate = ?1", VEHICLE_COLUMNS);
        let vehicle = conn
            .query_row(&sql, params![plate.trim()], map_vehicle)
            .optional()?;
        Ok(vehicle)
    }

    /// 在役车辆（按车牌）
    pub fn list_active(&self) -> RepositoryResult<Vec<Vehicle>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM vehicles WHERE active = 1 ORDER BY plate",
            VEHICLE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_vehicle)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// 在役车辆列表行: 平均健康度 + 未读告警数
    ///
    /// 排序: critico → atencao → ok → 车牌
    pub fn list_summaries(&self) -> RepositoryResult<Vec<VehicleSummary>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {cols},
                   COALESCE((SELECT AVG(c.health_pct) FROM components c WHERE c.vehicle_id = v.id), 0.0),
                   (SELECT COUNT(*) FROM alerts a WHERE a.vehicle_id = v.id AND a.read = 0)
            FROM vehicles v
            WHERE v.active = 1
            ORDER BY CASE v.status WHEN 'critico' THEN 0 WHEN 'atencao' THEN 1 ELSE 2 END,
                     v.plate
            "#,
            cols = VEHICLE_COLUMNS
                .split(", ")
                .map(|c| format!("v.{}", c.trim()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            let average: f64 = row.get(10)?;
            Ok(VehicleSummary {
                vehicle: map_vehicle(row)?,
                average_health: (average * 10.0).round() / 10.0,
                unread_alerts: row.get(11)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// 更新里程（仅允许不减）
    ///
    /// # 返回
    /// - Err(NotFound): 车辆不存在
    /// - Err(InvalidStateTransition): 库中里程已大于提交值
    pub fn update_odometer(&self, id: i64, odometer_km: f64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE vehicles SET odometer_km = ?2 WHERE id = ?1 AND odometer_km <= ?2",
            params![id, odometer_km],
        )?;
        if changed == 0 {
            let current: Option<f64> = conn
                .query_row(
                    "SELECT odometer_km FROM vehicles WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            return Err(match current {
                Some(current) => RepositoryError::InvalidStateTransition {
                    from: format!("{} km", current),
                    to: format!("{} km", odometer_km),
                },
                None => RepositoryError::not_found("Vehicle", id),
            });
        }
        Ok(())
    }

    pub fn update_status(&self, id: i64, status: VehicleStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::update_status_with(&conn, id, status)
    }

    pub(crate) fn update_status_with(
        conn: &Connection,
        id: i64,
        status: VehicleStatus,
    ) -> RepositoryResult<()> {
        let changed = conn.execute(
            "UPDATE vehicles SET status = ?2 WHERE id = ?1",
            params![id, status.to_db_str()],
        )?;
        if changed == 0 {
            return Err(RepositoryError::not_found("Vehicle", id));
        }
        Ok(())
    }

    pub fn deactivate(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute("UPDATE vehicles SET active = 0 WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(RepositoryError::not_found("Vehicle", id));
        }
        Ok(())
    }
}

// ==========================================
// ComponentRepository - 部件健康度仓储
// ==========================================
pub struct ComponentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ComponentRepository {
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

    pub fn insert(&self, component: &NewComponent) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO components (vehicle_id, name, health_pct, last_inspection)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                component.vehicle_id,
                component.name.trim(),
                component.health_pct,
                component.last_inspection,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Component>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM components WHERE id = ?1", COMPONENT_COLUMNS);
        let component = conn.query_row(&sql, params![id], map_component).optional()?;
        Ok(component)
    }

    /// 车辆部件（健康度最差在前）
    pub fn list_by_vehicle(&self, vehicle_id: i64) -> RepositoryResult<Vec<Component>> {
        let conn = self.get_conn()?;
        Self::list_by_vehicle_with(&conn, vehicle_id)
    }

    pub(crate) fn list_by_vehicle_with(
        conn: &Connection,
        vehicle_id: i64,
    ) -> RepositoryResult<Vec<Component>> {
        let sql = format!(
            "SELECT {} FROM components WHERE vehicle_id = ?1 ORDER BY health_pct ASC, name ASC",
            COMPONENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![vehicle_id], map_component)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// 按部件名查询（大小写不敏感）
    pub fn find_by_vehicle_and_name(
        &self,
        vehicle_id: i64,
        name: &str,
    ) -> RepositoryResult<Option<Component>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM components WHERE vehicle_id = ?1 AND lower(name) = lower(?2)",
            COMPONENT_COLUMNS
        );
        let component = conn
            .query_row(&sql, params![vehicle_id, name.trim()], map_component)
            .optional()?;
        Ok(component)
    }

    pub(crate) fn update_inspection_with(
        conn: &Connection,
        id: i64,
        health_pct: u8,
        inspected_on: NaiveDate,
    ) -> RepositoryResult<()> {
        let changed = conn.execute(
            r#"
            UPDATE components SET health_pct = ?2, last_inspection = ?3
            WHERE id = ?1 AND (last_inspection IS NULL OR last_inspection <= ?3)
            "#,
            params![id, health_pct, inspected_on],
        )?;
        if changed == 0 {
            let last: Option<Option<NaiveDate>> = conn
                .query_row(
                    "SELECT last_inspection FROM components WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            return Err(match last {
                Some(last) => RepositoryError::InvalidStateTransition {
                    from: last.map(|d| d.to_string()).unwrap_or_default(),
                    to: inspected_on.to_string(),
                },
                None => RepositoryError::not_found("Component", id),
            });
        }
        Ok(())
    }
}
