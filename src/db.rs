// ==========================================
// 车队预测性维护系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 建表脚本与 schema_version 标记
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
///
/// 日期列为 TEXT (YYYY-MM-DD)，时间列为 TEXT (YYYY-MM-DD HH:MM:SS)，
/// 症状 / 备件列表以 JSON 数组存储。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id    TEXT NOT NULL DEFAULT 'global',
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS vehicles (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    plate               TEXT NOT NULL UNIQUE,
    model               TEXT NOT NULL,
    year                INTEGER NOT NULL,
    engine              TEXT NOT NULL,
    odometer_km         REAL NOT NULL CHECK (odometer_km >= 0),
    registered_on       TEXT NOT NULL,
    last_oil_change_km  REAL,
    status              TEXT NOT NULL DEFAULT 'ok' CHECK (status IN ('ok', 'atencao', 'critico')),
    active              INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS components (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    vehicle_id       INTEGER NOT NULL REFERENCES vehicles(id),
    name             TEXT NOT NULL,
    health_pct       INTEGER NOT NULL CHECK (health_pct BETWEEN 0 AND 100),
    last_inspection  TEXT,
    UNIQUE (vehicle_id, name)
);

CREATE TABLE IF NOT EXISTS occurrences (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    vehicle_id   INTEGER NOT NULL REFERENCES vehicles(id),
    system       TEXT NOT NULL,
    symptoms     TEXT NOT NULL,
    description  TEXT NOT NULL,
    severity     TEXT NOT NULL CHECK (severity IN ('baixa', 'media', 'alta', 'critica')),
    odometer_km  REAL NOT NULL,
    occurred_on  TEXT NOT NULL,
    status       TEXT NOT NULL DEFAULT 'aberta' CHECK (status IN ('aberta', 'em_analise', 'resolvida')),
    created_at   TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE INDEX IF NOT EXISTS idx_occurrences_vehicle ON occurrences(vehicle_id, system, occurred_on);

CREATE TABLE IF NOT EXISTS diagnostics (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    occurrence_id        INTEGER NOT NULL REFERENCES occurrences(id),
    vehicle_id           INTEGER NOT NULL REFERENCES vehicles(id),
    system               TEXT NOT NULL,
    health_component     TEXT NOT NULL,
    component            TEXT NOT NULL,
    failure_probability  REAL NOT NULL CHECK (failure_probability BETWEEN 0 AND 1),
    severity             TEXT NOT NULL CHECK (severity IN ('baixa', 'media', 'alta', 'critica')),
    horizon_days         INTEGER NOT NULL CHECK (horizon_days >= 1),
    correlated_symptoms  TEXT NOT NULL,
    recommended_parts    TEXT NOT NULL,
    estimated_savings    REAL NOT NULL,
    recommendation       TEXT NOT NULL,
    model_version        TEXT NOT NULL,
    justification        TEXT NOT NULL,
    created_at           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS alerts (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    vehicle_id     INTEGER NOT NULL REFERENCES vehicles(id),
    component      TEXT NOT NULL,
    diagnostic_id  INTEGER REFERENCES diagnostics(id),
    alert_type     TEXT NOT NULL CHECK (alert_type IN ('critico', 'atencao', 'info')),
    message        TEXT NOT NULL,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL,
    read           INTEGER NOT NULL DEFAULT 0
);
-- 同一 (车辆, 部件) 至多一条未读告警
CREATE UNIQUE INDEX IF NOT EXISTS ux_alerts_open ON alerts(vehicle_id, component) WHERE read = 0;

CREATE TABLE IF NOT EXISTS maintenance_items (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    vehicle_id           INTEGER NOT NULL REFERENCES vehicles(id),
    item_type            TEXT NOT NULL CHECK (item_type IN ('preventiva', 'preditiva', 'corretiva')),
    description          TEXT NOT NULL,
    scheduled_date       TEXT NOT NULL,
    status               TEXT NOT NULL DEFAULT 'agendada' CHECK (status IN ('agendada', 'atrasada', 'concluida')),
    diagnostic_id        INTEGER REFERENCES diagnostics(id),
    failure_probability  REAL,
    completed_on         TEXT,
    completed_km         REAL,
    cost                 REAL,
    parts                TEXT,
    notes                TEXT,
    created_at           TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE INDEX IF NOT EXISTS idx_maintenance_status ON maintenance_items(status, scheduled_date);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);

        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_open_alert_uniqueness_is_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO vehicles (plate, model, year, engine, odometer_km, registered_on)
             VALUES ('ABC-1234', 'Scania R450', 2021, 'DC13', 100, '2021-01-01')",
            [],
        )
        .unwrap();
        let insert = "INSERT INTO alerts (vehicle_id, component, alert_type, message, created_at, updated_at, read)
                      VALUES (1, 'Freios', 'critico', 'm', '2026-05-04 08:00:00', '2026-05-04 08:00:00', ?1)";
        conn.execute(insert, [0]).unwrap();
        assert!(conn.execute(insert, [0]).is_err());
        // 已读告警不受限制
        conn.execute(insert, [1]).unwrap();
    }
}
