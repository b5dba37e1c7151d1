// ==========================================
// 车队预测性维护系统 - 配置管理器
// ==========================================
// 职责: 评分权重、阈值等参数的加载与覆写
// 存储: config_kv 表 (key-value + scope)，值为 JSON
// ==========================================

use crate::config::fleet_profile::{
    DiagnosticProfile, HealthThresholds, PriorityProfile, SchedulingProfile,
};
use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, "配置已更新");
        Ok(())
    }

    /// 读取 JSON 配置；缺失时返回默认值，格式错误时报错
    fn load_profile<T>(&self, key: &str) -> RepositoryResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.get_global_config_value(key)? {
            None => Ok(T::default()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| RepositoryError::FieldValueError {
                field: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// 序列化并写入 JSON 配置
    pub fn update_profile<T: Serialize>(&self, key: &str, profile: &T) -> RepositoryResult<()> {
        let raw = serde_json::to_string(profile)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
        self.set_global_config_value(key, &raw)
    }

    // ===== 业务参数 =====

    pub fn get_diagnostic_profile(&self) -> RepositoryResult<DiagnosticProfile> {
        self.load_profile(config_keys::DIAGNOSTIC_PROFILE)
    }

    pub fn get_health_thresholds(&self) -> RepositoryResult<HealthThresholds> {
        let thresholds: HealthThresholds = self.load_profile(config_keys::HEALTH_THRESHOLDS)?;
        if thresholds.critico > thresholds.atencao || thresholds.atencao > 100 {
            return Err(RepositoryError::FieldValueError {
                field: config_keys::HEALTH_THRESHOLDS.to_string(),
                message: format!(
                    "阈值需满足 critico <= atencao <= 100 (critico={}, atencao={})",
                    thresholds.critico, thresholds.atencao
                ),
            });
        }
        Ok(thresholds)
    }

    pub fn get_priority_profile(&self) -> RepositoryResult<PriorityProfile> {
        self.load_profile(config_keys::PRIORITY_PROFILE)
    }

    pub fn get_scheduling_profile(&self) -> RepositoryResult<SchedulingProfile> {
        self.load_profile(config_keys::SCHEDULING_PROFILE)
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 诊断结果可追溯到计算时使用的权重
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(json!(config_map).to_string())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 诊断评分权重与区间 (JSON)
    pub const DIAGNOSTIC_PROFILE: &str = "diagnostic_profile";

    // 部件健康阈值 (JSON)
    pub const HEALTH_THRESHOLDS: &str = "health_thresholds";

    // 维修优先级 (JSON)
    pub const PRIORITY_PROFILE: &str = "priority_profile";

    // 诊断触发排期 (JSON)
    pub const SCHEDULING_PROFILE: &str = "scheduling_profile";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use tempfile::NamedTempFile;

    fn manager() -> (NamedTempFile, ConfigManager) {
        let temp = NamedTempFile::new().unwrap();
        let conn = open_sqlite_connection(temp.path().to_str().unwrap()).unwrap();
        init_schema(&conn).unwrap();
        (temp, ConfigManager::from_connection(Arc::new(Mutex::new(conn))))
    }

    #[test]
    fn test_missing_profiles_fall_back_to_defaults() {
        let (_temp, manager) = manager();
        assert_eq!(
            manager.get_diagnostic_profile().unwrap(),
            DiagnosticProfile::default()
        );
        assert_eq!(manager.get_health_thresholds().unwrap(), HealthThresholds::default());
        assert_eq!(manager.get_config_snapshot().unwrap(), "{}");
    }

    #[test]
    fn test_update_profile_round_trips_through_config_kv() {
        let (_temp, manager) = manager();
        let thresholds = HealthThresholds {
            critico: 40,
            atencao: 70,
        };
        manager
            .update_profile(config_keys::HEALTH_THRESHOLDS, &thresholds)
            .unwrap();
        assert_eq!(manager.get_health_thresholds().unwrap(), thresholds);

        // 二次写入走 UPSERT
        manager
            .set_global_config_value(config_keys::PRIORITY_PROFILE, r#"{"predictive_high_threshold":0.8}"#)
            .unwrap();
        manager
            .set_global_config_value(config_keys::PRIORITY_PROFILE, r#"{"predictive_high_threshold":0.65}"#)
            .unwrap();
        assert_eq!(manager.get_priority_profile().unwrap().predictive_high_threshold, 0.65);

        let snapshot: BTreeMap<String, String> =
            serde_json::from_str(&manager.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains_key(config_keys::HEALTH_THRESHOLDS));
    }

    #[test]
    fn test_malformed_json_is_field_value_error() {
        let (_temp, manager) = manager();
        manager
            .set_global_config_value(config_keys::SCHEDULING_PROFILE, "{not json")
            .unwrap();
        match manager.get_scheduling_profile() {
            Err(RepositoryError::FieldValueError { field, .. }) => {
                assert_eq!(field, config_keys::SCHEDULING_PROFILE)
            }
            other => panic!("Expected FieldValueError, got {:?}", other),
        }
    }

    #[test]
    fn test_inverted_thresholds_rejected_on_load() {
        let (_temp, manager) = manager();
        manager
            .set_global_config_value(config_keys::HEALTH_THRESHOLDS, r#"{"critico":85,"atencao":80}"#)
            .unwrap();
        assert!(matches!(
            manager.get_health_thresholds(),
            Err(RepositoryError::FieldValueError { .. })
        ));
    }
}
