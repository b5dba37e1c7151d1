// ==========================================
// 车队预测性维护系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{
    AlertApi, ConfigApi, FleetApi, MaintenanceApi, OccurrenceApi, ReportApi, VehicleWriteLocks,
};
use crate::config::config_manager::ConfigManager;
use crate::engine::{
    Clock, DiagnosticEngine, FleetRepositories, HealthEvaluator, MaintenancePrioritizer,
    OptionalEventPublisher, SystemClock, TracingEventPublisher,
};

/// 应用状态
///
/// 包含所有API实例和共享资源，所有仓储共享同一 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 事件上报API
    pub occurrence_api: Arc<OccurrenceApi>,

    /// 告警与诊断API
    pub alert_api: Arc<AlertApi>,

    /// 维修排期API
    pub maintenance_api: Arc<MaintenanceApi>,

    /// 车队台账API
    pub fleet_api: Arc<FleetApi>,

    /// 报表API
    pub report_api: Arc<ReportApi>,

    /// 配置管理API
    pub config_api: Arc<ConfigApi>,

    /// 时钟（报表 "今日" 取值）
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并初始化表结构
    /// 2. 读取配置参数并初始化所有Engine
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        crate::db::init_schema(&conn).map_err(|e| format!("无法初始化表结构: {}", e))?;

        let publisher = OptionalEventPublisher::with_publisher(Arc::new(TracingEventPublisher));
        let mut state = Self::from_connection(
            Arc::new(Mutex::new(conn)),
            Arc::new(SystemClock),
            publisher,
        )?;
        state.db_path = db_path;
        Ok(state)
    }

    /// 基于已有连接组装（测试注入固定时钟与记录型发布者）
    ///
    /// 连接需已完成 `init_schema`
    pub fn from_connection(
        conn: Arc<Mutex<Connection>>,
        clock: Arc<dyn Clock>,
        events: OptionalEventPublisher,
    ) -> Result<Self, String> {
        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));
        let diagnostic_profile = config_manager
            .get_diagnostic_profile()
            .map_err(|e| format!("无法读取诊断参数: {}", e))?;
        let health_thresholds = config_manager
            .get_health_thresholds()
            .map_err(|e| format!("无法读取健康度阈值: {}", e))?;
        let priority_profile = config_manager
            .get_priority_profile()
            .map_err(|e| format!("无法读取优先级参数: {}", e))?;
        let scheduling_profile = config_manager
            .get_scheduling_profile()
            .map_err(|e| format!("无法读取排期参数: {}", e))?;

        // ==========================================
        // Repository 与 Engine
        // ==========================================
        let repos = FleetRepositories::from_connection(conn);
        let diagnostic_engine = Arc::new(DiagnosticEngine::new(diagnostic_profile));
        let prioritizer = Arc::new(MaintenancePrioritizer::new(priority_profile));
        let health = Arc::new(HealthEvaluator::new(health_thresholds));
        let locks = Arc::new(VehicleWriteLocks::new());

        // ==========================================
        // API
        // ==========================================
        let occurrence_api = Arc::new(OccurrenceApi::new(
            repos.clone(),
            diagnostic_engine,
            prioritizer.clone(),
            scheduling_profile,
            clock.clone(),
            events.clone(),
            locks.clone(),
        ));
        let alert_api = Arc::new(AlertApi::new(repos.clone(), clock.clone(), events.clone()));
        let maintenance_api = Arc::new(MaintenanceApi::new(
            repos.clone(),
            prioritizer,
            clock.clone(),
            events.clone(),
            locks.clone(),
        ));
        let fleet_api = Arc::new(FleetApi::new(
            repos.clone(),
            health,
            clock.clone(),
            events,
            locks,
        ));
        let report_api = Arc::new(ReportApi::new(repos));
        let config_api = Arc::new(ConfigApi::new(config_manager));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path: String::new(),
            occurrence_api,
            alert_api,
            maintenance_api,
            fleet_api,
            report_api,
            config_api,
            clock,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先读取环境变量 FLEETPRED_DB_PATH，否则使用用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("FLEETPRED_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./fleetpred.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("fleetpred");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("fleetpred.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_bootstraps_empty_database() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let db_path = file.path().to_str().unwrap().to_string();

        let state = AppState::new(db_path.clone()).unwrap();
        assert_eq!(state.db_path, db_path);
        assert!(state.fleet_api.list_vehicles().unwrap().is_empty());
        assert!(state.maintenance_api.get_priority_queue().unwrap().is_empty());
    }
}
