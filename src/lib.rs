// ==========================================
// 车队预测性维护系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统 (维修由人工最终确认)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AlertType, MaintenanceStatus, MaintenanceType, OccurrenceStatus, Severity, VehicleStatus,
    VehicleSystem,
};

// 领域实体
pub use domain::{
    Alert, Component, Diagnostic, MaintenanceItem, Occurrence, OccurrenceSubmission, Vehicle,
};

// 引擎
pub use engine::{
    AlertDispatcher, DiagnosticEngine, HealthEvaluator, MaintenancePrioritizer, SymptomCatalog,
};

// API
pub use api::{AlertApi, ApiError, ApiResult, FleetApi, MaintenanceApi, OccurrenceApi, ReportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "FleetPred";
