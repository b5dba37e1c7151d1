// ==========================================
// 车队预测性维护系统 - 配置层
// ==========================================
// 职责: 评分权重与阈值的加载/覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod fleet_profile;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use fleet_profile::{
    DiagnosticProfile, HealthThresholds, PriorityProfile, SchedulingProfile, SeverityBands,
    SeverityWeights,
};
