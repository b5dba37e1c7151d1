// ==========================================
// 车队预测性维护系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod alert;
pub mod diagnostic;
pub mod maintenance;
pub mod occurrence;
pub mod report;
pub mod types;
pub mod vehicle;

// 重导出核心类型
pub use alert::{Alert, AlertDecision, AlertFilter, NewAlert};
pub use diagnostic::{Diagnostic, DiagnosticDraft};
pub use maintenance::{MaintenanceCompletion, MaintenanceItem, NewMaintenanceItem};
pub use occurrence::{NewOccurrence, Occurrence, OccurrenceSubmission};
pub use report::{CostByType, CostReport, DashboardStats, VehicleCost};
pub use types::{
    AlertType, MaintenanceStatus, MaintenanceType, OccurrenceStatus, Severity, VehicleStatus,
    VehicleSystem,
};
pub use vehicle::{Component, NewComponent, NewVehicle, Vehicle, VehicleDetail, VehicleSummary};
