// ==========================================
// 车队预测性维护系统 - API 层
// ==========================================
// 职责: 对外暴露的业务操作（供命令行或 HTTP 层调用）
// 红线: 错误在此记录后原样返回，不吞掉
// ==========================================

pub mod alert_api;
pub mod config_api;
pub mod error;
pub mod fleet_api;
pub mod maintenance_api;
pub mod occurrence_api;
pub mod report_api;
pub mod vehicle_lock;

// 重导出核心类型
pub use alert_api::AlertApi;
pub use config_api::ConfigApi;
pub use error::{ApiError, ApiResult};
pub use fleet_api::{FleetApi, InspectionResponse};
pub use maintenance_api::MaintenanceApi;
pub use occurrence_api::{OccurrenceApi, SubmitOccurrenceResponse};
pub use report_api::ReportApi;
pub use vehicle_lock::VehicleWriteLocks;
