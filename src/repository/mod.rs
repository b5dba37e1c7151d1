// ==========================================
// 车队预测性维护系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约束: 各仓储共享同一 Arc<Mutex<Connection>>
// ==========================================

pub mod alert_repo;
pub mod diagnostic_repo;
pub mod error;
pub mod maintenance_repo;
pub mod occurrence_repo;
pub mod report_repo;
pub(crate) mod row_codec;
pub mod transaction_repo;
pub mod vehicle_repo;

// 重导出核心仓储
pub use alert_repo::{AlertRepository, AlertWrite};
pub use diagnostic_repo::DiagnosticRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use maintenance_repo::MaintenanceRepository;
pub use occurrence_repo::OccurrenceRepository;
pub use report_repo::{ReportRepository, StatusBreakdown};
pub use transaction_repo::{
    FleetTransactionRepository, InspectionWrite, ScheduledFollowUp, SubmissionReceipt,
};
pub use vehicle_repo::{ComponentRepository, VehicleRepository};
