// ==========================================
// 车队预测性维护系统 - 引擎层
// ==========================================
// 职责: 实现诊断、告警、优先级等业务规则,不拼 SQL
// 红线: Engine 不拼 SQL, 不读系统时间 (Clock 注入)
// ==========================================

pub mod alert;
pub mod catalog;
pub mod clock;
pub mod diagnostic;
pub mod error;
pub mod events;
pub mod health;
pub mod priority;
pub mod repositories;

// 重导出核心引擎
pub use alert::{AlertDecision, AlertDispatcher, AlertSignal};
pub use catalog::{SymptomCatalog, SystemProfile, TargetProfile};
pub use clock::{Clock, FixedClock, SystemClock};
pub use diagnostic::{DiagnosticEngine, FailureFeatures, FailureScorer, WeightedScorer};
pub use error::{EngineError, EngineResult};
pub use events::{
    FleetEvent, FleetEventKind, FleetEventPublisher, NoOpEventPublisher, OptionalEventPublisher,
    RecordingEventPublisher, TracingEventPublisher,
};
pub use health::{HealthBreach, HealthEvaluator};
pub use priority::{week_bounds, MaintenancePrioritizer};
pub use repositories::{FleetRepositories, FleetSnapshotSource};
