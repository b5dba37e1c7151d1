// ==========================================
// 车队预测性维护系统 - 引擎层事件发布
// ==========================================
// 职责: 定义车队事件发布 trait
// 说明: 提交入账、告警变更、维修状态变更后发布
// 红线: 发布失败只记录日志，不回滚已提交的写入
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// 车队事件类型
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FleetEventKind {
    /// 事件入账并完成诊断
    OccurrenceDiagnosed,
    /// 新建告警
    AlertCreated,
    /// 未读告警就地更新
    AlertUpdated,
    /// 告警标记已读
    AlertRead,
    /// 维修排期
    MaintenanceScheduled,
    /// 维修完工
    MaintenanceCompleted,
    /// 维修转为逾期
    MaintenanceOverdue,
    /// 车辆入队
    VehicleRegistered,
    /// 部件巡检 / 里程 / 停用
    VehicleUpdated,
}

impl FleetEventKind {
    pub fn as_str(&self) -> &str {
        match self {
            FleetEventKind::OccurrenceDiagnosed => "OccurrenceDiagnosed",
            FleetEventKind::AlertCreated => "AlertCreated",
            FleetEventKind::AlertUpdated => "AlertUpdated",
            FleetEventKind::AlertRead => "AlertRead",
            FleetEventKind::MaintenanceScheduled => "MaintenanceScheduled",
            FleetEventKind::MaintenanceCompleted => "MaintenanceCompleted",
            FleetEventKind::MaintenanceOverdue => "MaintenanceOverdue",
            FleetEventKind::VehicleRegistered => "VehicleRegistered",
            FleetEventKind::VehicleUpdated => "VehicleUpdated",
        }
    }
}

/// 车队事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetEvent {
    pub event_id: String,
    pub kind: FleetEventKind,
    pub vehicle_id: Option<i64>,
    /// 相关记录 id（事件/告警/维修项）
    pub record_id: Option<i64>,
    pub occurred_at: NaiveDateTime,
}

impl FleetEvent {
    pub fn new(
        kind: FleetEventKind,
        vehicle_id: Option<i64>,
        record_id: Option<i64>,
        occurred_at: NaiveDateTime,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            kind,
            vehicle_id,
            record_id,
            occurred_at,
        }
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 车队事件发布者
///
/// # 返回
/// - `Ok(event_id)`: 已发布事件的 id
/// - `Err`: 发布失败
pub trait FleetEventPublisher: Send + Sync {
    fn publish(&self, event: FleetEvent) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// 默认发布者：只写 tracing 日志
#[derive(Debug, Clone, Default)]
pub struct TracingEventPublisher;

impl FleetEventPublisher for TracingEventPublisher {
    fn publish(&self, event: FleetEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        tracing::info!(
            event_id = %event.event_id,
            kind = event.kind.as_str(),
            vehicle_id = ?event.vehicle_id,
            record_id = ?event.record_id,
            "车队事件"
        );
        Ok(event.event_id)
    }
}

/// 空操作事件发布者（单元测试用）
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl FleetEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: FleetEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpEventPublisher: 跳过事件发布 - kind={}",
            event.kind.as_str()
        );
        Ok(String::new())
    }
}

/// 记录型发布者：保存已发布事件，便于断言
#[derive(Debug, Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<FleetEvent>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已发布事件的快照
    pub fn events(&self) -> Vec<FleetEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn kinds(&self) -> Vec<FleetEventKind> {
        self.events().into_iter().map(|e| e.kind).collect()
    }
}

impl FleetEventPublisher for RecordingEventPublisher {
    fn publish(&self, event: FleetEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        let id = event.event_id.clone();
        self.events
            .lock()
            .map_err(|e| format!("事件记录锁中毒: {}", e))?
            .push(event);
        Ok(id)
    }
}

/// 可选的事件发布者包装
///
/// 发布失败只告警，不向调用方传播
#[derive(Clone)]
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn FleetEventPublisher>>,
}

impl OptionalEventPublisher {
    pub fn with_publisher(publisher: Arc<dyn FleetEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    /// 发布事件（如果有发布者）
    pub fn publish(&self, event: FleetEvent) {
        let Some(publisher) = &self.inner else {
            tracing::debug!(
                "OptionalEventPublisher: 未配置发布者，跳过事件 - kind={}",
                event.kind.as_str()
            );
            return;
        };

        let kind = event.kind;
        if let Err(e) = publisher.publish(event) {
            tracing::warn!(kind = kind.as_str(), error = %e, "事件发布失败");
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 4)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = FleetEvent::new(FleetEventKind::AlertCreated, Some(1), Some(2), at());
        let b = FleetEvent::new(FleetEventKind::AlertCreated, Some(1), Some(2), at());
        assert_ne!(a.event_id, b.event_id);
        assert!(Uuid::parse_str(&a.event_id).is_ok());
    }

    #[test]
    fn test_tracing_publisher_returns_event_id() {
        let event = FleetEvent::new(FleetEventKind::MaintenanceScheduled, Some(3), Some(8), at());
        let id = event.event_id.clone();
        assert_eq!(TracingEventPublisher.publish(event).unwrap(), id);
    }

    #[test]
    fn test_noop_publisher() {
        let event = FleetEvent::new(FleetEventKind::AlertRead, None, Some(1), at());
        assert!(NoOpEventPublisher.publish(event).unwrap().is_empty());
    }

    #[test]
    fn test_optional_publisher_forwards_to_recorder() {
        let recorder = Arc::new(RecordingEventPublisher::new());
        let publisher = OptionalEventPublisher::with_publisher(recorder.clone());
        assert!(publisher.is_configured());

        publisher.publish(FleetEvent::new(FleetEventKind::OccurrenceDiagnosed, Some(1), Some(5), at()));
        publisher.publish(FleetEvent::new(FleetEventKind::AlertCreated, Some(1), Some(9), at()));

        assert_eq!(
            recorder.kinds(),
            vec![FleetEventKind::OccurrenceDiagnosed, FleetEventKind::AlertCreated]
        );
    }

    #[test]
    fn test_optional_publisher_none() {
        let publisher = OptionalEventPublisher::none();
        assert!(!publisher.is_configured());
        publisher.publish(FleetEvent::new(FleetEventKind::VehicleRegistered, Some(1), None, at()));
    }
}
