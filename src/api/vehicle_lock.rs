// ==========================================
// 车队预测性维护系统 - 单车写入串行化
// ==========================================
// 职责: 同一车辆的 "读未读告警 → 决策 → 写入" 串行执行
// 红线: 不同车辆互不阻塞
// ==========================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::error::{ApiError, ApiResult};

/// 按车辆 id 分片的写锁表
#[derive(Default)]
pub struct VehicleWriteLocks {
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl VehicleWriteLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取得车辆的锁句柄（首次访问时创建）
    pub fn handle(&self, vehicle_id: i64) -> ApiResult<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|e| ApiError::InternalError(format!("车辆锁表获取失败: {}", e)))?;
        Ok(locks
            .entry(vehicle_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }
}

/// 锁定句柄并返回守卫
pub fn acquire(handle: &Arc<Mutex<()>>) -> ApiResult<MutexGuard<'_, ()>> {
    handle
        .lock()
        .map_err(|e| ApiError::InternalError(format!("车辆写锁获取失败: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_vehicle_shares_handle() {
        let locks = VehicleWriteLocks::new();
        let a = locks.handle(7).unwrap();
        let b = locks.handle(7).unwrap();
        let c = locks.handle(8).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_acquire_releases_on_drop() {
        let locks = VehicleWriteLocks::new();
        let handle = locks.handle(1).unwrap();
        {
            let _guard = acquire(&handle).unwrap();
            assert!(handle.try_lock().is_err());
        }
        assert!(handle.try_lock().is_ok());
    }
}
