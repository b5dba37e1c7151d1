// ==========================================
// 车队预测性维护系统 - 部件健康评估引擎
// ==========================================
// 职责: 健康度 → 车辆状态推导 / 阈值越界识别 / 巡检与里程校验
// 规则: 车辆状态取最差部件所在区间
//       critico: 任一部件 < critico 阈值
//       atencao: 任一部件 < atencao 阈值
//       ok: 其他
// ==========================================

use crate::config::fleet_profile::HealthThresholds;
use crate::domain::types::{AlertType, VehicleStatus};
use crate::domain::vehicle::{Component, Vehicle};
use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 健康阈值越界（告警分发的输入之一）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthBreach {
    pub vehicle_id: i64,
    pub component: String,
    pub health_pct: u8,
    pub alert_type: AlertType,
}

// ==========================================
// HealthEvaluator
// ==========================================
#[derive(Debug, Clone)]
pub struct HealthEvaluator {
    thresholds: HealthThresholds,
}

impl HealthEvaluator {
    pub fn new(thresholds: HealthThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &HealthThresholds {
        &self.thresholds
    }

    /// 单个健康度对应的区间
    pub fn status_for_health(&self, health_pct: u8) -> VehicleStatus {
        if health_pct < self.thresholds.critico {
            VehicleStatus::Critico
        } else if health_pct < self.thresholds.atencao {
            VehicleStatus::Atencao
        } else {
            VehicleStatus::Ok
        }
    }

    /// 车辆状态 = 各部件区间的最大值（无部件时为 ok）
    pub fn vehicle_status(&self, components: &[Component]) -> VehicleStatus {
        components
            .iter()
            .map(|c| self.status_for_health(c.health_pct))
            .max()
            .unwrap_or(VehicleStatus::Ok)
    }

    /// 部件是否越界；越界时给出告警类型
    pub fn detect_breach(&self, component: &Component) -> Option<HealthBreach> {
        let alert_type = match self.status_for_health(component.health_pct) {
            VehicleStatus::Critico => AlertType::Critico,
            VehicleStatus::Atencao => AlertType::Atencao,
            VehicleStatus::Ok => return None,
        };

        Some(HealthBreach {
            vehicle_id: component.vehicle_id,
            component: component.name.clone(),
            health_pct: component.health_pct,
            alert_type,
        })
    }

    /// 批量识别越界部件
    pub fn detect_breaches(&self, components: &[Component]) -> Vec<HealthBreach> {
        components
            .iter()
            .filter_map(|c| self.detect_breach(c))
            .collect()
    }

    // ==========================================
    // 输入校验
    // ==========================================

    /// 健康度必须在 [0,100]
    pub fn validate_health(&self, health_pct: u8) -> EngineResult<()> {
        if health_pct > 100 {
            return Err(EngineError::InvalidInput(format!(
                "健康度超出范围 [0,100]: {}",
                health_pct
            )));
        }
        Ok(())
    }

    /// 巡检记录不得早于已存的最近巡检日期
    pub fn validate_inspection(
        &self,
        component: &Component,
        health_pct: u8,
        inspected_on: NaiveDate,
    ) -> EngineResult<()> {
        self.validate_health(health_pct)?;

        if let Some(last) = component.last_inspection {
            if inspected_on < last {
                return Err(EngineError::InvalidInput(format!(
                    "巡检日期 {} 早于部件 {} 的最近巡检 {}",
                    inspected_on, component.name, last
                )));
            }
        }
        Ok(())
    }

    /// 里程单调不减
    pub fn validate_odometer(&self, vehicle: &Vehicle, odometer_km: f64) -> EngineResult<()> {
        if !odometer_km.is_finite() || odometer_km < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "里程无效: {}",
                odometer_km
            )));
        }
        if odometer_km < vehicle.odometer_km {
            return Err(EngineError::InvalidInput(format!(
                "里程不可回退: 车辆 {} 当前 {} km, 提交 {} km",
                vehicle.plate, vehicle.odometer_km, odometer_km
            )));
        }
        Ok(())
    }
}

impl Default for HealthEvaluator {
    fn default() -> Self {
        Self::new(HealthThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(id: i64, name: &str, health: u8) -> Component {
        Component {
            id,
            vehicle_id: 1,
            name: name.to_string(),
            health_pct: health,
            last_inspection: NaiveDate::from_ymd_opt(2026, 3, 1),
        }
    }

    #[test]
    fn test_vehicle_status_takes_worst_bucket() {
        let evaluator = HealthEvaluator::default();

        let healthy = vec![component(1, "Motor", 92), component(2, "Freios", 80)];
        assert_eq!(evaluator.vehicle_status(&healthy), VehicleStatus::Ok);

        let warning = vec![component(1, "Motor", 92), component(2, "Freios", 79)];
        assert_eq!(evaluator.vehicle_status(&warning), VehicleStatus::Atencao);

        let critical = vec![component(1, "Motor", 49), component(2, "Freios", 60)];
        assert_eq!(evaluator.vehicle_status(&critical), VehicleStatus::Critico);

        assert_eq!(evaluator.vehicle_status(&[]), VehicleStatus::Ok);
    }

    #[test]
    fn test_custom_thresholds() {
        let evaluator = HealthEvaluator::new(HealthThresholds {
            critico: 30,
            atencao: 60,
        });
        assert_eq!(evaluator.status_for_health(45), VehicleStatus::Atencao);
        assert_eq!(evaluator.status_for_health(29), VehicleStatus::Critico);
        assert_eq!(evaluator.status_for_health(60), VehicleStatus::Ok);
    }

    #[test]
    fn test_detect_breaches() {
        let evaluator = HealthEvaluator::default();
        let components = vec![
            component(1, "Motor", 95),
            component(2, "Freios", 40),
            component(3, "Pneus", 70),
        ];

        let breaches = evaluator.detect_breaches(&components);
        assert_eq!(breaches.len(), 2);
        assert_eq!(breaches[0].component, "Freios");
        assert_eq!(breaches[0].alert_type, AlertType::Critico);
        assert_eq!(breaches[1].alert_type, AlertType::Atencao);
    }

    #[test]
    fn test_inspection_cannot_go_back_in_time() {
        let evaluator = HealthEvaluator::default();
        let freios = component(2, "Freios", 70);

        let earlier = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let later = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

        assert!(evaluator.validate_inspection(&freios, 65, earlier).is_err());
        assert!(evaluator.validate_inspection(&freios, 65, later).is_ok());
        assert!(evaluator.validate_inspection(&freios, 101, later).is_err());
    }

    #[test]
    fn test_odometer_is_non_decreasing() {
        let evaluator = HealthEvaluator::default();
        let vehicle = Vehicle {
            id: 1,
            plate: "ABC-1234".to_string(),
            model: "Scania R450".to_string(),
            year: 2021,
            engine: "DC13".to_string(),
            odometer_km: 245_000.0,
            registered_on: NaiveDate::from_ymd_opt(2021, 4, 10).unwrap(),
            last_oil_change_km: Some(240_000.0),
            status: VehicleStatus::Ok,
            active: true,
        };

        assert!(evaluator.validate_odometer(&vehicle, 245_000.0).is_ok());
        assert!(evaluator.validate_odometer(&vehicle, 246_500.0).is_ok());
        assert!(matches!(
            evaluator.validate_odometer(&vehicle, 244_999.0),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(evaluator.validate_odometer(&vehicle, f64::NAN).is_err());
    }
}
