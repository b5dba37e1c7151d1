use crate::config::fleet_profile::DiagnosticProfile;
use serde::{Deserialize, Serialize};

/// 评分输入特征
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FailureFeatures {
    /// 上报严重度的序数权重
    pub severity_weight: f64,
    /// 健康缺口 (100 - health) / 100；健康度缺失时为中性值
    pub health_deficit: f64,
    /// 历史事件中与本次共享症状的比例
    pub history_correlation: f64,
}

/// 失效概率评分接口
///
/// 引擎会把返回值钳制到 [0,1]，实现方无需自行处理越界。
pub trait FailureScorer: Send + Sync {
    fn score(&self, features: &FailureFeatures) -> f64;
}

/// 加权线性评分（默认实现）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedScorer {
    pub health_weight: f64,
    pub history_weight: f64,
}

impl WeightedScorer {
    pub fn from_profile(profile: &DiagnosticProfile) -> Self {
        Self {
            health_weight: profile.health_weight,
            history_weight: profile.history_weight,
        }
    }
}

impl FailureScorer for WeightedScorer {
    fn score(&self, features: &FailureFeatures) -> f64 {
        features.severity_weight
            + self.health_weight * features.health_deficit
            + self.history_weight * features.history_correlation
    }
}

/// 钳制到 [0,1] 并保留 4 位小数（NaN 视为 0）
pub(super) fn normalize_probability(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    let clamped = raw.clamp(0.0, 1.0);
    (clamped * 10_000.0).round() / 10_000.0
}

/// 预计失效天数: round(max * (1 - p)) + 1，下限 1 天
pub(super) fn horizon_days(probability: f64, horizon_max_days: u32) -> u32 {
    let scaled = (f64::from(horizon_max_days) * (1.0 - probability)).round();
    let days = if scaled.is_finite() && scaled > 0.0 {
        (scaled as u32).saturating_add(1)
    } else {
        1
    };
    days.max(1)
}

/// 预计节省: max(0, p × 纠正成本 − 预测成本)，保留到分
pub(super) fn estimated_savings(probability: f64, predictive_cost: f64, corrective_cost: f64) -> f64 {
    let avoided = probability * corrective_cost - predictive_cost;
    if avoided <= 0.0 {
        return 0.0;
    }
    (avoided * 100.0).round() / 100.0
}
