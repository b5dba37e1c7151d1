use crate::domain::types::Severity;
use serde::{Deserialize, Serialize};

/// 诊断评分参数（持久化对象）
///
/// 存储位置：config_kv（scope_id='global'，key='diagnostic_profile'）
/// 缺省字段按 `Default` 补齐，便于只覆写部分权重。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticProfile {
    /// 上报严重度序数权重
    pub severity_weights: SeverityWeights,

    /// 部件健康缺口权重（(100 - health) / 100 乘以此值）
    pub health_weight: f64,

    /// 历史症状相关度权重
    pub history_weight: f64,

    /// 部件健康度缺失时使用的中性缺口
    pub neutral_health_deficit: f64,

    /// 严重度区间下限
    pub bands: SeverityBands,

    /// 概率为 0 时的最大预计天数
    pub horizon_max_days: u32,

    /// 相关症状回溯窗口（天）
    pub lookback_days: i64,

    /// 高里程上调阈值（km），None 表示不启用
    pub high_mileage_km: Option<f64>,

    /// 模型版本标签
    pub model_version: String,
}

impl Default for DiagnosticProfile {
    fn default() -> Self {
        Self {
            severity_weights: SeverityWeights::default(),
            health_weight: 0.3,
            history_weight: 0.1,
            neutral_health_deficit: 0.5,
            bands: SeverityBands::default(),
            horizon_max_days: 60,
            lookback_days: 180,
            high_mileage_km: Some(300_000.0),
            model_version: "weighted-v1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityWeights {
    pub baixa: f64,
    pub media: f64,
    pub alta: f64,
    pub critica: f64,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            baixa: 0.10,
            media: 0.25,
            alta: 0.40,
            critica: 0.60,
        }
    }
}

impl SeverityWeights {
    pub fn weight_of(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Baixa => self.baixa,
            Severity::Media => self.media,
            Severity::Alta => self.alta,
            Severity::Critica => self.critica,
        }
    }
}

/// 严重度区间（概率 >= 下限即命中）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityBands {
    pub critica: f64,
    pub alta: f64,
    pub media: f64,
}

impl Default for SeverityBands {
    fn default() -> Self {
        Self {
            critica: 0.7,
            alta: 0.5,
            media: 0.3,
        }
    }
}

impl SeverityBands {
    /// 概率对应的最低严重度
    pub fn severity_for(&self, probability: f64) -> Severity {
        if probability >= self.critica {
            Severity::Critica
        } else if probability >= self.alta {
            Severity::Alta
        } else if probability >= self.media {
            Severity::Media
        } else {
            Severity::Baixa
        }
    }
}

/// 部件健康度阈值（key='health_thresholds'）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthThresholds {
    /// 低于此值为 critico
    pub critico: u8,
    /// 低于此值为 atencao
    pub atencao: u8,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            critico: 50,
            atencao: 80,
        }
    }
}

/// 维修优先级参数（key='priority_profile'）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityProfile {
    /// 预测性维修进入高优先层的概率下限
    pub predictive_high_threshold: f64,
}

impl Default for PriorityProfile {
    fn default() -> Self {
        Self {
            predictive_high_threshold: 0.7,
        }
    }
}

/// 诊断触发排期参数（key='scheduling_profile'）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingProfile {
    /// 诊断概率达到此值时自动排一条预测性维修
    pub auto_schedule_probability: f64,
}

impl Default for SchedulingProfile {
    fn default() -> Self {
        Self {
            auto_schedule_probability: 0.5,
        }
    }
}
