// ==========================================
// 车队预测性维护系统 - 配置管理 API
// ==========================================
// 职责: 评分参数的查询与覆写
// 说明: 覆写后的参数在下次构建 AppState 时生效
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::{config_keys, ConfigManager};
use crate::config::fleet_profile::{
    DiagnosticProfile, HealthThresholds, PriorityProfile, SchedulingProfile,
};

/// 预计天数上限与回溯窗口的最大值（10 年）
const MAX_WINDOW_DAYS: u32 = 3650;

pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 全部已覆写配置的 JSON 快照
    pub fn get_config_snapshot(&self) -> ApiResult<String> {
        Ok(self.config_manager.get_config_snapshot()?)
    }

    pub fn get_diagnostic_profile(&self) -> ApiResult<DiagnosticProfile> {
        Ok(self.config_manager.get_diagnostic_profile()?)
    }

    /// 覆写诊断参数
    ///
    /// # 返回
    /// - Err(InvalidInput): 权重为负、区间未按 media < alta < critica 排列或天数为 0
    pub fn update_diagnostic_profile(&self, profile: &DiagnosticProfile) -> ApiResult<()> {
        let weights = &profile.severity_weights;
        let all_weights = [
            weights.baixa,
            weights.media,
            weights.alta,
            weights.critica,
            profile.health_weight,
            profile.history_weight,
        ];
        if all_weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ApiError::InvalidInput("权重必须为非负数".to_string()));
        }
        if !(0.0..=1.0).contains(&profile.neutral_health_deficit) {
            return Err(ApiError::InvalidInput(format!(
                "中性健康缺口超出范围 [0,1]: {}",
                profile.neutral_health_deficit
            )));
        }
        let bands = &profile.bands;
        if !(bands.media < bands.alta && bands.alta < bands.critica && bands.critica <= 1.0) {
            return Err(ApiError::InvalidInput(format!(
                "严重度区间需满足 media < alta < critica <= 1 (media={}, alta={}, critica={})",
                bands.media, bands.alta, bands.critica
            )));
        }
        if profile.horizon_max_days == 0 || profile.horizon_max_days > MAX_WINDOW_DAYS {
            return Err(ApiError::InvalidInput(format!(
                "预计天数上限需在 [1, {}] 内: {}",
                MAX_WINDOW_DAYS, profile.horizon_max_days
            )));
        }
        if profile.lookback_days <= 0 || profile.lookback_days > i64::from(MAX_WINDOW_DAYS) {
            return Err(ApiError::InvalidInput(format!(
                "回溯窗口需在 [1, {}] 内: {}",
                MAX_WINDOW_DAYS, profile.lookback_days
            )));
        }

        self.config_manager
            .update_profile(config_keys::DIAGNOSTIC_PROFILE, profile)?;
        info!(model_version = %profile.model_version, "诊断参数已更新");
        Ok(())
    }

    /// 覆写健康度阈值
    pub fn update_health_thresholds(&self, thresholds: &HealthThresholds) -> ApiResult<()> {
        if thresholds.critico > thresholds.atencao || thresholds.atencao > 100 {
            return Err(ApiError::InvalidInput(format!(
                "阈值需满足 critico <= atencao <= 100 (critico={}, atencao={})",
                thresholds.critico, thresholds.atencao
            )));
        }
        self.config_manager
            .update_profile(config_keys::HEALTH_THRESHOLDS, thresholds)?;
        info!(
            critico = thresholds.critico,
            atencao = thresholds.atencao,
            "健康度阈值已更新"
        );
        Ok(())
    }

    pub fn update_priority_profile(&self, profile: &PriorityProfile) -> ApiResult<()> {
        check_probability("predictive_high_threshold", profile.predictive_high_threshold)?;
        self.config_manager
            .update_profile(config_keys::PRIORITY_PROFILE, profile)?;
        Ok(())
    }

    pub fn update_scheduling_profile(&self, profile: &SchedulingProfile) -> ApiResult<()> {
        check_probability("auto_schedule_probability", profile.auto_schedule_probability)?;
        self.config_manager
            .update_profile(config_keys::SCHEDULING_PROFILE, profile)?;
        Ok(())
    }
}

fn check_probability(field: &str, value: f64) -> ApiResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ApiError::InvalidInput(format!(
            "{} 超出范围 [0,1]: {}",
            field, value
        )));
    }
    Ok(())
}
