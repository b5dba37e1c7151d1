use super::scoring::{
    estimated_savings, horizon_days, normalize_probability, FailureFeatures, FailureScorer,
    WeightedScorer,
};
use crate::config::fleet_profile::DiagnosticProfile;
use crate::domain::diagnostic::DiagnosticDraft;
use crate::domain::maintenance::NewMaintenanceItem;
use crate::domain::occurrence::{NewOccurrence, Occurrence, OccurrenceSubmission};
use crate::domain::types::{MaintenanceType, Severity};
use crate::engine::catalog::SymptomCatalog;
use crate::engine::error::{EngineError, EngineResult};
use chrono::{Duration, NaiveDate};
use tracing::{debug, instrument};

// ==========================================
// DiagnosticEngine - 诊断引擎
// ==========================================
pub struct DiagnosticEngine {
    profile: DiagnosticProfile,
    catalog: SymptomCatalog,
    scorer: Box<dyn FailureScorer>,
}

impl DiagnosticEngine {
    /// 默认目录 + 加权评分
    pub fn new(profile: DiagnosticProfile) -> Self {
        let scorer = WeightedScorer::from_profile(&profile);
        Self {
            profile,
            catalog: SymptomCatalog::standard(),
            scorer: Box::new(scorer),
        }
    }

    /// 替换目录与评分实现
    pub fn with_scorer(
        profile: DiagnosticProfile,
        catalog: SymptomCatalog,
        scorer: Box<dyn FailureScorer>,
    ) -> Self {
        Self {
            profile,
            catalog,
            scorer,
        }
    }

    pub fn profile(&self) -> &DiagnosticProfile {
        &self.profile
    }

    pub fn catalog(&self) -> &SymptomCatalog {
        &self.catalog
    }

    // ==========================================
    // 上报校验
    // ==========================================

    /// 校验上报并规范化为待入账事件
    ///
    /// # 返回
    /// - Err(InvalidInput): 描述为空、症状为空或越出词表、里程无效
    /// - Err(UnmappedSystem): 系统不在目录中
    pub fn validate_submission(
        &self,
        submission: &OccurrenceSubmission,
        occurred_on: NaiveDate,
    ) -> EngineResult<NewOccurrence> {
        let description = submission.description.trim();
        if description.is_empty() {
            return Err(EngineError::InvalidInput("描述不能为空".to_string()));
        }
        if submission.symptoms.is_empty() {
            return Err(EngineError::InvalidInput("症状集合不能为空".to_string()));
        }
        if !submission.odometer_km.is_finite() || submission.odometer_km < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "里程无效: {}",
                submission.odometer_km
            )));
        }

        let profile = self.catalog.profile_by_label(&submission.system)?;
        let symptoms = profile.canonicalize_symptoms(&submission.symptoms)?;

        Ok(NewOccurrence {
            vehicle_id: submission.vehicle_id,
            system: profile.system,
            symptoms,
            description: description.to_string(),
            severity: submission.severity,
            odometer_km: submission.odometer_km,
            occurred_on,
        })
    }

    // ==========================================
    // 诊断计算
    // ==========================================

    /// 由事件推导诊断
    ///
    /// # 参数
    /// - `occurrence`: 待诊断事件
    /// - `current_health`: 目标系统部件的当前健康度（缺失时取中性缺口）
    /// - `history`: 同车历史事件（可含其他系统，内部过滤）
    ///
    /// # 返回
    /// 诊断草稿；不修改事件与健康度
    #[instrument(skip(self, occurrence, history), fields(
        vehicle_id = occurrence.vehicle_id,
        system = %occurrence.system,
        history_len = history.len()
    ))]
    pub fn diagnose(
        &self,
        occurrence: &Occurrence,
        current_health: Option<u8>,
        history: &[Occurrence],
    ) -> EngineResult<DiagnosticDraft> {
        let system_profile = self.catalog.profile(occurrence.system)?;
        let symptoms = system_profile.canonicalize_symptoms(&occurrence.symptoms)?;

        // 1. 同车同系统、早于或等于本次日期的历史事件
        let prior: Vec<&Occurrence> = history
            .iter()
            .filter(|h| {
                h.vehicle_id == occurrence.vehicle_id
                    && h.system == occurrence.system
                    && h.id != occurrence.id
                    && h.occurred_on <= occurrence.occurred_on
            })
            .collect();
        let sharing = prior
            .iter()
            .filter(|h| h.shares_symptom_with(&symptoms))
            .count();
        let history_correlation = if prior.is_empty() {
            0.0
        } else {
            sharing as f64 / prior.len() as f64
        };

        // 2. 评分
        let health_deficit = match current_health {
            Some(h) => f64::from(100 - h.min(100)) / 100.0,
            None => self.profile.neutral_health_deficit,
        };
        let features = FailureFeatures {
            severity_weight: self.profile.severity_weights.weight_of(occurrence.severity),
            health_deficit,
            history_correlation,
        };
        let probability = normalize_probability(self.scorer.score(&features));

        // 3. 预计天数
        let horizon = horizon_days(probability, self.profile.horizon_max_days);

        // 4. 严重度（不低于概率区间）
        let band_severity = self.profile.bands.severity_for(probability);
        let high_mileage = self
            .profile
            .high_mileage_km
            .map(|limit| occurrence.odometer_km > limit)
            .unwrap_or(false);
        let severity = if high_mileage && band_severity == Severity::Media {
            band_severity.escalate()
        } else {
            band_severity
        };

        // 5. 相关症状 = 本次症状 ∪ 回溯窗口内的历史症状
        let window_start = Duration::try_days(self.profile.lookback_days)
            .and_then(|span| occurrence.occurred_on.checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN);
        let mut correlated = symptoms.clone();
        for past in prior.iter().filter(|h| h.occurred_on >= window_start) {
            for symptom in &past.symptoms {
                let key = symptom.trim().to_lowercase();
                if !correlated.iter().any(|c| c.to_lowercase() == key) {
                    correlated.push(symptom.trim().to_string());
                }
            }
        }

        // 6. 目标部件、备件、节省
        let target = system_profile.resolve_target(&symptoms);
        let savings = estimated_savings(
            probability,
            system_profile.predictive_cost,
            system_profile.corrective_cost,
        );

        let justification = build_justification(
            prior.len(),
            sharing,
            system_profile.health_component,
            current_health,
            (severity != band_severity).then_some(occurrence.odometer_km),
        );

        debug!(
            probability,
            horizon,
            severity = %severity,
            prior = prior.len(),
            sharing,
            "诊断计算完成"
        );

        Ok(DiagnosticDraft {
            vehicle_id: occurrence.vehicle_id,
            system: occurrence.system,
            health_component: system_profile.health_component.to_string(),
            component: target.component.to_string(),
            failure_probability: probability,
            severity,
            horizon_days: horizon,
            correlated_symptoms: correlated,
            recommended_parts: target.parts.iter().map(|p| p.to_string()).collect(),
            estimated_savings: savings,
            recommendation: target.recommendation.to_string(),
            model_version: self.profile.model_version.clone(),
            justification,
        })
    }

    // ==========================================
    // 诊断触发排期
    // ==========================================

    /// 概率达到阈值时提议一条预测性维修
    ///
    /// 排期日 = 提交日 + ceil(horizon / 2)，至少 1 天
    pub fn propose_maintenance(
        &self,
        draft: &DiagnosticDraft,
        submitted_on: NaiveDate,
        threshold: f64,
    ) -> Option<NewMaintenanceItem> {
        if draft.failure_probability < threshold {
            return None;
        }

        let offset = i64::from(draft.horizon_days.div_ceil(2).max(1));
        Some(NewMaintenanceItem {
            vehicle_id: draft.vehicle_id,
            item_type: MaintenanceType::Preditiva,
            description: format!("Manutenção preditiva: {}", draft.component),
            scheduled_date: Some(
                submitted_on
                    .checked_add_signed(Duration::days(offset))
                    .unwrap_or(NaiveDate::MAX),
            ),
            diagnostic_id: None,
            failure_probability: Some(draft.failure_probability),
        })
    }
}

impl Default for DiagnosticEngine {
    fn default() -> Self {
        Self::new(DiagnosticProfile::default())
    }
}

fn build_justification(
    prior: usize,
    sharing: usize,
    health_component: &str,
    current_health: Option<u8>,
    escalated_at_km: Option<f64>,
) -> String {
    let mut text = format!(
        "Baseado em {} ocorrência(s) anterior(es) deste sistema no veículo, {} com sintomas em comum.",
        prior, sharing
    );
    match current_health {
        Some(h) => text.push_str(&format!(" Saúde atual de {}: {}%.", health_component, h)),
        None => text.push_str(&format!(
            " Saúde de {} não registrada; usado valor neutro.",
            health_component
        )),
    }
    if let Some(km) = escalated_at_km {
        text.push_str(&format!(
            " Severidade elevada pela quilometragem ({:.0} km).",
            km
        ));
    }
    text
}
