// ==========================================
// 车队预测性维护系统 - 症状词表与部件目录
// ==========================================
// 职责: 系统 → 健康部件 / 诊断目标 / 备件 / 成本 的静态映射
// 说明: 症状匹配大小写不敏感，入账时统一为词表拼写
// ==========================================

use crate::domain::types::VehicleSystem;
use crate::engine::error::{EngineError, EngineResult};

/// 诊断目标（部件 + 推荐备件 + 建议）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetProfile {
    pub component: &'static str,
    pub parts: &'static [&'static str],
    pub recommendation: &'static str,
}

/// 单个系统的目录条目
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemProfile {
    pub system: VehicleSystem,
    /// 健康度表中的部件名
    pub health_component: &'static str,
    /// 该系统允许上报的症状
    pub symptoms: &'static [&'static str],
    /// 未命中细化规则时的诊断目标
    pub default_target: TargetProfile,
    /// 症状 → 更具体的诊断目标（按顺序匹配）
    pub refinements: &'static [(&'static str, TargetProfile)],
    /// 预测性干预成本 (BRL)
    pub predictive_cost: f64,
    /// 故障后纠正性维修成本 (BRL)
    pub corrective_cost: f64,
}

impl SystemProfile {
    /// 按上报症状选择诊断目标：第一个命中细化规则的症状优先
    pub fn resolve_target(&self, symptoms: &[String]) -> &TargetProfile {
        for symptom in symptoms {
            let key = symptom.trim().to_lowercase();
            if let Some((_, target)) = self
                .refinements
                .iter()
                .find(|(trigger, _)| trigger.to_lowercase() == key)
            {
                return target;
            }
        }
        &self.default_target
    }

    /// 校验并规范化症状集合
    ///
    /// # 返回
    /// - Ok(Vec<String>): 去重后的词表拼写（保持上报顺序）
    /// - Err(InvalidInput): 症状为空或不在词表内
    pub fn canonicalize_symptoms(&self, symptoms: &[String]) -> EngineResult<Vec<String>> {
        if symptoms.is_empty() {
            return Err(EngineError::InvalidInput("症状集合不能为空".to_string()));
        }

        let mut canonical: Vec<String> = Vec::with_capacity(symptoms.len());
        for raw in symptoms {
            let key = raw.trim().to_lowercase();
            if key.is_empty() {
                return Err(EngineError::InvalidInput("症状不能为空字符串".to_string()));
            }
            let known = self
                .symptoms
                .iter()
                .find(|s| s.to_lowercase() == key)
                .ok_or_else(|| {
                    EngineError::InvalidInput(format!(
                        "症状 '{}' 不属于系统 {} 的词表",
                        raw.trim(),
                        self.system
                    ))
                })?;
            if !canonical.iter().any(|c| c == known) {
                canonical.push(known.to_string());
            }
        }

        Ok(canonical)
    }
}

// ==========================================
// 静态目录
// ==========================================

const MOTOR: SystemProfile = SystemProfile {
    system: VehicleSystem::Motor,
    health_component: "Motor",
    symptoms: &[
        "Perda de potência",
        "Ruído anormal",
        "Fumaça excessiva",
        "Consumo elevado de óleo",
        "Vibração anormal",
    ],
    default_target: TargetProfile {
        component: "Motor (diagnóstico geral)",
        parts: &["Filtro combustível", "Velas de ignição", "Junta do coletor"],
        recommendation: "Realizar diagnóstico completo do motor com scanner OBD. \
                         Verificar compressão dos cilindros e sistema de injeção.",
    },
    refinements: &[
        (
            "Perda de potência",
            TargetProfile {
                component: "Turbocompressor",
                parts: &["Kit reparo turbo", "Mangueira intercooler", "Junta turbo"],
                recommendation: "Inspecionar turbocompressor para folga axial e vazamentos. \
                                 Verificar intercooler e mangueiras de pressão.",
            },
        ),
        (
            "Fumaça excessiva",
            TargetProfile {
                component: "Sistema de injeção",
                parts: &["Bico injetor", "Bomba alta pressão", "Filtro combustível"],
                recommendation: "Verificar bicos injetores e bomba de alta pressão. \
                                 Fumaça indica excesso de combustível ou injeção incorreta.",
            },
        ),
        (
            "Consumo elevado de óleo",
            TargetProfile {
                component: "Anéis de pistão / retentores",
                parts: &["Jogo de anéis", "Retentor de válvula", "Óleo 15W40"],
                recommendation: "Medir compressão e blow-by. Verificar retentores de válvula \
                                 e desgaste dos anéis.",
            },
        ),
    ],
    predictive_cost: 4500.0,
    corrective_cost: 28000.0,
};

const FREIOS: SystemProfile = SystemProfile {
    system: VehicleSystem::Freios,
    health_component: "Freios",
    symptoms: &[
        "Ruído ao frear",
        "Pedal longo",
        "Vibração",
        "Desgaste de lona/pastilha",
        "Aquecimento excessivo",
    ],
    default_target: TargetProfile {
        component: "Pastilhas e discos de freio",
        parts: &["Pastilhas de freio", "Discos de freio", "Flexíveis de freio"],
        recommendation: "Inspeção completa do sistema de freios: pastilhas, discos, \
                         flexíveis e cilindros.",
    },
    refinements: &[
        (
            "Ruído ao frear",
            TargetProfile {
                component: "Pastilhas e discos de freio",
                parts: &["Kit pastilhas eixo dianteiro", "Discos de freio", "Sensor de desgaste"],
                recommendation: "Substituição imediata de pastilhas. Verificar discos para \
                                 desgaste abaixo do mínimo e empenamento.",
            },
        ),
        (
            "Vibração",
            TargetProfile {
                component: "Discos de freio",
                parts: &["Discos de freio", "Pastilhas de freio", "Rolamento do cubo"],
                recommendation: "Retificar ou substituir discos de freio. Empenamento causa \
                                 vibração e reduz eficiência de frenagem.",
            },
        ),
        (
            "Pedal longo",
            TargetProfile {
                component: "Cilindro mestre / servo-freio",
                parts: &["Cilindro mestre", "Kit reparo servo-freio", "Fluido de freio"],
                recommendation: "Verificar nível de fluido, cilindro mestre e servo-freio. \
                                 Pedal longo pode indicar entrada de ar ou vazamento interno.",
            },
        ),
    ],
    predictive_cost: 2800.0,
    corrective_cost: 12000.0,
};

const ARREFECIMENTO: SystemProfile = SystemProfile {
    system: VehicleSystem::Arrefecimento,
    health_component: "Arrefecimento",
    symptoms: &[
        "Temperatura elevada",
        "Vazamento de líquido",
        "Ventilador não liga",
        "Consumo de líquido",
    ],
    default_target: TargetProfile {
        component: "Sistema de arrefecimento (diagnóstico geral)",
        parts: &["Mangueiras", "Abraçadeiras", "Líquido de arrefecimento"],
        recommendation: "Teste de pressão no sistema de arrefecimento. Verificar \
                         mangueiras, radiador e bomba d'água.",
    },
    refinements: &[
        (
            "Temperatura elevada",
            TargetProfile {
                component: "Bomba d'água",
                parts: &["Bomba d'água", "Termostato", "Líquido de arrefecimento"],
                recommendation: "Substituir bomba d'água com urgência. Superaquecimento pode \
                                 causar dano irreversível ao cabeçote e ao bloco.",
            },
        ),
        (
            "Vazamento de líquido",
            TargetProfile {
                component: "Radiador / mangueiras",
                parts: &["Radiador", "Kit mangueiras", "Abraçadeiras"],
                recommendation: "Localizar ponto de vazamento com teste de pressão. \
                                 Verificar radiador, mangueiras e conexões.",
            },
        ),
        (
            "Ventilador não liga",
            TargetProfile {
                component: "Embreagem viscosa / ventilador",
                parts: &["Embreagem viscosa", "Sensor de temperatura", "Relé do ventilador"],
                recommendation: "Testar acionamento do ventilador e sensor de temperatura.",
            },
        ),
    ],
    predictive_cost: 1800.0,
    corrective_cost: 9500.0,
};

const TRANSMISSAO: SystemProfile = SystemProfile {
    system: VehicleSystem::Transmissao,
    health_component: "Transmissão",
    symptoms: &[
        "Dificuldade de engate",
        "Ruído em marcha",
        "Trancos",
        "Patinação da embreagem",
    ],
    default_target: TargetProfile {
        component: "Transmissão (diagnóstico geral)",
        parts: &["Óleo de câmbio", "Filtro de câmbio", "Junta do cárter"],
        recommendation: "Verificar nível e qualidade do óleo de câmbio. \
                         Testar sincronizadores e engrenagens.",
    },
    refinements: &[
        (
            "Dificuldade de engate",
            TargetProfile {
                component: "Sincronizadores",
                parts: &["Kit sincronizadores", "Garfo de engate", "Óleo de câmbio"],
                recommendation: "Verificar sincronizadores e garfos de engate. \
                                 Pode ser necessária revisão do câmbio.",
            },
        ),
        (
            "Patinação da embreagem",
            TargetProfile {
                component: "Embreagem",
                parts: &["Kit embreagem completo", "Rolamento atuador", "Volante do motor"],
                recommendation: "Substituir kit de embreagem. Patinação indica disco \
                                 desgastado além do limite.",
            },
        ),
    ],
    predictive_cost: 5500.0,
    corrective_cost: 35000.0,
};

const SUSPENSAO: SystemProfile = SystemProfile {
    system: VehicleSystem::Suspensao,
    health_component: "Suspensão",
    symptoms: &[
        "Instabilidade",
        "Ruído em irregularidades",
        "Desgaste de molas",
        "Inclinação lateral",
    ],
    default_target: TargetProfile {
        component: "Suspensão (diagnóstico geral)",
        parts: &["Buchas", "Amortecedores", "Pinos e graxeiras"],
        recommendation: "Inspeção visual completa da suspensão. Verificar bolsas de ar, \
                         amortecedores e buchas.",
    },
    refinements: &[
        (
            "Instabilidade",
            TargetProfile {
                component: "Amortecedores / bolsas de ar",
                parts: &["Amortecedores", "Bolsas de ar", "Buchas do estabilizador"],
                recommendation: "Verificar amortecedores e bolsas de ar. Instabilidade \
                                 causa fadiga prematura em outros componentes.",
            },
        ),
        (
            "Desgaste de molas",
            TargetProfile {
                component: "Feixe de molas",
                parts: &["Feixe de molas", "Grampos", "Buchas do jumelo"],
                recommendation: "Substituir lâminas trincadas e verificar grampos do feixe.",
            },
        ),
    ],
    predictive_cost: 3200.0,
    corrective_cost: 15000.0,
};

// ==========================================
// SymptomCatalog - 目录查询入口
// ==========================================
#[derive(Debug, Clone)]
pub struct SymptomCatalog {
    profiles: Vec<SystemProfile>,
}

impl SymptomCatalog {
    /// 标准目录（五个系统）
    pub fn standard() -> Self {
        Self {
            profiles: vec![MOTOR, FREIOS, ARREFECIMENTO, TRANSMISSAO, SUSPENSAO],
        }
    }

    /// 自定义目录（测试或裁剪用）
    pub fn with_profiles(profiles: Vec<SystemProfile>) -> Self {
        Self { profiles }
    }

    /// 查找系统条目
    ///
    /// # 返回
    /// - Err(UnmappedSystem): 目录中无该系统，绝不静默回退
    pub fn profile(&self, system: VehicleSystem) -> EngineResult<&SystemProfile> {
        self.profiles
            .iter()
            .find(|p| p.system == system)
            .ok_or_else(|| EngineError::UnmappedSystem {
                system: system.label().to_string(),
            })
    }

    /// 从原始标签解析系统并查找条目
    pub fn profile_by_label(&self, label: &str) -> EngineResult<&SystemProfile> {
        let system = VehicleSystem::from_label(label).ok_or_else(|| EngineError::UnmappedSystem {
            system: label.trim().to_string(),
        })?;
        self.profile(system)
    }

    /// 某部件名对应的系统条目（健康告警定位诊断目标用）
    pub fn profile_for_component(&self, component: &str) -> Option<&SystemProfile> {
        let key = component.trim().to_lowercase();
        self.profiles
            .iter()
            .find(|p| p.health_component.to_lowercase() == key)
    }
}

impl Default for SymptomCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_system_is_mapped() {
        let catalog = SymptomCatalog::standard();
        for system in VehicleSystem::ALL {
            let profile = catalog.profile(system).unwrap();
            assert!(!profile.symptoms.is_empty());
            assert!(profile.corrective_cost > profile.predictive_cost);
        }
    }

    #[test]
    fn test_unknown_label_is_unmapped() {
        let catalog = SymptomCatalog::standard();
        let err = catalog.profile_by_label("Sistema Elétrico").unwrap_err();
        assert!(matches!(err, EngineError::UnmappedSystem { .. }));
    }

    #[test]
    fn test_reduced_catalog_reports_unmapped_system() {
        let catalog = SymptomCatalog::with_profiles(vec![MOTOR]);
        assert!(matches!(
            catalog.profile(VehicleSystem::Freios),
            Err(EngineError::UnmappedSystem { .. })
        ));
    }

    #[test]
    fn test_canonicalize_symptoms() {
        let catalog = SymptomCatalog::standard();
        let freios = catalog.profile(VehicleSystem::Freios).unwrap();

        let symptoms = vec![
            " ruído ao frear".to_string(),
            "PEDAL LONGO".to_string(),
            "Ruído ao frear".to_string(),
        ];
        let canonical = freios.canonicalize_symptoms(&symptoms).unwrap();
        assert_eq!(canonical, vec!["Ruído ao frear", "Pedal longo"]);

        let foreign = vec!["Temperatura elevada".to_string()];
        assert!(matches!(
            freios.canonicalize_symptoms(&foreign),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            freios.canonicalize_symptoms(&[]),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_first_refined_symptom_wins() {
        let catalog = SymptomCatalog::standard();
        let freios = catalog.profile(VehicleSystem::Freios).unwrap();

        let target = freios.resolve_target(&["Aquecimento excessivo".to_string(), "Pedal longo".to_string()]);
        assert_eq!(target.component, "Cilindro mestre / servo-freio");

        let target = freios.resolve_target(&["Aquecimento excessivo".to_string()]);
        assert_eq!(target.component, freios.default_target.component);
    }
}
