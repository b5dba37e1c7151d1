// ==========================================
// 车队预测性维护系统 - 领域类型定义
// ==========================================
// 序列化格式: 小写葡语标签 (与数据库 CHECK 约束一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 车辆状态 (Vehicle Status)
// ==========================================
// 由部件健康度推导: 取最差部件所在区间
// 顺序: Ok < Atencao < Critico
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Ok,      // 正常
    Atencao, // 关注
    Critico, // 危险
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl VehicleStatus {
    /// 从数据库字符串解析（未知值返回 None）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ok" => Some(VehicleStatus::Ok),
            "atencao" => Some(VehicleStatus::Atencao),
            "critico" => Some(VehicleStatus::Critico),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            VehicleStatus::Ok => "ok",
            VehicleStatus::Atencao => "atencao",
            VehicleStatus::Critico => "critico",
        }
    }
}

// ==========================================
// 严重度 (Severity)
// ==========================================
// 用于: 上报严重度 + 诊断严重度
// 顺序: Baixa < Media < Alta < Critica
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Baixa,   // 低
    Media,   // 中
    Alta,    // 高
    Critica, // 严重
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl Severity {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "baixa" => Some(Severity::Baixa),
            "media" | "média" => Some(Severity::Media),
            "alta" => Some(Severity::Alta),
            "critica" | "crítica" => Some(Severity::Critica),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            Severity::Baixa => "baixa",
            Severity::Media => "media",
            Severity::Alta => "alta",
            Severity::Critica => "critica",
        }
    }

    /// 上调一级（Critica 保持不变）
    pub fn escalate(self) -> Self {
        match self {
            Severity::Baixa => Severity::Media,
            Severity::Media => Severity::Alta,
            Severity::Alta | Severity::Critica => Severity::Critica,
        }
    }
}

// ==========================================
// 车辆系统 (Vehicle System)
// ==========================================
// 上报时选择的受影响系统; 标签为葡语原文
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VehicleSystem {
    #[serde(rename = "Motor")]
    Motor,
    #[serde(rename = "Freios")]
    Freios,
    #[serde(rename = "Arrefecimento")]
    Arrefecimento,
    #[serde(rename = "Transmissão")]
    Transmissao,
    #[serde(rename = "Suspensão")]
    Suspensao,
}

impl fmt::Display for VehicleSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl VehicleSystem {
    pub const ALL: [VehicleSystem; 5] = [
        VehicleSystem::Motor,
        VehicleSystem::Freios,
        VehicleSystem::Arrefecimento,
        VehicleSystem::Transmissao,
        VehicleSystem::Suspensao,
    ];

    /// 从标签解析（大小写不敏感，容忍缺失重音）
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "motor" => Some(VehicleSystem::Motor),
            "freios" => Some(VehicleSystem::Freios),
            "arrefecimento" => Some(VehicleSystem::Arrefecimento),
            "transmissão" | "transmissao" => Some(VehicleSystem::Transmissao),
            "suspensão" | "suspensao" => Some(VehicleSystem::Suspensao),
            _ => None,
        }
    }

    /// 葡语标签（也作为数据库存储值）
    pub fn label(&self) -> &'static str {
        match self {
            VehicleSystem::Motor => "Motor",
            VehicleSystem::Freios => "Freios",
            VehicleSystem::Arrefecimento => "Arrefecimento",
            VehicleSystem::Transmissao => "Transmissão",
            VehicleSystem::Suspensao => "Suspensão",
        }
    }
}

// ==========================================
// 告警类型 (Alert Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Info,    // 提示
    Atencao, // 关注
    Critico, // 危险
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl AlertType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "info" | "ok-info" => Some(AlertType::Info),
            "atencao" => Some(AlertType::Atencao),
            "critico" => Some(AlertType::Critico),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            AlertType::Info => "info",
            AlertType::Atencao => "atencao",
            AlertType::Critico => "critico",
        }
    }
}

// ==========================================
// 维修类型 (Maintenance Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceType {
    Preventiva, // 预防性
    Preditiva,  // 预测性
    Corretiva,  // 纠正性
}

impl fmt::Display for MaintenanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl MaintenanceType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "preventiva" => Some(MaintenanceType::Preventiva),
            "preditiva" => Some(MaintenanceType::Preditiva),
            "corretiva" => Some(MaintenanceType::Corretiva),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            MaintenanceType::Preventiva => "preventiva",
            MaintenanceType::Preditiva => "preditiva",
            MaintenanceType::Corretiva => "corretiva",
        }
    }
}

// ==========================================
// 维修状态 (Maintenance Status)
// ==========================================
// 状态机: Agendada → Concluida (终态)
//         Agendada → Atrasada → Concluida
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceStatus {
    Agendada,  // 已排期
    Atrasada,  // 已逾期
    Concluida, // 已完成
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl MaintenanceStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "agendada" => Some(MaintenanceStatus::Agendada),
            "atrasada" => Some(MaintenanceStatus::Atrasada),
            "concluida" | "concluída" => Some(MaintenanceStatus::Concluida),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::Agendada => "agendada",
            MaintenanceStatus::Atrasada => "atrasada",
            MaintenanceStatus::Concluida => "concluida",
        }
    }

    /// 是否仍待处理（参与优先级队列）
    pub fn is_pending(&self) -> bool {
        !matches!(self, MaintenanceStatus::Concluida)
    }
}

// ==========================================
// 事件处理状态 (Occurrence Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccurrenceStatus {
    Aberta,    // 新建
    EmAnalise, // 诊断中
    Resolvida, // 已解决
}

impl fmt::Display for OccurrenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl OccurrenceStatus {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "aberta" => Some(OccurrenceStatus::Aberta),
            "em_analise" => Some(OccurrenceStatus::EmAnalise),
            "resolvida" => Some(OccurrenceStatus::Resolvida),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            OccurrenceStatus::Aberta => "aberta",
            OccurrenceStatus::EmAnalise => "em_analise",
            OccurrenceStatus::Resolvida => "resolvida",
        }
    }
}
