// ==========================================
// 车队预测性维护系统 - 诊断引擎
// ==========================================
// 职责: 事件 + 部件健康度 + 历史事件 → 失效概率诊断
// 输入: 已入账事件、目标部件健康度、同车历史事件
// 输出: DiagnosticDraft (概率/严重度/预计天数/备件/节省)
// 红线: 纯计算，不读系统时间，不写库
// 红线: 严重度不得低于概率区间对应的等级
// ==========================================
// 注: 评分函数通过 FailureScorer 注入，可替换为学习模型
// ==========================================

mod core;
mod scoring;


pub use core::DiagnosticEngine;
pub use scoring::{FailureFeatures, FailureScorer, WeightedScorer};
