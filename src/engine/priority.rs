// ==========================================
// 车队预测性维护系统 - 维修优先级引擎
// ==========================================
// 职责: 待处理维修项 → 全序优先级队列 + 周视图
// 输入: 待处理维修项快照 + 注入的 "今天"
// 输出: 排序后的维修项列表 / 周一至周日日期分桶
// 红线: 排序为全序且稳定，同输入同输出
// 红线: 缺少排期日期的维修项在入库时拒绝，不在排序中静默丢弃
// ==========================================

mod core;

#[cfg(test)]
mod tests;

pub use core::{week_bounds, MaintenancePrioritizer};
