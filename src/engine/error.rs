// ==========================================
// 车队预测性维护系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 引擎错误均为同步、确定性错误，不做内部重试
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 必填字段缺失、症状为空或不在该系统词表内
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 系统没有对应的部件映射
    #[error("系统未映射到部件: {system}")]
    UnmappedSystem { system: String },

    /// 维修项缺少排期日期
    #[error("排期不完整: {0}")]
    IncompleteSchedule(String),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
