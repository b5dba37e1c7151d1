// ==========================================
// 车队预测性维护系统 - API 层错误类型
// ==========================================
// 职责: 引擎与仓储错误 → 调用方可区分的错误类别
// 红线: 错误原样返回给调用方，不在 API 层吞掉
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// 请求本身不合法（空症状、健康度越界、里程回退、重复完工等）
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 上报的系统标签在症状目录中没有对应部件
    #[error("系统未映射到部件: {0}")]
    UnmappedSystem(String),

    /// 维修项缺少排期日期
    #[error("排期不完整: {0}")]
    IncompleteSchedule(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 与已有记录冲突（唯一键、外键）
    #[error("数据冲突: {0}")]
    Conflict(String),

    #[error("存储失败: {0}")]
    Storage(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 错误类别标识（供命令行 / 日志区分）
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "InvalidInput",
            ApiError::UnmappedSystem(_) => "UnmappedSystem",
            ApiError::IncompleteSchedule(_) => "IncompleteSchedule",
            ApiError::NotFound(_) => "NotFound",
            ApiError::Conflict(_) => "Conflict",
            ApiError::Storage(_) => "Storage",
            ApiError::InternalError(_) => "InternalError",
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            EngineError::UnmappedSystem { system } => ApiError::UnmappedSystem(system),
            EngineError::IncompleteSchedule(msg) => ApiError::IncompleteSchedule(msg),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            // 已完工维修项再次登记
            RepositoryError::InvalidStateTransition { .. } => ApiError::InvalidInput(err.to_string()),
            RepositoryError::UniqueConstraintViolation(_)
            | RepositoryError::ForeignKeyViolation(_) => ApiError::Conflict(err.to_string()),
            RepositoryError::FieldValueError { .. } => ApiError::InvalidInput(err.to_string()),
            RepositoryError::LockError(_)
            | RepositoryError::DatabaseTransactionError(_)
            | RepositoryError::DatabaseQueryError(_) => ApiError::Storage(err.to_string()),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
