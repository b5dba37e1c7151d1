// ==========================================
// 车队预测性维护系统 - 仓储层错误类型
// ==========================================
// 约束: 约束冲突按 SQLite 扩展错误码区分，不做字符串匹配
// ==========================================

use rusqlite::ffi;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("{entity}(id={id}) 不存在")]
    NotFound { entity: String, id: String },

    #[error("连接锁获取失败: {0}")]
    LockError(String),

    #[error("事务提交失败: {0}")]
    DatabaseTransactionError(String),

    #[error("SQL 执行失败: {0}")]
    DatabaseQueryError(String),

    /// 车牌重复、同车同名部件、同部件第二条未读告警
    #[error("唯一约束冲突: {0}")]
    UniqueConstraintViolation(String),

    /// 引用了不存在的车辆/事件/诊断
    #[error("外键约束冲突: {0}")]
    ForeignKeyViolation(String),

    /// 维修项状态机: 已完工的项不能再变更
    #[error("维修状态不可从 {from} 变为 {to}")]
    InvalidStateTransition { from: String, to: String },

    /// 字段无法解码（枚举文本、日期、JSON 列或配置值）
    #[error("字段 {field} 解码失败: {message}")]
    FieldValueError { field: String, message: String },

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl RepositoryError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, ref msg) = err {
            let detail = msg.clone().unwrap_or_else(|| code.to_string());
            match code.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return RepositoryError::UniqueConstraintViolation(detail)
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return RepositoryError::ForeignKeyViolation(detail)
                }
                _ => return RepositoryError::DatabaseQueryError(detail),
            }
        }
        match err {
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::not_found("row", "?"),
            other => RepositoryError::DatabaseQueryError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::FieldValueError {
            field: "json".to_string(),
            message: err.to_string(),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
