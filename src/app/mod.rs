// ==========================================
// 车队预测性维护系统 - 应用层
// ==========================================
// 职责: 组装 Repository / Engine / API
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
