// ==========================================
// 车队预测性维护系统 - 行解码辅助
// ==========================================
// 职责: TEXT 枚举列 / JSON 数组列 与领域类型之间的转换
// ==========================================

use rusqlite::types::Type;

/// 解析枚举列；未知取值作为列转换错误返回
pub(crate) fn decode_enum<T>(
    idx: usize,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("未知枚举取值: {}", raw).into(),
        )
    })
}

/// 解析 JSON 字符串数组列
pub(crate) fn decode_list(idx: usize, raw: &str) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// 编码 JSON 字符串数组列
pub(crate) fn encode_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}
