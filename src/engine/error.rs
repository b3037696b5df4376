// ==========================================
// 库存补货引擎 - 引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 口径: 结构性错误直接拒绝运行；数值异常不报错,只计入诊断
// ==========================================

use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    // ===== 输入结构错误 =====
    #[error("缺少速度数据: 销售事件与预计算速度均未提供，拒绝将全部物料视为呆滞")]
    MissingVelocityData,

    #[error("必填字段缺失 (来源 {source_name}): 所有行的 {field} 均为空")]
    MissingField { source_name: String, field: String },

    // ===== 配置错误 =====
    #[error("配置无效 (key: {key}, value: {value}): {message}")]
    InvalidConfig {
        key: String,
        value: String,
        message: String,
    },
}

impl EngineError {
    pub fn invalid_config(key: &str, value: impl ToString, message: &str) -> Self {
        EngineError::InvalidConfig {
            key: key.to_string(),
            value: value.to_string(),
            message: message.to_string(),
        }
    }

    pub fn missing_field(source_name: &str, field: &str) -> Self {
        EngineError::MissingField {
            source_name: source_name.to_string(),
            field: field.to_string(),
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
