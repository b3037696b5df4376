// ==========================================
// 库存补货引擎 - 核心库
// ==========================================
// 系统定位: 纯计算引擎（无持久化、无 IO、无全局状态）
// 输入: 归一化库存记录 + 销售事件/预计算速度 + 运行配置
// 输出: 补货结果表 + 运行诊断
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录与类型
pub mod domain;

// 引擎层 - 计算规则
pub mod engine;

// 配置层 - 运行配置
pub mod config;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{ConfigError, ConfigManager, ReplenishmentConfig};

pub use domain::{
    CellValue, DateCell, DaysSinceLastSale, ForecastMode, InventoryRecord, KeyGranularity,
    ReplenishmentInput, ReplenishmentReport, ReplenishmentResult, RunDiagnostics, SaleEvent,
    VelocityPeriod, VelocityRecord,
};

pub use engine::{EngineError, EngineResult, ReplenishmentEngine};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "库存补货引擎";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
