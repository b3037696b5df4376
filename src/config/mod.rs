// ==========================================
// 库存补货引擎 - 配置层
// ==========================================
// 职责: 运行配置定义、键值加载、快照
// ==========================================

pub mod config_manager;
pub mod error;
pub mod replenishment_config;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use replenishment_config::ReplenishmentConfig;
