// ==========================================
// 库存补货引擎 - 领域模型层
// ==========================================
// 职责: 定义输入记录、结果记录、领域类型
// 红线: 不含引擎逻辑,不含文件读取/列名猜测
// ==========================================

pub mod cell;
pub mod inventory;
pub mod replenishment;
pub mod sales;
pub mod types;

// 重导出核心类型
pub use cell::{CellValue, DateCell};
pub use inventory::{derive_product_group, resolve_product_group, InventoryRecord, UNKNOWN_LOCATION};
pub use replenishment::{ReplenishmentInput, ReplenishmentReport, ReplenishmentResult, RunDiagnostics};
pub use sales::{SaleEvent, VelocityRecord};
pub use types::{DaysSinceLastSale, ForecastMode, KeyGranularity, VelocityPeriod};
