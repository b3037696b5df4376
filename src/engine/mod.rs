// ==========================================
// 库存补货引擎 - 引擎层
// ==========================================
// 职责: 速度 / 连接 / 预测 / 再订货点 / 呆滞判定
// 红线: 引擎不读文件、不猜列名、不含随机性
// ==========================================

pub mod classification;
pub mod coercion;
pub mod error;
pub mod forecast;
pub mod join;
pub mod key;
pub mod orchestrator;
pub mod reorder;
pub mod reporting;
pub mod velocity;

// 重导出核心引擎
pub use classification::StockClassifier;
pub use coercion::ValueCoercer;
pub use error::{EngineError, EngineResult};
pub use forecast::{ewma, ForecastEngine};
pub use key::ItemKey;
pub use orchestrator::ReplenishmentEngine;
pub use reorder::{ReorderCalculator, ReorderPlan};
pub use reporting::{GroupSummary, ReportSummary};
pub use velocity::{VelocityAggregate, VelocityEngine, WEEKS_PER_MONTH};
