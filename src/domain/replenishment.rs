// ==========================================
// 库存补货引擎 - 输入批次与结果模型
// ==========================================
// 生命周期: 单次分析运行内,不跨运行持久化
// ==========================================

use crate::domain::inventory::InventoryRecord;
use crate::domain::sales::{SaleEvent, VelocityRecord};
use crate::domain::types::DaysSinceLastSale;
use serde::{Deserialize, Serialize};

// ==========================================
// ReplenishmentInput - 单次运行输入
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplenishmentInput {
    #[serde(default)]
    pub inventory: Vec<InventoryRecord>,
    #[serde(default)]
    pub sales: Option<Vec<SaleEvent>>,
    #[serde(default)]
    pub velocity: Option<Vec<VelocityRecord>>,
}

impl ReplenishmentInput {
    pub fn from_sales(inventory: Vec<InventoryRecord>, sales: Vec<SaleEvent>) -> Self {
        Self {
            inventory,
            sales: Some(sales),
            velocity: None,
        }
    }

    pub fn from_velocity(inventory: Vec<InventoryRecord>, velocity: Vec<VelocityRecord>) -> Self {
        Self {
            inventory,
            sales: None,
            velocity: Some(velocity),
        }
    }
}

// ==========================================
// ReplenishmentResult - 补货结果（每个键一行）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplenishmentResult {
    // ===== 键 =====
    pub item_id: String,
    pub location_id: Option<String>, // ITEM 粒度下为 None
    pub product_group: Option<String>,

    // ===== 基础量 =====
    pub weekly_velocity: f64,
    pub on_hand: f64,
    pub unit_cost: f64,
    pub moving_avg_cost: f64,

    // ===== 预测与补货 =====
    pub forecast_units: f64,
    pub lead_demand: f64,
    pub safety_stock: f64,
    pub reorder_point: f64,
    pub suggested_order: f64,
    pub order_value: f64,

    // ===== 估值与分类 =====
    pub dollar_value: f64,
    pub is_dead_stock: bool,
    pub days_since_last_sale: DaysSinceLastSale,
    pub days_of_supply: Option<f64>, // None = 无穷（速度为 0）
}

impl ReplenishmentResult {
    /// 呆滞占用资金（非呆滞为 0）
    pub fn trapped_capital(&self) -> f64 {
        if self.is_dead_stock {
            self.dollar_value
        } else {
            0.0
        }
    }
}

// ==========================================
// RunDiagnostics - 运行诊断
// ==========================================
// 接口契约: 调用方据此向用户给出非阻断警告
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDiagnostics {
    pub coerced_value_count: usize,       // 强制转换为默认值的字段数
    pub unmatched_velocity_count: usize,  // 有库存无速度数据的键
    pub unmatched_inventory_count: usize, // 有速度数据无库存记录的键
    pub clamped_negative_count: usize,    // 负值截断为 0 的字段数
    pub skipped_row_count: usize,         // 物料号为空被跳过的行
    pub out_of_window_event_count: usize, // 回看窗口外的销售事件
    pub undated_event_count: usize,       // 日期缺失/无法解析的销售事件
    pub filtered_row_count: usize,        // 库位过滤排除的行（库存 + 销售/速度）
}

impl RunDiagnostics {
    /// 是否存在需要提示用户的数据异常
    pub fn has_anomalies(&self) -> bool {
        self.coerced_value_count > 0
            || self.clamped_negative_count > 0
            || self.skipped_row_count > 0
            || self.undated_event_count > 0
    }
}

// ==========================================
// ReplenishmentReport - 运行输出
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplenishmentReport {
    pub results: Vec<ReplenishmentResult>,
    pub diagnostics: RunDiagnostics,
}

impl ReplenishmentReport {
    pub fn find(&self, item_id: &str, location_id: Option<&str>) -> Option<&ReplenishmentResult> {
        self.results
            .iter()
            .find(|r| r.item_id == item_id && r.location_id.as_deref() == location_id)
    }

    pub fn dead_stock(&self) -> impl Iterator<Item = &ReplenishmentResult> {
        self.results.iter().filter(|r| r.is_dead_stock)
    }
}
