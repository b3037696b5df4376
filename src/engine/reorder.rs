// ==========================================
// 库存补货引擎 - 再订货点计算
// ==========================================
// lead_demand     = 周速度 × 提前期周数
// safety_stock    = 周速度 × 安全库存周数
// reorder_point   = lead_demand + safety_stock
// suggested_order = max(0, reorder_point - on_hand)
// order_value     = suggested_order × unit_cost
// ==========================================
// 红线: on_hand ≥ reorder_point 时建议量必为 0
// 注: 呆滞品速度为 0 → 再订货点为 0 → 永不自动补货
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReorderPlan {
    pub lead_demand: f64,
    pub safety_stock: f64,
    pub reorder_point: f64,
    pub suggested_order: f64,
    pub order_value: f64,
}

pub struct ReorderCalculator {
    lead_time_weeks: f64,
    safety_stock_weeks: f64,
}

impl ReorderCalculator {
    pub fn new(lead_time_weeks: u32, safety_stock_weeks: u32) -> Self {
        Self {
            lead_time_weeks: lead_time_weeks as f64,
            safety_stock_weeks: safety_stock_weeks as f64,
        }
    }

    /// 计算补货计划（输入应已截断为非负）
    pub fn plan(&self, weekly_velocity: f64, on_hand: f64, unit_cost: f64) -> ReorderPlan {
        let lead_demand = weekly_velocity * self.lead_time_weeks;
        let safety_stock = weekly_velocity * self.safety_stock_weeks;
        let reorder_point = lead_demand + safety_stock;

        let suggested_order = if on_hand >= reorder_point {
            0.0
        } else {
            reorder_point - on_hand
        };

        ReorderPlan {
            lead_demand,
            safety_stock,
            reorder_point,
            suggested_order,
            order_value: suggested_order * unit_cost,
        }
    }
}
