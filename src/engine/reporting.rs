// ==========================================
// 库存补货引擎 - 报表视图
// ==========================================
// 职责: 基于结果集的下游视图（Top-N、建议采购、汇总、品类聚合）
// 注: top_n 仅作用于此处,不影响引擎计算
// ==========================================

use crate::domain::replenishment::ReplenishmentResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// 无品类时的分组名
pub const UNGROUPED: &str = "UNGROUPED";

// ==========================================
// ReportSummary - 汇总指标
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub item_count: usize,
    pub dead_stock_count: usize,
    pub reorder_count: usize,
    pub trapped_capital: f64,
    pub total_order_value: f64,
    pub total_forecast_units: f64,
    pub avg_weekly_velocity: f64,
}

// ==========================================
// GroupSummary - 品类聚合
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub product_group: String,
    pub item_count: usize,
    pub weekly_velocity: f64,
    pub on_hand: f64,
    pub forecast_units: f64,
    pub dead_stock_count: usize,
}

/// 按 f64 降序比较,并列时按键升序保证稳定
fn desc_by(a: f64, b: f64, ra: &ReplenishmentResult, rb: &ReplenishmentResult) -> Ordering {
    b.partial_cmp(&a)
        .unwrap_or(Ordering::Equal)
        .then_with(|| ra.item_id.cmp(&rb.item_id))
        .then_with(|| ra.location_id.cmp(&rb.location_id))
}

/// 呆滞 Top-N（按占用资金降序）
pub fn top_dead_stock(results: &[ReplenishmentResult], n: usize) -> Vec<&ReplenishmentResult> {
    let mut dead: Vec<_> = results.iter().filter(|r| r.is_dead_stock).collect();
    dead.sort_by(|a, b| desc_by(a.dollar_value, b.dollar_value, a, b));
    dead.truncate(n);
    dead
}

/// 建议采购清单（建议量 > 0,按订单金额降序）
pub fn suggested_purchases(results: &[ReplenishmentResult]) -> Vec<&ReplenishmentResult> {
    let mut orders: Vec<_> = results.iter().filter(|r| r.suggested_order > 0.0).collect();
    orders.sort_by(|a, b| desc_by(a.order_value, b.order_value, a, b));
    orders
}

/// 畅销 Top-N（按周速度降序,速度为 0 的不入榜）
pub fn top_movers(results: &[ReplenishmentResult], n: usize) -> Vec<&ReplenishmentResult> {
    let mut movers: Vec<_> = results.iter().filter(|r| r.weekly_velocity > 0.0).collect();
    movers.sort_by(|a, b| desc_by(a.weekly_velocity, b.weekly_velocity, a, b));
    movers.truncate(n);
    movers
}

/// 滞销 Bottom-N（按周速度升序,呆滞品单独列示不在此榜）
pub fn bottom_movers(results: &[ReplenishmentResult], n: usize) -> Vec<&ReplenishmentResult> {
    let mut movers: Vec<_> = results.iter().filter(|r| !r.is_dead_stock).collect();
    movers.sort_by(|a, b| desc_by(b.weekly_velocity, a.weekly_velocity, a, b));
    movers.truncate(n);
    movers
}

/// 汇总
pub fn summarize(results: &[ReplenishmentResult]) -> ReportSummary {
    let item_count = results.len();
    let total_velocity: f64 = results.iter().map(|r| r.weekly_velocity).sum();

    ReportSummary {
        item_count,
        dead_stock_count: results.iter().filter(|r| r.is_dead_stock).count(),
        reorder_count: results.iter().filter(|r| r.suggested_order > 0.0).count(),
        trapped_capital: results.iter().map(|r| r.trapped_capital()).sum(),
        total_order_value: results.iter().map(|r| r.order_value).sum(),
        total_forecast_units: results.iter().map(|r| r.forecast_units).sum(),
        avg_weekly_velocity: if item_count > 0 {
            total_velocity / item_count as f64
        } else {
            0.0
        },
    }
}

/// 品类聚合（按品类名有序）
pub fn group_by_product_group(results: &[ReplenishmentResult]) -> Vec<GroupSummary> {
    let mut groups: BTreeMap<String, GroupSummary> = BTreeMap::new();

    for r in results {
        let name = r.product_group.clone().unwrap_or_else(|| UNGROUPED.to_string());
        let entry = groups.entry(name.clone()).or_insert_with(|| GroupSummary {
            product_group: name,
            ..Default::default()
        });
        entry.item_count += 1;
        entry.weekly_velocity += r.weekly_velocity;
        entry.on_hand += r.on_hand;
        entry.forecast_units += r.forecast_units;
        if r.is_dead_stock {
            entry.dead_stock_count += 1;
        }
    }

    groups.into_values().collect()
}
