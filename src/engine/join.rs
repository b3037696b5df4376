// ==========================================
// 库存补货引擎 - 库存聚合与外连接
// ==========================================
// 职责:
// 1) 库存行按键聚合（净量累加,成本按数量加权）
// 2) 库存表 ⟗ 速度表（全外连接）
// ==========================================
// 口径:
// - 净量 = 现存 - 已分配 - 欠交（字段存在时）,负值截断为 0
// - 采购成本缺失 → 回落到移动平均成本 → 再缺失为 0
// - 有速度无库存: on_hand = 0（计 unmatched_inventory）
// - 有库存无速度: weekly_velocity = 0（计 unmatched_velocity）
// - 最近销售日期保留两侧全部候选,由分类器取最近的合理日期
// ==========================================

use crate::domain::inventory::{resolve_product_group, InventoryRecord};
use crate::domain::replenishment::RunDiagnostics;
use crate::domain::types::KeyGranularity;
use crate::engine::coercion::ValueCoercer;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::key::{location_allowed, ItemKey};
use crate::engine::velocity::VelocityAggregate;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet};

// ==========================================
// InventoryAggregate - 单键库存聚合
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryAggregate {
    pub on_hand: f64,
    pub last_sale_dates: Vec<NaiveDateTime>,
    pub product_group: Option<String>,
    unit_cost_weighted: f64,
    avg_cost_weighted: f64,
    unit_cost_sum: f64,
    avg_cost_sum: f64,
    rows: usize,
}

impl InventoryAggregate {
    fn add_row(&mut self, net: f64, unit_cost: f64, avg_cost: f64) {
        self.on_hand += net;
        self.unit_cost_weighted += unit_cost * net;
        self.avg_cost_weighted += avg_cost * net;
        self.unit_cost_sum += unit_cost;
        self.avg_cost_sum += avg_cost;
        self.rows += 1;
    }

    /// 数量加权采购成本（总量为 0 时取算术平均）
    pub fn unit_cost(&self) -> f64 {
        self.weighted(self.unit_cost_weighted, self.unit_cost_sum)
    }

    /// 数量加权移动平均成本
    pub fn moving_avg_cost(&self) -> f64 {
        self.weighted(self.avg_cost_weighted, self.avg_cost_sum)
    }

    fn weighted(&self, weighted: f64, plain_sum: f64) -> f64 {
        if self.on_hand > 0.0 {
            weighted / self.on_hand
        } else if self.rows > 0 {
            plain_sum / self.rows as f64
        } else {
            0.0
        }
    }
}

/// 库存行聚合
pub fn aggregate_inventory(
    records: &[InventoryRecord],
    granularity: KeyGranularity,
    location_filter: Option<&BTreeSet<String>>,
    coercer: &mut ValueCoercer,
    diagnostics: &mut RunDiagnostics,
) -> EngineResult<BTreeMap<ItemKey, InventoryAggregate>> {
    let mut table: BTreeMap<ItemKey, InventoryAggregate> = BTreeMap::new();
    let mut keyed_rows = 0usize;

    for record in records {
        let key = match ItemKey::build(granularity, &record.item_id, &record.location_id) {
            Some(k) => k,
            None => {
                diagnostics.skipped_row_count += 1;
                continue;
            }
        };
        keyed_rows += 1;

        if !location_allowed(location_filter, &record.location_id) {
            diagnostics.filtered_row_count += 1;
            continue;
        }

        // 净量
        let on_hand = coercer.number(&record.on_hand);
        let allocated = coercer.optional_number(&record.allocated).unwrap_or(0.0);
        let backordered = coercer.optional_number(&record.backordered).unwrap_or(0.0);
        let net = coercer.non_negative(on_hand - allocated - backordered);

        // 成本
        let moving_avg = coercer.optional_number(&record.moving_avg_cost);
        let purchase = coercer.optional_number(&record.unit_cost);
        let unit_cost = coercer.non_negative(purchase.or(moving_avg).unwrap_or(0.0));
        let avg_cost = coercer.non_negative(moving_avg.unwrap_or(0.0));

        let last_sale = coercer.date(&record.last_sale_date);

        let entry = table.entry(key).or_default();
        entry.add_row(net, unit_cost, avg_cost);
        entry.last_sale_dates.extend(last_sale);
        if entry.product_group.is_none() {
            entry.product_group =
                resolve_product_group(record.product_group.as_deref(), &record.item_id);
        }
    }

    if keyed_rows == 0 && !records.is_empty() {
        return Err(EngineError::missing_field("inventory", "item_id"));
    }

    Ok(table)
}

// ==========================================
// JoinedRow - 外连接结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub key: ItemKey,
    pub inventory: Option<InventoryAggregate>,
    pub velocity: Option<VelocityAggregate>,
}

impl JoinedRow {
    /// 品类: 库存侧显式/派生优先,其次速度侧
    pub fn product_group(&self) -> Option<String> {
        self.inventory
            .as_ref()
            .and_then(|i| i.product_group.clone())
            .or_else(|| self.velocity.as_ref().and_then(|v| v.product_group.clone()))
    }

    /// 最近销售时间候选: 库存记录日期 + 销售事件最近日期
    pub fn last_sale_candidates(&self) -> Vec<NaiveDateTime> {
        let mut dates = self
            .inventory
            .as_ref()
            .map(|i| i.last_sale_dates.clone())
            .unwrap_or_default();
        dates.extend(self.velocity.as_ref().and_then(|v| v.last_sold_at));
        dates
    }
}

/// 全外连接（按键有序）
pub fn outer_join(
    mut inventory: BTreeMap<ItemKey, InventoryAggregate>,
    velocity: BTreeMap<ItemKey, VelocityAggregate>,
    diagnostics: &mut RunDiagnostics,
) -> Vec<JoinedRow> {
    let mut rows: BTreeMap<ItemKey, JoinedRow> = BTreeMap::new();

    for (key, vel) in velocity {
        let inv = inventory.remove(&key);
        if inv.is_none() {
            diagnostics.unmatched_inventory_count += 1;
        }
        rows.insert(
            key.clone(),
            JoinedRow {
                key,
                inventory: inv,
                velocity: Some(vel),
            },
        );
    }

    for (key, inv) in inventory {
        diagnostics.unmatched_velocity_count += 1;
        rows.insert(
            key.clone(),
            JoinedRow {
                key,
                inventory: Some(inv),
                velocity: None,
            },
        );
    }

    rows.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cell::CellValue;

    fn aggregate(records: &[InventoryRecord], granularity: KeyGranularity) -> (
        BTreeMap<ItemKey, InventoryAggregate>,
        ValueCoercer,
        RunDiagnostics,
    ) {
        let mut coercer = ValueCoercer::new();
        let mut diag = RunDiagnostics::default();
        let table =
            aggregate_inventory(records, granularity, None, &mut coercer, &mut diag).unwrap();
        (table, coercer, diag)
    }

    #[test]
    fn test_duplicate_rows_are_summed() {
        let records = vec![
            InventoryRecord::new("A1", "5120", 30.0).with_unit_cost(10.0),
            InventoryRecord::new("A1", "5140", 70.0).with_unit_cost(20.0),
        ];
        let (table, _, _) = aggregate(&records, KeyGranularity::Item);
        let agg = table.values().next().unwrap();
        assert_eq!(agg.on_hand, 100.0);
        // (30×10 + 70×20) / 100
        assert!((agg.unit_cost() - 17.0).abs() < 1e-9);
    }

    #[test]
    fn test_net_quantity_and_clamp() {
        let mut record = InventoryRecord::new("A1", "5120", 10.0);
        record.allocated = CellValue::Number(4.0);
        record.backordered = CellValue::Number(1.0);
        let mut oversold = InventoryRecord::new("B2", "5120", 3.0);
        oversold.allocated = CellValue::Number(8.0);

        let (table, coercer, _) = aggregate(&[record, oversold], KeyGranularity::Item);
        let values: Vec<_> = table.values().collect();
        assert_eq!(values[0].on_hand, 5.0);
        assert_eq!(values[1].on_hand, 0.0);
        assert_eq!(coercer.clamped_count(), 1);
    }

    #[test]
    fn test_unit_cost_falls_back_to_moving_average() {
        let records = vec![InventoryRecord::new("A1", "5120", 4.0).with_moving_avg_cost(12.5)];
        let (table, _, _) = aggregate(&records, KeyGranularity::Item);
        let agg = table.values().next().unwrap();
        assert_eq!(agg.unit_cost(), 12.5);
        assert_eq!(agg.moving_avg_cost(), 12.5);
    }

    #[test]
    fn test_zero_quantity_uses_plain_mean_cost() {
        let records = vec![
            InventoryRecord::new("A1", "5120", 0.0).with_unit_cost(10.0),
            InventoryRecord::new("A1", "5140", 0.0).with_unit_cost(30.0),
        ];
        let (table, _, _) = aggregate(&records, KeyGranularity::Item);
        assert_eq!(table.values().next().unwrap().unit_cost(), 20.0);
    }

    #[test]
    fn test_all_blank_keys_is_structural_error() {
        let records = vec![InventoryRecord::new(" ", "5120", 1.0)];
        let result = aggregate_inventory(
            &records,
            KeyGranularity::Item,
            None,
            &mut ValueCoercer::new(),
            &mut RunDiagnostics::default(),
        );
        assert_eq!(result, Err(EngineError::missing_field("inventory", "item_id")));
    }

    #[test]
    fn test_location_filter_excludes_rows() {
        let records = vec![
            InventoryRecord::new("A1", "5120", 30.0),
            InventoryRecord::new("A1", "5140", 70.0),
            InventoryRecord::new("B2", "5160", 5.0),
        ];
        let filter: BTreeSet<String> = ["5140".to_string()].into();
        let mut coercer = ValueCoercer::new();
        let mut diag = RunDiagnostics::default();

        let table = aggregate_inventory(
            &records,
            KeyGranularity::Item,
            Some(&filter),
            &mut coercer,
            &mut diag,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.values().next().unwrap().on_hand, 70.0);
        assert_eq!(diag.filtered_row_count, 2);
    }

    #[test]
    fn test_last_sale_candidates_from_both_sides() {
        let old = chrono::NaiveDate::from_ymd_opt(1900, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let recent = chrono::NaiveDate::from_ymd_opt(2025, 6, 26)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let (mut inventory, _, _) = aggregate(
            &[InventoryRecord::new("A1", "5120", 10.0).with_last_sale("1900-01-01")],
            KeyGranularity::Item,
        );
        let key = ItemKey::build(KeyGranularity::Item, "A1", "").unwrap();
        let row = JoinedRow {
            key: key.clone(),
            inventory: inventory.remove(&key),
            velocity: Some(VelocityAggregate {
                last_sold_at: Some(recent),
                ..Default::default()
            }),
        };
        assert_eq!(row.last_sale_candidates(), vec![old, recent]);
    }

    #[test]
    fn test_outer_join_counts_unmatched_both_ways() {
        let (inventory, _, _) = aggregate(
            &[
                InventoryRecord::new("A1", "5120", 10.0),
                InventoryRecord::new("B2", "5120", 5.0),
            ],
            KeyGranularity::Item,
        );
        let mut velocity = BTreeMap::new();
        velocity.insert(
            ItemKey::build(KeyGranularity::Item, "A1", "").unwrap(),
            VelocityAggregate {
                weekly_velocity: 2.0,
                ..Default::default()
            },
        );
        velocity.insert(
            ItemKey::build(KeyGranularity::Item, "E5", "").unwrap(),
            VelocityAggregate {
                weekly_velocity: 1.0,
                ..Default::default()
            },
        );

        let mut diag = RunDiagnostics::default();
        let rows = outer_join(inventory, velocity, &mut diag);
        let ids: Vec<_> = rows.iter().map(|r| r.key.item_id.as_str()).collect();
        assert_eq!(ids, vec!["A1", "B2", "E5"]);
        assert_eq!(diag.unmatched_inventory_count, 1); // E5
        assert_eq!(diag.unmatched_velocity_count, 1); // B2
        assert!(rows[2].inventory.is_none());
        assert!(rows[1].velocity.is_none());
    }
}
