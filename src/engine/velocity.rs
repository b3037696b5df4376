// ==========================================
// 库存补货引擎 - 销售速度计算
// ==========================================
// 职责: 销售事件 / 预计算速度 → 每个键的周速度
// 输出: BTreeMap<ItemKey, VelocityAggregate>（速度来源中出现过的每个键）
// ==========================================
// 口径:
// - 事件窗口: [as_of - lookback_weeks × 7 天, as_of]
// - 周速度 = 窗口内数量合计 / lookback_weeks
// - 月均速度 → 周速度: 除以 WEEKS_PER_MONTH
// - 同键多行累加,不覆盖
// - 配置库位过滤时,过滤先于聚合
// - 合计溢出为非有限值 → 0 并计数
// ==========================================

use crate::config::config_keys;
use crate::domain::inventory::resolve_product_group;
use crate::domain::replenishment::RunDiagnostics;
use crate::domain::sales::{SaleEvent, VelocityRecord};
use crate::domain::types::{KeyGranularity, VelocityPeriod};
use crate::engine::coercion::ValueCoercer;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::key::{location_allowed, ItemKey};
use chrono::{Duration, NaiveDateTime};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

/// 平均每月周数（365.25 / 12 / 7 ≈ 4.3482）
pub const WEEKS_PER_MONTH: f64 = 365.25 / 12.0 / 7.0;

const SECONDS_PER_WEEK: i64 = 7 * 24 * 3600;

// ==========================================
// VelocityAggregate - 单键速度聚合
// ==========================================
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VelocityAggregate {
    /// 周速度（未截断,由调用方截断为非负）
    pub weekly_velocity: f64,

    /// 窗口内逐周数量（旧 → 新）；预计算来源为 None
    pub weekly_buckets: Option<Vec<f64>>,

    /// 最近一次销售时间（不晚于 as_of,含窗口外事件）
    pub last_sold_at: Option<NaiveDateTime>,

    pub product_group: Option<String>,
}

// ==========================================
// VelocityEngine - 速度计算引擎
// ==========================================
pub struct VelocityEngine {
    lookback_weeks: u32,
    granularity: KeyGranularity,
    location_filter: Option<BTreeSet<String>>,
}

impl VelocityEngine {
    pub fn new(lookback_weeks: u32, granularity: KeyGranularity) -> Self {
        Self {
            lookback_weeks,
            granularity,
            location_filter: None,
        }
    }

    pub fn with_location_filter(mut self, location_filter: Option<BTreeSet<String>>) -> Self {
        self.location_filter = location_filter;
        self
    }

    /// 窗口起点 = as_of - lookback_weeks 周
    fn window_start(&self, as_of: NaiveDateTime) -> EngineResult<NaiveDateTime> {
        as_of
            .checked_sub_signed(Duration::weeks(self.lookback_weeks as i64))
            .ok_or_else(|| {
                EngineError::invalid_config(
                    config_keys::LOOKBACK_WEEKS,
                    self.lookback_weeks,
                    "回看窗口超出可表示的日期范围",
                )
            })
    }

    /// 由销售事件计算周速度
    #[instrument(skip(self, events, coercer, diagnostics), fields(count = events.len()))]
    pub fn from_events(
        &self,
        events: &[SaleEvent],
        as_of: NaiveDateTime,
        coercer: &mut ValueCoercer,
        diagnostics: &mut RunDiagnostics,
    ) -> EngineResult<BTreeMap<ItemKey, VelocityAggregate>> {
        let weeks = self.lookback_weeks.max(1) as usize;
        let window_start = self.window_start(as_of)?;
        let mut table: BTreeMap<ItemKey, VelocityAggregate> = BTreeMap::new();
        let mut keyed_rows = 0usize;

        for event in events {
            let key = match ItemKey::build(self.granularity, &event.item_id, &event.location_id) {
                Some(k) => k,
                None => {
                    diagnostics.skipped_row_count += 1;
                    continue;
                }
            };
            keyed_rows += 1;

            if !location_allowed(self.location_filter.as_ref(), &event.location_id) {
                diagnostics.filtered_row_count += 1;
                continue;
            }

            let entry = table.entry(key).or_insert_with(|| VelocityAggregate {
                weekly_buckets: Some(vec![0.0; weeks]),
                ..Default::default()
            });
            if entry.product_group.is_none() {
                entry.product_group =
                    resolve_product_group(event.product_group.as_deref(), &event.item_id);
            }

            let quantity = coercer.number(&event.quantity);

            let sold_at = match coercer.date(&event.sold_at) {
                Some(ts) => ts,
                None => {
                    diagnostics.undated_event_count += 1;
                    continue;
                }
            };

            if sold_at > as_of {
                diagnostics.out_of_window_event_count += 1;
                continue;
            }
            entry.last_sold_at = entry.last_sold_at.max(Some(sold_at));

            if sold_at < window_start {
                diagnostics.out_of_window_event_count += 1;
                continue;
            }

            let offset = (sold_at - window_start).num_seconds() / SECONDS_PER_WEEK;
            let bucket = (offset.max(0) as usize).min(weeks - 1);
            if let Some(buckets) = entry.weekly_buckets.as_mut() {
                buckets[bucket] += quantity;
            }
        }

        if keyed_rows == 0 && !events.is_empty() {
            return Err(EngineError::missing_field("sales", "item_id"));
        }

        for aggregate in table.values_mut() {
            let total: f64 = aggregate
                .weekly_buckets
                .as_deref()
                .map(|b| b.iter().sum())
                .unwrap_or(0.0);
            aggregate.weekly_velocity = coercer.finite(total / self.lookback_weeks as f64);
        }

        debug!(keys = table.len(), "销售事件速度计算完成");
        Ok(table)
    }

    /// 由预计算速度换算周速度
    #[instrument(skip(self, records, coercer, diagnostics), fields(count = records.len()))]
    pub fn from_precomputed(
        &self,
        records: &[VelocityRecord],
        coercer: &mut ValueCoercer,
        diagnostics: &mut RunDiagnostics,
    ) -> EngineResult<BTreeMap<ItemKey, VelocityAggregate>> {
        let mut table: BTreeMap<ItemKey, VelocityAggregate> = BTreeMap::new();
        let mut keyed_rows = 0usize;

        for record in records {
            let key = match ItemKey::build(self.granularity, &record.item_id, &record.location_id) {
                Some(k) => k,
                None => {
                    diagnostics.skipped_row_count += 1;
                    continue;
                }
            };
            keyed_rows += 1;

            if !location_allowed(self.location_filter.as_ref(), &record.location_id) {
                diagnostics.filtered_row_count += 1;
                continue;
            }

            let figure = coercer.number(&record.figure);
            let weekly = match record.period {
                VelocityPeriod::Weekly => figure,
                VelocityPeriod::Monthly => figure / WEEKS_PER_MONTH,
            };

            let entry = table.entry(key).or_default();
            entry.weekly_velocity += weekly;
            if entry.product_group.is_none() {
                entry.product_group =
                    resolve_product_group(record.product_group.as_deref(), &record.item_id);
            }
        }

        if keyed_rows == 0 && !records.is_empty() {
            return Err(EngineError::missing_field("velocity", "item_id"));
        }

        for aggregate in table.values_mut() {
            aggregate.weekly_velocity = coercer.finite(aggregate.weekly_velocity);
        }

        debug!(keys = table.len(), "预计算速度换算完成");
        Ok(table)
    }
}
