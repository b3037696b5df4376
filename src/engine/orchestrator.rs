// ==========================================
// 库存补货引擎 - 引擎编排器
// ==========================================
// 计算主流程（单次、无状态、纯函数）:
// 0) 配置校验 + 速度来源校验（结构性错误直接拒绝）
// 1) 速度计算（销售事件优先,其次预计算速度）
// 2) 库存聚合 + 全外连接
// 3) 预测 → 4) 再订货点 → 5) 呆滞判定 → 6) 距上次销售天数
// ==========================================
// 红线: 要么全部有效行处理完毕并返回,要么整次拒绝;不存在部分结果
// 红线: 输出数值字段均为有限值（溢出 → 0 并计入 coerced_value_count）
// ==========================================

use crate::config::ReplenishmentConfig;
use crate::domain::replenishment::{
    ReplenishmentInput, ReplenishmentReport, ReplenishmentResult, RunDiagnostics,
};
use crate::engine::classification::StockClassifier;
use crate::engine::coercion::ValueCoercer;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::forecast::ForecastEngine;
use crate::engine::join::{aggregate_inventory, outer_join, JoinedRow};
use crate::engine::key::ItemKey;
use crate::engine::reorder::{ReorderCalculator, ReorderPlan};
use crate::engine::velocity::{VelocityAggregate, VelocityEngine};
use crate::perf::PerfGuard;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

// ==========================================
// ReplenishmentEngine - 补货引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct ReplenishmentEngine {
    config: ReplenishmentConfig,
}

impl ReplenishmentEngine {
    /// 创建引擎（配置在此校验）
    pub fn new(config: ReplenishmentConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReplenishmentConfig {
        &self.config
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 执行一次补货分析
    ///
    /// # 参数
    /// - `input`: 归一化库存 + 速度来源
    /// - `as_of`: 分析基准时间（"now",显式传入以保证可重复）
    ///
    /// # 返回
    /// 每个键一行结果 + 运行诊断
    #[instrument(
        skip(self, input),
        fields(
            inventory = input.inventory.len(),
            granularity = %self.config.key_granularity,
            mode = %self.config.forecast_mode,
        )
    )]
    pub fn run(
        &self,
        input: &ReplenishmentInput,
        as_of: NaiveDateTime,
    ) -> EngineResult<ReplenishmentReport> {
        let mut perf = PerfGuard::new("replenishment_run");
        let mut coercer = ValueCoercer::new();
        let mut diagnostics = RunDiagnostics::default();

        // 1. 速度
        let velocity = self.compute_velocity(input, as_of, &mut coercer, &mut diagnostics)?;

        // 2. 库存聚合 + 外连接
        let inventory = aggregate_inventory(
            &input.inventory,
            self.config.key_granularity,
            self.config.location_filter.as_ref(),
            &mut coercer,
            &mut diagnostics,
        )?;
        debug!(
            velocity_keys = velocity.len(),
            inventory_keys = inventory.len(),
            "外连接开始"
        );
        let joined = outer_join(inventory, velocity, &mut diagnostics);

        // 3~6. 逐键计算
        let forecaster = ForecastEngine::new(&self.config);
        let reorder = ReorderCalculator::new(
            self.config.lead_time_weeks,
            self.config.safety_stock_weeks,
        );
        let classifier = StockClassifier::new(self.config.days_since_sale_ceiling);

        let results: Vec<ReplenishmentResult> = joined
            .into_iter()
            .map(|row| {
                self.evaluate_row(row, as_of, &forecaster, &reorder, &classifier, &mut coercer)
            })
            .collect();

        diagnostics.coerced_value_count = coercer.coerced_count();
        diagnostics.clamped_negative_count = coercer.clamped_count();

        let dead_count = results.iter().filter(|r| r.is_dead_stock).count();
        let order_count = results.iter().filter(|r| r.suggested_order > 0.0).count();
        info!(
            results = results.len(),
            dead_stock = dead_count,
            reorders = order_count,
            filtered = diagnostics.filtered_row_count,
            "补货分析完成"
        );
        if diagnostics.has_anomalies() {
            warn!(
                coerced = diagnostics.coerced_value_count,
                clamped = diagnostics.clamped_negative_count,
                skipped = diagnostics.skipped_row_count,
                undated = diagnostics.undated_event_count,
                "输入存在异常值，已按默认值处理"
            );
        }

        perf.set_rows(results.len());
        Ok(ReplenishmentReport {
            results,
            diagnostics,
        })
    }

    // ==========================================
    // 内部步骤
    // ==========================================

    /// 选择速度来源并计算
    ///
    /// 规则:
    /// - 销售事件非空 → 使用事件（同时提供预计算速度时忽略后者）
    /// - 否则预计算速度非空 → 使用预计算速度
    /// - 均缺失/为空 → MissingVelocityData
    fn compute_velocity(
        &self,
        input: &ReplenishmentInput,
        as_of: NaiveDateTime,
        coercer: &mut ValueCoercer,
        diagnostics: &mut RunDiagnostics,
    ) -> EngineResult<BTreeMap<ItemKey, VelocityAggregate>> {
        let engine = VelocityEngine::new(self.config.lookback_weeks, self.config.key_granularity)
            .with_location_filter(self.config.location_filter.clone());
        let events = input.sales.as_deref().filter(|e| !e.is_empty());
        let precomputed = input.velocity.as_deref().filter(|v| !v.is_empty());

        match (events, precomputed) {
            (Some(events), other) => {
                if other.is_some() {
                    warn!("同时提供销售事件与预计算速度，以销售事件为准");
                }
                engine.from_events(events, as_of, coercer, diagnostics)
            }
            (None, Some(records)) => engine.from_precomputed(records, coercer, diagnostics),
            (None, None) => Err(EngineError::MissingVelocityData),
        }
    }

    /// 单键计算
    fn evaluate_row(
        &self,
        row: JoinedRow,
        as_of: NaiveDateTime,
        forecaster: &ForecastEngine,
        reorder: &ReorderCalculator,
        classifier: &StockClassifier,
        coercer: &mut ValueCoercer,
    ) -> ReplenishmentResult {
        let product_group = row.product_group();
        let days_since_last_sale =
            classifier.days_since_latest_sale(&row.last_sale_candidates(), as_of);

        let (on_hand, unit_cost, moving_avg_cost) = match &row.inventory {
            Some(inv) => (
                coercer.finite(inv.on_hand),
                coercer.finite(inv.unit_cost()),
                coercer.finite(inv.moving_avg_cost()),
            ),
            None => (0.0, 0.0, 0.0),
        };

        let (raw_velocity, buckets) = match &row.velocity {
            Some(vel) => (vel.weekly_velocity, vel.weekly_buckets.as_deref()),
            None => (0.0, None),
        };
        let finite_velocity = coercer.finite(raw_velocity);
        let weekly_velocity = coercer.non_negative(finite_velocity);

        let raw_forecast = forecaster.forecast_units(weekly_velocity, buckets);
        let forecast_units = coercer.finite(raw_forecast);
        let plan = finite_plan(reorder.plan(weekly_velocity, on_hand, unit_cost), coercer);
        let dollar_value = coercer.finite(on_hand * moving_avg_cost);

        ReplenishmentResult {
            item_id: row.key.item_id,
            location_id: row.key.location_id,
            product_group,
            weekly_velocity,
            on_hand,
            unit_cost,
            moving_avg_cost,
            forecast_units,
            lead_demand: plan.lead_demand,
            safety_stock: plan.safety_stock,
            reorder_point: plan.reorder_point,
            suggested_order: plan.suggested_order,
            order_value: plan.order_value,
            dollar_value,
            is_dead_stock: classifier.is_dead_stock(weekly_velocity, on_hand),
            days_since_last_sale,
            days_of_supply: classifier.days_of_supply(on_hand, weekly_velocity),
        }
    }
}

/// 再订货计划溢出处理
///
/// 再订货点溢出时建议量同样失去意义,一并置 0
fn finite_plan(plan: ReorderPlan, coercer: &mut ValueCoercer) -> ReorderPlan {
    let reorder_point = coercer.finite(plan.reorder_point);
    let suggested_order = if reorder_point == 0.0 {
        0.0
    } else {
        coercer.finite(plan.suggested_order)
    };
    let order_value = if suggested_order == 0.0 {
        0.0
    } else {
        coercer.finite(plan.order_value)
    };
    ReorderPlan {
        lead_demand: coercer.finite(plan.lead_demand),
        safety_stock: coercer.finite(plan.safety_stock),
        reorder_point,
        suggested_order,
        order_value,
    }
}
