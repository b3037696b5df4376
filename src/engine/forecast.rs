// ==========================================
// 库存补货引擎 - 周期预测
// ==========================================
// LINEAR:   round(周速度 × 预测周数 × 系数)
// SMOOTHED: round(EWMA(逐周数量) × 预测周数 × 系数)
//           无逐周历史（预计算速度）时回落到周速度
// 红线: 确定性计算,不含随机扰动
// ==========================================

use crate::config::ReplenishmentConfig;
use crate::domain::types::ForecastMode;

pub struct ForecastEngine {
    mode: ForecastMode,
    horizon_weeks: f64,
    multiplier: f64,
    alpha: f64,
}

impl ForecastEngine {
    pub fn new(config: &ReplenishmentConfig) -> Self {
        Self {
            mode: config.forecast_mode,
            horizon_weeks: config.forecast_horizon_weeks as f64,
            multiplier: config.forecast_multiplier,
            alpha: config.smoothing_alpha(),
        }
    }

    /// 预测单位数（非负,四舍五入远离零）
    pub fn forecast_units(&self, weekly_velocity: f64, weekly_buckets: Option<&[f64]>) -> f64 {
        let rate = self.smoothed_rate(weekly_velocity, weekly_buckets);
        (rate.max(0.0) * self.horizon_weeks * self.multiplier).round()
    }

    /// 平滑后的周速度（LINEAR 模式下等于周速度）
    pub fn smoothed_rate(&self, weekly_velocity: f64, weekly_buckets: Option<&[f64]>) -> f64 {
        match self.mode {
            ForecastMode::Linear => weekly_velocity,
            ForecastMode::Smoothed => weekly_buckets
                .and_then(|b| ewma(b, self.alpha))
                .unwrap_or(weekly_velocity),
        }
    }
}

/// 指数加权移动平均（旧 → 新,s0 = x0）
///
/// 空序列返回 None
pub fn ewma(values: &[f64], alpha: f64) -> Option<f64> {
    let (first, rest) = values.split_first()?;
    Some(
        rest.iter()
            .fold(*first, |smoothed, x| alpha * x + (1.0 - alpha) * smoothed),
    )
}
