// ==========================================
// 库存补货引擎 - 运行配置
// ==========================================
// 红线: 无全局/会话状态,配置在调用时显式传入
// ==========================================

use crate::config::config_manager::config_keys;
use crate::domain::types::{ForecastMode, KeyGranularity};
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 预测上浮系数默认值
pub const DEFAULT_FORECAST_MULTIPLIER: f64 = 1.15;

/// 距上次销售天数的合理上限（超出视为占位日期）
pub const DEFAULT_DAYS_SINCE_SALE_CEILING: i64 = 9999;

/// 回看窗口 / 预测周期上限（10 年）
pub const MAX_WEEKS: u32 = 520;

/// 补货运行配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplenishmentConfig {
    /// 速度回看窗口（周，> 0）
    pub lookback_weeks: u32,

    /// 预测周期（周，> 0）
    pub forecast_horizon_weeks: u32,

    /// 供应商提前期（周）
    pub lead_time_weeks: u32,

    /// 安全库存覆盖周数
    pub safety_stock_weeks: u32,

    /// 预测上浮系数（> 0）
    pub forecast_multiplier: f64,

    pub forecast_mode: ForecastMode,

    /// EWMA 跨度（周期数，alpha = 2 / (span + 1)）
    pub smoothing_span: u32,

    pub key_granularity: KeyGranularity,

    /// 报表 Top-N 截断（不参与引擎计算）
    pub top_n: usize,

    pub days_since_sale_ceiling: i64,

    /// 库位过滤（None = 全部库位；库存与销售同时过滤）
    pub location_filter: Option<BTreeSet<String>>,
}

impl Default for ReplenishmentConfig {
    fn default() -> Self {
        Self {
            lookback_weeks: 12,
            forecast_horizon_weeks: 12,
            lead_time_weeks: 2,
            safety_stock_weeks: 1,
            forecast_multiplier: DEFAULT_FORECAST_MULTIPLIER,
            forecast_mode: ForecastMode::Linear,
            smoothing_span: 4,
            key_granularity: KeyGranularity::Item,
            top_n: 10,
            days_since_sale_ceiling: DEFAULT_DAYS_SINCE_SALE_CEILING,
            location_filter: None,
        }
    }
}

impl ReplenishmentConfig {
    /// 计算前校验（退化配置直接拒绝）
    pub fn validate(&self) -> EngineResult<()> {
        if self.lookback_weeks == 0 {
            return Err(EngineError::invalid_config(
                config_keys::LOOKBACK_WEEKS,
                self.lookback_weeks,
                "回看窗口必须大于 0 周",
            ));
        }
        if self.lookback_weeks > MAX_WEEKS {
            return Err(EngineError::invalid_config(
                config_keys::LOOKBACK_WEEKS,
                self.lookback_weeks,
                "回看窗口不得超过 520 周",
            ));
        }
        if self.forecast_horizon_weeks == 0 {
            return Err(EngineError::invalid_config(
                config_keys::FORECAST_HORIZON_WEEKS,
                self.forecast_horizon_weeks,
                "预测周期必须大于 0 周",
            ));
        }
        if self.forecast_horizon_weeks > MAX_WEEKS {
            return Err(EngineError::invalid_config(
                config_keys::FORECAST_HORIZON_WEEKS,
                self.forecast_horizon_weeks,
                "预测周期不得超过 520 周",
            ));
        }
        if !self.forecast_multiplier.is_finite() || self.forecast_multiplier <= 0.0 {
            return Err(EngineError::invalid_config(
                config_keys::FORECAST_MULTIPLIER,
                self.forecast_multiplier,
                "预测系数必须为正有限数",
            ));
        }
        if self.smoothing_span == 0 {
            return Err(EngineError::invalid_config(
                config_keys::SMOOTHING_SPAN,
                self.smoothing_span,
                "平滑跨度必须大于 0",
            ));
        }
        if self.top_n == 0 {
            return Err(EngineError::invalid_config(
                config_keys::TOP_N,
                self.top_n,
                "Top-N 必须大于 0",
            ));
        }
        if self.days_since_sale_ceiling <= 0 {
            return Err(EngineError::invalid_config(
                config_keys::DAYS_SINCE_SALE_CEILING,
                self.days_since_sale_ceiling,
                "天数上限必须大于 0",
            ));
        }
        if let Some(filter) = &self.location_filter {
            if filter.is_empty() || filter.iter().any(|loc| loc.trim().is_empty()) {
                return Err(EngineError::invalid_config(
                    config_keys::LOCATION_FILTER,
                    filter.iter().cloned().collect::<Vec<_>>().join(","),
                    "库位过滤不能为空，且不能包含空白库位",
                ));
            }
        }
        Ok(())
    }

    /// EWMA 平滑系数
    pub fn smoothing_alpha(&self) -> f64 {
        2.0 / (self.smoothing_span as f64 + 1.0)
    }

    pub fn with_lead_time(mut self, lead_time_weeks: u32, safety_stock_weeks: u32) -> Self {
        self.lead_time_weeks = lead_time_weeks;
        self.safety_stock_weeks = safety_stock_weeks;
        self
    }

    pub fn with_lookback(mut self, lookback_weeks: u32) -> Self {
        self.lookback_weeks = lookback_weeks;
        self
    }

    pub fn with_forecast(mut self, horizon_weeks: u32, mode: ForecastMode) -> Self {
        self.forecast_horizon_weeks = horizon_weeks;
        self.forecast_mode = mode;
        self
    }

    pub fn with_granularity(mut self, granularity: KeyGranularity) -> Self {
        self.key_granularity = granularity;
        self
    }

    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.location_filter = Some(locations.into_iter().map(Into::into).collect());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ReplenishmentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.forecast_multiplier, 1.15);
        assert!((config.smoothing_alpha() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_zero_lookback_rejected() {
        let config = ReplenishmentConfig::default().with_lookback(0);
        match config.validate() {
            Err(EngineError::InvalidConfig { key, .. }) => assert_eq!(key, "lookback_weeks"),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_values_rejected() {
        let mut config = ReplenishmentConfig::default();
        config.forecast_horizon_weeks = 0;
        assert!(config.validate().is_err());

        let mut config = ReplenishmentConfig::default();
        config.forecast_multiplier = 0.0;
        assert!(config.validate().is_err());

        let mut config = ReplenishmentConfig::default();
        config.forecast_multiplier = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = ReplenishmentConfig::default();
        config.smoothing_span = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_week_upper_bound() {
        assert!(ReplenishmentConfig::default().with_lookback(520).validate().is_ok());

        match ReplenishmentConfig::default().with_lookback(20_000_000).validate() {
            Err(EngineError::InvalidConfig { key, .. }) => assert_eq!(key, "lookback_weeks"),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }

        let config = ReplenishmentConfig::default().with_forecast(521, ForecastMode::Linear);
        match config.validate() {
            Err(EngineError::InvalidConfig { key, .. }) => {
                assert_eq!(key, "forecast_horizon_weeks")
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_location_filter_validation() {
        assert!(ReplenishmentConfig::default()
            .with_locations(["5120", "5140"])
            .validate()
            .is_ok());
        assert!(ReplenishmentConfig::default()
            .with_locations(Vec::<String>::new())
            .validate()
            .is_err());
        assert!(ReplenishmentConfig::default()
            .with_locations(["5120", " "])
            .validate()
            .is_err());
    }

    #[test]
    fn test_zero_lead_time_is_allowed() {
        let config = ReplenishmentConfig::default().with_lead_time(0, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ReplenishmentConfig =
            serde_json::from_str(r#"{"lookback_weeks": 4, "forecast_mode": "SMOOTHED"}"#).unwrap();
        assert_eq!(config.lookback_weeks, 4);
        assert_eq!(config.forecast_mode, ForecastMode::Smoothed);
        assert_eq!(config.forecast_horizon_weeks, 12);
        assert_eq!(config.location_filter, None);
    }
}
