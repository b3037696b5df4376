// ==========================================
// 库存补货引擎 - 配置管理器
// ==========================================
// 职责: 键值配置加载、查询、快照
// 来源: 键值对 / JSON 配置文件 / 配置快照
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::replenishment_config::ReplenishmentConfig;
use crate::domain::types::{ForecastMode, KeyGranularity};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::str::FromStr;

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const LOOKBACK_WEEKS: &str = "lookback_weeks";
    pub const FORECAST_HORIZON_WEEKS: &str = "forecast_horizon_weeks";
    pub const LEAD_TIME_WEEKS: &str = "lead_time_weeks";
    pub const SAFETY_STOCK_WEEKS: &str = "safety_stock_weeks";
    pub const FORECAST_MULTIPLIER: &str = "forecast_multiplier";
    pub const FORECAST_MODE: &str = "forecast_mode";
    pub const SMOOTHING_SPAN: &str = "smoothing_span";
    pub const KEY_GRANULARITY: &str = "key_granularity";
    pub const TOP_N: &str = "top_n";
    pub const DAYS_SINCE_SALE_CEILING: &str = "days_since_sale_ceiling";
    pub const LOCATION_FILTER: &str = "location_filter"; // 逗号分隔,如 "5120,5140"
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    entries: BTreeMap<String, String>,
}

impl ConfigManager {
    /// 创建空配置（全部取默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 从键值对创建
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (k.into().trim().to_string(), v.into().trim().to_string()))
            .collect();
        Self { entries }
    }

    /// 从 JSON 配置文件创建
    ///
    /// 文件内容为 JSON 对象；字符串/数字/布尔值均按字符串存储
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileReadError(format!("{}: {}", path.display(), e)))?;
        let manager = Self::from_snapshot(&raw)?;

        tracing::debug!(
            path = %path.display(),
            entries = manager.entries.len(),
            "配置文件加载完成"
        );
        Ok(manager)
    }

    /// 从配置快照（JSON 对象）创建
    pub fn from_snapshot(snapshot_json: &str) -> ConfigResult<Self> {
        let mut manager = Self::new();
        manager.restore_config_from_snapshot(snapshot_json)?;
        Ok(manager)
    }

    /// 覆写单个配置项
    pub fn set(&mut self, key: &str, value: impl ToString) {
        self.entries
            .insert(key.trim().to_string(), value.to_string().trim().to_string());
    }

    /// 读取配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// 读取并解析配置值，缺失时取默认值
    ///
    /// 值存在但格式错误时返回 ConfigValueError（指明 key）
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_global_config_value(key) {
            None => Ok(default),
            Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::ConfigValueError {
                key: key.to_string(),
                value: raw.to_string(),
                message: e.to_string(),
            }),
        }
    }

    // ==========================================
    // 类型化读取
    // ==========================================

    pub fn get_lookback_weeks(&self) -> ConfigResult<u32> {
        self.get_parsed_or_default(config_keys::LOOKBACK_WEEKS, 12)
    }

    pub fn get_forecast_horizon_weeks(&self) -> ConfigResult<u32> {
        self.get_parsed_or_default(config_keys::FORECAST_HORIZON_WEEKS, 12)
    }

    pub fn get_lead_time_weeks(&self) -> ConfigResult<u32> {
        self.get_parsed_or_default(config_keys::LEAD_TIME_WEEKS, 2)
    }

    pub fn get_safety_stock_weeks(&self) -> ConfigResult<u32> {
        self.get_parsed_or_default(config_keys::SAFETY_STOCK_WEEKS, 1)
    }

    pub fn get_forecast_multiplier(&self) -> ConfigResult<f64> {
        self.get_parsed_or_default(
            config_keys::FORECAST_MULTIPLIER,
            crate::config::replenishment_config::DEFAULT_FORECAST_MULTIPLIER,
        )
    }

    pub fn get_forecast_mode(&self) -> ConfigResult<ForecastMode> {
        match self.get_global_config_value(config_keys::FORECAST_MODE) {
            None => Ok(ForecastMode::Linear),
            Some(raw) => ForecastMode::parse(raw).ok_or_else(|| ConfigError::ConfigValueError {
                key: config_keys::FORECAST_MODE.to_string(),
                value: raw.to_string(),
                message: "仅支持 LINEAR / SMOOTHED".to_string(),
            }),
        }
    }

    pub fn get_smoothing_span(&self) -> ConfigResult<u32> {
        self.get_parsed_or_default(config_keys::SMOOTHING_SPAN, 4)
    }

    pub fn get_key_granularity(&self) -> ConfigResult<KeyGranularity> {
        match self.get_global_config_value(config_keys::KEY_GRANULARITY) {
            None => Ok(KeyGranularity::Item),
            Some(raw) => KeyGranularity::parse(raw).ok_or_else(|| ConfigError::ConfigValueError {
                key: config_keys::KEY_GRANULARITY.to_string(),
                value: raw.to_string(),
                message: "仅支持 ITEM / ITEM_LOCATION".to_string(),
            }),
        }
    }

    pub fn get_top_n(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(config_keys::TOP_N, 10)
    }

    pub fn get_days_since_sale_ceiling(&self) -> ConfigResult<i64> {
        self.get_parsed_or_default(
            config_keys::DAYS_SINCE_SALE_CEILING,
            crate::config::replenishment_config::DEFAULT_DAYS_SINCE_SALE_CEILING,
        )
    }

    /// 库位过滤（逗号分隔；未配置 = 全部库位）
    pub fn get_location_filter(&self) -> ConfigResult<Option<BTreeSet<String>>> {
        let raw = match self.get_global_config_value(config_keys::LOCATION_FILTER) {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let locations: BTreeSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|loc| !loc.is_empty())
            .map(str::to_string)
            .collect();
        if locations.is_empty() {
            return Err(ConfigError::ConfigValueError {
                key: config_keys::LOCATION_FILTER.to_string(),
                value: raw.to_string(),
                message: "至少需要一个库位".to_string(),
            });
        }
        Ok(Some(locations))
    }

    /// 组装并校验运行配置
    pub fn load_replenishment_config(&self) -> ConfigResult<ReplenishmentConfig> {
        let config = ReplenishmentConfig {
            lookback_weeks: self.get_lookback_weeks()?,
            forecast_horizon_weeks: self.get_forecast_horizon_weeks()?,
            lead_time_weeks: self.get_lead_time_weeks()?,
            safety_stock_weeks: self.get_safety_stock_weeks()?,
            forecast_multiplier: self.get_forecast_multiplier()?,
            forecast_mode: self.get_forecast_mode()?,
            smoothing_span: self.get_smoothing_span()?,
            key_granularity: self.get_key_granularity()?,
            top_n: self.get_top_n()?,
            days_since_sale_ceiling: self.get_days_since_sale_ceiling()?,
            location_filter: self.get_location_filter()?,
        };
        config.validate()?;
        Ok(config)
    }

    // ==========================================
    // 快照
    // ==========================================

    /// 获取所有配置的快照（JSON 格式，键有序）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    /// 从配置快照恢复配置（覆盖现有配置）
    ///
    /// 返回恢复的配置项数量
    pub fn restore_config_from_snapshot(&mut self, snapshot_json: &str) -> ConfigResult<usize> {
        let value: Value = serde_json::from_str(snapshot_json)?;
        let object = value.as_object().ok_or_else(|| {
            ConfigError::ParseError("配置快照必须是 JSON 对象".to_string())
        })?;

        let mut entries = BTreeMap::new();
        for (key, raw) in object {
            let text = match raw {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => continue,
                other => {
                    return Err(ConfigError::ConfigValueError {
                        key: key.clone(),
                        value: other.to_string(),
                        message: "配置值必须是标量".to_string(),
                    })
                }
            };
            entries.insert(key.trim().to_string(), text);
        }

        let count = entries.len();
        self.entries = entries;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_manager_yields_defaults() {
        let config = ConfigManager::new().load_replenishment_config().unwrap();
        assert_eq!(config, ReplenishmentConfig::default());
    }

    #[test]
    fn test_pairs_override_defaults() {
        let manager = ConfigManager::from_pairs([
            ("lookback_weeks", "8"),
            ("forecast_mode", "smoothed"),
            ("key_granularity", "ITEM_LOCATION"),
            ("forecast_multiplier", "1.2"),
        ]);
        let config = manager.load_replenishment_config().unwrap();
        assert_eq!(config.lookback_weeks, 8);
        assert_eq!(config.forecast_mode, ForecastMode::Smoothed);
        assert_eq!(config.key_granularity, KeyGranularity::ItemLocation);
        assert!((config.forecast_multiplier - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_malformed_value_names_key() {
        let manager = ConfigManager::from_pairs([("lead_time_weeks", "two")]);
        match manager.load_replenishment_config() {
            Err(ConfigError::ConfigValueError { key, value, .. }) => {
                assert_eq!(key, "lead_time_weeks");
                assert_eq!(value, "two");
            }
            other => panic!("expected ConfigValueError, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_lookback_rejected_at_parse() {
        let manager = ConfigManager::from_pairs([("lookback_weeks", "-4")]);
        assert!(matches!(
            manager.load_replenishment_config(),
            Err(ConfigError::ConfigValueError { .. })
        ));
    }

    #[test]
    fn test_zero_horizon_rejected_by_validation() {
        let manager = ConfigManager::from_pairs([("forecast_horizon_weeks", "0")]);
        assert!(matches!(
            manager.load_replenishment_config(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_oversized_lookback_rejected_by_validation() {
        let manager = ConfigManager::from_pairs([("lookback_weeks", "20000000")]);
        assert!(matches!(
            manager.load_replenishment_config(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_location_filter_parsed_from_list() {
        let manager = ConfigManager::from_pairs([("location_filter", " 5140, 5120 ,,")]);
        let config = manager.load_replenishment_config().unwrap();
        let filter = config.location_filter.unwrap();
        assert_eq!(
            filter.into_iter().collect::<Vec<_>>(),
            vec!["5120".to_string(), "5140".to_string()]
        );

        let manager = ConfigManager::from_pairs([("location_filter", " , ")]);
        assert!(matches!(
            manager.load_replenishment_config(),
            Err(ConfigError::ConfigValueError { .. })
        ));
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut manager = ConfigManager::new();
        manager.set("top_n", 25);
        manager.set("lead_time_weeks", 3);

        let snapshot = manager.get_config_snapshot().unwrap();
        let restored = ConfigManager::from_snapshot(&snapshot).unwrap();
        assert_eq!(restored.get_top_n().unwrap(), 25);
        assert_eq!(restored.get_lead_time_weeks().unwrap(), 3);
    }

    #[test]
    fn test_snapshot_accepts_numbers_and_skips_null() {
        let mut manager = ConfigManager::new();
        let count = manager
            .restore_config_from_snapshot(r#"{"lookback_weeks": 6, "top_n": null}"#)
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(manager.get_lookback_weeks().unwrap(), 6);
        assert_eq!(manager.get_top_n().unwrap(), 10);
    }

    #[test]
    fn test_snapshot_rejects_non_object() {
        let mut manager = ConfigManager::new();
        assert!(manager.restore_config_from_snapshot("[1, 2]").is_err());
        assert!(manager
            .restore_config_from_snapshot(r#"{"lookback_weeks": [1]}"#)
            .is_err());
    }
}
