// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证配置文件读取、校验与快照恢复
// ==========================================


use inventory_replenishment::config::config_keys;
use inventory_replenishment::{
    ConfigError, ConfigManager, EngineError, ForecastMode, KeyGranularity, ReplenishmentInput,
    ReplenishmentEngine, VelocityRecord,
};
use std::io::Write;
use tempfile::NamedTempFile;
use test_helpers::{as_of, InventoryBuilder};

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(json.as_bytes())
        .expect("Failed to write config");
    file
}

#[test]
fn test_load_config_from_file() {
    let file = write_config(
        r#"{
            "lookback_weeks": 8,
            "lead_time_weeks": "3",
            "forecast_multiplier": 1.3,
            "forecast_mode": "smoothed",
            "key_granularity": "ITEM_LOCATION",
            "location_filter": "5120, 5140",
            "top_n": null
        }"#,
    );

    let manager = ConfigManager::from_json_file(file.path()).expect("Failed to load config");
    let config = manager
        .load_replenishment_config()
        .expect("Config should be valid");

    assert_eq!(config.lookback_weeks, 8);
    assert_eq!(config.lead_time_weeks, 3);
    assert_eq!(config.forecast_multiplier, 1.3);
    assert_eq!(config.forecast_mode, ForecastMode::Smoothed);
    assert_eq!(config.key_granularity, KeyGranularity::ItemLocation);
    let locations: Vec<_> = config.location_filter.unwrap().into_iter().collect();
    assert_eq!(locations, vec!["5120", "5140"]);
    // 未配置项取默认值
    assert_eq!(config.forecast_horizon_weeks, 12);
    assert_eq!(config.safety_stock_weeks, 1);
    assert_eq!(config.top_n, 10);
}

#[test]
fn test_missing_file_reports_read_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let result = ConfigManager::from_json_file(dir.path().join("absent.json"));
    assert!(matches!(result, Err(ConfigError::FileReadError(_))));
}

#[test]
fn test_malformed_file_reports_parse_error() {
    let file = write_config("{ lookback_weeks: ");
    let result = ConfigManager::from_json_file(file.path());
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_malformed_value_names_key() {
    let manager = ConfigManager::from_pairs([(config_keys::LEAD_TIME_WEEKS, "two")]);
    match manager.load_replenishment_config() {
        Err(ConfigError::ConfigValueError { key, value, .. }) => {
            assert_eq!(key, config_keys::LEAD_TIME_WEEKS);
            assert_eq!(value, "two");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_out_of_range_value_rejected() {
    let manager = ConfigManager::from_pairs([(config_keys::LOOKBACK_WEEKS, "0")]);
    let result = manager.load_replenishment_config();
    assert!(matches!(
        result,
        Err(ConfigError::Invalid(EngineError::InvalidConfig { .. }))
    ));
}

#[test]
fn test_snapshot_round_trip_drives_engine() {
    let mut manager = ConfigManager::new();
    manager.set(config_keys::LEAD_TIME_WEEKS, 4);
    manager.set(config_keys::SAFETY_STOCK_WEEKS, 2);
    let snapshot = manager.get_config_snapshot().expect("Failed to snapshot");

    let restored = ConfigManager::from_snapshot(&snapshot).expect("Failed to restore");
    assert_eq!(restored.get_global_config_value(config_keys::LEAD_TIME_WEEKS), Some("4"));

    let config = restored.load_replenishment_config().unwrap();
    let engine = ReplenishmentEngine::new(config).unwrap();
    let input = ReplenishmentInput::from_velocity(
        vec![InventoryBuilder::new("C3").on_hand(0.0).build()],
        vec![VelocityRecord::weekly("C3", "5140", 10.0)],
    );
    let report = engine.run(&input, as_of()).unwrap();
    assert_eq!(report.results[0].reorder_point, 60.0);
    assert_eq!(report.results[0].suggested_order, 60.0);
}

#[test]
fn test_restore_rejects_nested_values() {
    let mut manager = ConfigManager::from_pairs([(config_keys::TOP_N, "5")]);
    let result = manager.restore_config_from_snapshot(r#"{"top_n": [1, 2]}"#);
    assert!(matches!(result, Err(ConfigError::ConfigValueError { .. })));
    // 失败时保留原配置
    assert_eq!(manager.get_top_n().unwrap(), 5);
}
