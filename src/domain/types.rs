// ==========================================
// 库存补货引擎 - 领域类型定义
// ==========================================
// 职责: 预测模式 / 聚合粒度 / 速度周期 / 距上次销售天数
// ==========================================

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// ==========================================
// 预测模式 (Forecast Mode)
// ==========================================
// 线性模式必须始终可用,平滑模式为可选细化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ForecastMode {
    #[default]
    Linear,   // 速度 × 周数 × 系数
    Smoothed, // 周度 EWMA × 周数 × 系数
}

impl fmt::Display for ForecastMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastMode::Linear => write!(f, "LINEAR"),
            ForecastMode::Smoothed => write!(f, "SMOOTHED"),
        }
    }
}

impl ForecastMode {
    /// 从配置字符串解析（大小写不敏感）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "LINEAR" => Some(ForecastMode::Linear),
            "SMOOTHED" | "EWMA" => Some(ForecastMode::Smoothed),
            _ => None,
        }
    }
}

// ==========================================
// 聚合粒度 (Key Granularity)
// ==========================================
// 决定呆滞/再订货点按 物料 还是 物料×库位 计算
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyGranularity {
    #[default]
    Item,         // 跨库位汇总
    ItemLocation, // 按库位拆分
}

impl fmt::Display for KeyGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyGranularity::Item => write!(f, "ITEM"),
            KeyGranularity::ItemLocation => write!(f, "ITEM_LOCATION"),
        }
    }
}

impl KeyGranularity {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "ITEM" => Some(KeyGranularity::Item),
            "ITEM_LOCATION" | "ITEM-LOCATION" | "LOCATION" => Some(KeyGranularity::ItemLocation),
            _ => None,
        }
    }
}

// ==========================================
// 速度周期 (Velocity Period)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VelocityPeriod {
    Weekly,
    Monthly,
}

impl fmt::Display for VelocityPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VelocityPeriod::Weekly => write!(f, "WEEKLY"),
            VelocityPeriod::Monthly => write!(f, "MONTHLY"),
        }
    }
}

// ==========================================
// 距上次销售天数 (Days Since Last Sale)
// ==========================================
// 序列化: 整数 或 "never"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DaysSinceLastSale {
    Days(i64),
    Never,
}

impl DaysSinceLastSale {
    pub fn is_never(&self) -> bool {
        matches!(self, DaysSinceLastSale::Never)
    }

    pub fn days(&self) -> Option<i64> {
        match self {
            DaysSinceLastSale::Days(d) => Some(*d),
            DaysSinceLastSale::Never => None,
        }
    }
}

impl fmt::Display for DaysSinceLastSale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaysSinceLastSale::Days(d) => write!(f, "{}", d),
            DaysSinceLastSale::Never => write!(f, "never"),
        }
    }
}

impl Serialize for DaysSinceLastSale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DaysSinceLastSale::Days(d) => serializer.serialize_i64(*d),
            DaysSinceLastSale::Never => serializer.serialize_str("never"),
        }
    }
}

impl<'de> Deserialize<'de> for DaysSinceLastSale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DaysVisitor;

        impl<'de> Visitor<'de> for DaysVisitor {
            type Value = DaysSinceLastSale;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an integer day count or \"never\"")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(DaysSinceLastSale::Days(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i64::try_from(v)
                    .map(DaysSinceLastSale::Days)
                    .map_err(|_| E::custom(format!("day count out of range: {}", v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                if v.eq_ignore_ascii_case("never") {
                    Ok(DaysSinceLastSale::Never)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        deserializer.deserialize_any(DaysVisitor)
    }
}
