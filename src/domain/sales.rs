// ==========================================
// 库存补货引擎 - 销售领域模型
// ==========================================
// 两类速度来源（至少提供其一）:
// 1) 带时间戳的销售事件
// 2) 预先计算的月均/周均速度
// ==========================================

use crate::domain::cell::{CellValue, DateCell};
use crate::domain::types::VelocityPeriod;
use serde::{Deserialize, Serialize};

// ==========================================
// SaleEvent - 销售事件（单行出货）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaleEvent {
    pub item_id: String,
    #[serde(default)]
    pub location_id: String,
    #[serde(default)]
    pub product_group: Option<String>,
    #[serde(default)]
    pub quantity: CellValue, // 出货数量
    #[serde(default)]
    pub sold_at: DateCell,   // 开票/出货时间（无法解析的事件不参与速度计算）
}

impl SaleEvent {
    pub fn new(
        item_id: &str,
        location_id: &str,
        quantity: impl Into<CellValue>,
        sold_at: impl Into<DateCell>,
    ) -> Self {
        Self {
            item_id: item_id.to_string(),
            location_id: location_id.to_string(),
            product_group: None,
            quantity: quantity.into(),
            sold_at: sold_at.into(),
        }
    }
}

// ==========================================
// VelocityRecord - 预计算速度
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityRecord {
    pub item_id: String,
    #[serde(default)]
    pub location_id: String,
    #[serde(default)]
    pub product_group: Option<String>,
    #[serde(default)]
    pub figure: CellValue,
    pub period: VelocityPeriod,
}

impl VelocityRecord {
    pub fn monthly(item_id: &str, location_id: &str, figure: impl Into<CellValue>) -> Self {
        Self {
            item_id: item_id.to_string(),
            location_id: location_id.to_string(),
            product_group: None,
            figure: figure.into(),
            period: VelocityPeriod::Monthly,
        }
    }

    pub fn weekly(item_id: &str, location_id: &str, figure: impl Into<CellValue>) -> Self {
        Self {
            item_id: item_id.to_string(),
            location_id: location_id.to_string(),
            product_group: None,
            figure: figure.into(),
            period: VelocityPeriod::Weekly,
        }
    }
}
