// ==========================================
// 库存补货引擎 - 库存领域模型
// ==========================================
// 用途: 外部归一化步骤写入,引擎只读
// 红线: 引擎只依赖归一化字段,不依赖原始列名
// ==========================================

use crate::domain::cell::{CellValue, DateCell};
use serde::{Deserialize, Serialize};

/// 库位缺失时的占位代码
pub const UNKNOWN_LOCATION: &str = "UNKNOWN";

// ==========================================
// InventoryRecord - 库存记录（物料 × 库位）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    // ===== 主键 =====
    pub item_id: String,     // 物料号（TRIM 后非空）
    #[serde(default)]
    pub location_id: String, // 库位代码

    // ===== 分类 =====
    #[serde(default)]
    pub product_group: Option<String>, // 显式品类（缺失时由物料号前缀派生）

    // ===== 数量 =====
    #[serde(default)]
    pub on_hand: CellValue,     // 现存量
    #[serde(default)]
    pub allocated: CellValue,   // 已分配（存在时从净量中扣除）
    #[serde(default)]
    pub backordered: CellValue, // 欠交（存在时从净量中扣除）

    // ===== 成本 =====
    #[serde(default)]
    pub unit_cost: CellValue,       // 采购成本（缺失时回落到移动平均成本）
    #[serde(default)]
    pub moving_avg_cost: CellValue, // 移动平均成本（估值口径）

    // ===== 时间 =====
    #[serde(default)]
    pub last_sale_date: DateCell, // 最近销售日期（缺失/无法解析 = 从未销售）
}

impl InventoryRecord {
    pub fn new(item_id: &str, location_id: &str, on_hand: impl Into<CellValue>) -> Self {
        Self {
            item_id: item_id.to_string(),
            location_id: location_id.to_string(),
            on_hand: on_hand.into(),
            ..Default::default()
        }
    }

    pub fn with_unit_cost(mut self, cost: impl Into<CellValue>) -> Self {
        self.unit_cost = cost.into();
        self
    }

    pub fn with_moving_avg_cost(mut self, cost: impl Into<CellValue>) -> Self {
        self.moving_avg_cost = cost.into();
        self
    }

    pub fn with_last_sale(mut self, date: impl Into<DateCell>) -> Self {
        self.last_sale_date = date.into();
        self
    }

    pub fn with_product_group(mut self, group: &str) -> Self {
        self.product_group = Some(group.to_string());
        self
    }
}

/// 由物料号派生品类：前导 2~4 位大写字母
///
/// - "NE63A6511SS" → "NE"
/// - "RAF18" → "RAF"
/// - "ABCDE1" → "ABCD"
/// - "A1" / "ne63" → None
pub fn derive_product_group(item_id: &str) -> Option<String> {
    let prefix: String = item_id
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_uppercase())
        .take(4)
        .collect();

    if prefix.len() >= 2 {
        Some(prefix)
    } else {
        None
    }
}

/// 品类决策：显式品类优先（TRIM 后非空），否则由物料号派生
pub fn resolve_product_group(explicit: Option<&str>, item_id: &str) -> Option<String> {
    match explicit.map(str::trim) {
        Some(g) if !g.is_empty() => Some(g.to_string()),
        _ => derive_product_group(item_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_product_group() {
        assert_eq!(derive_product_group("NE63A6511SS"), Some("NE".to_string()));
        assert_eq!(derive_product_group("RAF18DU4QL"), Some("RAF".to_string()));
        assert_eq!(derive_product_group("ABCDE1"), Some("ABCD".to_string()));
        assert_eq!(derive_product_group("A1"), None);
        assert_eq!(derive_product_group("ne63"), None);
        assert_eq!(derive_product_group(""), None);
    }

    #[test]
    fn test_resolve_product_group_prefers_explicit() {
        assert_eq!(
            resolve_product_group(Some(" Ovens "), "NE63A"),
            Some("Ovens".to_string())
        );
        assert_eq!(resolve_product_group(Some("  "), "NE63A"), Some("NE".to_string()));
        assert_eq!(resolve_product_group(None, "WF45"), Some("WF".to_string()));
    }
}
