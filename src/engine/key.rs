// ==========================================
// 库存补货引擎 - 聚合键
// ==========================================
// ITEM 粒度: (item_id, None)
// ITEM_LOCATION 粒度: (item_id, Some(location_id))
// 有序键保证输出顺序确定（同输入同输出）
// ==========================================

use crate::domain::inventory::UNKNOWN_LOCATION;
use crate::domain::types::KeyGranularity;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey {
    pub item_id: String,
    pub location_id: Option<String>,
}

impl ItemKey {
    /// 按粒度构造键；物料号 TRIM 后为空返回 None
    pub fn build(granularity: KeyGranularity, item_id: &str, location_id: &str) -> Option<Self> {
        let item_id = item_id.trim();
        if item_id.is_empty() {
            return None;
        }

        let location_id = match granularity {
            KeyGranularity::Item => None,
            KeyGranularity::ItemLocation => {
                let loc = location_id.trim();
                Some(if loc.is_empty() {
                    UNKNOWN_LOCATION.to_string()
                } else {
                    loc.to_string()
                })
            }
        };

        Some(Self {
            item_id: item_id.to_string(),
            location_id,
        })
    }
}

/// 库位过滤（未配置时全部放行；空白库位按 UNKNOWN 匹配）
pub fn location_allowed(filter: Option<&BTreeSet<String>>, location_id: &str) -> bool {
    match filter {
        None => true,
        Some(wanted) => {
            let loc = location_id.trim();
            let loc = if loc.is_empty() { UNKNOWN_LOCATION } else { loc };
            wanted.contains(loc)
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location_id {
            Some(loc) => write!(f, "{}@{}", self.item_id, loc),
            None => write!(f, "{}", self.item_id),
        }
    }
}
