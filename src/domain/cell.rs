// ==========================================
// 库存补货引擎 - 原始单元格值
// ==========================================
// 用途: 归一化记录中的数值/日期字段保留原始形态,
//       由引擎统一强制转换并计数（不可静默丢失）
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// CellValue - 数值单元格
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Missing
    }
}

impl CellValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Number(v as f64)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<Option<f64>> for CellValue {
    fn from(v: Option<f64>) -> Self {
        v.map(CellValue::Number).unwrap_or(CellValue::Missing)
    }
}

// ==========================================
// DateCell - 日期单元格
// ==========================================
// 解析顺序: Timestamp → Date → Text（兜底原文）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateCell {
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Text(String),
    Missing,
}

impl Default for DateCell {
    fn default() -> Self {
        DateCell::Missing
    }
}

impl From<NaiveDateTime> for DateCell {
    fn from(v: NaiveDateTime) -> Self {
        DateCell::Timestamp(v)
    }
}

impl From<NaiveDate> for DateCell {
    fn from(v: NaiveDate) -> Self {
        DateCell::Date(v)
    }
}

impl From<&str> for DateCell {
    fn from(v: &str) -> Self {
        DateCell::Text(v.to_string())
    }
}
