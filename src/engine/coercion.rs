// ==========================================
// 库存补货引擎 - 数值/日期强制转换
// ==========================================
// 红线: 单行坏值不得导致整次运行失败
// 红线: 每一次替换为默认值都必须计数（不可静默丢失）
// ==========================================
// 规则:
// - Missing / 空白文本 → 视为缺失（不计数）
// - 无法解析的文本、NaN、无穷 → 0 并计数
// - 负值 → 截断为 0 并单独计数
// - 无法解析的日期文本 → None（"never"）并计数
// ==========================================

use crate::domain::cell::{CellValue, DateCell};
use chrono::{NaiveDate, NaiveDateTime};

/// 支持的日期时间文本格式
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// 支持的日期文本格式
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y", "%Y/%m/%d"];

// ==========================================
// ValueCoercer - 带计数的转换器
// ==========================================
#[derive(Debug, Default)]
pub struct ValueCoercer {
    coerced: usize,
    clamped: usize,
}

impl ValueCoercer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 被替换为默认值的字段数
    pub fn coerced_count(&self) -> usize {
        self.coerced
    }

    /// 负值截断次数
    pub fn clamped_count(&self) -> usize {
        self.clamped
    }

    /// 可选数值：缺失返回 None,坏值返回 Some(0.0) 并计数
    pub fn optional_number(&mut self, cell: &CellValue) -> Option<f64> {
        match cell {
            CellValue::Missing => None,
            CellValue::Number(v) => Some(self.finite(*v)),
            CellValue::Text(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return None;
                }
                match parse_numeric_text(trimmed) {
                    Some(v) => Some(self.finite(v)),
                    None => {
                        self.coerced += 1;
                        Some(0.0)
                    }
                }
            }
        }
    }

    /// 数值（缺失为 0）
    pub fn number(&mut self, cell: &CellValue) -> f64 {
        self.optional_number(cell).unwrap_or(0.0)
    }

    /// 非负截断（负值计数）
    pub fn non_negative(&mut self, value: f64) -> f64 {
        if value < 0.0 {
            self.clamped += 1;
            0.0
        } else {
            value
        }
    }

    /// 日期：缺失/无法解析均返回 None,仅无法解析计数
    pub fn date(&mut self, cell: &DateCell) -> Option<NaiveDateTime> {
        match cell {
            DateCell::Missing => None,
            DateCell::Timestamp(ts) => Some(*ts),
            DateCell::Date(d) => d.and_hms_opt(0, 0, 0),
            DateCell::Text(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return None;
                }
                let parsed = parse_date_text(trimmed);
                if parsed.is_none() {
                    self.coerced += 1;
                }
                parsed
            }
        }
    }

    /// 非有限值（聚合溢出等）→ 0 并计数
    pub fn finite(&mut self, v: f64) -> f64 {
        if v.is_finite() {
            v
        } else {
            self.coerced += 1;
            0.0
        }
    }
}

/// 数值文本解析（允许千分位逗号）
fn parse_numeric_text(text: &str) -> Option<f64> {
    text.parse::<f64>()
        .ok()
        .or_else(|| text.replace(',', "").parse::<f64>().ok())
}

/// 日期文本解析（依次尝试各格式）
pub fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
