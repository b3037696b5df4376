// ==========================================
// 库存补货引擎 - 呆滞判定与销售新鲜度
// ==========================================
// 红线: 呆滞是二元标记,不是评分
//       is_dead_stock = (weekly_velocity == 0) AND (on_hand > 0)
// 距上次销售天数:
// - 无日期 → never
// - floor(as_of - last_sale) 为负或超过上限（占位日期）→ never
// - 多个来源时取最近的合理日期（占位日期不得掩盖真实销售）
// ==========================================

use crate::domain::types::DaysSinceLastSale;
use chrono::NaiveDateTime;

pub struct StockClassifier {
    days_ceiling: i64,
}

impl StockClassifier {
    pub fn new(days_ceiling: i64) -> Self {
        Self { days_ceiling }
    }

    /// 呆滞判定
    pub fn is_dead_stock(&self, weekly_velocity: f64, on_hand: f64) -> bool {
        weekly_velocity == 0.0 && on_hand > 0.0
    }

    /// 距上次销售天数
    pub fn days_since_last_sale(
        &self,
        last_sale: Option<NaiveDateTime>,
        as_of: NaiveDateTime,
    ) -> DaysSinceLastSale {
        let last_sale = match last_sale {
            Some(ts) => ts,
            None => return DaysSinceLastSale::Never,
        };

        // num_days 向零截断; as_of ≥ last_sale 时等价于 floor
        let elapsed = as_of - last_sale;
        if elapsed < chrono::Duration::zero() {
            return DaysSinceLastSale::Never;
        }

        let days = elapsed.num_days();
        if days > self.days_ceiling {
            DaysSinceLastSale::Never
        } else {
            DaysSinceLastSale::Days(days)
        }
    }

    /// 多来源日期中取最近的合理日期计算天数
    pub fn days_since_latest_sale(
        &self,
        candidates: &[NaiveDateTime],
        as_of: NaiveDateTime,
    ) -> DaysSinceLastSale {
        candidates
            .iter()
            .filter_map(|ts| self.days_since_last_sale(Some(*ts), as_of).days())
            .min()
            .map(DaysSinceLastSale::Days)
            .unwrap_or(DaysSinceLastSale::Never)
    }

    /// 供应覆盖期 = on_hand / 周速度
    ///
    /// 速度为 0 或商溢出时返回 None（无穷）
    pub fn days_of_supply(&self, on_hand: f64, weekly_velocity: f64) -> Option<f64> {
        if weekly_velocity > 0.0 {
            Some(on_hand / weekly_velocity).filter(|weeks| weeks.is_finite())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_dead_stock_definition() {
        let classifier = StockClassifier::new(9999);
        assert!(classifier.is_dead_stock(0.0, 5.0));
        assert!(!classifier.is_dead_stock(0.0, 0.0));
        assert!(!classifier.is_dead_stock(0.1, 5.0));
    }

    #[test]
    fn test_days_since_last_sale() {
        let classifier = StockClassifier::new(9999);
        let as_of = ts(2025, 6, 30) + chrono::Duration::hours(9);
        assert_eq!(
            classifier.days_since_last_sale(Some(ts(2025, 6, 20)), as_of),
            DaysSinceLastSale::Days(10)
        );
        assert_eq!(
            classifier.days_since_last_sale(None, as_of),
            DaysSinceLastSale::Never
        );
    }

    #[test]
    fn test_future_and_sentinel_dates_are_never() {
        let classifier = StockClassifier::new(9999);
        let as_of = ts(2025, 6, 30);
        assert!(classifier
            .days_since_last_sale(Some(ts(2025, 7, 2)), as_of)
            .is_never());
        // 1900-01-01 占位日期
        assert!(classifier
            .days_since_last_sale(Some(ts(1900, 1, 1)), as_of)
            .is_never());
    }

    #[test]
    fn test_placeholder_date_does_not_mask_recent_sale() {
        let classifier = StockClassifier::new(9999);
        let as_of = ts(2025, 6, 30);
        assert_eq!(
            classifier.days_since_latest_sale(&[ts(1900, 1, 1), ts(2025, 6, 27)], as_of),
            DaysSinceLastSale::Days(3)
        );
        // 未来日期同样被忽略
        assert_eq!(
            classifier.days_since_latest_sale(&[ts(2099, 1, 1), ts(2025, 5, 31)], as_of),
            DaysSinceLastSale::Days(30)
        );
        assert!(classifier
            .days_since_latest_sale(&[ts(1900, 1, 1)], as_of)
            .is_never());
        assert!(classifier.days_since_latest_sale(&[], as_of).is_never());
    }

    #[test]
    fn test_days_of_supply() {
        let classifier = StockClassifier::new(9999);
        assert_eq!(classifier.days_of_supply(100.0, 20.0), Some(5.0));
        assert_eq!(classifier.days_of_supply(100.0, 0.0), None);
        assert_eq!(classifier.days_of_supply(f64::MAX, 1e-10), None);
    }
}
