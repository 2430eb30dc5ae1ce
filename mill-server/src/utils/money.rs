//! 金额计算
//!
//! 所有金额运算走 Decimal，避免 f64 累加误差。
//! 存储层仍使用 f64 (两位小数)，仅在计算边界转换。

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// f64 -> Decimal (保留两位小数)
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or(Decimal::ZERO)
        .round_dp(2)
}

/// Decimal -> f64 (两位小数)
pub fn to_f64(value: Decimal) -> f64 {
    value.round_dp(2).to_f64().unwrap_or(0.0)
}

/// 订单行小计: quantity × unit_price
pub fn line_total(quantity: i64, unit_price: f64) -> f64 {
    let total = Decimal::from(quantity) * to_decimal(unit_price);
    to_f64(total)
}

/// 发货行金额: rate × metric_value × delivered_quantity
///
/// metric_value 是计价量纲（如每卷平方米数），rate 是单价。
pub fn dispatch_line_amount(rate: f64, metric_value: f64, delivered_quantity: i64) -> f64 {
    let amount = to_decimal(rate) * to_decimal(metric_value) * Decimal::from(delivered_quantity);
    to_f64(amount)
}

/// 金额求和 (Decimal 累加后再回到 f64)
pub fn sum_amounts<I: IntoIterator<Item = f64>>(amounts: I) -> f64 {
    let total: Decimal = amounts.into_iter().map(to_decimal).sum();
    to_f64(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_precision() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);

        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn test_accumulation_precision() {
        // Sum 0.01 one thousand times
        let total = sum_amounts(std::iter::repeat_n(0.01, 1000));
        assert_eq!(total, 10.0);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(3, 10.99), 32.97);
        assert_eq!(line_total(0, 10.99), 0.0);
    }

    #[test]
    fn test_dispatch_line_amount() {
        // 规格场景: 50 件 × 单价 10 × 量纲 1 = 500
        assert_eq!(dispatch_line_amount(10.0, 1.0, 50), 500.0);
        // 按面积计价: 12.5 元/㎡ × 18㎡/卷 × 4 卷 = 900
        assert_eq!(dispatch_line_amount(12.5, 18.0, 4), 900.0);
    }

    #[test]
    fn test_sum_amounts() {
        assert_eq!(sum_amounts([500.0, 900.0, 0.33]), 1400.33);
        assert_eq!(sum_amounts([]), 0.0);
    }
}
