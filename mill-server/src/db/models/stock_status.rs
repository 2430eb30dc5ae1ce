//! Stock status classification
//!
//! 状态永远是 (stock, reorder_level) 的纯函数，禁止单独赋值。

use serde::{Deserialize, Serialize};

/// Derived stock status for products and raw materials
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// Classify stock level against an optional reorder threshold
    ///
    /// - stock <= 0           -> OUT_OF_STOCK
    /// - stock <= reorder     -> LOW_STOCK (when a threshold is configured)
    /// - otherwise            -> IN_STOCK
    pub fn classify(stock: f64, reorder_level: Option<f64>) -> Self {
        if stock <= 0.0 {
            StockStatus::OutOfStock
        } else if matches!(reorder_level, Some(level) if stock <= level) {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    /// Whether this status should raise a low-stock alert
    pub fn needs_alert(&self) -> bool {
        !matches!(self, StockStatus::InStock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_out_of_stock() {
        assert_eq!(StockStatus::classify(0.0, None), StockStatus::OutOfStock);
        assert_eq!(StockStatus::classify(-1.0, None), StockStatus::OutOfStock);
        // zero beats threshold
        assert_eq!(
            StockStatus::classify(0.0, Some(10.0)),
            StockStatus::OutOfStock
        );
    }

    #[test]
    fn test_classify_low_stock() {
        assert_eq!(
            StockStatus::classify(5.0, Some(10.0)),
            StockStatus::LowStock
        );
        assert_eq!(
            StockStatus::classify(10.0, Some(10.0)),
            StockStatus::LowStock
        );
    }

    #[test]
    fn test_classify_in_stock() {
        assert_eq!(StockStatus::classify(11.0, Some(10.0)), StockStatus::InStock);
        // no threshold configured: any positive stock is IN_STOCK
        assert_eq!(StockStatus::classify(1.0, None), StockStatus::InStock);
    }

    #[test]
    fn test_serde_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&StockStatus::LowStock).unwrap(),
            "\"LOW_STOCK\""
        );
        let s: StockStatus = serde_json::from_str("\"OUT_OF_STOCK\"").unwrap();
        assert_eq!(s, StockStatus::OutOfStock);
    }
}
