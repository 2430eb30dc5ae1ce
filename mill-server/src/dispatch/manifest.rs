//! Delivery manifest
//!
//! 创建发货时提交的 {订单行, 交付数量, 单价} 列表及其校验。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::db::models::OrderItem;
use crate::db::repository::product::ProductAttrs;
use crate::utils::{AppError, AppResult, ErrorCode};

/// 单条交付清单项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// 订单行 record key
    pub item_id: String,
    pub delivered_quantity: i64,
    /// 单价
    pub rate: f64,
    /// 计价量纲 (如每卷平方米数)；缺省按 1 计
    #[serde(default = "default_metric")]
    pub metric_value: f64,
    /// 商品匹配属性 (Phase 2 库存扣减用；无外键，按属性相等匹配)
    pub attrs: Option<ProductAttrs>,
}

fn default_metric() -> f64 {
    1.0
}

/// 校验清单：非空、数量为正、每一行都属于目标订单
///
/// 任何违例都发生在第一笔写入之前。
pub fn validate_manifest(
    manifest: &[ManifestEntry],
    order_items: &HashMap<String, OrderItem>,
) -> AppResult<()> {
    if manifest.is_empty() {
        return Err(AppError::new(ErrorCode::ManifestEmpty));
    }

    for entry in manifest {
        if entry.delivered_quantity <= 0 {
            return Err(AppError::new(ErrorCode::ManifestInvalidQuantity)
                .with_detail("item_id", entry.item_id.clone())
                .with_detail("delivered_quantity", entry.delivered_quantity));
        }
        if entry.rate < 0.0 || entry.metric_value < 0.0 {
            return Err(AppError::new(ErrorCode::ManifestInvalidQuantity)
                .with_detail("item_id", entry.item_id.clone())
                .with_detail("reason", "rate and metric_value cannot be negative"));
        }
        if !order_items.contains_key(&entry.item_id) {
            // 防跨订单篡改：清单行必须属于目标订单
            return Err(AppError::new(ErrorCode::OrderItemForeign)
                .with_detail("item_id", entry.item_id.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::RecordId;

    fn item(key: &str) -> OrderItem {
        OrderItem {
            id: Some(RecordId::from_table_key("order_item", key)),
            order: RecordId::from_table_key("order", "o1"),
            product: RecordId::from_table_key("product", "p1"),
            quantity: 10,
            unit: "rolls".to_string(),
            unit_price: 10.0,
            line_total: 100.0,
            color_top: None,
            color_bottom: None,
            length: None,
            width: None,
            gsm: None,
        }
    }

    fn entry(item_id: &str, qty: i64) -> ManifestEntry {
        ManifestEntry {
            item_id: item_id.to_string(),
            delivered_quantity: qty,
            rate: 10.0,
            metric_value: 1.0,
            attrs: None,
        }
    }

    fn items(keys: &[&str]) -> HashMap<String, OrderItem> {
        keys.iter().map(|k| (k.to_string(), item(k))).collect()
    }

    #[test]
    fn test_empty_manifest_rejected() {
        let err = validate_manifest(&[], &items(&["i1"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ManifestEmpty);
    }

    #[test]
    fn test_zero_or_negative_quantity_rejected() {
        let err = validate_manifest(&[entry("i1", 0)], &items(&["i1"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ManifestInvalidQuantity);
        let err = validate_manifest(&[entry("i1", -3)], &items(&["i1"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ManifestInvalidQuantity);
    }

    #[test]
    fn test_foreign_item_rejected() {
        let err = validate_manifest(&[entry("other", 1)], &items(&["i1"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderItemForeign);
    }

    #[test]
    fn test_valid_manifest() {
        let result = validate_manifest(
            &[entry("i1", 5), entry("i2", 1)],
            &items(&["i1", "i2"]),
        );
        assert!(result.is_ok());
    }
}
