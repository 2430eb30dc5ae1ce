//! Product Model (finished goods)

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::stock_status::StockStatus;

/// Product kind — 卷材或捆包
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    Roll,
    Bundle,
}

impl ProductType {
    /// 编号前缀: TR = tarpaulin roll, TB = tarpaulin bundle
    pub fn item_id_prefix(&self) -> &'static str {
        match self {
            ProductType::Roll => "TR",
            ProductType::Bundle => "TB",
        }
    }

    /// 默认计量单位
    pub fn default_unit(&self) -> &'static str {
        match self {
            ProductType::Roll => "rolls",
            ProductType::Bundle => "bundles",
        }
    }
}

/// Finished product entity
///
/// status 永远由 StockLedger 从 (stock, reorder_level) 重算，
/// 其他组件不得直接写 stock / status 字段。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// 人类可读编号, e.g. "TR001" / "TB001"
    pub item_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub gsm: Option<i64>,
    pub color_top: Option<String>,
    pub color_bottom: Option<String>,
    pub width: Option<f64>,
    pub length: Option<f64>,
    pub weight: Option<f64>,
    /// BUNDLE only
    pub pieces_per_bundle: Option<i64>,
    /// ROLL only
    pub roll_type: Option<String>,
    pub unit: String,
    /// 销售单价
    pub price: f64,
    pub stock: f64,
    pub reorder_level: Option<f64>,
    pub status: StockStatus,
    /// 累计售出数量 (发货时递增，报表用)
    #[serde(default)]
    pub units_sold: i64,
    pub remarks: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Inventory intake payload — 入库时若属性元组已存在则合并数量，
/// 否则创建新品类并分配编号
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductIntake {
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub name: String,
    pub quantity: f64,
    pub gsm: Option<i64>,
    pub color_top: Option<String>,
    pub color_bottom: Option<String>,
    pub width: Option<f64>,
    pub length: Option<f64>,
    pub weight: Option<f64>,
    pub pieces_per_bundle: Option<i64>,
    pub roll_type: Option<String>,
    pub price: Option<f64>,
    pub reorder_level: Option<f64>,
    pub remarks: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_prefix() {
        assert_eq!(ProductType::Roll.item_id_prefix(), "TR");
        assert_eq!(ProductType::Bundle.item_id_prefix(), "TB");
    }

    #[test]
    fn test_type_serde() {
        assert_eq!(
            serde_json::to_string(&ProductType::Roll).unwrap(),
            "\"ROLL\""
        );
        let t: ProductType = serde_json::from_str("\"BUNDLE\"").unwrap();
        assert_eq!(t, ProductType::Bundle);
    }
}
