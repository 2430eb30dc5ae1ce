//! Raw Material Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::stock_status::StockStatus;

/// Raw material entity
///
/// status 同 Product：由 StockLedger 从 (stock, reorder_level) 重算。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMaterial {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// 人类可读编号, e.g. "RM-001"
    pub item_id: String,
    pub name: String,
    pub supplier: Option<String>,
    pub stock: f64,
    pub unit: String,
    pub price: f64,
    /// GST 税率 (百分比)
    pub gst_rate: Option<f64>,
    pub reorder_level: Option<f64>,
    pub status: StockStatus,
    pub remarks: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create raw material payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMaterialCreate {
    pub name: String,
    pub supplier: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub price: f64,
    pub gst_rate: Option<f64>,
    pub reorder_level: Option<f64>,
    pub remarks: Option<String>,
}

/// Absolute stock update payload (manual correction path)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMaterialStockUpdate {
    pub stock: f64,
}
