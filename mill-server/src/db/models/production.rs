//! Production Batch Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Production batch status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductionStatus {
    Pending,
    InProgress,
    Completed,
    Delayed,
    Cancelled,
}

impl ProductionStatus {
    /// 解析 API 传入的状态字符串
    pub fn parse(value: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(value.to_string())).ok()
    }
}

/// Raw material requirement declared on a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRequirement {
    /// Record link to raw material
    pub raw_material: RecordId,
    /// 单件产品消耗量
    pub quantity_per_unit: f64,
}

/// Production batch entity
///
/// 创建时校验声明的原料库存充足；批次完成时经由 StockLedger
/// 为产品入库 (increment) 并扣减声明的原料。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionBatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// 批次号 (uuid)
    pub batch_id: String,
    /// Record link to product
    pub product: RecordId,
    /// Record link to order (可选)
    pub order: Option<RecordId>,
    pub quantity: i64,
    pub status: ProductionStatus,
    #[serde(default)]
    pub materials: Vec<MaterialRequirement>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Material requirement in a create-batch payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRequirementCreate {
    pub raw_material_id: String,
    pub quantity_per_unit: f64,
}

/// Create production batch payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionBatchCreate {
    pub product_id: String,
    pub quantity: i64,
    pub order_id: Option<String>,
    #[serde(default)]
    pub materials: Vec<MaterialRequirementCreate>,
    pub start_date: Option<i64>,
}
