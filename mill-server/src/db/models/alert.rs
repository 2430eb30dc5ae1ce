//! Alert Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Alert type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// 库存低于阈值或售罄
    StockLow,
    /// 发货扣减被封底截断，账面与实际可能漂移
    StockDrift,
    Production,
    Order,
}

/// Alert severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// Alert entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub message: String,
    pub severity: AlertSeverity,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: i64,
}
