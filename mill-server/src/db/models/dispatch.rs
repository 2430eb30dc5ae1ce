//! Dispatch Model
//!
//! 发货单是 append-only 实体：创建一次，状态只向前迁移，正常流程不删除。
//! 行明细 (`lines`) 是创建时刻的反规范化快照，后续商品或订单行变更不影响它。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::product::ProductType;

// =============================================================================
// Dispatch Status
// =============================================================================

/// Dispatch status enum
///
/// READY_FOR_PICKUP → IN_TRANSIT → DELIVERED; DELAYED 可从前两者进入。
/// DELIVERED 为终态，且级联把关联订单置为 DELIVERED。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchStatus {
    ReadyForPickup,
    InTransit,
    Delivered,
    Delayed,
}

impl DispatchStatus {
    /// 是否终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, DispatchStatus::Delivered)
    }

    /// 校验状态迁移
    pub fn may_enter(&self, next: DispatchStatus) -> bool {
        if next == *self {
            // 幂等更新
            return true;
        }
        match (self, next) {
            (DispatchStatus::ReadyForPickup, DispatchStatus::InTransit)
            | (DispatchStatus::ReadyForPickup, DispatchStatus::Delivered)
            | (DispatchStatus::ReadyForPickup, DispatchStatus::Delayed)
            | (DispatchStatus::InTransit, DispatchStatus::Delivered)
            | (DispatchStatus::InTransit, DispatchStatus::Delayed)
            | (DispatchStatus::Delayed, DispatchStatus::InTransit)
            | (DispatchStatus::Delayed, DispatchStatus::Delivered) => true,
            _ => false,
        }
    }

    /// 解析 API 传入的状态字符串
    pub fn parse(value: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(value.to_string())).ok()
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Itemized snapshot line — 创建时刻的价格/数量副本
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchLine {
    /// 订单行 record key
    pub item_id: String,
    pub product_name: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub color_top: Option<String>,
    pub color_bottom: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub gsm: Option<i64>,
    pub delivered_quantity: i64,
    pub rate: f64,
    /// 计价量纲 (如每卷平方米数)
    pub metric_value: f64,
    /// rate × metric_value × delivered_quantity
    pub amount: f64,
}

/// Dispatch entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// 人类可读编号, e.g. "DIS001" (独立于订单编号空间)
    pub dispatch_no: String,
    /// Record link to order
    pub order: RecordId,
    /// 冗余订单编号，便于列表检索
    pub order_no: String,
    pub status: DispatchStatus,
    pub customer: Option<String>,
    pub loading_date: Option<String>,
    pub driver_name: Option<String>,
    pub driver_number: Option<String>,
    pub car_number: Option<String>,
    pub carrier: Option<String>,
    pub transportation: Option<String>,
    pub shipping_address: Option<String>,
    pub tracking_id: Option<String>,
    /// 人类可读打包摘要
    pub package_details: String,
    /// 本次发货总额
    pub total_amount: f64,
    /// 行明细快照
    pub lines: Vec<DispatchLine>,
    pub remarks: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Shipment metadata supplied at creation time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchMeta {
    pub customer: Option<String>,
    pub loading_date: Option<String>,
    pub driver_name: Option<String>,
    pub driver_number: Option<String>,
    pub car_number: Option<String>,
    pub carrier: Option<String>,
    pub transportation: Option<String>,
    pub shipping_address: Option<String>,
    pub remarks: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(DispatchStatus::ReadyForPickup.may_enter(DispatchStatus::InTransit));
        assert!(DispatchStatus::InTransit.may_enter(DispatchStatus::Delivered));
        assert!(DispatchStatus::ReadyForPickup.may_enter(DispatchStatus::Delivered));
    }

    #[test]
    fn test_delayed_paths() {
        assert!(DispatchStatus::ReadyForPickup.may_enter(DispatchStatus::Delayed));
        assert!(DispatchStatus::InTransit.may_enter(DispatchStatus::Delayed));
        assert!(DispatchStatus::Delayed.may_enter(DispatchStatus::InTransit));
        assert!(DispatchStatus::Delayed.may_enter(DispatchStatus::Delivered));
    }

    #[test]
    fn test_delivered_is_terminal() {
        assert!(!DispatchStatus::Delivered.may_enter(DispatchStatus::InTransit));
        assert!(!DispatchStatus::Delivered.may_enter(DispatchStatus::Delayed));
        assert!(DispatchStatus::Delivered.is_terminal());
    }

    #[test]
    fn test_no_backwards() {
        assert!(!DispatchStatus::InTransit.may_enter(DispatchStatus::ReadyForPickup));
        assert!(!DispatchStatus::Delayed.may_enter(DispatchStatus::ReadyForPickup));
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            DispatchStatus::parse("READY_FOR_PICKUP"),
            Some(DispatchStatus::ReadyForPickup)
        );
        assert_eq!(DispatchStatus::parse("LOST"), None);
    }
}
