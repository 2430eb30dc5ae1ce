//! Order Model
//!
//! 订单 + 订单行。订单行的 quantity 表示未交付数量：
//! 发货时只递减、封底为 0，从不删除行。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

// =============================================================================
// Order Status
// =============================================================================

/// Order status enum
///
/// 主链: PENDING → PROCESSING → IN_PRODUCTION → COMPLETED → SHIPPED → DELIVERED
/// 旁路: CANCELLED / DELAYED 可从任意非终态进入。
/// SHIPPED / DELIVERED 只能在订单存在发货记录时进入。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    InProduction,
    Completed,
    Shipped,
    Delivered,
    Cancelled,
    Delayed,
}

impl OrderStatus {
    /// 主链上的序号；旁路状态无序号
    fn rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Processing => Some(1),
            OrderStatus::InProduction => Some(2),
            OrderStatus::Completed => Some(3),
            OrderStatus::Shipped => Some(4),
            OrderStatus::Delivered => Some(5),
            OrderStatus::Cancelled | OrderStatus::Delayed => None,
        }
    }

    /// 是否终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// 校验状态迁移
    ///
    /// `has_dispatch`: 订单是否已有发货记录。没有发货记录不得进入
    /// SHIPPED / DELIVERED，不允许跳过发货直达 SHIPPED。
    pub fn may_enter(&self, next: OrderStatus, has_dispatch: bool) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == *self {
            // 幂等更新
            return true;
        }
        match next {
            OrderStatus::Cancelled | OrderStatus::Delayed => true,
            OrderStatus::Shipped | OrderStatus::Delivered => {
                has_dispatch
                    && match (self.rank(), next.rank()) {
                        (Some(cur), Some(nxt)) => nxt >= cur,
                        // 从 DELAYED 恢复
                        (None, Some(_)) => true,
                        _ => false,
                    }
            }
            _ => match (self.rank(), next.rank()) {
                // 主链只允许向前
                (Some(cur), Some(nxt)) => nxt >= cur,
                // 从 DELAYED 恢复到主链任意状态
                (None, Some(_)) => true,
                _ => false,
            },
        }
    }

    /// 解析 API 传入的状态字符串
    pub fn parse(value: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(value.to_string())).ok()
    }
}

// =============================================================================
// Order
// =============================================================================

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// 人类可读编号, e.g. "ORD001"
    pub order_no: String,
    /// Record link to customer
    pub customer: RecordId,
    /// Record link to creating user
    pub user: Option<RecordId>,
    pub status: OrderStatus,
    /// 订单总额；全量交付时按 OrderTotalPolicy 处理
    pub total: f64,
    /// 下单时间 (毫秒时间戳)
    pub ordered_at: i64,
    pub delivery_method: Option<String>,
    pub carrier: Option<String>,
    pub remarks: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line item (owned by exactly one order, deleted with it)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Record link to owning order
    pub order: RecordId,
    /// Record link to product
    pub product: RecordId,
    /// 未交付数量 (≥0, 发货递减)
    pub quantity: i64,
    pub unit: String,
    pub unit_price: f64,
    /// quantity × unit_price at creation time
    pub line_total: f64,
    // 生产规格属性 (仅描述制造要求，不参与标识)
    pub color_top: Option<String>,
    pub color_bottom: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub gsm: Option<i64>,
}

// =============================================================================
// API Request Types
// =============================================================================

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub customer_id: String,
    pub items: Vec<OrderItemCreate>,
    pub delivery_method: Option<String>,
    pub carrier: Option<String>,
    pub remarks: Option<String>,
}

/// Line item in a create-order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemCreate {
    pub product_id: String,
    pub quantity: i64,
    pub unit: Option<String>,
    pub color_top: Option<String>,
    pub color_bottom: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub gsm: Option<i64>,
}

/// Update order status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_chain() {
        assert!(OrderStatus::Pending.may_enter(OrderStatus::Processing, false));
        assert!(OrderStatus::Processing.may_enter(OrderStatus::InProduction, false));
        assert!(OrderStatus::InProduction.may_enter(OrderStatus::Completed, false));
        // 不允许回退
        assert!(!OrderStatus::Completed.may_enter(OrderStatus::Pending, false));
    }

    #[test]
    fn test_shipped_requires_dispatch() {
        assert!(!OrderStatus::Completed.may_enter(OrderStatus::Shipped, false));
        assert!(OrderStatus::Completed.may_enter(OrderStatus::Shipped, true));
        assert!(!OrderStatus::Pending.may_enter(OrderStatus::Delivered, false));
        assert!(OrderStatus::Shipped.may_enter(OrderStatus::Delivered, true));
    }

    #[test]
    fn test_side_transitions() {
        assert!(OrderStatus::Pending.may_enter(OrderStatus::Cancelled, false));
        assert!(OrderStatus::Shipped.may_enter(OrderStatus::Delayed, false));
        // 从 DELAYED 恢复
        assert!(OrderStatus::Delayed.may_enter(OrderStatus::InProduction, false));
        assert!(OrderStatus::Delayed.may_enter(OrderStatus::Shipped, true));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!OrderStatus::Delivered.may_enter(OrderStatus::Pending, true));
        assert!(!OrderStatus::Cancelled.may_enter(OrderStatus::Processing, false));
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn test_parse() {
        assert_eq!(OrderStatus::parse("IN_PRODUCTION"), Some(OrderStatus::InProduction));
        assert_eq!(OrderStatus::parse("SHIPPED"), Some(OrderStatus::Shipped));
        assert_eq!(OrderStatus::parse("bogus"), None);
    }
}
