//! Order Repository
//!
//! 订单创建与读侧查询。订单行的 quantity 递减只发生在
//! `DispatchWorkflow` 的原子事务里，本仓储不提供该操作。

use serde::{Deserialize, Serialize};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, PageInfo, Pagination, RepoError, RepoResult};
use crate::db::models::{Order, OrderCreate, OrderItem, OrderStatus, Product};
use crate::db::schema::is_unique_index_violation;
use crate::db::sequence::SequenceAllocator;
use crate::utils::money;

const ORDER_TABLE: &str = "order";
const ORDER_ITEM_TABLE: &str = "order_item";
const ORDER_PREFIX: &str = "ORD";

/// 编号分配竞态的重试上限
const CREATE_RETRIES: usize = 3;

// =============================================================================
// Read-side projections
// =============================================================================

/// Order row for list views (customer fetched)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_no: String,
    pub customer_name: Option<String>,
    pub customer_company: Option<String>,
    pub status: OrderStatus,
    pub total: f64,
    pub ordered_at: i64,
}

/// Line item with product name for detail views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemDetail {
    pub item_id: String,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub unit: String,
    pub unit_price: f64,
    pub line_total: f64,
    pub color_top: Option<String>,
    pub color_bottom: Option<String>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub gsm: Option<i64>,
}

/// Full order detail
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order_no: String,
    pub customer_name: Option<String>,
    pub customer_company: Option<String>,
    pub status: OrderStatus,
    pub total: f64,
    pub ordered_at: i64,
    pub delivery_method: Option<String>,
    pub carrier: Option<String>,
    pub remarks: Option<String>,
    pub items: Vec<OrderItemDetail>,
    pub dispatch_nos: Vec<String>,
}

/// Order book header counters + latest orders
#[derive(Debug, Clone, Serialize)]
pub struct OrderBook {
    pub new_orders: i64,
    pub in_production: i64,
    pub completed: i64,
    pub orders: Vec<OrderSummary>,
}

/// List filter parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<String>,
    pub search: Option<String>,
}

// =============================================================================
// Order Repository
// =============================================================================

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
    sequences: SequenceAllocator,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            sequences: SequenceAllocator::new(db.clone()),
            base: BaseRepository::new(db),
        }
    }

    /// Create an order with its line items in one transaction
    ///
    /// 价格取自商品当前单价；订单总额 = Σ 行小计 (Decimal 累加)。
    /// 编号分配撞唯一索引时整个事务回滚并重试。
    pub async fn create(&self, data: OrderCreate, user: Option<RecordId>) -> RepoResult<Order> {
        if data.items.is_empty() {
            return Err(RepoError::Validation("items are required".into()));
        }
        for item in &data.items {
            if item.quantity <= 0 {
                return Err(RepoError::Validation("item quantity must be positive".into()));
            }
        }

        // Resolve customer
        let customer: Option<crate::db::models::Customer> = self
            .base
            .db()
            .select(("customer", data.customer_id.as_str()))
            .await?;
        let customer = customer
            .ok_or_else(|| RepoError::NotFound(format!("Customer {} not found", data.customer_id)))?;
        let customer_id = customer.id.clone().expect("selected record has an id");

        // Resolve products and price the lines
        let mut lines: Vec<serde_json::Value> = Vec::with_capacity(data.items.len());
        let mut totals: Vec<f64> = Vec::with_capacity(data.items.len());
        for item in &data.items {
            let product: Option<Product> = self
                .base
                .db()
                .select(("product", item.product_id.as_str()))
                .await?;
            let product = product.ok_or_else(|| {
                RepoError::NotFound(format!("Product {} not found", item.product_id))
            })?;

            let unit_price = product.price;
            let line_total = money::line_total(item.quantity, unit_price);
            totals.push(line_total);

            lines.push(serde_json::json!({
                "product_key": item.product_id,
                "quantity": item.quantity,
                "unit": item.unit.clone().unwrap_or_else(|| product.unit.clone()),
                "unit_price": unit_price,
                "line_total": line_total,
                "color_top": item.color_top,
                "color_bottom": item.color_bottom,
                "length": item.length,
                "width": item.width,
                "gsm": item.gsm,
            }));
        }
        let total = money::sum_amounts(totals);

        let now = shared::util::now_millis();
        let mut last_err = None;

        for _ in 0..CREATE_RETRIES {
            let order_no = self
                .sequences
                .next_id(ORDER_TABLE, "order_no", ORDER_PREFIX)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

            let order = Order {
                id: None,
                order_no: order_no.clone(),
                customer: customer_id.clone(),
                user: user.clone(),
                status: OrderStatus::Pending,
                total,
                ordered_at: now,
                delivery_method: data.delivery_method.clone(),
                carrier: data.carrier.clone(),
                remarks: data.remarks.clone(),
                created_at: now,
                updated_at: now,
            };

            let result = self
                .base
                .db()
                .query(
                    r#"
                    BEGIN TRANSACTION;
                    LET $ord = CREATE ONLY order CONTENT $order;
                    FOR $line IN $lines {
                        CREATE order_item CONTENT {
                            order: $ord.id,
                            product: type::thing('product', $line.product_key),
                            quantity: $line.quantity,
                            unit: $line.unit,
                            unit_price: $line.unit_price,
                            line_total: $line.line_total,
                            color_top: $line.color_top,
                            color_bottom: $line.color_bottom,
                            length: $line.length,
                            width: $line.width,
                            gsm: $line.gsm
                        };
                    };
                    COMMIT TRANSACTION;
                    "#,
                )
                .bind(("order", order))
                .bind(("lines", lines.clone()))
                .await
                .and_then(|r| r.check());

            match result {
                Ok(_) => {
                    return self
                        .find_by_order_no(&order_no)
                        .await?
                        .ok_or_else(|| RepoError::Database("Order vanished after create".into()));
                }
                Err(e) if is_unique_index_violation(&e, "order_no") => {
                    tracing::debug!(order_no = %order_no, "order_no collision, retrying allocation");
                    last_err = Some(RepoError::Duplicate(format!(
                        "Order number {order_no} already allocated"
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_err.unwrap_or_else(|| RepoError::Database("Order create failed".into())))
    }

    /// Find order by human-readable number
    pub async fn find_by_order_no(&self, order_no: &str) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE order_no = $order_no LIMIT 1")
            .bind(("order_no", order_no.to_string()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Line items of an order
    pub async fn items_for(&self, order: &RecordId) -> RepoResult<Vec<OrderItem>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order_item WHERE order = $order")
            .bind(("order", order.clone()))
            .await?;
        let items: Vec<OrderItem> = result.take(0)?;
        Ok(items)
    }

    /// Find single line item by record key
    pub async fn find_item(&self, key: &str) -> RepoResult<Option<OrderItem>> {
        let item: Option<OrderItem> = self.base.db().select((ORDER_ITEM_TABLE, key)).await?;
        Ok(item)
    }

    /// Whether the order has at least one dispatch record
    pub async fn has_dispatch(&self, order: &RecordId) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query("SELECT VALUE count() FROM dispatch WHERE order = $order GROUP ALL")
            .bind(("order", order.clone()))
            .await?;
        let counts: Vec<i64> = result.take(0)?;
        Ok(counts.first().copied().unwrap_or(0) > 0)
    }

    /// Paginated list with customer fetched
    pub async fn find_all(
        &self,
        filter: OrderFilter,
        pagination: Pagination,
    ) -> RepoResult<(Vec<OrderSummary>, PageInfo)> {
        let mut conditions = Vec::new();
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.search.is_some() {
            conditions.push(
                "(order_no CONTAINS $search OR string::lowercase(customer.name) CONTAINS string::lowercase($search))",
            );
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let list_query = format!(
            "SELECT order_no, customer.name AS customer_name, \
             customer.company AS customer_company, status, total, ordered_at \
             FROM order {where_clause} ORDER BY ordered_at DESC \
             LIMIT $limit START $offset"
        );
        let count_query = format!("SELECT VALUE count() FROM order {where_clause} GROUP ALL");

        let mut query = self
            .base
            .db()
            .query(list_query)
            .query(count_query)
            .bind(("limit", pagination.limit as i64))
            .bind(("offset", pagination.offset() as i64));
        if let Some(status) = filter.status {
            query = query.bind(("status", status));
        }
        if let Some(search) = filter.search {
            query = query.bind(("search", search));
        }

        let mut result = query.await?;
        let orders: Vec<OrderSummary> = result.take(0)?;
        let counts: Vec<i64> = result.take(1)?;
        let total = counts.first().copied().unwrap_or(0).max(0) as u64;

        Ok((orders, PageInfo::new(pagination, total)))
    }

    /// Order book: header counters + latest orders
    pub async fn order_book(&self, status_filter: Option<String>) -> RepoResult<OrderBook> {
        let where_clause = match status_filter {
            Some(_) => "WHERE status = $status",
            None => "",
        };
        let recent_query = format!(
            "SELECT order_no, customer.name AS customer_name, \
             customer.company AS customer_company, status, total, ordered_at \
             FROM order {where_clause} ORDER BY ordered_at DESC LIMIT 5"
        );

        let mut query = self
            .base
            .db()
            .query(
                "SELECT VALUE count() FROM order \
                 WHERE status = 'PENDING' AND created_at >= $today GROUP ALL",
            )
            .query("SELECT VALUE count() FROM order WHERE status = 'IN_PRODUCTION' GROUP ALL")
            .query("SELECT VALUE count() FROM order WHERE status = 'COMPLETED' GROUP ALL")
            .query(recent_query)
            .bind(("today", shared::util::today_start_millis()));
        if let Some(status) = status_filter {
            query = query.bind(("status", status));
        }

        let mut result = query.await?;
        let new_orders: Vec<i64> = result.take(0)?;
        let in_production: Vec<i64> = result.take(1)?;
        let completed: Vec<i64> = result.take(2)?;
        let orders: Vec<OrderSummary> = result.take(3)?;

        Ok(OrderBook {
            new_orders: new_orders.first().copied().unwrap_or(0),
            in_production: in_production.first().copied().unwrap_or(0),
            completed: completed.first().copied().unwrap_or(0),
            orders,
        })
    }

    /// Full order detail with items and dispatch numbers
    pub async fn get_detail(&self, order_no: &str) -> RepoResult<OrderDetail> {
        let order = self
            .find_by_order_no(order_no)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", order_no)))?;
        let order_id = order.id.clone().expect("loaded record has an id");

        let mut result = self
            .base
            .db()
            .query(
                "SELECT record::id(id) AS item_id, product.name AS product_name, \
                 quantity, unit, unit_price, line_total, \
                 color_top, color_bottom, length, width, gsm \
                 FROM order_item WHERE order = $order",
            )
            .query("SELECT VALUE dispatch_no FROM dispatch WHERE order = $order ORDER BY dispatch_no")
            .query("SELECT name, company FROM ONLY $customer")
            .bind(("order", order_id))
            .bind(("customer", order.customer.clone()))
            .await?;

        let items: Vec<OrderItemDetail> = result.take(0)?;
        let dispatch_nos: Vec<String> = result.take(1)?;

        #[derive(Deserialize)]
        struct CustomerName {
            name: Option<String>,
            company: Option<String>,
        }
        let customer: Option<CustomerName> = result.take(2)?;
        let (customer_name, customer_company) = customer
            .map(|c| (c.name, c.company))
            .unwrap_or((None, None));

        Ok(OrderDetail {
            order_no: order.order_no,
            customer_name,
            customer_company,
            status: order.status,
            total: order.total,
            ordered_at: order.ordered_at,
            delivery_method: order.delivery_method,
            carrier: order.carrier,
            remarks: order.remarks,
            items,
            dispatch_nos,
        })
    }

    /// Explicit status update with state-machine validation
    ///
    /// SHIPPED / DELIVERED 需要订单已有发货记录 (不允许绕过发货工作流)。
    pub async fn update_status(&self, order_no: &str, next: OrderStatus) -> RepoResult<Order> {
        let order = self
            .find_by_order_no(order_no)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", order_no)))?;
        let order_id = order.id.clone().expect("loaded record has an id");

        let has_dispatch = self.has_dispatch(&order_id).await?;
        if !order.status.may_enter(next, has_dispatch) {
            return Err(RepoError::Validation(format!(
                "Cannot transition order {order_no} from {:?} to {next:?}",
                order.status
            )));
        }

        let mut result = self
            .base
            .db()
            .query("UPDATE $order SET status = $status, updated_at = $now RETURN AFTER")
            .bind(("order", order_id))
            .bind(("status", next))
            .bind(("now", shared::util::now_millis()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", order_no)))
    }
}
