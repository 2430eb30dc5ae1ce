//! Dispatch Workflow
//!
//! 两阶段发货，见模块文档。Phase 1 的事务要么整体提交要么整体回滚；
//! 编号撞唯一索引或存储事务冲突时换新编号整体重试。

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{
    Dispatch, DispatchLine, DispatchMeta, DispatchStatus, OrderItem, Product,
};
use crate::db::repository::product::ProductAttrs;
use crate::db::repository::{DispatchRepository, OrderRepository, ProductRepository};
use crate::db::schema::{is_transaction_conflict, is_unique_index_violation};
use crate::db::sequence::SequenceAllocator;
use crate::dispatch::manifest::{ManifestEntry, validate_manifest};
use crate::stock::{StockKind, StockLedger};
use crate::utils::{AppError, AppResult, ErrorCode, money};

const DISPATCH_TABLE: &str = "dispatch";
const DISPATCH_PREFIX: &str = "DIS";

/// 事务整体重试上限 (编号冲突 / 存储冲突)
const TX_RETRIES: usize = 3;

// =============================================================================
// Policies
// =============================================================================

/// 全量交付时订单总额的处理策略
///
/// 旧版实现把发货金额累加到已计算好的订单总额上，存在重复计价的嫌疑
/// (产品负责人待定)。两种语义都实现并测试，默认保留累加行为。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderTotalPolicy {
    /// 全量交付时 total += 发货金额 (旧版语义，默认)
    IncrementByDispatchAmount,
    /// 保持订单创建时算好的总额不动
    KeepOrderTotal,
}

impl FromStr for OrderTotalPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increment" => Ok(OrderTotalPolicy::IncrementByDispatchAmount),
            "keep" => Ok(OrderTotalPolicy::KeepOrderTotal),
            _ => Err(()),
        }
    }
}

/// 发货策略集合
#[derive(Debug, Clone, Copy)]
pub struct DispatchPolicy {
    /// 每个订单只允许一条发货记录 (旧版 1:1 行为)；
    /// 关闭时允许多次部分发货，直到全量交付
    pub single_dispatch_per_order: bool,
    pub order_total_policy: OrderTotalPolicy,
    /// Phase 1 事务超时 (毫秒)；超时返回可重试错误，原子性保证无半提交状态
    pub tx_timeout_ms: u64,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            single_dispatch_per_order: false,
            order_total_policy: OrderTotalPolicy::IncrementByDispatchAmount,
            tx_timeout_ms: 10_000,
        }
    }
}

// =============================================================================
// Workflow
// =============================================================================

pub struct DispatchWorkflow {
    db: Surreal<Db>,
    stock: Arc<StockLedger>,
    policy: DispatchPolicy,
    sequences: SequenceAllocator,
    orders: OrderRepository,
    products: ProductRepository,
    dispatches: DispatchRepository,
}

impl DispatchWorkflow {
    pub fn new(db: Surreal<Db>, stock: Arc<StockLedger>, policy: DispatchPolicy) -> Self {
        Self {
            sequences: SequenceAllocator::new(db.clone()),
            orders: OrderRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            dispatches: DispatchRepository::new(db.clone()),
            stock,
            policy,
            db,
        }
    }

    /// 创建发货 (两阶段算法，见模块文档)
    pub async fn create_dispatch(
        &self,
        order_no: &str,
        manifest: Vec<ManifestEntry>,
        meta: DispatchMeta,
    ) -> AppResult<Dispatch> {
        // ---------- Preconditions (第一笔写入之前) ----------
        let order = self
            .orders
            .find_by_order_no(order_no)
            .await?
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::OrderNotFound, format!("Order {order_no} not found"))
            })?;
        let order_id = order.id.clone().expect("loaded record has an id");

        let items: HashMap<String, OrderItem> = self
            .orders
            .items_for(&order_id)
            .await?
            .into_iter()
            .filter_map(|item| {
                item.id
                    .as_ref()
                    .map(|id| (id.key().to_string(), item.clone()))
            })
            .collect();

        validate_manifest(&manifest, &items)?;

        // ---------- 快照与总额 (反规范化，Decimal 计算) ----------
        let mut lines = Vec::with_capacity(manifest.len());
        for entry in &manifest {
            let item = &items[&entry.item_id];
            let product: Option<Product> =
                self.db.select(item.product.clone()).await.map_err(|e| {
                    AppError::database(e.to_string())
                })?;
            let product_name = entry
                .attrs
                .as_ref()
                .map(|a| a.name.clone())
                .or_else(|| product.as_ref().map(|p| p.name.clone()))
                .unwrap_or_else(|| "Unknown product".to_string());
            let product_type = entry
                .attrs
                .as_ref()
                .map(|a| a.product_type)
                .or_else(|| product.as_ref().map(|p| p.product_type))
                .unwrap_or(crate::db::models::ProductType::Roll);

            lines.push(DispatchLine {
                item_id: entry.item_id.clone(),
                product_name,
                product_type,
                color_top: item.color_top.clone(),
                color_bottom: item.color_bottom.clone(),
                length: item.length,
                width: item.width,
                gsm: item.gsm,
                delivered_quantity: entry.delivered_quantity,
                rate: entry.rate,
                metric_value: entry.metric_value,
                amount: money::dispatch_line_amount(
                    entry.rate,
                    entry.metric_value,
                    entry.delivered_quantity,
                ),
            });
        }
        let total_amount = money::sum_amounts(lines.iter().map(|l| l.amount));
        let package_details = build_package_details(&lines);

        let total_bump = match self.policy.order_total_policy {
            OrderTotalPolicy::IncrementByDispatchAmount => total_amount,
            OrderTotalPolicy::KeepOrderTotal => 0.0,
        };

        let decrements: Vec<serde_json::Value> = manifest
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "item": entry.item_id,
                    "qty": entry.delivered_quantity,
                })
            })
            .collect();

        // ---------- Phase 1: atomic transaction ----------
        let now = shared::util::now_millis();
        let mut last_err: Option<AppError> = None;

        for attempt in 0..TX_RETRIES {
            let dispatch_no = self
                .sequences
                .next_id(DISPATCH_TABLE, "dispatch_no", DISPATCH_PREFIX)
                .await?;

            let dispatch = Dispatch {
                id: None,
                dispatch_no: dispatch_no.clone(),
                order: order_id.clone(),
                order_no: order.order_no.clone(),
                status: DispatchStatus::ReadyForPickup,
                customer: meta.customer.clone(),
                loading_date: meta.loading_date.clone(),
                driver_name: meta.driver_name.clone(),
                driver_number: meta.driver_number.clone(),
                car_number: meta.car_number.clone(),
                carrier: meta.carrier.clone(),
                transportation: meta.transportation.clone(),
                shipping_address: meta.shipping_address.clone(),
                tracking_id: None,
                package_details: package_details.clone(),
                total_amount,
                lines: lines.clone(),
                remarks: meta.remarks.clone(),
                created_at: now,
                updated_at: now,
            };

            match self
                .run_atomic_phase(&dispatch, &decrements, total_bump)
                .await
            {
                Ok(()) => {
                    tracing::info!(
                        dispatch_no = %dispatch_no,
                        order_no = %order.order_no,
                        total_amount,
                        "Dispatch created"
                    );

                    // ---------- Phase 2: best-effort stock adjustments ----------
                    self.adjust_stock(&manifest, &items).await;

                    return self
                        .dispatches
                        .find_by_dispatch_no(&dispatch_no)
                        .await?
                        .ok_or_else(|| AppError::database("Dispatch vanished after commit"));
                }
                Err(e) if e.is_retryable() && attempt + 1 < TX_RETRIES => {
                    tracing::debug!(
                        dispatch_no = %dispatch_no,
                        error = %e,
                        "Dispatch transaction retry"
                    );
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or_else(|| AppError::internal("Dispatch creation failed")))
    }

    /// Phase 1 事务本体。任何失败 (编号冲突、行归属校验、存储冲突)
    /// 都回滚全部写入。
    async fn run_atomic_phase(
        &self,
        dispatch: &Dispatch,
        decrements: &[serde_json::Value],
        total_bump: f64,
    ) -> AppResult<()> {
        let query = self
            .db
            .query(
                r#"
                BEGIN TRANSACTION;

                LET $ord = (SELECT * FROM order WHERE id = $order_id)[0];
                IF $ord == NONE { THROW 'order_not_found' };

                IF $single {
                    LET $existing = SELECT VALUE count() FROM dispatch WHERE order = $order_id GROUP ALL;
                    IF ($existing[0] ?? 0) > 0 { THROW 'dispatch_exists' };
                };

                CREATE dispatch CONTENT $dispatch;

                -- 逐行扣减未交付数量，封底为 0；行必须属于该订单
                FOR $line IN $decrements {
                    LET $item = (SELECT * FROM order_item
                        WHERE id = type::thing('order_item', $line.item) AND order = $order_id)[0];
                    IF $item == NONE { THROW 'order_item_foreign' };
                    UPDATE $item.id SET quantity = math::max(0, quantity - $line.qty);
                };

                -- 全量交付判定覆盖订单的所有行，不只清单行
                LET $remaining = math::sum(SELECT VALUE quantity FROM order_item WHERE order = $order_id) OR 0;
                IF $remaining == 0 AND $ord.status NOTINSIDE ['SHIPPED', 'DELIVERED'] {
                    UPDATE $order_id SET status = 'SHIPPED', total += $total_bump, updated_at = $now;
                };

                COMMIT TRANSACTION;
                "#,
            )
            .bind(("order_id", dispatch.order.clone()))
            .bind(("single", self.policy.single_dispatch_per_order))
            .bind(("dispatch", dispatch.clone()))
            .bind(("decrements", decrements.to_vec()))
            .bind(("total_bump", total_bump))
            .bind(("now", shared::util::now_millis()));

        let result = tokio::time::timeout(
            Duration::from_millis(self.policy.tx_timeout_ms),
            query,
        )
        .await;

        let response = match result {
            Err(_) => {
                // 原子性保证超时不会留下半提交状态；调用方可重试
                return Err(AppError::new(ErrorCode::TimeoutError));
            }
            Ok(r) => r,
        };

        match response.and_then(|r| r.check()) {
            Ok(_) => Ok(()),
            Err(e) => Err(map_phase1_error(e)),
        }
    }

    /// Phase 2: 按属性元组匹配商品并扣减库存，逐条独立、尽力而为。
    ///
    /// 发货确认是客户侧事实，不因库存记账失败而撤销 —— 单条失败
    /// 只记日志与告警 (无匹配 / 歧义匹配有显式错误路径)。
    async fn adjust_stock(&self, manifest: &[ManifestEntry], items: &HashMap<String, OrderItem>) {
        for entry in manifest {
            let outcome = self.adjust_stock_entry(entry, items).await;
            if let Err(e) = outcome {
                tracing::warn!(
                    item_id = %entry.item_id,
                    error = %e,
                    "Stock adjustment failed for dispatch line (dispatch unaffected)"
                );
            }
        }
    }

    async fn adjust_stock_entry(
        &self,
        entry: &ManifestEntry,
        items: &HashMap<String, OrderItem>,
    ) -> AppResult<()> {
        let product_key = match &entry.attrs {
            Some(attrs) => self.resolve_product(attrs).await?,
            // 清单未带属性时退回订单行上的商品链接
            None => items
                .get(&entry.item_id)
                .map(|item| item.product.key().to_string())
                .ok_or_else(|| AppError::new(ErrorCode::ProductMatchNone))?,
        };

        self.stock
            .decrement(
                StockKind::Product,
                &product_key,
                entry.delivered_quantity as f64,
            )
            .await?;
        self.products
            .add_units_sold(&product_key, entry.delivered_quantity)
            .await?;
        Ok(())
    }

    /// 属性元组 -> 唯一商品；无匹配与歧义匹配是显式错误
    async fn resolve_product(&self, attrs: &ProductAttrs) -> AppResult<String> {
        let matches = self.products.find_by_attributes(attrs).await?;
        match matches.len() {
            0 => Err(AppError::new(ErrorCode::ProductMatchNone)
                .with_detail("name", attrs.name.clone())),
            1 => Ok(matches[0]
                .id
                .as_ref()
                .expect("loaded record has an id")
                .key()
                .to_string()),
            n => Err(AppError::new(ErrorCode::ProductMatchAmbiguous)
                .with_detail("name", attrs.name.clone())
                .with_detail("matches", n)),
        }
    }

    /// 发货状态迁移；到达 DELIVERED 时级联订单状态
    pub async fn update_status(
        &self,
        dispatch_no: &str,
        new_status: &str,
        tracking_id: Option<String>,
        remarks: Option<String>,
    ) -> AppResult<Dispatch> {
        let status = DispatchStatus::parse(new_status).ok_or_else(|| {
            AppError::new(ErrorCode::DispatchInvalidStatus).with_detail("status", new_status)
        })?;

        let dispatch = self
            .dispatches
            .find_by_dispatch_no(dispatch_no)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::DispatchNotFound,
                    format!("Dispatch {dispatch_no} not found"),
                )
            })?;

        if !dispatch.status.may_enter(status) {
            return Err(AppError::new(ErrorCode::DispatchInvalidStatus)
                .with_detail("from", format!("{:?}", dispatch.status))
                .with_detail("to", new_status));
        }

        self.db
            .query(
                r#"
                BEGIN TRANSACTION;
                UPDATE $dispatch_id SET status = $status,
                    tracking_id = $tracking_id ?? tracking_id,
                    remarks = $remarks ?? remarks,
                    updated_at = $now;
                IF $status == 'DELIVERED' {
                    -- 跨聚合副作用: 发货送达强制订单进入 DELIVERED
                    UPDATE $order_id SET status = 'DELIVERED', updated_at = $now;
                };
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("dispatch_id", dispatch.id.clone().expect("loaded record has an id")))
            .bind(("order_id", dispatch.order.clone()))
            .bind(("status", status))
            .bind(("tracking_id", tracking_id))
            .bind(("remarks", remarks))
            .bind(("now", shared::util::now_millis()))
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .check()
            .map_err(|e| AppError::database(e.to_string()))?;

        self.dispatches
            .find_by_dispatch_no(dispatch_no)
            .await?
            .ok_or_else(|| AppError::database("Dispatch vanished after update"))
    }
}

/// 人类可读打包摘要
fn build_package_details(lines: &[DispatchLine]) -> String {
    lines
        .iter()
        .map(|line| {
            let mut spec = Vec::new();
            if let Some(gsm) = line.gsm {
                spec.push(format!("{gsm}gsm"));
            }
            match (&line.color_top, &line.color_bottom) {
                (Some(top), Some(bottom)) => spec.push(format!("{top}/{bottom}")),
                (Some(color), None) | (None, Some(color)) => spec.push(color.clone()),
                (None, None) => {}
            }
            match (line.width, line.length) {
                (Some(w), Some(l)) => spec.push(format!("{w}x{l}")),
                (Some(w), None) => spec.push(format!("w{w}")),
                (None, Some(l)) => spec.push(format!("l{l}")),
                (None, None) => {}
            }
            let spec = if spec.is_empty() {
                String::new()
            } else {
                format!(" ({})", spec.join(", "))
            };
            format!(
                "{} x {}{} @ {}",
                line.delivered_quantity, line.product_name, spec, line.rate
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Phase 1 错误映射：编号冲突与存储冲突可重试，业务校验直接上抛
fn map_phase1_error(err: surrealdb::Error) -> AppError {
    let msg = err.to_string();
    if msg.contains("order_not_found") {
        AppError::new(ErrorCode::OrderNotFound)
    } else if msg.contains("dispatch_exists") {
        AppError::new(ErrorCode::DispatchExists)
    } else if msg.contains("order_item_foreign") {
        AppError::new(ErrorCode::OrderItemForeign)
    } else if is_unique_index_violation(&err, "dispatch_no") {
        AppError::new(ErrorCode::DuplicateDispatchId)
    } else if is_transaction_conflict(&err) {
        AppError::new(ErrorCode::TransactionConflict)
    } else {
        AppError::database(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ProductType;

    fn line(name: &str, qty: i64, rate: f64) -> DispatchLine {
        DispatchLine {
            item_id: "i1".to_string(),
            product_name: name.to_string(),
            product_type: ProductType::Roll,
            color_top: Some("blue".to_string()),
            color_bottom: Some("green".to_string()),
            length: None,
            width: Some(2.5),
            gsm: Some(120),
            delivered_quantity: qty,
            rate,
            metric_value: 1.0,
            amount: money::dispatch_line_amount(rate, 1.0, qty),
        }
    }

    #[test]
    fn test_package_details() {
        let details = build_package_details(&[line("Heavy Tarp", 3, 12.5)]);
        assert_eq!(details, "3 x Heavy Tarp (120gsm, blue/green, w2.5) @ 12.5");
    }

    #[test]
    fn test_package_details_joins_lines() {
        let details = build_package_details(&[line("A", 1, 1.0), line("B", 2, 2.0)]);
        assert!(details.contains("; "));
        assert!(details.starts_with("1 x A"));
    }

    #[test]
    fn test_total_policy_parse() {
        assert_eq!(
            "increment".parse::<OrderTotalPolicy>(),
            Ok(OrderTotalPolicy::IncrementByDispatchAmount)
        );
        assert_eq!(
            "keep".parse::<OrderTotalPolicy>(),
            Ok(OrderTotalPolicy::KeepOrderTotal)
        );
        assert!("bogus".parse::<OrderTotalPolicy>().is_err());
    }

    #[test]
    fn test_default_policy() {
        let policy = DispatchPolicy::default();
        assert!(!policy.single_dispatch_per_order);
        assert_eq!(
            policy.order_total_policy,
            OrderTotalPolicy::IncrementByDispatchAmount
        );
    }
}
