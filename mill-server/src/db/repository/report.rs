//! Report Repository
//!
//! 只读聚合投影：制造仪表盘、经营摘要、库存总览。
//! 全部是对核心表的读侧投影，不做任何写入。

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoResult};
use crate::db::models::{ProductionStatus, RawMaterial};

// =============================================================================
// Projection rows
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionAlertRow {
    pub alert_type: String,
    pub message: String,
    pub severity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub batch_id: String,
    pub product_name: Option<String>,
    pub quantity: i64,
    pub status: ProductionStatus,
    pub start_date: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentOrderRow {
    pub order_no: String,
    pub total: f64,
    pub status: String,
    pub dispatch_status: Option<String>,
}

/// 制造仪表盘
#[derive(Debug, Clone, Serialize)]
pub struct ManufacturingDashboard {
    pub todays_orders: i64,
    pub production_alerts: Vec<ProductionAlertRow>,
    pub production_schedule: Vec<ScheduleEntry>,
    pub total_raw_material_stock: f64,
    pub ready_for_dispatch: i64,
    pub recent_orders: Vec<RecentOrderRow>,
    pub completed_orders: i64,
    pub pending_orders: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopProductRow {
    pub name: String,
    pub units_sold: i64,
}

/// 经营摘要 (period = month | quarter | year)
#[derive(Debug, Clone, Serialize)]
pub struct BusinessSummary {
    pub total_revenue: f64,
    pub completed_orders: i64,
    pub active_customers: i64,
    pub production_units: i64,
    pub top_products: Vec<TopProductRow>,
    pub low_stock: Vec<RawMaterial>,
    pub out_of_stock: Vec<RawMaterial>,
}

/// 库存总览
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_raw_materials: f64,
    pub finished_products: f64,
    pub low_stock_items: i64,
    pub top_selling_product: Option<String>,
}

/// 解析统计周期为起始时间戳 (毫秒)
pub fn period_start_millis(period: &str) -> i64 {
    let now = Utc::now();
    let start = match period {
        "year" => now - Duration::days(365),
        "quarter" => now - Duration::days(91),
        // 默认月
        _ => now - Duration::days(30),
    };
    start.timestamp_millis()
}

// =============================================================================
// Report Repository
// =============================================================================

#[derive(Clone)]
pub struct ReportRepository {
    base: BaseRepository,
}

impl ReportRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// 制造仪表盘聚合
    pub async fn manufacturing_dashboard(&self) -> RepoResult<ManufacturingDashboard> {
        let today = shared::util::today_start_millis();
        let week_ago = shared::util::now_millis() - 7 * 24 * 60 * 60 * 1000;

        let mut result = self
            .base
            .db()
            .query(
                r#"
                -- Header counters
                LET $todays = SELECT VALUE count() FROM order WHERE created_at >= $today GROUP ALL;
                LET $completed = SELECT VALUE count() FROM order WHERE status = 'COMPLETED' GROUP ALL;
                LET $pending = SELECT VALUE count() FROM order WHERE status = 'PENDING' GROUP ALL;
                LET $ready = SELECT VALUE count() FROM dispatch WHERE status = 'READY_FOR_PICKUP' GROUP ALL;

                -- Production alerts: low stock materials + delayed batches + recent bulk orders
                LET $low_stock = SELECT name, stock, unit, status FROM raw_material
                    WHERE status IN ['LOW_STOCK', 'OUT_OF_STOCK'] ORDER BY stock ASC LIMIT 3;
                LET $delayed = SELECT batch_id, product.name AS product_name FROM production_batch
                    WHERE status = 'DELAYED' LIMIT 3;
                LET $bulk = SELECT order, math::sum(quantity) AS qty FROM order_item
                    WHERE order.created_at >= $week_ago
                    GROUP BY order;
                LET $bulk_orders = SELECT * FROM $bulk WHERE qty > 100 LIMIT 3;

                -- Today's production schedule
                LET $schedule = SELECT batch_id, product.name AS product_name, quantity, status, start_date
                    FROM production_batch
                    WHERE status IN ['PENDING', 'IN_PROGRESS'] AND (start_date ?? 0) >= $today
                    ORDER BY start_date ASC;

                -- Raw material stock on hand
                LET $rm_stock = math::sum(SELECT VALUE stock FROM raw_material) OR 0;

                -- Recent orders with dispatch status
                LET $recent = SELECT order_no, total, <string>status AS status,
                        (SELECT VALUE <string>status FROM dispatch WHERE order = $parent.id LIMIT 1)[0] AS dispatch_status
                    FROM order ORDER BY created_at DESC LIMIT 5;

                RETURN {
                    todays: $todays[0] ?? 0,
                    completed: $completed[0] ?? 0,
                    pending: $pending[0] ?? 0,
                    ready: $ready[0] ?? 0,
                    low_stock: $low_stock,
                    delayed: $delayed,
                    bulk_orders: $bulk_orders,
                    schedule: $schedule,
                    rm_stock: $rm_stock,
                    recent: $recent
                };
                "#,
            )
            .bind(("today", today))
            .bind(("week_ago", week_ago))
            .await?;

        #[derive(Deserialize)]
        struct LowStockRow {
            name: String,
            stock: f64,
            unit: Option<String>,
            status: String,
        }
        #[derive(Deserialize)]
        struct DelayedRow {
            batch_id: String,
            product_name: Option<String>,
        }
        #[derive(Deserialize)]
        struct BulkRow {
            qty: i64,
        }
        #[derive(Deserialize)]
        struct Aggregates {
            todays: i64,
            completed: i64,
            pending: i64,
            ready: i64,
            low_stock: Vec<LowStockRow>,
            delayed: Vec<DelayedRow>,
            bulk_orders: Vec<BulkRow>,
            schedule: Vec<ScheduleEntry>,
            rm_stock: f64,
            recent: Vec<RecentOrderRow>,
        }

        // LET 语句占用结果槽位，RETURN 永远是最后一条
        let last = result.num_statements() - 1;
        let aggregates: Option<Aggregates> = result.take(last)?;
        let aggregates = aggregates.ok_or_else(|| {
            super::RepoError::Database("Dashboard aggregation returned nothing".to_string())
        })?;

        // 组装告警列表 (库存、生产、订单三类)
        let mut production_alerts = Vec::new();
        for row in aggregates.low_stock {
            let severity = if row.status == "OUT_OF_STOCK" {
                "CRITICAL"
            } else {
                "WARNING"
            };
            production_alerts.push(ProductionAlertRow {
                alert_type: "STOCK".to_string(),
                message: format!(
                    "Low Stock: {} ({} {} remaining)",
                    row.name,
                    row.stock,
                    row.unit.unwrap_or_default()
                ),
                severity: severity.to_string(),
            });
        }
        for row in aggregates.delayed {
            production_alerts.push(ProductionAlertRow {
                alert_type: "PRODUCTION".to_string(),
                message: format!(
                    "Delayed Production: {} batch #{}",
                    row.product_name.unwrap_or_else(|| "Custom Product".to_string()),
                    row.batch_id
                ),
                severity: "WARNING".to_string(),
            });
        }
        for row in aggregates.bulk_orders {
            production_alerts.push(ProductionAlertRow {
                alert_type: "ORDER".to_string(),
                message: format!("New bulk order received: {} units", row.qty),
                severity: "INFO".to_string(),
            });
        }

        Ok(ManufacturingDashboard {
            todays_orders: aggregates.todays,
            production_alerts,
            production_schedule: aggregates.schedule,
            total_raw_material_stock: aggregates.rm_stock,
            ready_for_dispatch: aggregates.ready,
            recent_orders: aggregates.recent,
            completed_orders: aggregates.completed,
            pending_orders: aggregates.pending,
        })
    }

    /// 经营摘要聚合
    pub async fn business_summary(&self, period: &str) -> RepoResult<BusinessSummary> {
        let since = period_start_millis(period);

        let mut result = self
            .base
            .db()
            .query(
                r#"
                LET $delivered = SELECT total, customer FROM order
                    WHERE status = 'DELIVERED' AND updated_at >= $since;
                LET $revenue = math::sum($delivered.total) OR 0;
                LET $active = array::len(array::distinct(
                    SELECT VALUE customer FROM order WHERE updated_at >= $since));
                LET $units = math::sum(SELECT VALUE quantity FROM production_batch
                    WHERE status = 'COMPLETED' AND (end_date ?? 0) >= $since) OR 0;
                LET $top = SELECT name, units_sold FROM product ORDER BY units_sold DESC LIMIT 4;
                LET $low = SELECT * FROM raw_material WHERE status = 'LOW_STOCK' ORDER BY stock ASC;
                LET $out = SELECT * FROM raw_material WHERE status = 'OUT_OF_STOCK' ORDER BY stock ASC;

                RETURN {
                    revenue: $revenue,
                    completed: array::len($delivered),
                    active: $active,
                    units: $units,
                    top: $top,
                    low: $low,
                    out: $out
                };
                "#,
            )
            .bind(("since", since))
            .await?;

        #[derive(Deserialize)]
        struct Aggregates {
            revenue: f64,
            completed: i64,
            active: i64,
            units: i64,
            top: Vec<TopProductRow>,
            low: Vec<RawMaterial>,
            out: Vec<RawMaterial>,
        }

        // LET 语句占用结果槽位，RETURN 永远是最后一条
        let last = result.num_statements() - 1;
        let aggregates: Option<Aggregates> = result.take(last)?;
        let aggregates = aggregates.ok_or_else(|| {
            super::RepoError::Database("Summary aggregation returned nothing".to_string())
        })?;

        Ok(BusinessSummary {
            total_revenue: aggregates.revenue,
            completed_orders: aggregates.completed,
            active_customers: aggregates.active,
            production_units: aggregates.units,
            top_products: aggregates.top,
            low_stock: aggregates.low,
            out_of_stock: aggregates.out,
        })
    }

    /// 库存总览
    pub async fn inventory_summary(&self) -> RepoResult<InventorySummary> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                LET $rm = math::sum(SELECT VALUE stock FROM raw_material) OR 0;
                LET $fp = math::sum(SELECT VALUE stock FROM product) OR 0;
                LET $low = SELECT VALUE count() FROM raw_material
                    WHERE status IN ['LOW_STOCK', 'OUT_OF_STOCK'] GROUP ALL;
                LET $top = SELECT VALUE name FROM product ORDER BY units_sold DESC LIMIT 1;

                RETURN {
                    total_raw_materials: $rm,
                    finished_products: $fp,
                    low_stock_items: $low[0] ?? 0,
                    top_selling_product: $top[0]
                };
                "#,
            )
            .await?;

        let last = result.num_statements() - 1;
        let summary: Option<InventorySummary> = result.take(last)?;
        summary.ok_or_else(|| {
            super::RepoError::Database("Inventory aggregation returned nothing".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_start() {
        let now = shared::util::now_millis();
        let month = period_start_millis("month");
        let quarter = period_start_millis("quarter");
        let year = period_start_millis("year");
        assert!(month < now);
        assert!(quarter < month);
        assert!(year < quarter);
        // 未知周期按月处理
        assert!((period_start_millis("bogus") - month).abs() < 5_000);
    }
}
