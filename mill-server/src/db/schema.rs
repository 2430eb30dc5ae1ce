//! Schema Definition
//!
//! 表与索引定义。标识符列全部带唯一索引：序号分配器存在读-算-写竞态，
//! 靠唯一索引让后写者失败重试 (insert-then-retry)。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// 定义全部表与索引 (幂等，可在每次启动时执行)
pub async fn define_schema(db: &Surreal<Db>) -> surrealdb::Result<()> {
    db.query(
        r#"
        -- Customers
        DEFINE TABLE IF NOT EXISTS customer SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS customer_email ON customer FIELDS email UNIQUE;

        -- Users
        DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS user_username ON user FIELDS username UNIQUE;

        -- Orders and line items
        DEFINE TABLE IF NOT EXISTS order SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS order_no ON order FIELDS order_no UNIQUE;
        DEFINE TABLE IF NOT EXISTS order_item SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS order_item_order ON order_item FIELDS order;

        -- Inventory
        DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS product_item_id ON product FIELDS item_id UNIQUE;
        DEFINE TABLE IF NOT EXISTS raw_material SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS raw_material_item_id ON raw_material FIELDS item_id UNIQUE;

        -- Dispatches
        DEFINE TABLE IF NOT EXISTS dispatch SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS dispatch_no ON dispatch FIELDS dispatch_no UNIQUE;
        DEFINE INDEX IF NOT EXISTS dispatch_order ON dispatch FIELDS order;

        -- Production
        DEFINE TABLE IF NOT EXISTS production_batch SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS production_batch_id ON production_batch FIELDS batch_id UNIQUE;

        -- Alerts
        DEFINE TABLE IF NOT EXISTS alert SCHEMALESS;
        "#,
    )
    .await?
    .check()?;

    Ok(())
}

/// 判断存储层错误是否为唯一索引冲突
///
/// SurrealDB 的索引冲突错误信息包含索引名，按名字匹配即可区分
/// 是哪个标识符列撞了。
pub fn is_unique_index_violation(err: &surrealdb::Error, index_name: &str) -> bool {
    let msg = err.to_string();
    msg.contains("already contains") && msg.contains(index_name)
}

/// 判断存储层错误是否为事务冲突 (可重试)
pub fn is_transaction_conflict(err: &surrealdb::Error) -> bool {
    let msg = err.to_string();
    msg.contains("conflict") || msg.contains("failed transaction") || msg.contains("retry")
}
