//! Product Repository
//!
//! 商品的创建与查询。stock / status 的后续变更走 `StockLedger`。

use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, PageInfo, Pagination, RepoError, RepoResult};
use crate::db::models::{Product, ProductIntake, ProductType, StockStatus};
use crate::db::schema::is_unique_index_violation;
use crate::db::sequence::SequenceAllocator;

const PRODUCT_TABLE: &str = "product";
const CREATE_RETRIES: usize = 3;

/// 属性元组匹配条件 (name + 类型相关的尺寸/颜色属性)
///
/// 发货路径没有从清单行到商品的外键，按属性相等匹配；
/// 入库合并走同一套判定。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAttrs {
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub gsm: Option<i64>,
    pub color_top: Option<String>,
    pub color_bottom: Option<String>,
    pub width: Option<f64>,
    pub length: Option<f64>,
    pub roll_type: Option<String>,
}

/// List filter parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
}

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
    sequences: SequenceAllocator,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            sequences: SequenceAllocator::new(db.clone()),
            base: BaseRepository::new(db),
        }
    }

    /// Paginated list of finished products
    pub async fn find_all(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> RepoResult<(Vec<Product>, PageInfo)> {
        let mut conditions = Vec::new();
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.product_type.is_some() {
            conditions.push("type = $type");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let list_query = format!(
            "SELECT * FROM product {where_clause} ORDER BY created_at DESC \
             LIMIT $limit START $offset"
        );
        let count_query = format!("SELECT VALUE count() FROM product {where_clause} GROUP ALL");

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
        if let Some(product_type) = filter.product_type {
            query = query.bind(("type", product_type));
        }

        let mut result = query.await?;
        let products: Vec<Product> = result.take(0)?;
        let counts: Vec<i64> = result.take(1)?;
        let total = counts.first().copied().unwrap_or(0).max(0) as u64;

        Ok((products, PageInfo::new(pagination, total)))
    }

    /// Find product by human-readable item id
    pub async fn find_by_item_id(&self, item_id: &str) -> RepoResult<Option<Product>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM product WHERE item_id = $item_id LIMIT 1")
            .bind(("item_id", item_id.to_string()))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// Find products matching a descriptive attribute tuple
    ///
    /// 返回所有命中 —— 由调用方区分 无匹配 / 唯一 / 歧义。
    pub async fn find_by_attributes(&self, attrs: &ProductAttrs) -> RepoResult<Vec<Product>> {
        // 按类型收窄匹配维度: ROLL 不看 length, BUNDLE 不看 roll_type
        let mut conditions = vec!["name = $name", "type = $type"];
        match attrs.product_type {
            ProductType::Roll => {
                conditions.push("gsm = $gsm");
                conditions.push("color_top = $color_top");
                conditions.push("color_bottom = $color_bottom");
                conditions.push("width = $width");
                conditions.push("roll_type = $roll_type");
            }
            ProductType::Bundle => {
                conditions.push("gsm = $gsm");
                conditions.push("color_top = $color_top");
                conditions.push("color_bottom = $color_bottom");
                conditions.push("width = $width");
                conditions.push("length = $length");
            }
        }
        let query = format!(
            "SELECT * FROM product WHERE {}",
            conditions.join(" AND ")
        );

        let mut result = self
            .base
            .db()
            .query(query)
            .bind(("name", attrs.name.clone()))
            .bind(("type", attrs.product_type))
            .bind(("gsm", attrs.gsm))
            .bind(("color_top", attrs.color_top.clone()))
            .bind(("color_bottom", attrs.color_bottom.clone()))
            .bind(("width", attrs.width))
            .bind(("length", attrs.length))
            .bind(("roll_type", attrs.roll_type.clone()))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products)
    }

    /// Create a new product kind from an intake payload (allocates item id)
    pub async fn create_from_intake(&self, data: ProductIntake) -> RepoResult<Product> {
        if data.name.trim().is_empty() {
            return Err(RepoError::Validation("name is required".into()));
        }
        if data.quantity < 0.0 {
            return Err(RepoError::Validation("quantity cannot be negative".into()));
        }

        let prefix = data.product_type.item_id_prefix();
        let now = shared::util::now_millis();
        let mut last_err = None;

        for _ in 0..CREATE_RETRIES {
            let item_id = self
                .sequences
                .next_id(PRODUCT_TABLE, "item_id", prefix)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

            let product = Product {
                id: None,
                item_id: item_id.clone(),
                name: data.name.clone(),
                product_type: data.product_type,
                gsm: data.gsm,
                color_top: data.color_top.clone(),
                color_bottom: data.color_bottom.clone(),
                width: data.width,
                length: data.length,
                weight: data.weight,
                pieces_per_bundle: data.pieces_per_bundle,
                roll_type: data.roll_type.clone(),
                unit: data.product_type.default_unit().to_string(),
                price: data.price.unwrap_or(0.0),
                stock: data.quantity,
                reorder_level: data.reorder_level,
                status: StockStatus::classify(data.quantity, data.reorder_level),
                units_sold: 0,
                remarks: data.remarks.clone(),
                created_at: now,
                updated_at: now,
            };

            let created: Result<Option<Product>, surrealdb::Error> = self
                .base
                .db()
                .create(PRODUCT_TABLE)
                .content(product)
                .await;

            match created {
                Ok(Some(product)) => return Ok(product),
                Ok(None) => {
                    return Err(RepoError::Database("Failed to create product".to_string()));
                }
                Err(e) if is_unique_index_violation(&e, "product_item_id") => {
                    tracing::debug!(item_id = %item_id, "item_id collision, retrying allocation");
                    last_err = Some(RepoError::Duplicate(format!(
                        "Product item id {item_id} already allocated"
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_err.unwrap_or_else(|| RepoError::Database("Product create failed".into())))
    }

    /// 发货后累加售出数量 (报表用，非库存字段)
    pub async fn add_units_sold(&self, item_key: &str, quantity: i64) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE type::thing('product', $key) SET units_sold += $qty")
            .bind(("key", item_key.to_string()))
            .bind(("qty", quantity))
            .await?
            .check()?;
        Ok(())
    }
}
