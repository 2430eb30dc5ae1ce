//! Production Batch Repository

use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{
    MaterialRequirement, ProductionBatch, ProductionBatchCreate, ProductionStatus, RawMaterial,
};

const BATCH_TABLE: &str = "production_batch";

/// List filter parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductionFilter {
    pub status: Option<String>,
}

/// Schedule row (product and order numbers fetched)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub batch_id: String,
    pub product_name: Option<String>,
    pub order_no: Option<String>,
    pub quantity: i64,
    pub status: ProductionStatus,
    pub start_date: Option<i64>,
}

#[derive(Clone)]
pub struct ProductionRepository {
    base: BaseRepository,
}

impl ProductionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a production batch
    ///
    /// 创建前校验声明的原料当前库存足够本批次消耗
    /// (InsufficientMaterials)；实际扣减发生在批次完成时。
    pub async fn create(&self, data: ProductionBatchCreate) -> RepoResult<ProductionBatch> {
        if data.quantity <= 0 {
            return Err(RepoError::Validation("quantity must be positive".into()));
        }

        // Resolve product
        let product: Option<crate::db::models::Product> = self
            .base
            .db()
            .select(("product", data.product_id.as_str()))
            .await?;
        let product = product.ok_or_else(|| {
            RepoError::NotFound(format!("Product {} not found", data.product_id))
        })?;

        // Resolve order link if given
        let order = match &data.order_id {
            Some(order_key) => {
                let order: Option<crate::db::models::Order> =
                    self.base.db().select(("order", order_key.as_str())).await?;
                Some(
                    order
                        .ok_or_else(|| RepoError::NotFound(format!("Order {order_key} not found")))?
                        .id
                        .expect("selected record has an id"),
                )
            }
            None => None,
        };

        // Check raw material availability
        let mut materials = Vec::with_capacity(data.materials.len());
        for req in &data.materials {
            if req.quantity_per_unit <= 0.0 {
                return Err(RepoError::Validation(
                    "material quantity_per_unit must be positive".into(),
                ));
            }
            let material: Option<RawMaterial> = self
                .base
                .db()
                .select(("raw_material", req.raw_material_id.as_str()))
                .await?;
            let material = material.ok_or_else(|| {
                RepoError::NotFound(format!("Raw material {} not found", req.raw_material_id))
            })?;

            let required = req.quantity_per_unit * data.quantity as f64;
            if material.stock < required {
                return Err(RepoError::Validation(format!(
                    "Insufficient stock for {}: need {required}, have {}",
                    material.name, material.stock
                )));
            }
            materials.push(MaterialRequirement {
                raw_material: material.id.expect("selected record has an id"),
                quantity_per_unit: req.quantity_per_unit,
            });
        }

        let now = shared::util::now_millis();
        let batch = ProductionBatch {
            id: None,
            batch_id: Uuid::new_v4().to_string(),
            product: product.id.expect("selected record has an id"),
            order,
            quantity: data.quantity,
            status: ProductionStatus::Pending,
            materials,
            start_date: data.start_date,
            end_date: None,
            created_at: now,
            updated_at: now,
        };

        let created: Option<ProductionBatch> = self
            .base
            .db()
            .create(BATCH_TABLE)
            .content(batch)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create production batch".to_string()))
    }

    /// Find batch by record key
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<ProductionBatch>> {
        let batch: Option<ProductionBatch> = self.base.db().select((BATCH_TABLE, id)).await?;
        Ok(batch)
    }

    /// Find batches, newest first
    pub async fn find_all(&self, filter: ProductionFilter) -> RepoResult<Vec<ProductionBatch>> {
        let mut result = match filter.status {
            Some(status) => {
                self.base
                    .db()
                    .query(
                        "SELECT * FROM production_batch WHERE status = $status \
                         ORDER BY created_at DESC",
                    )
                    .bind(("status", status))
                    .await?
            }
            None => {
                self.base
                    .db()
                    .query("SELECT * FROM production_batch ORDER BY created_at DESC")
                    .await?
            }
        };
        let batches: Vec<ProductionBatch> = result.take(0)?;
        Ok(batches)
    }

    /// 生产排程 (product / order 名称取出)
    pub async fn schedule(&self) -> RepoResult<Vec<ScheduleRow>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT batch_id, product.name AS product_name, order.order_no AS order_no, \
                 quantity, status, start_date \
                 FROM production_batch \
                 WHERE status IN ['PENDING', 'IN_PROGRESS'] \
                 ORDER BY start_date ASC",
            )
            .await?;
        let rows: Vec<ScheduleRow> = result.take(0)?;
        Ok(rows)
    }

    /// Update batch status
    ///
    /// 库存副作用 (产品入库、原料扣减) 由调用方经 StockLedger 执行。
    pub async fn update_status(
        &self,
        id: &str,
        status: ProductionStatus,
    ) -> RepoResult<ProductionBatch> {
        let end_date = matches!(status, ProductionStatus::Completed)
            .then(shared::util::now_millis);

        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing('production_batch', $id) \
                 SET status = $status, updated_at = $now, \
                     end_date = $end_date ?? end_date \
                 RETURN AFTER",
            )
            .bind(("id", id.to_string()))
            .bind(("status", status))
            .bind(("now", shared::util::now_millis()))
            .bind(("end_date", end_date))
            .await?;
        let batches: Vec<ProductionBatch> = result.take(0)?;
        batches
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Production batch {} not found", id)))
    }
}
