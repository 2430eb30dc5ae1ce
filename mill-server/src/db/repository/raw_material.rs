//! Raw Material Repository

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{RawMaterial, RawMaterialCreate, StockStatus};
use crate::db::schema::is_unique_index_violation;
use crate::db::sequence::SequenceAllocator;

const RAW_MATERIAL_TABLE: &str = "raw_material";
const RAW_MATERIAL_PREFIX: &str = "RM-";
const CREATE_RETRIES: usize = 3;

/// List filter parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMaterialFilter {
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct RawMaterialRepository {
    base: BaseRepository,
    sequences: SequenceAllocator,
}

impl RawMaterialRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            sequences: SequenceAllocator::new(db.clone()),
            base: BaseRepository::new(db),
        }
    }

    /// Find raw materials, filtered by status and/or name substring
    pub async fn find_all(&self, filter: RawMaterialFilter) -> RepoResult<Vec<RawMaterial>> {
        let mut conditions = Vec::new();
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.search.is_some() {
            conditions.push(
                "(string::lowercase(name) CONTAINS string::lowercase($search) \
                  OR string::lowercase(supplier ?? '') CONTAINS string::lowercase($search) \
                  OR item_id CONTAINS $search)",
            );
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!("SELECT * FROM raw_material {where_clause} ORDER BY name ASC");
        let mut q = self.base.db().query(query);
        if let Some(status) = filter.status {
            q = q.bind(("status", status));
        }
        if let Some(search) = filter.search {
            q = q.bind(("search", search));
        }

        let mut result = q.await?;
        let materials: Vec<RawMaterial> = result.take(0)?;
        Ok(materials)
    }

    /// Find raw material by human-readable item id
    pub async fn find_by_item_id(&self, item_id: &str) -> RepoResult<Option<RawMaterial>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM raw_material WHERE item_id = $item_id LIMIT 1")
            .bind(("item_id", item_id.to_string()))
            .await?;
        let materials: Vec<RawMaterial> = result.take(0)?;
        Ok(materials.into_iter().next())
    }

    /// 低库存/售罄清单 (告警侧边栏)
    pub async fn find_low_stock(&self) -> RepoResult<Vec<RawMaterial>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM raw_material \
                 WHERE status IN ['LOW_STOCK', 'OUT_OF_STOCK'] ORDER BY stock ASC",
            )
            .await?;
        let materials: Vec<RawMaterial> = result.take(0)?;
        Ok(materials)
    }

    /// Create a new raw material (allocates "RM-###" item id)
    pub async fn create(&self, data: RawMaterialCreate) -> RepoResult<RawMaterial> {
        if data.name.trim().is_empty() {
            return Err(RepoError::Validation("name is required".into()));
        }
        if data.quantity < 0.0 {
            return Err(RepoError::Validation("quantity cannot be negative".into()));
        }
        if data.price < 0.0 {
            return Err(RepoError::Validation("price cannot be negative".into()));
        }

        let now = shared::util::now_millis();
        let mut last_err = None;

        for _ in 0..CREATE_RETRIES {
            let item_id = self
                .sequences
                .next_id(RAW_MATERIAL_TABLE, "item_id", RAW_MATERIAL_PREFIX)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

            let material = RawMaterial {
                id: None,
                item_id: item_id.clone(),
                name: data.name.clone(),
                supplier: data.supplier.clone(),
                stock: data.quantity,
                unit: data.unit.clone(),
                price: data.price,
                gst_rate: data.gst_rate,
                reorder_level: data.reorder_level,
                status: StockStatus::classify(data.quantity, data.reorder_level),
                remarks: data.remarks.clone(),
                created_at: now,
                updated_at: now,
            };

            let created: Result<Option<RawMaterial>, surrealdb::Error> = self
                .base
                .db()
                .create(RAW_MATERIAL_TABLE)
                .content(material)
                .await;

            match created {
                Ok(Some(material)) => return Ok(material),
                Ok(None) => {
                    return Err(RepoError::Database(
                        "Failed to create raw material".to_string(),
                    ));
                }
                Err(e) if is_unique_index_violation(&e, "raw_material_item_id") => {
                    tracing::debug!(item_id = %item_id, "item_id collision, retrying allocation");
                    last_err = Some(RepoError::Duplicate(format!(
                        "Raw material item id {item_id} already allocated"
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_err.unwrap_or_else(|| RepoError::Database("Raw material create failed".into())))
    }
}
