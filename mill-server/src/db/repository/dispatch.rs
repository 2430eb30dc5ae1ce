//! Dispatch Repository (read side)
//!
//! 发货记录的创建与状态迁移在 `DispatchWorkflow`；这里只有查询。

use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, PageInfo, Pagination, RepoResult};
use crate::db::models::Dispatch;

/// List filter parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DispatchFilter {
    pub status: Option<String>,
    pub search: Option<String>,
}

/// "今日发货" 面板数据
#[derive(Debug, Clone, Serialize)]
pub struct TodayDispatches {
    pub todays_dispatches: i64,
    pub recent_dispatches: Vec<Dispatch>,
}

#[derive(Clone)]
pub struct DispatchRepository {
    base: BaseRepository,
}

impl DispatchRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find dispatch by human-readable number
    pub async fn find_by_dispatch_no(&self, dispatch_no: &str) -> RepoResult<Option<Dispatch>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM dispatch WHERE dispatch_no = $dispatch_no LIMIT 1")
            .bind(("dispatch_no", dispatch_no.to_string()))
            .await?;
        let dispatches: Vec<Dispatch> = result.take(0)?;
        Ok(dispatches.into_iter().next())
    }

    /// Paginated list
    pub async fn find_all(
        &self,
        filter: DispatchFilter,
        pagination: Pagination,
    ) -> RepoResult<(Vec<Dispatch>, PageInfo)> {
        let mut conditions = Vec::new();
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.search.is_some() {
            conditions.push(
                "(dispatch_no CONTAINS $search OR order_no CONTAINS $search \
                  OR string::lowercase(customer ?? '') CONTAINS string::lowercase($search))",
            );
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let list_query = format!(
            "SELECT * FROM dispatch {where_clause} ORDER BY created_at DESC \
             LIMIT $limit START $offset"
        );
        let count_query = format!("SELECT VALUE count() FROM dispatch {where_clause} GROUP ALL");

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
        let dispatches: Vec<Dispatch> = result.take(0)?;
        let counts: Vec<i64> = result.take(1)?;
        let total = counts.first().copied().unwrap_or(0).max(0) as u64;

        Ok((dispatches, PageInfo::new(pagination, total)))
    }

    /// 今日发货数量 + 最近 4 条 (仪表盘 "Today's Dispatch Status" 区块)
    pub async fn today(&self) -> RepoResult<TodayDispatches> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT VALUE count() FROM dispatch WHERE created_at >= $today GROUP ALL",
            )
            .query(
                "SELECT * FROM dispatch WHERE created_at >= $today \
                 ORDER BY created_at DESC LIMIT 4",
            )
            .bind(("today", shared::util::today_start_millis()))
            .await?;

        let counts: Vec<i64> = result.take(0)?;
        let recent: Vec<Dispatch> = result.take(1)?;

        Ok(TodayDispatches {
            todays_dispatches: counts.first().copied().unwrap_or(0),
            recent_dispatches: recent,
        })
    }
}
