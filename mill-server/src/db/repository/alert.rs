//! Alert Repository

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Alert, AlertSeverity, AlertType};

const ALERT_TABLE: &str = "alert";

/// List filter parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertFilter {
    pub is_read: Option<bool>,
    pub severity: Option<String>,
}

#[derive(Clone)]
pub struct AlertRepository {
    base: BaseRepository,
}

impl AlertRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find alerts, newest first
    pub async fn find_all(&self, filter: AlertFilter) -> RepoResult<Vec<Alert>> {
        let mut conditions = Vec::new();
        if filter.is_read.is_some() {
            conditions.push("is_read = $is_read");
        }
        if filter.severity.is_some() {
            conditions.push("severity = $severity");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!("SELECT * FROM alert {where_clause} ORDER BY created_at DESC");
        let mut q = self.base.db().query(query);
        if let Some(is_read) = filter.is_read {
            q = q.bind(("is_read", is_read));
        }
        if let Some(severity) = filter.severity {
            q = q.bind(("severity", severity));
        }

        let mut result = q.await?;
        let alerts: Vec<Alert> = result.take(0)?;
        Ok(alerts)
    }

    /// Mark one alert as read
    pub async fn mark_read(&self, id: &str) -> RepoResult<Alert> {
        let mut result = self
            .base
            .db()
            .query("UPDATE type::thing('alert', $id) SET is_read = true RETURN AFTER")
            .bind(("id", id.to_string()))
            .await?;
        let alerts: Vec<Alert> = result.take(0)?;
        alerts
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Alert {} not found", id)))
    }

    /// Create an alert
    pub async fn create(
        &self,
        alert_type: AlertType,
        severity: AlertSeverity,
        message: impl Into<String>,
    ) -> RepoResult<Alert> {
        let alert = Alert {
            id: None,
            alert_type,
            message: message.into(),
            severity,
            is_read: false,
            created_at: shared::util::now_millis(),
        };

        let created: Option<Alert> = self.base.db().create(ALERT_TABLE).content(alert).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create alert".to_string()))
    }
}
