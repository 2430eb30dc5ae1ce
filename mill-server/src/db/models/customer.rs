//! Customer Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Customer entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    /// 缺省时不落字段，避免唯一索引把 NONE 当作重复值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
    pub created_at: i64,
}

/// Create customer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
}

impl Customer {
    /// 列表展示名：优先公司名
    pub fn display_name(&self) -> &str {
        self.company.as_deref().unwrap_or(&self.name)
    }
}
