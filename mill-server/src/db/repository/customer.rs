//! Customer Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Customer, CustomerCreate, Order};
use crate::db::schema::is_unique_index_violation;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const CUSTOMER_TABLE: &str = "customer";

#[derive(Clone)]
pub struct CustomerRepository {
    base: BaseRepository,
}

impl CustomerRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all customers, optionally filtered by name/email/company substring
    pub async fn find_all(&self, search: Option<String>) -> RepoResult<Vec<Customer>> {
        let mut result = match search {
            Some(term) => {
                self.base
                    .db()
                    .query(
                        "SELECT * FROM customer \
                         WHERE string::lowercase(name) CONTAINS string::lowercase($term) \
                            OR string::lowercase(email ?? '') CONTAINS string::lowercase($term) \
                            OR string::lowercase(company ?? '') CONTAINS string::lowercase($term) \
                         ORDER BY name ASC",
                    )
                    .bind(("term", term))
                    .await?
            }
            None => {
                self.base
                    .db()
                    .query("SELECT * FROM customer ORDER BY name ASC")
                    .await?
            }
        };

        let customers: Vec<Customer> = result.take(0)?;
        Ok(customers)
    }

    /// Find customer by record key
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Customer>> {
        let customer: Option<Customer> = self.base.db().select((CUSTOMER_TABLE, id)).await?;
        Ok(customer)
    }

    /// Orders placed by a customer (detail view)
    pub async fn find_orders(&self, id: &str) -> RepoResult<Vec<Order>> {
        let customer_id = RecordId::from_table_key(CUSTOMER_TABLE, id);
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE customer = $customer ORDER BY ordered_at DESC")
            .bind(("customer", customer_id))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders)
    }

    /// Create a new customer
    pub async fn create(&self, data: CustomerCreate) -> RepoResult<Customer> {
        if data.name.trim().is_empty() {
            return Err(RepoError::Validation("name is required".into()));
        }

        let customer = Customer {
            id: None,
            name: data.name,
            email: data.email,
            phone: data.phone,
            address: data.address,
            company: data.company,
            created_at: shared::util::now_millis(),
        };

        let created: Option<Customer> = self
            .base
            .db()
            .create(CUSTOMER_TABLE)
            .content(customer)
            .await
            .map_err(|e| {
                if is_unique_index_violation(&e, "customer_email") {
                    RepoError::Duplicate("Customer email already registered".into())
                } else {
                    RepoError::from(e)
                }
            })?;

        created.ok_or_else(|| RepoError::Database("Failed to create customer".to_string()))
    }
}
