//! Shared test fixtures: in-memory database + seed helpers
#![allow(dead_code)]

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use mill_server::db::DbService;
use mill_server::db::models::{
    Customer, CustomerCreate, Order, OrderCreate, OrderItem, OrderItemCreate, Product,
    ProductIntake, ProductType,
};
use mill_server::db::repository::{CustomerRepository, OrderRepository, ProductRepository};
use mill_server::dispatch::{DispatchPolicy, DispatchWorkflow};
use mill_server::stock::StockLedger;

pub struct TestContext {
    pub db: Surreal<Db>,
    pub stock: Arc<StockLedger>,
}

pub async fn setup() -> TestContext {
    let service = DbService::open_memory().await.expect("open memory db");
    let stock = Arc::new(StockLedger::new(service.db.clone()));
    TestContext {
        db: service.db,
        stock,
    }
}

impl TestContext {
    pub fn workflow(&self) -> DispatchWorkflow {
        self.workflow_with(DispatchPolicy::default())
    }

    pub fn workflow_with(&self, policy: DispatchPolicy) -> DispatchWorkflow {
        DispatchWorkflow::new(self.db.clone(), self.stock.clone(), policy)
    }

    pub async fn seed_customer(&self, name: &str) -> Customer {
        CustomerRepository::new(self.db.clone())
            .create(CustomerCreate {
                name: name.to_string(),
                email: None,
                phone: None,
                address: None,
                company: None,
            })
            .await
            .expect("seed customer")
    }

    pub async fn seed_product(&self, name: &str, price: f64, stock: f64) -> Product {
        ProductRepository::new(self.db.clone())
            .create_from_intake(ProductIntake {
                product_type: ProductType::Roll,
                name: name.to_string(),
                quantity: stock,
                gsm: Some(120),
                color_top: Some("blue".to_string()),
                color_bottom: Some("green".to_string()),
                width: Some(2.5),
                length: None,
                weight: None,
                pieces_per_bundle: None,
                roll_type: Some("standard".to_string()),
                price: Some(price),
                reorder_level: None,
                remarks: None,
            })
            .await
            .expect("seed product")
    }

    /// Create an order of `(product, quantity)` lines for the customer
    pub async fn seed_order(&self, customer: &Customer, lines: &[(&Product, i64)]) -> Order {
        let items = lines
            .iter()
            .map(|(product, quantity)| OrderItemCreate {
                product_id: product.id.as_ref().unwrap().key().to_string(),
                quantity: *quantity,
                unit: None,
                color_top: product.color_top.clone(),
                color_bottom: product.color_bottom.clone(),
                length: product.length,
                width: product.width,
                gsm: product.gsm,
            })
            .collect();

        OrderRepository::new(self.db.clone())
            .create(
                OrderCreate {
                    customer_id: customer.id.as_ref().unwrap().key().to_string(),
                    items,
                    delivery_method: None,
                    carrier: None,
                    remarks: None,
                },
                None,
            )
            .await
            .expect("seed order")
    }

    pub async fn order_items(&self, order: &Order) -> Vec<OrderItem> {
        OrderRepository::new(self.db.clone())
            .items_for(order.id.as_ref().unwrap())
            .await
            .expect("load order items")
    }

    pub async fn reload_order(&self, order_no: &str) -> Order {
        OrderRepository::new(self.db.clone())
            .find_by_order_no(order_no)
            .await
            .expect("reload order")
            .expect("order exists")
    }

    pub async fn reload_product(&self, item_id: &str) -> Product {
        ProductRepository::new(self.db.clone())
            .find_by_item_id(item_id)
            .await
            .expect("reload product")
            .expect("product exists")
    }
}
