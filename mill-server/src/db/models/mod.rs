//! Database Models

// Inventory
pub mod product;
pub mod raw_material;
pub mod stock_status;

// Parties
pub mod customer;
pub mod user;

// Orders
pub mod order;

// Dispatch
pub mod dispatch;

// Production
pub mod production;

// System
pub mod alert;

// Re-exports
pub use alert::{Alert, AlertSeverity, AlertType};
pub use customer::{Customer, CustomerCreate};
pub use dispatch::{Dispatch, DispatchLine, DispatchMeta, DispatchStatus};
pub use order::{
    Order, OrderCreate, OrderItem, OrderItemCreate, OrderStatus, OrderStatusUpdate,
};
pub use product::{Product, ProductIntake, ProductType};
pub use production::{
    MaterialRequirement, MaterialRequirementCreate, ProductionBatch, ProductionBatchCreate,
    ProductionStatus,
};
pub use raw_material::{RawMaterial, RawMaterialCreate, RawMaterialStockUpdate};
pub use stock_status::StockStatus;
pub use user::{User, UserCreate, UserResponse, UserUpdate};
