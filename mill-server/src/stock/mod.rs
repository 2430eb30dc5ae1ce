//! 库存台账 (Stock Ledger)
//!
//! 库存数量及其派生状态的唯一写入方。其他组件一律经由
//! [`StockLedger`] 变更 `stock` / `status` 字段。

mod ledger;

pub use ledger::{StockKind, StockLedger, StockLevel};
