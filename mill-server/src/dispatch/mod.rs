//! 发货工作流 (Dispatch Workflow)
//!
//! 订单到发货的两阶段库存核销：
//!
//! - **Phase 1 (原子)**: 分配发货编号、落发货快照、扣减订单行、
//!   条件推进订单状态 —— 全部在一个存储事务内，要么全部生效要么全部回滚。
//! - **Phase 2 (尽力而为)**: 按属性元组匹配商品并扣减库存。
//!   单条失败只记日志，不影响已确认的发货。
//!
//! 订单行数量与发货记录只能经由本模块变更。

mod manifest;
mod workflow;

pub use manifest::{ManifestEntry, validate_manifest};
pub use workflow::{DispatchPolicy, DispatchWorkflow, OrderTotalPolicy};
