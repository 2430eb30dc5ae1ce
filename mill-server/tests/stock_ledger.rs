//! Stock ledger integration tests (in-memory engine)

mod common;

use common::setup;
use mill_server::db::models::{AlertType, RawMaterialCreate, StockStatus};
use mill_server::db::repository::RawMaterialRepository;
use mill_server::db::repository::alert::AlertFilter;
use mill_server::db::repository::AlertRepository;
use mill_server::stock::StockKind;

async fn seed_material(ctx: &common::TestContext, stock: f64, reorder: Option<f64>) -> String {
    let material = RawMaterialRepository::new(ctx.db.clone())
        .create(RawMaterialCreate {
            name: "HDPE Granules".to_string(),
            supplier: Some("Polychem".to_string()),
            quantity: stock,
            unit: "kg".to_string(),
            price: 80.0,
            gst_rate: Some(18.0),
            reorder_level: reorder,
            remarks: None,
        })
        .await
        .expect("seed material");
    material.id.as_ref().unwrap().key().to_string()
}

#[tokio::test]
async fn decrement_recomputes_status_every_mutation() {
    let ctx = setup().await;
    let key = seed_material(&ctx, 100.0, Some(20.0)).await;

    let level = ctx
        .stock
        .decrement(StockKind::RawMaterial, &key, 70.0)
        .await
        .expect("decrement");
    assert_eq!(level.stock, 30.0);
    assert_eq!(level.status, StockStatus::InStock);

    // 穿越阈值 -> LOW_STOCK
    let level = ctx
        .stock
        .decrement(StockKind::RawMaterial, &key, 15.0)
        .await
        .expect("decrement");
    assert_eq!(level.stock, 15.0);
    assert_eq!(level.status, StockStatus::LowStock);

    // 清零 -> OUT_OF_STOCK
    let level = ctx
        .stock
        .decrement(StockKind::RawMaterial, &key, 15.0)
        .await
        .expect("decrement");
    assert_eq!(level.stock, 0.0);
    assert_eq!(level.status, StockStatus::OutOfStock);
}

#[tokio::test]
async fn decrement_clamps_and_records_drift_alert() {
    let ctx = setup().await;
    let key = seed_material(&ctx, 5.0, None).await;

    // 扣 8 只有 5：封底为 0，不报错
    let level = ctx
        .stock
        .decrement(StockKind::RawMaterial, &key, 8.0)
        .await
        .expect("clamped decrement succeeds");
    assert_eq!(level.stock, 0.0);
    assert_eq!(level.status, StockStatus::OutOfStock);

    // 漂移必须可见：产生 STOCK_DRIFT 告警
    let alerts = AlertRepository::new(ctx.db.clone())
        .find_all(AlertFilter::default())
        .await
        .expect("load alerts");
    assert!(
        alerts.iter().any(|a| a.alert_type == AlertType::StockDrift),
        "expected a stock drift alert, got {alerts:?}"
    );
}

#[tokio::test]
async fn increment_restores_status() {
    let ctx = setup().await;
    let key = seed_material(&ctx, 0.0, Some(10.0)).await;

    let level = ctx
        .stock
        .increment(StockKind::RawMaterial, &key, 4.0)
        .await
        .expect("increment");
    assert_eq!(level.stock, 4.0);
    assert_eq!(level.status, StockStatus::LowStock);

    let level = ctx
        .stock
        .increment(StockKind::RawMaterial, &key, 46.0)
        .await
        .expect("increment");
    assert_eq!(level.stock, 50.0);
    assert_eq!(level.status, StockStatus::InStock);
}

#[tokio::test]
async fn set_absolute_corrects_stock() {
    let ctx = setup().await;
    let key = seed_material(&ctx, 10.0, Some(5.0)).await;

    let level = ctx
        .stock
        .set_absolute(StockKind::RawMaterial, &key, 3.0)
        .await
        .expect("set absolute");
    assert_eq!(level.stock, 3.0);
    assert_eq!(level.status, StockStatus::LowStock);

    let err = ctx
        .stock
        .set_absolute(StockKind::RawMaterial, &key, -1.0)
        .await
        .unwrap_err();
    assert_eq!(err.code, mill_server::utils::ErrorCode::ValidationFailed);
}

#[tokio::test]
async fn missing_entity_is_not_found() {
    let ctx = setup().await;
    let err = ctx
        .stock
        .decrement(StockKind::RawMaterial, "nope", 1.0)
        .await
        .unwrap_err();
    assert_eq!(err.code, mill_server::utils::ErrorCode::RawMaterialNotFound);
}

#[tokio::test]
async fn concurrent_decrements_serialize_per_entity() {
    let ctx = setup().await;
    let key = seed_material(&ctx, 10.0, None).await;

    // 10 个并发扣减各 1：串行化后刚好清零，无 lost update 也不为负
    let mut handles = Vec::new();
    for _ in 0..10 {
        let stock = ctx.stock.clone();
        let key = key.clone();
        handles.push(tokio::spawn(async move {
            stock.decrement(StockKind::RawMaterial, &key, 1.0).await
        }));
    }
    for handle in handles {
        handle.await.expect("task").expect("decrement");
    }

    let material = RawMaterialRepository::new(ctx.db.clone())
        .find_by_item_id("RM-001")
        .await
        .expect("load")
        .expect("exists");
    assert_eq!(material.stock, 0.0);
    assert_eq!(material.status, StockStatus::OutOfStock);
}
