//! Inventory and production integration tests (in-memory engine)

mod common;

use common::setup;
use mill_server::db::models::{
    MaterialRequirementCreate, ProductionBatchCreate, ProductionStatus, RawMaterialCreate,
    StockStatus,
};
use mill_server::db::repository::product::ProductAttrs;
use mill_server::db::repository::{
    ProductRepository, ProductionRepository, RawMaterialRepository,
};
use mill_server::stock::StockKind;

#[tokio::test]
async fn item_ids_are_sequential_per_prefix() {
    let ctx = setup().await;

    let first = ctx.seed_product("Tarp A", 10.0, 5.0).await;
    let second = ctx.seed_product("Tarp B", 12.0, 5.0).await;
    assert_eq!(first.item_id, "TR001");
    assert_eq!(second.item_id, "TR002");

    let repo = RawMaterialRepository::new(ctx.db.clone());
    for expected in ["RM-001", "RM-002"] {
        let material = repo
            .create(RawMaterialCreate {
                name: format!("Material {expected}"),
                supplier: None,
                quantity: 10.0,
                unit: "kg".to_string(),
                price: 50.0,
                gst_rate: None,
                reorder_level: None,
                remarks: None,
            })
            .await
            .expect("create material");
        assert_eq!(material.item_id, expected);
    }
}

#[tokio::test]
async fn product_attribute_match_distinguishes_variants() {
    let ctx = setup().await;
    let repo = ProductRepository::new(ctx.db.clone());

    let product = ctx.seed_product("Heavy Tarp", 10.0, 5.0).await;

    // 同名不同宽度是另一个品类
    let matches = repo
        .find_by_attributes(&ProductAttrs {
            name: "Heavy Tarp".to_string(),
            product_type: product.product_type,
            gsm: product.gsm,
            color_top: product.color_top.clone(),
            color_bottom: product.color_bottom.clone(),
            width: Some(99.0),
            length: product.length,
            roll_type: product.roll_type.clone(),
        })
        .await
        .expect("query");
    assert!(matches.is_empty());

    let matches = repo
        .find_by_attributes(&ProductAttrs {
            name: "Heavy Tarp".to_string(),
            product_type: product.product_type,
            gsm: product.gsm,
            color_top: product.color_top.clone(),
            color_bottom: product.color_bottom.clone(),
            width: product.width,
            length: product.length,
            roll_type: product.roll_type.clone(),
        })
        .await
        .expect("query");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].item_id, product.item_id);
}

#[tokio::test]
async fn production_completion_moves_stock_through_ledger() {
    let ctx = setup().await;
    let product = ctx.seed_product("Heavy Tarp", 10.0, 5.0).await;

    let material = RawMaterialRepository::new(ctx.db.clone())
        .create(RawMaterialCreate {
            name: "HDPE Granules".to_string(),
            supplier: None,
            quantity: 100.0,
            unit: "kg".to_string(),
            price: 80.0,
            gst_rate: None,
            reorder_level: None,
            remarks: None,
        })
        .await
        .expect("create material");

    let repo = ProductionRepository::new(ctx.db.clone());
    let batch = repo
        .create(ProductionBatchCreate {
            product_id: product.id.as_ref().unwrap().key().to_string(),
            quantity: 20,
            order_id: None,
            materials: vec![MaterialRequirementCreate {
                raw_material_id: material.id.as_ref().unwrap().key().to_string(),
                quantity_per_unit: 2.0,
            }],
            start_date: None,
        })
        .await
        .expect("create batch");
    assert_eq!(batch.status, ProductionStatus::Pending);

    let batch_key = batch.id.as_ref().unwrap().key().to_string();
    let batch = repo
        .update_status(&batch_key, ProductionStatus::Completed)
        .await
        .expect("complete batch");
    assert_eq!(batch.status, ProductionStatus::Completed);
    assert!(batch.end_date.is_some());

    // 库存副作用经由台账 (此处模拟 handler 的编排)
    ctx.stock
        .increment(StockKind::Product, &batch.product.key().to_string(), 20.0)
        .await
        .expect("product intake");
    for requirement in &batch.materials {
        ctx.stock
            .decrement(
                StockKind::RawMaterial,
                &requirement.raw_material.key().to_string(),
                requirement.quantity_per_unit * batch.quantity as f64,
            )
            .await
            .expect("material consumption");
    }

    let product = ctx.reload_product(&product.item_id).await;
    assert_eq!(product.stock, 25.0);

    let material = RawMaterialRepository::new(ctx.db.clone())
        .find_by_item_id(&material.item_id)
        .await
        .expect("load")
        .expect("exists");
    assert_eq!(material.stock, 60.0);
    assert_eq!(material.status, StockStatus::InStock);
}

#[tokio::test]
async fn batch_creation_requires_sufficient_materials() {
    let ctx = setup().await;
    let product = ctx.seed_product("Heavy Tarp", 10.0, 5.0).await;

    let material = RawMaterialRepository::new(ctx.db.clone())
        .create(RawMaterialCreate {
            name: "HDPE Granules".to_string(),
            supplier: None,
            quantity: 10.0,
            unit: "kg".to_string(),
            price: 80.0,
            gst_rate: None,
            reorder_level: None,
            remarks: None,
        })
        .await
        .expect("create material");

    // 需要 2.0 × 20 = 40，只有 10
    let err = ProductionRepository::new(ctx.db.clone())
        .create(ProductionBatchCreate {
            product_id: product.id.as_ref().unwrap().key().to_string(),
            quantity: 20,
            order_id: None,
            materials: vec![MaterialRequirementCreate {
                raw_material_id: material.id.as_ref().unwrap().key().to_string(),
                quantity_per_unit: 2.0,
            }],
            start_date: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        mill_server::db::repository::RepoError::Validation(_)
    ));
}
