//! Dispatch workflow integration tests (in-memory engine)
//!
//! Covers the two-phase dispatch algorithm: atomicity, clamp-to-zero,
//! full-delivery transition, total policies, cascade on DELIVERED and
//! the allocator numbering.

mod common;

use common::setup;
use mill_server::db::models::{DispatchMeta, DispatchStatus, OrderItem, OrderStatus, Product};
use mill_server::db::repository::product::ProductAttrs;
use mill_server::dispatch::{DispatchPolicy, ManifestEntry, OrderTotalPolicy};
use mill_server::utils::ErrorCode;

fn entry(item: &OrderItem, qty: i64, rate: f64) -> ManifestEntry {
    ManifestEntry {
        item_id: item.id.as_ref().unwrap().key().to_string(),
        delivered_quantity: qty,
        rate,
        metric_value: 1.0,
        attrs: None,
    }
}

fn attrs_for(product: &Product) -> ProductAttrs {
    ProductAttrs {
        name: product.name.clone(),
        product_type: product.product_type,
        gsm: product.gsm,
        color_top: product.color_top.clone(),
        color_bottom: product.color_bottom.clone(),
        width: product.width,
        length: product.length,
        roll_type: product.roll_type.clone(),
    }
}

/// ORD001 / qty 50 / price 10 -> full delivery in one dispatch
#[tokio::test]
async fn full_delivery_ships_order_and_decrements_stock() {
    let ctx = setup().await;
    let customer = ctx.seed_customer("Acme Traders").await;
    let product = ctx.seed_product("Heavy Tarp", 10.0, 100.0).await;
    let order = ctx.seed_order(&customer, &[(&product, 50)]).await;

    assert_eq!(order.order_no, "ORD001");
    assert_eq!(order.total, 500.0);
    assert_eq!(order.status, OrderStatus::Pending);

    let items = ctx.order_items(&order).await;
    let mut manifest = vec![entry(&items[0], 50, 10.0)];
    manifest[0].attrs = Some(attrs_for(&product));

    let dispatch = ctx
        .workflow()
        .create_dispatch(&order.order_no, manifest, DispatchMeta::default())
        .await
        .expect("dispatch created");

    assert_eq!(dispatch.dispatch_no, "DIS001");
    assert_eq!(dispatch.status, DispatchStatus::ReadyForPickup);
    assert_eq!(dispatch.total_amount, 500.0);
    assert_eq!(dispatch.lines.len(), 1);
    assert_eq!(dispatch.lines[0].delivered_quantity, 50);

    // Item fully delivered, order SHIPPED, additive total semantics
    let items = ctx.order_items(&order).await;
    assert_eq!(items[0].quantity, 0);
    let order = ctx.reload_order(&order.order_no).await;
    assert_eq!(order.status, OrderStatus::Shipped);
    assert_eq!(order.total, 1000.0);

    // Phase 2 decremented product stock
    let product = ctx.reload_product(&product.item_id).await;
    assert_eq!(product.stock, 50.0);
    assert_eq!(product.units_sold, 50);
}

#[tokio::test]
async fn partial_dispatch_leaves_order_status_unchanged() {
    let ctx = setup().await;
    let customer = ctx.seed_customer("Acme Traders").await;
    let product_a = ctx.seed_product("Tarp A", 10.0, 100.0).await;
    let product_b = ctx.seed_product("Tarp B", 5.0, 100.0).await;
    let order = ctx
        .seed_order(&customer, &[(&product_a, 10), (&product_b, 4)])
        .await;

    let items = ctx.order_items(&order).await;
    let item_a = items
        .iter()
        .find(|i| i.product.key().to_string() == product_a.id.as_ref().unwrap().key().to_string())
        .unwrap();

    ctx.workflow()
        .create_dispatch(
            &order.order_no,
            vec![entry(item_a, 10, 10.0)],
            DispatchMeta::default(),
        )
        .await
        .expect("partial dispatch");

    // 清单行清零，另一行未动，订单状态不变
    let items = ctx.order_items(&order).await;
    let quantities: Vec<i64> = items.iter().map(|i| i.quantity).collect();
    assert!(quantities.contains(&0));
    assert!(quantities.contains(&4));

    let order = ctx.reload_order(&order.order_no).await;
    assert_eq!(order.status, OrderStatus::Pending);
    // 未全量交付不加总额
    assert_eq!(order.total, 120.0);
}

#[tokio::test]
async fn over_delivery_clamps_at_zero_floor() {
    let ctx = setup().await;
    let customer = ctx.seed_customer("Acme Traders").await;
    let product = ctx.seed_product("Heavy Tarp", 10.0, 30.0).await;
    let order = ctx.seed_order(&customer, &[(&product, 10)]).await;
    let items = ctx.order_items(&order).await;

    // First dispatch fully delivers
    ctx.workflow()
        .create_dispatch(
            &order.order_no,
            vec![entry(&items[0], 10, 10.0)],
            DispatchMeta::default(),
        )
        .await
        .expect("first dispatch");

    // Second dispatch over-delivers the same item: idempotent floor, not an error
    ctx.workflow()
        .create_dispatch(
            &order.order_no,
            vec![entry(&items[0], 10, 10.0)],
            DispatchMeta::default(),
        )
        .await
        .expect("second dispatch succeeds");

    let items = ctx.order_items(&order).await;
    assert_eq!(items[0].quantity, 0, "quantity never goes negative");

    // SHIPPED bump 只发生一次
    let order = ctx.reload_order(&order.order_no).await;
    assert_eq!(order.status, OrderStatus::Shipped);
    assert_eq!(order.total, 200.0);

    // Product stock clamped at zero as well (30 - 10 - 10 = 10)
    let product = ctx.reload_product(&product.item_id).await;
    assert_eq!(product.stock, 10.0);
}

#[tokio::test]
async fn missing_order_fails_without_side_effects() {
    let ctx = setup().await;

    let err = ctx
        .workflow()
        .create_dispatch(
            "ORD999",
            vec![ManifestEntry {
                item_id: "nonexistent".to_string(),
                delivered_quantity: 1,
                rate: 1.0,
                metric_value: 1.0,
                attrs: None,
            }],
            DispatchMeta::default(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::OrderNotFound);

    // No dispatch rows were written
    let mut result = ctx
        .db
        .query("SELECT VALUE count() FROM dispatch GROUP ALL")
        .await
        .unwrap();
    let counts: Vec<i64> = result.take(0).unwrap();
    assert_eq!(counts.first().copied().unwrap_or(0), 0);
}

#[tokio::test]
async fn empty_manifest_rejected() {
    let ctx = setup().await;
    let customer = ctx.seed_customer("Acme Traders").await;
    let product = ctx.seed_product("Heavy Tarp", 10.0, 10.0).await;
    let order = ctx.seed_order(&customer, &[(&product, 5)]).await;

    let err = ctx
        .workflow()
        .create_dispatch(&order.order_no, vec![], DispatchMeta::default())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ManifestEmpty);
}

#[tokio::test]
async fn foreign_line_item_rejected_without_mutation() {
    let ctx = setup().await;
    let customer = ctx.seed_customer("Acme Traders").await;
    let product = ctx.seed_product("Heavy Tarp", 10.0, 10.0).await;
    let order_a = ctx.seed_order(&customer, &[(&product, 5)]).await;
    let order_b = ctx.seed_order(&customer, &[(&product, 7)]).await;

    let items_b = ctx.order_items(&order_b).await;

    // order_b 的行混进 order_a 的清单：跨订单篡改防护
    let err = ctx
        .workflow()
        .create_dispatch(
            &order_a.order_no,
            vec![entry(&items_b[0], 5, 10.0)],
            DispatchMeta::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderItemForeign);

    // Neither order's items changed
    let items_a = ctx.order_items(&order_a).await;
    let items_b = ctx.order_items(&order_b).await;
    assert_eq!(items_a[0].quantity, 5);
    assert_eq!(items_b[0].quantity, 7);
}

#[tokio::test]
async fn dispatch_numbers_are_sequential() {
    let ctx = setup().await;
    let customer = ctx.seed_customer("Acme Traders").await;
    let product = ctx.seed_product("Heavy Tarp", 10.0, 100.0).await;

    for expected in ["DIS001", "DIS002", "DIS003"] {
        let order = ctx.seed_order(&customer, &[(&product, 1)]).await;
        let items = ctx.order_items(&order).await;
        let dispatch = ctx
            .workflow()
            .create_dispatch(
                &order.order_no,
                vec![entry(&items[0], 1, 10.0)],
                DispatchMeta::default(),
            )
            .await
            .expect("dispatch");
        assert_eq!(dispatch.dispatch_no, expected);
    }
}

#[tokio::test]
async fn delivered_status_cascades_to_order() {
    let ctx = setup().await;
    let customer = ctx.seed_customer("Acme Traders").await;
    let product = ctx.seed_product("Heavy Tarp", 10.0, 100.0).await;
    let order = ctx.seed_order(&customer, &[(&product, 5)]).await;
    let items = ctx.order_items(&order).await;

    let dispatch = ctx
        .workflow()
        .create_dispatch(
            &order.order_no,
            vec![entry(&items[0], 5, 10.0)],
            DispatchMeta::default(),
        )
        .await
        .expect("dispatch");

    let updated = ctx
        .workflow()
        .update_status(&dispatch.dispatch_no, "DELIVERED", None, None)
        .await
        .expect("status update");
    assert_eq!(updated.status, DispatchStatus::Delivered);

    // 跨聚合副作用
    let order = ctx.reload_order(&order.order_no).await;
    assert_eq!(order.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn invalid_and_backward_status_transitions_rejected() {
    let ctx = setup().await;
    let customer = ctx.seed_customer("Acme Traders").await;
    let product = ctx.seed_product("Heavy Tarp", 10.0, 100.0).await;
    let order = ctx.seed_order(&customer, &[(&product, 5)]).await;
    let items = ctx.order_items(&order).await;

    let dispatch = ctx
        .workflow()
        .create_dispatch(
            &order.order_no,
            vec![entry(&items[0], 5, 10.0)],
            DispatchMeta::default(),
        )
        .await
        .expect("dispatch");

    let err = ctx
        .workflow()
        .update_status(&dispatch.dispatch_no, "LOST", None, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DispatchInvalidStatus);

    ctx.workflow()
        .update_status(&dispatch.dispatch_no, "IN_TRANSIT", None, None)
        .await
        .expect("forward transition");

    let err = ctx
        .workflow()
        .update_status(&dispatch.dispatch_no, "READY_FOR_PICKUP", None, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DispatchInvalidStatus);
}

#[tokio::test]
async fn phase2_product_match_failure_does_not_fail_dispatch() {
    let ctx = setup().await;
    let customer = ctx.seed_customer("Acme Traders").await;
    let product = ctx.seed_product("Heavy Tarp", 10.0, 100.0).await;
    let order = ctx.seed_order(&customer, &[(&product, 5)]).await;
    let items = ctx.order_items(&order).await;

    let mut manifest = vec![entry(&items[0], 5, 10.0)];
    // 属性对不上任何商品：Phase 2 记日志跳过，发货本身成功
    let mut bad_attrs = attrs_for(&product);
    bad_attrs.name = "No Such Product".to_string();
    manifest[0].attrs = Some(bad_attrs);

    let dispatch = ctx
        .workflow()
        .create_dispatch(&order.order_no, manifest, DispatchMeta::default())
        .await
        .expect("dispatch succeeds despite stock bookkeeping failure");
    assert_eq!(dispatch.status, DispatchStatus::ReadyForPickup);

    // Phase 1 applied, Phase 2 skipped
    let items = ctx.order_items(&order).await;
    assert_eq!(items[0].quantity, 0);
    let product = ctx.reload_product(&product.item_id).await;
    assert_eq!(product.stock, 100.0, "stock untouched on match failure");
}

#[tokio::test]
async fn keep_order_total_policy_preserves_total() {
    let ctx = setup().await;
    let customer = ctx.seed_customer("Acme Traders").await;
    let product = ctx.seed_product("Heavy Tarp", 10.0, 100.0).await;
    let order = ctx.seed_order(&customer, &[(&product, 5)]).await;
    let items = ctx.order_items(&order).await;

    let policy = DispatchPolicy {
        order_total_policy: OrderTotalPolicy::KeepOrderTotal,
        ..DispatchPolicy::default()
    };
    ctx.workflow_with(policy)
        .create_dispatch(
            &order.order_no,
            vec![entry(&items[0], 5, 10.0)],
            DispatchMeta::default(),
        )
        .await
        .expect("dispatch");

    let order = ctx.reload_order(&order.order_no).await;
    assert_eq!(order.status, OrderStatus::Shipped);
    assert_eq!(order.total, 50.0, "total untouched under keep policy");
}

#[tokio::test]
async fn single_dispatch_policy_rejects_second_dispatch() {
    let ctx = setup().await;
    let customer = ctx.seed_customer("Acme Traders").await;
    let product = ctx.seed_product("Heavy Tarp", 10.0, 100.0).await;
    let order = ctx.seed_order(&customer, &[(&product, 10)]).await;
    let items = ctx.order_items(&order).await;

    let policy = DispatchPolicy {
        single_dispatch_per_order: true,
        ..DispatchPolicy::default()
    };

    ctx.workflow_with(policy)
        .create_dispatch(
            &order.order_no,
            vec![entry(&items[0], 4, 10.0)],
            DispatchMeta::default(),
        )
        .await
        .expect("first dispatch");

    let err = ctx
        .workflow_with(policy)
        .create_dispatch(
            &order.order_no,
            vec![entry(&items[0], 6, 10.0)],
            DispatchMeta::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DispatchExists);
}

#[tokio::test]
async fn concurrent_dispatches_do_not_lose_updates() {
    let ctx = setup().await;
    let customer = ctx.seed_customer("Acme Traders").await;
    let product = ctx.seed_product("Heavy Tarp", 10.0, 100.0).await;
    let order = ctx.seed_order(&customer, &[(&product, 10)]).await;
    let items = ctx.order_items(&order).await;

    // 两个并发发货合起来正好全量交付
    let wf_a = ctx.workflow();
    let wf_b = ctx.workflow();
    let entry_a = entry(&items[0], 5, 10.0);
    let entry_b = entry(&items[0], 5, 10.0);
    let order_no = order.order_no.clone();
    let order_no_b = order.order_no.clone();

    let (a, b) = tokio::join!(
        wf_a.create_dispatch(&order_no, vec![entry_a], DispatchMeta::default()),
        wf_b.create_dispatch(&order_no_b, vec![entry_b], DispatchMeta::default()),
    );
    a.expect("dispatch A");
    b.expect("dispatch B");

    // No lost update: both decrements landed
    let items = ctx.order_items(&order).await;
    assert_eq!(items[0].quantity, 0);

    // Exactly one SHIPPED transition, so exactly one total bump
    let order = ctx.reload_order(&order.order_no).await;
    assert_eq!(order.status, OrderStatus::Shipped);
    assert_eq!(order.total, 100.0 + 50.0);
}
