//! End-to-end tests for the sale engine against an in-memory store.
//!
//! The interesting ones are the atomicity and concurrency tests: a checkout
//! that fails its last decrement must vanish without trace, and two sales
//! racing for the last unit must resolve to exactly one winner.

use std::sync::Arc;

use chrono::Utc;
use tally_core::{
    CheckoutRequest, DeductRequest, LineItem, PaymentMethod, Product, TaxRate,
};
use tally_engine::{EngineError, FixedTaxRate, SaleEngine};
use tally_store::{Store, StoreConfig};

const BUSINESS: &str = "biz-1";
const STAFF: &str = "staff-1";

/// 5% tax for every test business.
const TAX_BPS: u32 = 500;

async fn engine() -> SaleEngine<FixedTaxRate> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let store = Store::new(StoreConfig::in_memory()).await.unwrap();
    SaleEngine::new(store, FixedTaxRate(TaxRate::from_bps(TAX_BPS)))
}

async fn seed_product(
    engine: &SaleEngine<FixedTaxRate>,
    id: &str,
    price_cents: i64,
    cost_cents: i64,
    stock: i64,
    threshold: i64,
) {
    let now = Utc::now();
    engine
        .store()
        .inventory()
        .insert(&Product {
            id: id.to_string(),
            business_id: BUSINESS.to_string(),
            name: format!("Product {id}"),
            price_cents,
            cost_cents,
            stock,
            low_stock_threshold: threshold,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();
}

fn checkout_request(items: Vec<LineItem>, discount_percent: f64) -> CheckoutRequest {
    CheckoutRequest {
        business_id: BUSINESS.to_string(),
        staff_id: STAFF.to_string(),
        items,
        discount_percent,
        payment_method: PaymentMethod::Cash,
        notes: None,
    }
}

fn line(product_id: &str, quantity: i64) -> LineItem {
    LineItem {
        product_id: product_id.to_string(),
        quantity,
    }
}

fn deduct_request(product_id: &str, quantity: i64) -> DeductRequest {
    DeductRequest {
        business_id: BUSINESS.to_string(),
        product_id: product_id.to_string(),
        quantity,
    }
}

async fn stock_of(engine: &SaleEngine<FixedTaxRate>, id: &str) -> i64 {
    engine
        .store()
        .inventory()
        .get(id, BUSINESS)
        .await
        .unwrap()
        .unwrap()
        .stock
}

// =============================================================================
// Checkout
// =============================================================================

/// The worked example: 2 × $10 (cost $6) + 1 × $20 (cost $15),
/// 10% discount, 5% tax.
#[tokio::test]
async fn checkout_commits_sale_with_correct_totals() {
    let engine = engine().await;
    seed_product(&engine, "a", 1000, 600, 10, 0).await;
    seed_product(&engine, "b", 2000, 1500, 10, 0).await;

    let txn = engine
        .checkout(checkout_request(vec![line("a", 2), line("b", 1)], 10.0))
        .await
        .unwrap();

    assert_eq!(txn.subtotal_cents, 4000);
    assert_eq!(txn.discount_cents, 400);
    assert_eq!(txn.tax_cents, 180);
    assert_eq!(txn.total_cents, 3780);
    assert_eq!(txn.profit_cents, 900);

    // Stock moved
    assert_eq!(stock_of(&engine, "a").await, 8);
    assert_eq!(stock_of(&engine, "b").await, 9);

    // And the record is durable, items in cart order, snapshots frozen
    let loaded = engine
        .store()
        .transactions()
        .get_by_id(&txn.id, BUSINESS)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.total_cents, 3780);
    assert_eq!(loaded.items.len(), 2);
    assert_eq!(loaded.items[0].product_id, "a");
    assert_eq!(loaded.items[0].quantity, 2);
    assert_eq!(loaded.items[0].line_total_cents, 2000);
    assert_eq!(loaded.items[1].product_id, "b");
}

#[tokio::test]
async fn checkout_empty_cart_is_rejected_without_side_effects() {
    let engine = engine().await;
    seed_product(&engine, "a", 1000, 600, 5, 0).await;

    let err = engine.checkout(checkout_request(vec![], 0.0)).await.unwrap_err();
    assert!(matches!(err, EngineError::EmptyCart));

    assert_eq!(engine.store().transactions().count(BUSINESS).await.unwrap(), 0);
    assert_eq!(stock_of(&engine, "a").await, 5);
}

#[tokio::test]
async fn checkout_invalid_quantity_fails_validation() {
    let engine = engine().await;
    seed_product(&engine, "a", 1000, 600, 5, 0).await;

    let err = engine
        .checkout(checkout_request(vec![line("a", 0)], 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(stock_of(&engine, "a").await, 5);
}

#[tokio::test]
async fn checkout_unknown_product_fails_whole_cart() {
    let engine = engine().await;
    seed_product(&engine, "a", 1000, 600, 5, 0).await;

    let err = engine
        .checkout(checkout_request(vec![line("a", 1), line("ghost", 1)], 0.0))
        .await
        .unwrap_err();

    match err {
        EngineError::ProductNotFound { product_id } => assert_eq!(product_id, "ghost"),
        other => panic!("expected ProductNotFound, got {other:?}"),
    }

    // The valid line was not partially sold
    assert_eq!(engine.store().transactions().count(BUSINESS).await.unwrap(), 0);
    assert_eq!(stock_of(&engine, "a").await, 5);
}

#[tokio::test]
async fn checkout_insufficient_stock_reports_structured_fields() {
    let engine = engine().await;
    seed_product(&engine, "a", 1000, 600, 3, 0).await;

    let err = engine
        .checkout(checkout_request(vec![line("a", 5)], 0.0))
        .await
        .unwrap_err();

    match err {
        EngineError::InsufficientStock {
            product_id,
            requested,
            available,
        } => {
            assert_eq!(product_id, "a");
            assert_eq!(requested, 5);
            assert_eq!(available, 3);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }
}

/// Atomicity: a cart holding the same product twice passes the per-line
/// pre-check (each line alone fits the stock) but the second decrement
/// fails inside the unit of work. Everything must roll back: no
/// transaction row, no stock change for any line, no alert.
#[tokio::test]
async fn checkout_failure_on_a_later_line_rolls_back_everything() {
    let engine = engine().await;
    seed_product(&engine, "a", 1000, 600, 5, 10).await;

    let err = engine
        .checkout(checkout_request(vec![line("a", 3), line("a", 3)], 0.0))
        .await
        .unwrap_err();

    match err {
        EngineError::InsufficientStock {
            requested,
            available,
            ..
        } => {
            assert_eq!(requested, 3);
            // First decrement had taken 5 → 2 before rolling back
            assert_eq!(available, 2);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // Full rollback: the first line's decrement is undone too
    assert_eq!(stock_of(&engine, "a").await, 5);
    assert_eq!(engine.store().transactions().count(BUSINESS).await.unwrap(), 0);
    // Threshold is 10, the rolled-back dip below it must not have alerted
    assert_eq!(engine.store().alerts().open_count("a").await.unwrap(), 0);
}

#[tokio::test]
async fn checkout_discount_above_hundred_percent_is_clamped() {
    let engine = engine().await;
    seed_product(&engine, "a", 1000, 600, 5, 0).await;

    let txn = engine
        .checkout(checkout_request(vec![line("a", 1)], 150.0))
        .await
        .unwrap();

    assert_eq!(txn.subtotal_cents, 1000);
    assert_eq!(txn.discount_cents, 1000);
    assert_eq!(txn.tax_cents, 0);
    assert_eq!(txn.total_cents, 0);
}

#[tokio::test]
async fn checkout_snapshots_survive_later_price_edits() {
    let engine = engine().await;
    seed_product(&engine, "a", 1000, 600, 5, 0).await;

    let txn = engine
        .checkout(checkout_request(vec![line("a", 1)], 0.0))
        .await
        .unwrap();

    // A price edit by the product-management layer, after the sale
    sqlx::query("UPDATE products SET price_cents = 9999 WHERE id = 'a'")
        .execute(engine.store().pool())
        .await
        .unwrap();

    let loaded = engine
        .store()
        .transactions()
        .get_by_id(&txn.id, BUSINESS)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.items[0].unit_price_cents, 1000);
    assert_eq!(loaded.subtotal_cents, 1000);
}

#[tokio::test]
async fn checkout_drives_alert_when_crossing_threshold() {
    let engine = engine().await;
    seed_product(&engine, "a", 1000, 600, 5, 3).await;

    engine
        .checkout(checkout_request(vec![line("a", 2)], 0.0))
        .await
        .unwrap();

    // 5 − 2 = 3, at the threshold: inclusive comparison alerts
    let alert = engine.store().alerts().find_open("a").await.unwrap().unwrap();
    assert_eq!(alert.current_stock, 3);
    assert_eq!(alert.threshold, 3);
}

/// Two concurrent checkouts race for the last unit: exactly one commits,
/// the other reports insufficient stock, and stock ends at zero.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_checkouts_for_last_unit_sell_it_once() {
    let engine = Arc::new(engine().await);
    seed_product(&engine, "a", 1000, 600, 1, 0).await;

    let first = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            engine
                .checkout(checkout_request(vec![line("a", 1)], 0.0))
                .await
        })
    };
    let second = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            engine
                .checkout(checkout_request(vec![line("a", 1)], 0.0))
                .await
        })
    };

    let results = [first.await.unwrap(), second.await.unwrap()];
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one checkout must win the last unit");

    let loss = results.iter().find(|r| r.is_err()).unwrap();
    match loss.as_ref().unwrap_err() {
        EngineError::InsufficientStock {
            requested,
            available,
            ..
        } => {
            assert_eq!(*requested, 1);
            assert_eq!(*available, 0);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    assert_eq!(stock_of(&engine, "a").await, 0);
    assert_eq!(engine.store().transactions().count(BUSINESS).await.unwrap(), 1);
}

// =============================================================================
// Stand-alone deduction
// =============================================================================

/// stock=5, threshold=2, deduct 3 → newStock=2, and 2 ≤ 2 raises an alert
/// snapshotting exactly that state.
#[tokio::test]
async fn deduct_reports_new_stock_and_alerts_at_threshold() {
    let engine = engine().await;
    seed_product(&engine, "a", 1000, 600, 5, 2).await;

    let new_stock = engine.deduct_stock(deduct_request("a", 3)).await.unwrap();
    assert_eq!(new_stock, 2);

    let alert = engine.store().alerts().find_open("a").await.unwrap().unwrap();
    assert_eq!(alert.current_stock, 2);
    assert_eq!(alert.threshold, 2);

    // Inventory-only: no transaction record for a deduction
    assert_eq!(engine.store().transactions().count(BUSINESS).await.unwrap(), 0);
}

#[tokio::test]
async fn deduct_above_threshold_stays_quiet() {
    let engine = engine().await;
    seed_product(&engine, "a", 1000, 600, 5, 2).await;

    let new_stock = engine.deduct_stock(deduct_request("a", 1)).await.unwrap();
    assert_eq!(new_stock, 4);
    assert_eq!(engine.store().alerts().open_count("a").await.unwrap(), 0);
}

/// While one alert is open, further low-stock events are no-ops: the
/// original alert (and its snapshot) stays, nothing new appears.
#[tokio::test]
async fn repeated_low_stock_keeps_a_single_open_alert() {
    let engine = engine().await;
    seed_product(&engine, "a", 1000, 600, 4, 5).await;

    // Already below threshold: first deduction raises the alert at stock 3
    engine.deduct_stock(deduct_request("a", 1)).await.unwrap();
    assert_eq!(engine.store().alerts().open_count("a").await.unwrap(), 1);

    // Still below threshold: second deduction must not duplicate it
    let new_stock = engine.deduct_stock(deduct_request("a", 1)).await.unwrap();
    assert_eq!(new_stock, 2);
    assert_eq!(engine.store().alerts().open_count("a").await.unwrap(), 1);

    // The surviving alert is the original one, snapshot untouched
    let alert = engine.store().alerts().find_open("a").await.unwrap().unwrap();
    assert_eq!(alert.current_stock, 3);
}

#[tokio::test]
async fn dismissed_alert_can_be_raised_again() {
    let engine = engine().await;
    seed_product(&engine, "a", 1000, 600, 4, 5).await;

    engine.deduct_stock(deduct_request("a", 1)).await.unwrap();
    let first = engine.store().alerts().find_open("a").await.unwrap().unwrap();

    engine.store().alerts().dismiss(&first.id).await.unwrap();

    let new_stock = engine.deduct_stock(deduct_request("a", 1)).await.unwrap();
    assert_eq!(new_stock, 2);

    let second = engine.store().alerts().find_open("a").await.unwrap().unwrap();
    assert_ne!(second.id, first.id);
    assert_eq!(second.current_stock, 2);
}

#[tokio::test]
async fn deduct_insufficient_stock_changes_nothing() {
    let engine = engine().await;
    seed_product(&engine, "a", 1000, 600, 2, 0).await;

    let err = engine.deduct_stock(deduct_request("a", 5)).await.unwrap_err();
    match err {
        EngineError::InsufficientStock {
            requested,
            available,
            ..
        } => {
            assert_eq!(requested, 5);
            assert_eq!(available, 2);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    assert_eq!(stock_of(&engine, "a").await, 2);
    assert_eq!(engine.store().alerts().open_count("a").await.unwrap(), 0);
}

#[tokio::test]
async fn deduct_unknown_product_is_not_found() {
    let engine = engine().await;

    let err = engine.deduct_stock(deduct_request("ghost", 1)).await.unwrap_err();
    assert!(matches!(err, EngineError::ProductNotFound { .. }));
}

#[tokio::test]
async fn deduct_rejects_non_positive_quantity() {
    let engine = engine().await;
    seed_product(&engine, "a", 1000, 600, 5, 0).await;

    let err = engine.deduct_stock(deduct_request("a", 0)).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(stock_of(&engine, "a").await, 5);
}

/// Units sold never exceed initial stock under concurrency: ten deductions
/// of one unit against a stock of five yield exactly five successes.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_deductions_never_oversell() {
    let engine = Arc::new(engine().await);
    seed_product(&engine, "a", 1000, 600, 5, 0).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine.deduct_stock(deduct_request("a", 1)).await
        }));
    }

    let mut wins = 0;
    let mut losses = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(EngineError::InsufficientStock { .. }) => losses += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(wins, 5);
    assert_eq!(losses, 5);
    assert_eq!(stock_of(&engine, "a").await, 0);
}
