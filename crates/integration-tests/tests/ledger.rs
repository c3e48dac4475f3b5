//! Integration tests for ledger entries and their effect on cash on hand.
//!
//! Requires a migrated database, a cash row (kasir cash init) and a
//! running server. Run with: cargo test -- --ignored

use kasir_core::{TransactionStatus, TransactionType};
use kasir_integration_tests::{CASH_LOCK, TestContext, decimal};
use kasir_server::services::ledger::cash_effect;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

#[test]
fn test_cash_effect_follows_type_and_status() {
    let amount = Decimal::from(2500);
    assert_eq!(
        cash_effect(TransactionType::Income, TransactionStatus::Completed, amount),
        amount
    );
    assert_eq!(
        cash_effect(TransactionType::Outcome, TransactionStatus::Completed, amount),
        -amount
    );
    assert_eq!(
        cash_effect(TransactionType::Income, TransactionStatus::Pending, amount),
        Decimal::ZERO
    );
}

async fn record(ctx: &TestContext, body: Value) -> Value {
    let resp = ctx.post("/api/transactions").json(&body).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.unwrap()
}

#[tokio::test]
#[ignore = "Requires running server, database and cash row"]
async fn test_income_and_outcome_move_cash() {
    let _guard = CASH_LOCK.lock().await;
    let ctx = TestContext::new().await;
    let before = ctx.cash_nominal().await;

    let income = record(&ctx, json!({ "amount": "15000", "type": "income" })).await;
    assert_eq!(income["category"], "income");
    assert_eq!(income["status"], "completed");
    assert_eq!(ctx.cash_nominal().await, before + Decimal::from(15000));

    record(&ctx, json!({ "amount": "4000", "type": "outcome" })).await;
    assert_eq!(ctx.cash_nominal().await, before + Decimal::from(11000));
}

#[tokio::test]
#[ignore = "Requires running server, database and cash row"]
async fn test_pending_entry_leaves_cash() {
    let _guard = CASH_LOCK.lock().await;
    let ctx = TestContext::new().await;
    let before = ctx.cash_nominal().await;

    let pending = record(
        &ctx,
        json!({ "amount": "9000", "type": "income", "status": "pending" }),
    )
    .await;
    assert_eq!(ctx.cash_nominal().await, before);

    // Completing it applies the amount.
    let resp = ctx
        .put(&format!("/api/transactions/{}", pending["id"].as_str().unwrap()))
        .json(&json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(ctx.cash_nominal().await, before + Decimal::from(9000));
}

#[tokio::test]
#[ignore = "Requires running server, database and cash row"]
async fn test_delete_reverses_cash() {
    let _guard = CASH_LOCK.lock().await;
    let ctx = TestContext::new().await;
    let before = ctx.cash_nominal().await;

    let entry = record(&ctx, json!({ "amount": "7000", "type": "outcome" })).await;
    assert_eq!(ctx.cash_nominal().await, before - Decimal::from(7000));

    let id = entry["id"].as_str().unwrap();
    let resp = ctx.delete(&format!("/api/transactions/{id}")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(ctx.cash_nominal().await, before);

    let transactions = ctx.get_json("/api/transactions").await;
    assert!(
        !transactions
            .as_array()
            .unwrap()
            .iter()
            .any(|t| t["id"] == entry["id"])
    );
}

#[tokio::test]
#[ignore = "Requires running server, database and cash row"]
async fn test_delete_removes_only_the_matching_entry() {
    let _guard = CASH_LOCK.lock().await;
    let ctx = TestContext::new().await;

    let keep = record(&ctx, json!({ "amount": "1200", "type": "income" })).await;
    let gone = record(&ctx, json!({ "amount": "3400", "type": "income" })).await;

    let gone_path = format!("/api/transactions/{}", gone["id"].as_str().unwrap());
    let resp = ctx.delete(&gone_path).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let transactions = ctx.get_json("/api/transactions").await;
    let ids: Vec<&Value> = transactions
        .as_array()
        .unwrap()
        .iter()
        .map(|t| &t["id"])
        .collect();
    assert!(ids.contains(&&keep["id"]));
    assert!(!ids.contains(&&gone["id"]));

    let resp = ctx.delete(&gone_path).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = ctx
        .delete(&format!("/api/transactions/{}", keep["id"].as_str().unwrap()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

fn income_on(days: &Value, date: &str) -> Decimal {
    days.as_array()
        .unwrap()
        .iter()
        .find(|d| d["date"] == date)
        .map_or(Decimal::ZERO, |d| decimal(&d["income"]))
}

#[tokio::test]
#[ignore = "Requires running server, database and cash row"]
async fn test_daily_income_counts_every_status() {
    let _guard = CASH_LOCK.lock().await;
    let ctx = TestContext::new().await;
    let before = ctx.get_json("/api/dashboard/daily-income").await;

    let pending = record(
        &ctx,
        json!({ "amount": "2100", "type": "income", "status": "pending" }),
    )
    .await;
    let failed = record(
        &ctx,
        json!({ "amount": "900", "type": "income", "status": "failed" }),
    )
    .await;

    let after = ctx.get_json("/api/dashboard/daily-income").await;
    let today = after.as_array().unwrap().last().unwrap()["date"]
        .as_str()
        .unwrap()
        .to_owned();
    assert_eq!(
        income_on(&after, &today) - income_on(&before, &today),
        Decimal::from(3000)
    );

    for entry in [pending, failed] {
        let path = format!("/api/transactions/{}", entry["id"].as_str().unwrap());
        let resp = ctx.delete(&path).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
}

#[tokio::test]
#[ignore = "Requires running server, database and cash row"]
async fn test_reconciliation_reports_drift() {
    let ctx = TestContext::new().await;
    let report = ctx.get_json("/api/cash/reconciliation").await;
    assert_eq!(
        decimal(&report["balance"]) - decimal(&report["ledger_total"]),
        decimal(&report["drift"])
    );
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_invalid_entries_rejected() {
    let ctx = TestContext::new().await;

    for body in [
        json!({ "amount": "0", "type": "income" }),
        json!({ "amount": "-5", "type": "outcome" }),
        json!({ "amount": "10", "type": "transfer" }),
    ] {
        let resp = ctx.post("/api/transactions").json(&body).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
    }
}
