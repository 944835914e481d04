// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finsight::commands::budgets::upsert_allocation;
use finsight::commands::recommend::preprocess;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    finsight::db::init_schema(&conn).unwrap();
    conn
}

fn add_tx(conn: &Connection, user: &str, date: &str, amount: &str, ty: &str, category: &str) {
    conn.execute(
        "INSERT INTO transactions(user_id, date, amount, amount_type, category, description)
         VALUES (?1, ?2, ?3, ?4, ?5, '')",
        params![user, date, amount, ty, category],
    )
    .unwrap();
}

// Decimals serialize as JSON strings; compare numerically.
fn dval(v: &serde_json::Value) -> Decimal {
    v.as_str().unwrap().parse().unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn income_and_expense_buckets_are_aggregated_for_the_month() {
    let conn = setup();
    add_tx(&conn, "u1", "2025-06-01", "5000", "credit", "Salary");
    add_tx(&conn, "u1", "2025-06-02", "2000", "debit", "Rent");
    add_tx(&conn, "u1", "2025-06-03", "150", "debit", "Utilities");
    add_tx(&conn, "u1", "2025-06-04", "80", "debit", "Dining");
    add_tx(&conn, "u1", "2025-06-05", "40", "debit", "Dining");
    add_tx(&conn, "u1", "2025-06-06", "60", "debit", "Shopping");
    // Outside the month: ignored by the summary buckets
    add_tx(&conn, "u1", "2025-05-20", "999", "debit", "Rent");

    let summary = preprocess(&conn, "u1", "2025-06").unwrap();
    let fin = &summary["financial_summary"];
    assert_eq!(dval(&fin["total_income"]), dec("5000"));
    assert_eq!(dval(&fin["fixed_expenses"]), dec("2150"));
    assert_eq!(dval(&fin["variable_expenses"]["Dining"]), dec("120"));
    assert_eq!(dval(&fin["variable_expenses"]["Shopping"]), dec("60"));
    assert!(fin["variable_expenses"].get("Entertainment").is_none());
}

#[test]
fn subscription_and_debt_totals_are_included() {
    let conn = setup();
    conn.execute_batch(
        "INSERT INTO subscriptions(user_id, name, cost, usage, priority)
         VALUES ('u1', 'Netflix', '499', 'Monthly', 'Medium');
         INSERT INTO subscriptions(user_id, name, cost, usage, priority)
         VALUES ('u1', 'Spotify', '199', 'Daily', 'High');
         INSERT INTO debts(user_id, name, amount, interest_rate, priority)
         VALUES ('u1', 'Card', '1000', '10', 'High');
         INSERT INTO debts(user_id, name, amount, interest_rate, priority)
         VALUES ('u1', 'Car loan', '3000', '6', 'Low');",
    )
    .unwrap();

    let summary = preprocess(&conn, "u1", "2025-06").unwrap();
    let fin = &summary["financial_summary"];
    assert_eq!(dval(&fin["total_subscription_cost"]), dec("698"));
    assert_eq!(dval(&fin["total_debt"]), dec("4000"));
    assert_eq!(dval(&fin["weighted_interest_rate"]), dec("7"));
    assert_eq!(summary["subscriptions"].as_array().unwrap().len(), 2);
    assert_eq!(summary["debts"].as_array().unwrap().len(), 2);
}

#[test]
fn budget_document_keeps_allocation_order() {
    let conn = setup();
    upsert_allocation(&conn, "u1", "Housing", dec("2000"), "Monthly").unwrap();
    upsert_allocation(&conn, "u1", "Food", dec("800"), "Monthly").unwrap();
    conn.execute("UPDATE budgets SET income='5000', savings='1000'", [])
        .unwrap();

    let summary = preprocess(&conn, "u1", "2025-06").unwrap();
    let budget = &summary["financial_summary"]["budget"];
    assert_eq!(budget["income"], "5000");
    assert_eq!(budget["savings"], "1000");
    let lines = budget["expenses"].as_array().unwrap();
    assert_eq!(lines[0]["category"], "Housing");
    assert_eq!(lines[1]["category"], "Food");
}

#[test]
fn missing_budget_falls_back_to_empty_document() {
    let conn = setup();
    let summary = preprocess(&conn, "u1", "2025-06").unwrap();
    let budget = &summary["financial_summary"]["budget"];
    assert_eq!(budget["income"], 0);
    assert!(budget["expenses"].as_array().unwrap().is_empty());
}

#[test]
fn trends_keep_the_three_most_recent_months_newest_first() {
    let conn = setup();
    for (d, amount) in [
        ("2025-03-10", "10"),
        ("2025-04-10", "20"),
        ("2025-05-10", "30"),
        ("2025-06-10", "40"),
        ("2025-06-20", "5"),
    ] {
        add_tx(&conn, "u1", d, amount, "debit", "Food");
    }

    let summary = preprocess(&conn, "u1", "2025-06").unwrap();
    let trend = summary["monthly_trends"]["expense_trend"]
        .as_array()
        .unwrap();
    assert_eq!(trend.len(), 3);
    assert_eq!(trend[0]["month"], "2025-06");
    assert_eq!(dval(&trend[0]["total"]), dec("45"));
    assert_eq!(trend[1]["month"], "2025-05");
    assert_eq!(trend[2]["month"], "2025-04");
    assert!(summary["monthly_trends"]["income_trend"]
        .as_array()
        .unwrap()
        .is_empty());
}
