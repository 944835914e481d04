// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finsight::commands::budgets::{ensure_budget, save_draft, upsert_allocation};
use finsight::llm::{BudgetDraft, BudgetDraftLine};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    finsight::db::init_schema(&conn).unwrap();
    conn
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn budget_is_created_with_zero_defaults_on_first_access() {
    let conn = setup();
    let id = ensure_budget(&conn, "u1").unwrap();
    let (income, savings): (String, String) = conn
        .query_row(
            "SELECT income, savings FROM budgets WHERE id=?1",
            params![id],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(income, "0");
    assert_eq!(savings, "0");

    // Second access reuses the same document
    let again = ensure_budget(&conn, "u1").unwrap();
    assert_eq!(id, again);
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM budgets WHERE user_id='u1'", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(n, 1);
}

#[test]
fn allocation_updates_in_place_when_category_exists() {
    let conn = setup();
    upsert_allocation(&conn, "u1", "Food", dec("500"), "Monthly").unwrap();
    upsert_allocation(&conn, "u1", "Food", dec("750"), "Weekly").unwrap();

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM budget_lines", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 1);
    let (amount, freq): (String, String) = conn
        .query_row(
            "SELECT allocated_amount, frequency FROM budget_lines WHERE category='Food'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(amount, "750");
    assert_eq!(freq, "Weekly");
}

#[test]
fn new_categories_are_appended_in_order() {
    let conn = setup();
    upsert_allocation(&conn, "u1", "Housing", dec("2000"), "Monthly").unwrap();
    upsert_allocation(&conn, "u1", "Food", dec("800"), "Monthly").unwrap();
    upsert_allocation(&conn, "u1", "Housing", dec("2500"), "Monthly").unwrap();
    upsert_allocation(&conn, "u1", "Transport", dec("300"), "Monthly").unwrap();

    let mut stmt = conn
        .prepare("SELECT category FROM budget_lines ORDER BY position")
        .unwrap();
    let cats: Vec<String> = stmt
        .query_map([], |r| r.get(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    // Updating Housing must not move it to the end
    assert_eq!(cats, vec!["Housing", "Food", "Transport"]);
}

#[test]
fn allocations_are_scoped_per_user() {
    let conn = setup();
    upsert_allocation(&conn, "u1", "Food", dec("500"), "Monthly").unwrap();
    upsert_allocation(&conn, "u2", "Food", dec("900"), "Monthly").unwrap();

    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM budget_lines", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 2);
}

#[test]
fn parsed_draft_is_saved_as_budget_document() {
    let conn = setup();
    let draft = BudgetDraft {
        income: dec("5000"),
        savings: dec("1000"),
        expenses: vec![
            BudgetDraftLine {
                category: "Rent".into(),
                allocated_amount: dec("2000"),
            },
            BudgetDraftLine {
                category: "Groceries".into(),
                allocated_amount: dec("500"),
            },
        ],
    };
    save_draft(&conn, "u1", &draft).unwrap();

    let (income, savings): (String, String) = conn
        .query_row(
            "SELECT income, savings FROM budgets WHERE user_id='u1'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(income, "5000");
    assert_eq!(savings, "1000");

    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM budget_lines", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 2);
}
