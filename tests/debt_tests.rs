// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finsight::commands::debts::debt_summary;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    finsight::db::init_schema(&conn).unwrap();
    conn
}

fn add_debt(conn: &Connection, user: &str, name: &str, amount: &str, rate: &str) {
    conn.execute(
        "INSERT INTO debts(user_id, name, amount, interest_rate, priority)
         VALUES (?1, ?2, ?3, ?4, 'Medium')",
        params![user, name, amount, rate],
    )
    .unwrap();
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn rate_is_weighted_by_outstanding_amount() {
    let conn = setup();
    add_debt(&conn, "u1", "Card", "1000", "10");
    add_debt(&conn, "u1", "Car loan", "3000", "6");

    let (total, rate) = debt_summary(&conn, "u1").unwrap();
    assert_eq!(total, dec("4000"));
    // (1000*10 + 3000*6) / 4000
    assert_eq!(rate, dec("7"));
}

#[test]
fn no_debts_yields_zero_total_and_zero_rate() {
    let conn = setup();
    let (total, rate) = debt_summary(&conn, "u1").unwrap();
    assert_eq!(total, Decimal::ZERO);
    assert_eq!(rate, Decimal::ZERO);
}

#[test]
fn summary_is_scoped_per_user() {
    let conn = setup();
    add_debt(&conn, "u1", "Card", "1000", "10");
    add_debt(&conn, "u2", "Mortgage", "200000", "4");

    let (total, rate) = debt_summary(&conn, "u1").unwrap();
    assert_eq!(total, dec("1000"));
    assert_eq!(rate, dec("10"));
}
