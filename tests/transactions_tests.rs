// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use finsight::cli;
use finsight::commands::profile::get_profile;
use finsight::commands::transactions::{self, insert_transaction, NewTransaction};
use finsight::error::CoreError;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    finsight::db::init_schema(&conn).unwrap();
    conn
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn tx_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["finsight", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, sub) = matches.subcommand().unwrap();
    sub.clone()
}

#[test]
fn negative_amount_is_rejected() {
    let conn = setup();
    let err = insert_transaction(
        &conn,
        &NewTransaction {
            user_id: "u1",
            date: date("2025-06-01"),
            amount: dec("-10"),
            amount_type: "debit",
            category: "Food",
            description: "",
            mode: None,
        },
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CoreError>(),
        Some(CoreError::InvalidInput(_))
    ));
}

#[test]
fn cash_debit_decreases_cash_holdings() {
    let conn = setup();
    conn.execute(
        "INSERT INTO profiles(user_id, cash_holdings) VALUES ('u1', '1000')",
        [],
    )
    .unwrap();
    let sub = tx_matches(&[
        "add", "--user", "u1", "--date", "2025-06-01", "--amount", "250", "--type", "debit",
        "--category", "Food", "--mode", "cash",
    ]);
    transactions::handle(&conn, &sub).unwrap();

    let p = get_profile(&conn, "u1").unwrap().unwrap();
    assert_eq!(p.cash_holdings, dec("750"));
}

#[test]
fn online_credit_increases_online_holdings() {
    let conn = setup();
    let sub = tx_matches(&[
        "add", "--user", "u1", "--date", "2025-06-01", "--amount", "5000", "--type", "credit",
        "--category", "Salary", "--mode", "online",
    ]);
    transactions::handle(&conn, &sub).unwrap();

    let p = get_profile(&conn, "u1").unwrap().unwrap();
    assert_eq!(p.online_holdings, dec("5000"));
}

#[test]
fn entry_without_mode_leaves_holdings_alone() {
    let conn = setup();
    let sub = tx_matches(&[
        "add", "--user", "u1", "--date", "2025-06-01", "--amount", "100", "--type", "debit",
        "--category", "Food",
    ]);
    transactions::handle(&conn, &sub).unwrap();
    assert!(get_profile(&conn, "u1").unwrap().is_none());
}

#[test]
fn list_filters_by_month_category_and_type() {
    let conn = setup();
    for (d, amount, ty, cat) in [
        ("2025-06-01", "10", "debit", "Food"),
        ("2025-06-02", "20", "debit", "Travel"),
        ("2025-06-03", "30", "credit", "Food"),
        ("2025-07-01", "40", "debit", "Food"),
    ] {
        insert_transaction(
            &conn,
            &NewTransaction {
                user_id: "u1",
                date: date(d),
                amount: dec(amount),
                amount_type: ty,
                category: cat,
                description: "",
                mode: None,
            },
        )
        .unwrap();
    }

    let sub = tx_matches(&[
        "list", "--user", "u1", "--month", "2025-06", "--category", "Food", "--type", "debit",
    ]);
    let (_, list_sub) = sub.subcommand().unwrap();
    let rows = transactions::query_rows(&conn, list_sub).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date, "2025-06-01");
    assert_eq!(rows[0].amount, "10");
}

#[test]
fn list_orders_newest_first_and_honors_limit() {
    let conn = setup();
    for d in ["2025-06-01", "2025-06-05", "2025-06-03"] {
        insert_transaction(
            &conn,
            &NewTransaction {
                user_id: "u1",
                date: date(d),
                amount: dec("1"),
                amount_type: "debit",
                category: "Food",
                description: "",
                mode: None,
            },
        )
        .unwrap();
    }
    let sub = tx_matches(&["list", "--user", "u1", "--limit", "2"]);
    let (_, list_sub) = sub.subcommand().unwrap();
    let rows = transactions::query_rows(&conn, list_sub).unwrap();
    let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["2025-06-05", "2025-06-03"]);
}
