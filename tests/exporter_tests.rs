// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finsight::cli;
use finsight::commands::exporter;
use rusqlite::Connection;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    finsight::db::init_schema(&conn).unwrap();
    conn
}

fn seed(conn: &Connection) {
    conn.execute_batch(
        "INSERT INTO transactions(user_id, date, amount, amount_type, category, description, mode)
         VALUES ('u1', '2025-06-01', '100', 'debit', 'Food', 'lunch', 'cash');
         INSERT INTO transactions(user_id, date, amount, amount_type, category, description)
         VALUES ('u1', '2025-06-02', '5000', 'credit', 'Salary', 'payday');
         INSERT INTO transactions(user_id, date, amount, amount_type, category, description)
         VALUES ('u2', '2025-06-03', '42', 'debit', 'Travel', 'bus');",
    )
    .unwrap();
}

fn export_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["finsight", "export"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let (_, sub) = matches.subcommand().unwrap();
    sub.clone()
}

#[test]
fn csv_export_writes_header_and_user_rows_only() {
    let conn = setup();
    seed(&conn);
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("tx.csv");
    let out_s = out.to_str().unwrap();

    let sub = export_matches(&["transactions", "--user", "u1", "--out", out_s]);
    exporter::handle(&conn, &sub).unwrap();

    let content = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "date,amount,amount_type,category,description,mode");
    assert_eq!(lines[1], "2025-06-01,100,debit,Food,lunch,cash");
    assert_eq!(lines[2], "2025-06-02,5000,credit,Salary,payday,");
    assert!(!content.contains("u2"));
    assert!(!content.contains("Travel"));
}

#[test]
fn json_export_writes_an_array_of_objects() {
    let conn = setup();
    seed(&conn);
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("tx.json");
    let out_s = out.to_str().unwrap();

    let sub = export_matches(&[
        "transactions", "--user", "u1", "--format", "json", "--out", out_s,
    ]);
    exporter::handle(&conn, &sub).unwrap();

    let content = std::fs::read_to_string(&out).unwrap();
    let items: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["date"], "2025-06-01");
    assert_eq!(items[0]["amount"], "100");
    assert_eq!(items[0]["mode"], "cash");
    assert_eq!(items[1]["category"], "Salary");
    assert!(items[1]["mode"].is_null());
}
