// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

const UA: &str = concat!("finsight/", env!("CARGO_PKG_VERSION"));

/// Categories offered to every user before any custom ones are added.
pub const PREDEFINED_CATEGORIES: &[&str] = &[
    "Food",
    "Travel",
    "Rent",
    "Salary",
    "Shopping",
    "Healthcare",
    "Utilities",
    "Miscellaneous",
    "Savings",
];

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<String> {
    chrono::NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Billing window for a calendar month: first day inclusive, first day of the
/// following month exclusive. December wraps to January of the next year.
pub fn month_window(month: &str) -> Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", month))?;
    Ok((start, next_month_start(start)))
}

/// Same window, anchored on an arbitrary date inside the month.
pub fn window_for(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .expect("first of month is always valid");
    (start, next_month_start(start))
}

fn next_month_start(start: NaiveDate) -> NaiveDate {
    let (y, m) = if start.month() == 12 {
        (start.year() + 1, 1)
    } else {
        (start.year(), start.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1).expect("first of month is always valid")
}

/// Canonical casing for transaction categories: surrounding whitespace
/// trimmed, first character uppercased, the rest lowercased. " food", "FOOD"
/// and "Food" all group under "Food".
pub fn normalize_category(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

// Active user: every row in the store is scoped by user_id; the CLI defaults
// to whichever user was last selected with `profile use`.
pub fn get_active_user(conn: &Connection) -> Result<String> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='active_user'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v.unwrap_or_else(|| "default".to_string()))
}

pub fn set_active_user(conn: &Connection, user_id: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('active_user', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![user_id],
    )?;
    Ok(())
}

/// The user a subcommand operates on: an explicit `--user` wins, otherwise
/// the stored active user.
pub fn resolve_user(conn: &Connection, m: &clap::ArgMatches) -> Result<String> {
    if let Some(u) = m.get_one::<String>("user") {
        return Ok(u.trim().to_string());
    }
    get_active_user(conn)
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
