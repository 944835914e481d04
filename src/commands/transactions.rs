// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::profile;
use crate::error::CoreError;
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table, resolve_user};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

pub struct NewTransaction<'a> {
    pub user_id: &'a str,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub amount_type: &'a str,
    pub category: &'a str,
    pub description: &'a str,
    pub mode: Option<&'a str>,
}

/// Appends a ledger entry. Entries are immutable once written; amounts are
/// non-negative with the direction carried by amount_type.
pub fn insert_transaction(conn: &Connection, t: &NewTransaction) -> Result<i64> {
    if t.amount < Decimal::ZERO {
        return Err(CoreError::InvalidInput(format!(
            "transaction amount must be non-negative, got {}",
            t.amount
        ))
        .into());
    }
    conn.execute(
        "INSERT INTO transactions(user_id, date, amount, amount_type, category, description, mode)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            t.user_id,
            t.date.to_string(),
            t.amount.to_string(),
            t.amount_type,
            t.category,
            t.description,
            t.mode
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let amount_type = sub.get_one::<String>("type").unwrap();
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    let description = sub
        .get_one::<String>("description")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let mode = sub.get_one::<String>("mode").map(|s| s.as_str());

    insert_transaction(
        conn,
        &NewTransaction {
            user_id: &user,
            date,
            amount,
            amount_type,
            category: &category,
            description: &description,
            mode,
        },
    )?;
    if let Some(mode) = mode {
        profile::apply_holding_change(conn, &user, mode, amount_type, amount)?;
    }
    println!(
        "Recorded {} of {} in '{}' on {}",
        amount_type, amount, category, date
    );
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub date: String,
    pub amount: String,
    pub amount_type: String,
    pub category: String,
    pub description: String,
    pub mode: String,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.amount.clone(),
                    r.amount_type.clone(),
                    r.category.clone(),
                    r.description.clone(),
                    r.mode.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Amount", "Type", "Category", "Description", "Mode"],
                rows,
            )
        );
    }
    Ok(())
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let user = resolve_user(conn, sub)?;
    let mut sql = String::from(
        "SELECT date, amount, amount_type, category, description, mode \
         FROM transactions WHERE user_id=?",
    );
    let mut params_vec: Vec<String> = vec![user];

    if let Some(month) = sub.get_one::<String>("month") {
        sql.push_str(" AND substr(date,1,7)=?");
        params_vec.push(month.into());
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        sql.push_str(" AND category=?");
        params_vec.push(cat.into());
    }
    if let Some(t) = sub.get_one::<String>("type") {
        sql.push_str(" AND amount_type=?");
        params_vec.push(t.into());
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let mut rows = stmt.query(rusqlite::params_from_iter(params))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let date: String = r.get(0)?;
        let amount: String = r.get(1)?;
        let amount_type: String = r.get(2)?;
        let category: String = r.get(3)?;
        let description: String = r.get(4)?;
        let mode: Option<String> = r.get(5)?;
        data.push(TransactionRow {
            date,
            amount,
            amount_type,
            category,
            description,
            mode: mode.unwrap_or_default(),
        });
    }
    Ok(data)
}
