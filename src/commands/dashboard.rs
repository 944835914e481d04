// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::profile;
use crate::utils::{
    maybe_print_json, normalize_category, parse_decimal, pretty_table, resolve_user,
};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("categories", sub)) => spend_by_category(conn, sub)?,
        Some(("cashflow", sub)) => cashflow(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Overall income, expenses, and net savings across the whole ledger,
/// alongside the profile's holdings.
fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = resolve_user(conn, sub)?;

    let mut total_income = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;
    let mut stmt = conn.prepare(
        "SELECT amount, amount_type FROM transactions WHERE user_id=?1",
    )?;
    let mut cur = stmt.query(params![user])?;
    while let Some(r) = cur.next()? {
        let amount_s: String = r.get(0)?;
        let kind: String = r.get(1)?;
        let amount = parse_decimal(&amount_s)
            .with_context(|| format!("Invalid amount '{}' in transactions", amount_s))?;
        if kind == "credit" {
            total_income += amount;
        } else {
            total_expense += amount;
        }
    }

    let mut data = vec![
        vec!["Total Income".to_string(), format!("{:.2}", total_income)],
        vec!["Total Expenses".to_string(), format!("{:.2}", total_expense)],
        vec![
            "Net Savings".to_string(),
            format!("{:.2}", total_income - total_expense),
        ],
    ];
    if let Some(p) = profile::get_profile(conn, &user)? {
        data.push(vec![
            "Cash Holdings".to_string(),
            format!("{:.2}", p.cash_holdings),
        ]);
        data.push(vec![
            "Online Holdings".to_string(),
            format!("{:.2}", p.online_holdings),
        ]);
        data.push(vec![
            "Stock Investments".to_string(),
            format!("{:.2}", p.stock_investments),
        ]);
        data.push(vec![
            "Total Savings".to_string(),
            format!("{:.2}", p.total_savings()),
        ]);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!("{}", pretty_table(&["Metric", "Value"], data));
    }
    Ok(())
}

/// Debit totals per normalized category, largest first. Optionally limited
/// to one month.
fn spend_by_category(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = resolve_user(conn, sub)?;

    let mut sql = String::from(
        "SELECT category, amount FROM transactions
         WHERE user_id=? AND amount_type='debit'",
    );
    let mut params_vec: Vec<String> = vec![user];
    if let Some(month) = sub.get_one::<String>("month") {
        sql.push_str(" AND substr(date,1,7)=?");
        params_vec.push(month.into());
    }

    let mut stmt = conn.prepare(&sql)?;
    let bind: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let mut cur = stmt.query(rusqlite::params_from_iter(bind))?;

    use std::collections::HashMap;
    let mut agg: HashMap<String, Decimal> = HashMap::new();
    while let Some(r) = cur.next()? {
        let raw: String = r.get(0)?;
        let amount_s: String = r.get(1)?;
        let amount = parse_decimal(&amount_s)
            .with_context(|| format!("Invalid amount '{}' in transactions", amount_s))?
            .abs();
        *agg.entry(normalize_category(&raw)).or_insert(Decimal::ZERO) += amount;
    }
    let mut items: Vec<_> = agg.into_iter().collect();
    items.sort_by(|a, b| b.1.cmp(&a.1));
    let data: Vec<Vec<String>> = items
        .into_iter()
        .map(|(c, a)| vec![c, format!("{:.2}", a)])
        .collect();
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!("{}", pretty_table(&["Category", "Spent"], data));
    }
    Ok(())
}

/// Income vs expenses per month, most recent months first.
fn cashflow(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = resolve_user(conn, sub)?;
    let months: usize = *sub.get_one::<usize>("months").unwrap_or(&12);

    let mut stmt = conn.prepare(
        "SELECT substr(date,1,7) AS month, amount, amount_type
         FROM transactions WHERE user_id=?1 ORDER BY date DESC",
    )?;
    let mut cur = stmt.query(params![user])?;

    use std::collections::BTreeMap;
    let mut map: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    while let Some(r) = cur.next()? {
        let month: String = r.get(0)?;
        let amount_s: String = r.get(1)?;
        let kind: String = r.get(2)?;
        let amount = parse_decimal(&amount_s)
            .with_context(|| format!("Invalid amount '{}' in transactions", amount_s))?;
        let entry = map.entry(month).or_insert((Decimal::ZERO, Decimal::ZERO));
        if kind == "credit" {
            entry.0 += amount;
        } else {
            entry.1 += amount;
        }
    }
    let mut data = Vec::new();
    for (m, (inc, exp)) in map.iter().rev().take(months) {
        data.push(vec![
            m.clone(),
            format!("{:.2}", inc),
            format!("{:.2}", exp),
        ]);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!("{}", pretty_table(&["Month", "Income", "Expense"], data));
    }
    Ok(())
}
