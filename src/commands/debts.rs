// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::CoreError;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table, resolve_user};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("summary", sub)) => summary(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    if name.is_empty() {
        return Err(CoreError::InvalidInput("debt name is empty".into()).into());
    }
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let rate = parse_decimal(sub.get_one::<String>("interest-rate").unwrap())?;
    let priority = sub.get_one::<String>("priority").unwrap();
    conn.execute(
        "INSERT INTO debts(user_id, name, amount, interest_rate, priority)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user, name, amount.to_string(), rate.to_string(), priority],
    )?;
    println!("Added '{}' to debt records", name);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = resolve_user(conn, sub)?;
    let mut stmt = conn.prepare(
        "SELECT name, amount, interest_rate, priority, created_at
         FROM debts WHERE user_id=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![user], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (n, a, ir, p, c) = row?;
        data.push(vec![n, a, ir, p, c]);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!(
            "{}",
            pretty_table(
                &["Name", "Amount", "Interest (%)", "Priority", "Created"],
                data
            )
        );
    }
    Ok(())
}

/// Total outstanding debt and the amount-weighted average interest rate.
/// Zero debt yields a zero rate.
pub fn debt_summary(conn: &Connection, user_id: &str) -> Result<(Decimal, Decimal)> {
    let mut stmt = conn.prepare("SELECT name, amount, interest_rate FROM debts WHERE user_id=?1")?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut total = Decimal::ZERO;
    let mut weighted = Decimal::ZERO;
    for row in rows {
        let (name, amount_s, rate_s) = row?;
        let amount = parse_decimal(&amount_s)
            .with_context(|| format!("Invalid amount '{}' for debt '{}'", amount_s, name))?;
        let rate = parse_decimal(&rate_s)
            .with_context(|| format!("Invalid interest rate '{}' for debt '{}'", rate_s, name))?;
        total += amount;
        weighted += amount * rate;
    }
    let avg_rate = if total > Decimal::ZERO {
        weighted / total
    } else {
        Decimal::ZERO
    };
    Ok((total, avg_rate))
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let (total, rate) = debt_summary(conn, &user)?;
    let rows = vec![
        vec!["Total Debt".to_string(), format!("{:.2}", total)],
        vec![
            "Weighted Interest (%)".to_string(),
            format!("{:.2}", rate),
        ],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}
