// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::CoreError;
use crate::models::Profile;
use crate::utils::{
    maybe_print_json, parse_decimal, pretty_table, resolve_user, set_active_user,
    PREDEFINED_CATEGORIES,
};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("init", sub)) => init(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("use", sub)) => {
            let user = sub.get_one::<String>("user_id").unwrap().trim().to_string();
            set_active_user(conn, &user)?;
            println!("Active user set to '{}'", user);
        }
        Some(("category", sub)) => category(conn, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn ensure_profile(conn: &Connection, user_id: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO profiles(user_id) VALUES (?1) ON CONFLICT(user_id) DO NOTHING",
        params![user_id],
    )?;
    Ok(())
}

pub fn get_profile(conn: &Connection, user_id: &str) -> Result<Option<Profile>> {
    let row = conn
        .query_row(
            "SELECT cash_holdings, online_holdings, stock_investments, savings
             FROM profiles WHERE user_id=?1",
            params![user_id],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;
    match row {
        Some((cash, online, stock, savings)) => Ok(Some(Profile {
            user_id: user_id.to_string(),
            cash_holdings: parse_decimal(&cash)?,
            online_holdings: parse_decimal(&online)?,
            stock_investments: parse_decimal(&stock)?,
            savings: parse_decimal(&savings)?,
        })),
        None => Ok(None),
    }
}

/// Moves a holding when a transaction carries a mode: credits add to the
/// matching holding, debits subtract from it.
pub fn apply_holding_change(
    conn: &Connection,
    user_id: &str,
    mode: &str,
    amount_type: &str,
    amount: Decimal,
) -> Result<()> {
    let column = match mode {
        "cash" => "cash_holdings",
        "online" => "online_holdings",
        "stock" => "stock_investments",
        other => {
            return Err(CoreError::InvalidInput(format!(
                "unknown transaction mode '{}'",
                other
            ))
            .into())
        }
    };
    let delta = match amount_type {
        "credit" => amount,
        "debit" => -amount,
        other => {
            return Err(
                CoreError::InvalidInput(format!("unknown amount type '{}'", other)).into(),
            )
        }
    };
    ensure_profile(conn, user_id)?;
    let current: String = conn.query_row(
        &format!("SELECT {} FROM profiles WHERE user_id=?1", column),
        params![user_id],
        |r| r.get(0),
    )?;
    let new_value = parse_decimal(&current)
        .with_context(|| format!("Invalid {} '{}' in profile", column, current))?
        + delta;
    conn.execute(
        &format!("UPDATE profiles SET {}=?1 WHERE user_id=?2", column),
        params![new_value.to_string(), user_id],
    )?;
    Ok(())
}

fn init(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let cash = parse_decimal(sub.get_one::<String>("cash").unwrap())?;
    let online = parse_decimal(sub.get_one::<String>("online").unwrap())?;
    let stocks = parse_decimal(sub.get_one::<String>("stocks").unwrap())?;
    let savings = parse_decimal(sub.get_one::<String>("savings").unwrap())?;
    conn.execute(
        "INSERT INTO profiles(user_id, cash_holdings, online_holdings, stock_investments, savings)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id) DO UPDATE SET
             cash_holdings=excluded.cash_holdings,
             online_holdings=excluded.online_holdings,
             stock_investments=excluded.stock_investments,
             savings=excluded.savings",
        params![
            user,
            cash.to_string(),
            online.to_string(),
            stocks.to_string(),
            savings.to_string()
        ],
    )?;
    println!("Profile saved for '{}'", user);
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let user = resolve_user(conn, sub)?;
    let Some(p) = get_profile(conn, &user)? else {
        println!("No profile found for '{}'", user);
        return Ok(());
    };
    if json_flag {
        println!("{}", serde_json::to_string_pretty(&p)?);
        return Ok(());
    }
    let rows = vec![
        vec!["Cash Holdings".to_string(), format!("{:.2}", p.cash_holdings)],
        vec![
            "Online Holdings".to_string(),
            format!("{:.2}", p.online_holdings),
        ],
        vec![
            "Stock Investments".to_string(),
            format!("{:.2}", p.stock_investments),
        ],
        vec!["Savings".to_string(), format!("{:.2}", p.savings)],
        vec![
            "Total Savings".to_string(),
            format!("{:.2}", p.total_savings()),
        ],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}

pub fn custom_categories(conn: &Connection, user_id: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT name FROM custom_categories WHERE user_id=?1 ORDER BY name")?;
    let rows = stmt.query_map(params![user_id], |r| r.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn category(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let user = resolve_user(conn, sub)?;
            let name = sub.get_one::<String>("name").unwrap().trim().to_string();
            if name.is_empty() {
                return Err(CoreError::InvalidInput("category name is empty".into()).into());
            }
            let changed = conn.execute(
                "INSERT OR IGNORE INTO custom_categories(user_id, name) VALUES (?1, ?2)",
                params![user, name],
            )?;
            if changed == 0 {
                println!("Category '{}' already exists", name);
            } else {
                println!("Added category '{}'", name);
            }
        }
        Some(("list", sub)) => {
            let json_flag = sub.get_flag("json");
            let jsonl_flag = sub.get_flag("jsonl");
            let user = resolve_user(conn, sub)?;
            let custom = custom_categories(conn, &user)?;
            let mut all: Vec<(String, String)> = PREDEFINED_CATEGORIES
                .iter()
                .map(|c| (c.to_string(), "predefined".to_string()))
                .collect();
            all.extend(custom.into_iter().map(|c| (c, "custom".to_string())));
            if !maybe_print_json(json_flag, jsonl_flag, &all)? {
                let rows = all.into_iter().map(|(c, k)| vec![c, k]).collect();
                println!("{}", pretty_table(&["Category", "Kind"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
