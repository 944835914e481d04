// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::CoreError;
use crate::utils::{
    maybe_print_json, parse_date, parse_decimal, pretty_table, resolve_user, window_for,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("cancel", sub)) => cancel(conn, sub)?,
        Some(("materialize", sub)) => materialize(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// How a materialized charge is recognized on re-runs. `Description` is the
/// historical behavior: keyed on the literal marker string, so renaming a
/// subscription mid-month produces a second charge. `SubscriptionId` keys on
/// the stable row id instead and survives renames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeBy {
    Description,
    SubscriptionId,
}

impl FromStr for DedupeBy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "description" => Ok(DedupeBy::Description),
            "subscription-id" => Ok(DedupeBy::SubscriptionId),
            other => Err(CoreError::InvalidInput(format!(
                "unknown dedupe mode '{}' (use description|subscription-id)",
                other
            ))
            .into()),
        }
    }
}

/// Ensures exactly one debit charge per subscription exists inside the
/// billing window containing `as_of`. The existence check and the insert are
/// a single conditional INSERT, so re-runs (and concurrent runs against the
/// same store) cannot double-charge within one window. Returns the number of
/// charges written.
pub fn materialize_recurring_charges(
    conn: &Connection,
    user_id: &str,
    as_of: NaiveDate,
    dedupe: DedupeBy,
) -> Result<usize> {
    let (start, end) = window_for(as_of);

    let mut stmt =
        conn.prepare("SELECT id, name, cost FROM subscriptions WHERE user_id=?1 ORDER BY id")?;
    let subs = stmt.query_map(params![user_id], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;

    let mut inserted = 0usize;
    for row in subs {
        let (sub_id, name, cost_s) = row?;
        let cost = cost_s.parse::<Decimal>().map_err(|_| {
            CoreError::InvalidInput(format!("subscription '{}' has invalid cost '{}'", name, cost_s))
        })?;
        if cost <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(format!(
                "subscription '{}' has non-positive cost {}",
                name, cost
            ))
            .into());
        }
        let description = format!("Subscription: {}", name);

        let sql = match dedupe {
            DedupeBy::Description => {
                "INSERT INTO transactions(user_id, date, amount, amount_type, category, description, subscription_id)
                 SELECT ?1, ?2, ?3, 'debit', 'Subscription', ?4, ?5
                 WHERE NOT EXISTS (
                     SELECT 1 FROM transactions
                     WHERE user_id=?1 AND amount_type='debit' AND description=?4
                       AND date>=?6 AND date<?7
                 )"
            }
            DedupeBy::SubscriptionId => {
                "INSERT INTO transactions(user_id, date, amount, amount_type, category, description, subscription_id)
                 SELECT ?1, ?2, ?3, 'debit', 'Subscription', ?4, ?5
                 WHERE NOT EXISTS (
                     SELECT 1 FROM transactions
                     WHERE user_id=?1 AND amount_type='debit' AND subscription_id=?5
                       AND date>=?6 AND date<?7
                 )"
            }
        };
        inserted += conn.execute(
            sql,
            params![
                user_id,
                as_of.to_string(),
                cost.to_string(),
                description,
                sub_id,
                start.to_string(),
                end.to_string()
            ],
        )?;
    }
    Ok(inserted)
}

fn materialize(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let as_of = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => chrono::Utc::now().date_naive(),
    };
    let dedupe = sub
        .get_one::<String>("dedupe-by")
        .map(|s| DedupeBy::from_str(s))
        .transpose()?
        .unwrap_or(DedupeBy::Description);
    let n = materialize_recurring_charges(conn, &user, as_of, dedupe)?;
    println!("Materialized {} subscription charge(s) for {}", n, as_of);
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let cost = parse_decimal(sub.get_one::<String>("cost").unwrap())?;
    if cost <= Decimal::ZERO {
        return Err(CoreError::InvalidInput(format!(
            "subscription cost must be positive, got {}",
            cost
        ))
        .into());
    }
    let usage = sub.get_one::<String>("usage").unwrap();
    let priority = sub.get_one::<String>("priority").unwrap();
    conn.execute(
        "INSERT INTO subscriptions(user_id, name, cost, usage, priority)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user, name, cost.to_string(), usage, priority],
    )?;
    println!("Subscription to '{}' added ({} / {})", name, cost, usage);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = resolve_user(conn, sub)?;
    let mut stmt = conn.prepare(
        "SELECT id, name, cost, usage, priority, created_at
         FROM subscriptions WHERE user_id=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![user], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (id, name, cost, usage, priority, created) = row?;
        data.push(vec![id.to_string(), name, cost, usage, priority, created]);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!(
            "{}",
            pretty_table(
                &["Id", "Name", "Cost", "Usage", "Priority", "Created"],
                data
            )
        );
    }
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let cost = sub
        .get_one::<String>("cost")
        .map(|s| parse_decimal(s))
        .transpose()?;
    if let Some(c) = cost {
        if c <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(format!(
                "subscription cost must be positive, got {}",
                c
            ))
            .into());
        }
    }
    let usage = sub.get_one::<String>("usage");
    let priority = sub.get_one::<String>("priority");
    let changed = conn
        .execute(
            "UPDATE subscriptions SET
                 cost=COALESCE(?1, cost),
                 usage=COALESCE(?2, usage),
                 priority=COALESCE(?3, priority)
             WHERE id=?4 AND user_id=?5",
            params![cost.map(|c| c.to_string()), usage, priority, id, user],
        )
        .with_context(|| format!("Update subscription {}", id))?;
    if changed == 0 {
        println!("No subscription {} for '{}'", id, user);
    } else {
        println!("Subscription {} updated", id);
    }
    Ok(())
}

fn cancel(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let changed = conn.execute(
        "DELETE FROM subscriptions WHERE id=?1 AND user_id=?2",
        params![id, user],
    )?;
    if changed == 0 {
        println!("No subscription {} for '{}'", id, user);
    } else {
        println!("Subscription {} cancelled", id);
    }
    Ok(())
}
