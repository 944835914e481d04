// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::llm::{self, BudgetDraft, LlmClient};
use crate::models::CategoryStatus;
use crate::utils::{
    maybe_print_json, month_window, normalize_category, parse_decimal, parse_month, pretty_table,
    resolve_user,
};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::collections::HashMap;

pub const OVER_BUDGET: &str = "Over Budget";
pub const WITHIN_BUDGET: &str = "Within Budget";

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-income", sub)) => set_income(conn, sub)?,
        Some(("set-savings", sub)) => set_savings(conn, sub)?,
        Some(("allocate", sub)) => allocate(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("report", sub)) => report(conn, sub)?,
        Some(("parse", sub)) => parse(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Budget documents are created lazily with zero income/savings and no
/// allocation lines. Returns the budget row id.
pub fn ensure_budget(conn: &Connection, user_id: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO budgets(user_id, income, savings) VALUES (?1, '0', '0')
         ON CONFLICT(user_id) DO NOTHING",
        params![user_id],
    )?;
    let id: i64 = conn.query_row(
        "SELECT id FROM budgets WHERE user_id=?1",
        params![user_id],
        |r| r.get(0),
    )?;
    Ok(id)
}

/// One allocation per category per budget: updates the line in place when the
/// category exists, appends it at the end otherwise. The whole upsert is a
/// single conditional INSERT so concurrent calls cannot produce duplicates.
pub fn upsert_allocation(
    conn: &Connection,
    user_id: &str,
    category: &str,
    amount: Decimal,
    frequency: &str,
) -> Result<()> {
    let budget_id = ensure_budget(conn, user_id)?;
    conn.execute(
        "INSERT INTO budget_lines(budget_id, category, allocated_amount, frequency, position)
         VALUES (?1, ?2, ?3, ?4,
                 (SELECT IFNULL(MAX(position), 0) + 1 FROM budget_lines WHERE budget_id=?1))
         ON CONFLICT(budget_id, category) DO UPDATE SET
             allocated_amount=excluded.allocated_amount,
             frequency=excluded.frequency",
        params![budget_id, category, amount.to_string(), frequency],
    )?;
    Ok(())
}

/// Budget-vs-spend reconciliation for one calendar month. Allocation rows
/// come first in their stored order, then spend-only categories in first-seen
/// order; the side missing from the join defaults to zero.
pub fn reconcile(conn: &Connection, user_id: &str, month: &str) -> Result<Vec<CategoryStatus>> {
    let (start, end) = month_window(month)?;

    let mut allocations: Vec<(String, Decimal)> = Vec::new();
    let mut stmt = conn.prepare(
        "SELECT bl.category, bl.allocated_amount
         FROM budget_lines bl JOIN budgets b ON bl.budget_id=b.id
         WHERE b.user_id=?1 ORDER BY bl.position",
    )?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
    })?;
    for row in rows {
        let (category, amount_s) = row?;
        let amount = parse_decimal(&amount_s)
            .with_context(|| format!("Invalid allocation '{}' for {}", amount_s, category))?;
        allocations.push((category, amount));
    }

    // Spend per normalized category, retaining first-seen order for the
    // categories that have no allocation.
    let mut spent: HashMap<String, Decimal> = HashMap::new();
    let mut spend_order: Vec<String> = Vec::new();
    let mut tstmt = conn.prepare(
        "SELECT category, amount FROM transactions
         WHERE user_id=?1 AND amount_type='debit' AND date>=?2 AND date<?3
         ORDER BY date, id",
    )?;
    let mut cur = tstmt.query(params![user_id, start.to_string(), end.to_string()])?;
    while let Some(r) = cur.next()? {
        let raw_category: String = r.get(0)?;
        let amount_s: String = r.get(1)?;
        let amount = parse_decimal(&amount_s)
            .with_context(|| format!("Invalid amount '{}' in transactions", amount_s))?
            .abs();
        let key = normalize_category(&raw_category);
        if !spent.contains_key(&key) {
            spend_order.push(key.clone());
        }
        *spent.entry(key).or_insert(Decimal::ZERO) += amount;
    }

    let mut out = Vec::new();
    let mut consumed: Vec<String> = Vec::new();
    for (category, allocated) in allocations {
        let key = normalize_category(&category);
        let actual = spent.get(&key).copied().unwrap_or(Decimal::ZERO);
        consumed.push(key);
        out.push(status_row(category, allocated, actual));
    }
    for key in spend_order {
        if consumed.contains(&key) {
            continue;
        }
        let actual = spent.get(&key).copied().unwrap_or(Decimal::ZERO);
        out.push(status_row(key, Decimal::ZERO, actual));
    }
    Ok(out)
}

fn status_row(category: String, allocated: Decimal, actual: Decimal) -> CategoryStatus {
    let remaining = allocated - actual;
    let status = if remaining < Decimal::ZERO {
        OVER_BUDGET
    } else {
        WITHIN_BUDGET
    };
    CategoryStatus {
        category,
        allocated_amount: allocated,
        actual_spent: actual,
        remaining,
        status: status.to_string(),
    }
}

fn set_income(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    ensure_budget(conn, &user)?;
    conn.execute(
        "UPDATE budgets SET income=?1 WHERE user_id=?2",
        params![amount.to_string(), user],
    )?;
    println!("Income set to {}", amount);
    Ok(())
}

fn set_savings(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    ensure_budget(conn, &user)?;
    conn.execute(
        "UPDATE budgets SET savings=?1 WHERE user_id=?2",
        params![amount.to_string(), user],
    )?;
    println!("Savings goal set to {}", amount);
    Ok(())
}

fn allocate(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let frequency = sub.get_one::<String>("frequency").unwrap();
    upsert_allocation(conn, &user, &category, amount, frequency)?;
    println!("Budget for {} set to {} ({})", category, amount, frequency);
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = resolve_user(conn, sub)?;
    let doc: Option<(String, String, i64)> = conn
        .query_row(
            "SELECT income, savings, id FROM budgets WHERE user_id=?1",
            params![user],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    let Some((income, savings, budget_id)) = doc else {
        println!("No budget yet for '{}'", user);
        return Ok(());
    };
    let mut stmt = conn.prepare(
        "SELECT category, allocated_amount, frequency FROM budget_lines
         WHERE budget_id=?1 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![budget_id], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (c, a, f) = row?;
        data.push(vec![c, a, f]);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!("Income: {}  Savings goal: {}", income, savings);
        println!(
            "{}",
            pretty_table(&["Category", "Allocated", "Frequency"], data)
        );
    }
    Ok(())
}

fn report(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let user = resolve_user(conn, sub)?;
    let month = parse_month(sub.get_one::<String>("month").unwrap().trim())?;
    let rows = reconcile(conn, &user, &month)?;
    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        let data = rows
            .into_iter()
            .map(|r| {
                vec![
                    r.category,
                    format!("{:.2}", r.allocated_amount),
                    format!("{:.2}", r.actual_spent),
                    format!("{:.2}", r.remaining),
                    r.status,
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Category", "Allocated", "Spent", "Remaining", "Status"],
                data
            )
        );
    }
    Ok(())
}

fn parse(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let text = match sub.get_one::<String>("file") {
        Some(path) => std::fs::read_to_string(path.trim())
            .with_context(|| format!("Read budget description {}", path))?,
        None => sub.get_one::<String>("text").unwrap().to_string(),
    };
    let client = LlmClient::from_env()?;
    let reply = client.complete(llm::BUDGET_PROMPT, &text, 0.7)?;
    let draft: BudgetDraft = llm::parse_reply(&reply)?;
    save_draft(conn, &user, &draft)?;
    println!(
        "Parsed budget: income {}, savings {}, {} allocation(s)",
        draft.income,
        draft.savings,
        draft.expenses.len()
    );
    Ok(())
}

pub fn save_draft(conn: &Connection, user_id: &str, draft: &BudgetDraft) -> Result<()> {
    ensure_budget(conn, user_id)?;
    conn.execute(
        "UPDATE budgets SET income=?1, savings=?2 WHERE user_id=?3",
        params![draft.income.to_string(), draft.savings.to_string(), user_id],
    )?;
    for line in &draft.expenses {
        upsert_allocation(
            conn,
            user_id,
            line.category.trim(),
            line.allocated_amount,
            "Monthly",
        )?;
    }
    Ok(())
}
