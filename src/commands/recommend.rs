// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::debts::debt_summary;
use crate::llm::{self, LlmClient, Recommendation};
use crate::utils::{month_window, parse_decimal, pretty_table, resolve_user};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::BTreeMap;

/// Categories treated as fixed monthly commitments vs discretionary spend
/// when summarizing the month for the recommender.
const ESSENTIAL_CATEGORIES: &[&str] = &["Rent", "Utilities", "Healthcare"];
const VARIABLE_CATEGORIES: &[&str] = &["Dining", "Shopping", "Entertainment"];

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let user = resolve_user(conn, m)?;
    let month = match m.get_one::<String>("month") {
        Some(s) => crate::utils::parse_month(s.trim())?,
        None => chrono::Utc::now().format("%Y-%m").to_string(),
    };

    let summary = preprocess(conn, &user, &month)?;
    let client = LlmClient::from_env()?;
    let reply = client.complete(
        llm::RECOMMEND_PROMPT,
        &serde_json::to_string_pretty(&summary)?,
        0.7,
    )?;
    let rec: Recommendation = llm::parse_reply(&reply)?;

    if json_flag {
        println!("{}", serde_json::to_string_pretty(&rec)?);
        return Ok(());
    }
    println!("Recommendations:");
    for r in &rec.recommendations {
        println!("  - {}", r);
    }
    println!("Action items:");
    for a in &rec.action_items {
        println!("  - {}", a);
    }
    let rows = vec![
        vec!["Debt".to_string(), rec.risk_assessment.debt_risk.clone()],
        vec![
            "Savings".to_string(),
            rec.risk_assessment.savings_risk.clone(),
        ],
        vec![
            "Subscriptions".to_string(),
            rec.risk_assessment.subscription_risk.clone(),
        ],
    ];
    println!("{}", pretty_table(&["Risk", "Assessment"], rows));
    Ok(())
}

/// Aggregates one month of a user's finances into the JSON summary the
/// recommender prompt expects: income, fixed and variable expenses,
/// subscription load, debt exposure, the budget document, and three months
/// of income/expense trend.
pub fn preprocess(conn: &Connection, user_id: &str, month: &str) -> Result<serde_json::Value> {
    let (start, end) = month_window(month)?;

    let mut total_income = Decimal::ZERO;
    let mut fixed_expenses = Decimal::ZERO;
    let mut variable: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut stmt = conn.prepare(
        "SELECT amount, amount_type, category FROM transactions
         WHERE user_id=?1 AND date>=?2 AND date<?3",
    )?;
    let mut cur = stmt.query(params![user_id, start.to_string(), end.to_string()])?;
    while let Some(r) = cur.next()? {
        let amount_s: String = r.get(0)?;
        let kind: String = r.get(1)?;
        let category: String = r.get(2)?;
        let amount = parse_decimal(&amount_s)
            .with_context(|| format!("Invalid amount '{}' in transactions", amount_s))?;
        if kind == "credit" {
            total_income += amount;
        }
        if ESSENTIAL_CATEGORIES.contains(&category.as_str()) {
            fixed_expenses += amount;
        }
        if VARIABLE_CATEGORIES.contains(&category.as_str()) {
            *variable.entry(category).or_insert(Decimal::ZERO) += amount;
        }
    }

    let mut subs = Vec::new();
    let mut total_subscription_cost = Decimal::ZERO;
    let mut sstmt = conn.prepare(
        "SELECT name, cost, usage, priority FROM subscriptions WHERE user_id=?1 ORDER BY id",
    )?;
    let mut scur = sstmt.query(params![user_id])?;
    while let Some(r) = scur.next()? {
        let name: String = r.get(0)?;
        let cost_s: String = r.get(1)?;
        let usage: String = r.get(2)?;
        let priority: String = r.get(3)?;
        let cost = parse_decimal(&cost_s)
            .with_context(|| format!("Invalid cost '{}' for subscription '{}'", cost_s, name))?;
        total_subscription_cost += cost;
        subs.push(json!({
            "name": name, "cost": cost, "usage": usage, "priority": priority
        }));
    }

    let mut debts = Vec::new();
    let mut dstmt = conn.prepare(
        "SELECT name, amount, interest_rate, priority FROM debts WHERE user_id=?1 ORDER BY id",
    )?;
    let mut dcur = dstmt.query(params![user_id])?;
    while let Some(r) = dcur.next()? {
        let name: String = r.get(0)?;
        let amount: String = r.get(1)?;
        let rate: String = r.get(2)?;
        let priority: String = r.get(3)?;
        debts.push(json!({
            "name": name, "amount": amount, "interest_rate": rate, "priority": priority
        }));
    }
    let (total_debt, weighted_rate) = debt_summary(conn, user_id)?;

    let budget = conn
        .query_row(
            "SELECT id, income, savings FROM budgets WHERE user_id=?1",
            params![user_id],
            |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;
    let budget_json = match budget {
        Some((budget_id, income, savings)) => {
            let mut lstmt = conn.prepare(
                "SELECT category, allocated_amount, frequency FROM budget_lines
                 WHERE budget_id=?1 ORDER BY position",
            )?;
            let mut lines = Vec::new();
            let mut lcur = lstmt.query(params![budget_id])?;
            while let Some(r) = lcur.next()? {
                lines.push(json!({
                    "category": r.get::<_, String>(0)?,
                    "allocated_amount": r.get::<_, String>(1)?,
                    "frequency": r.get::<_, String>(2)?,
                }));
            }
            json!({ "income": income, "savings": savings, "expenses": lines })
        }
        None => json!({ "income": 0, "savings": 0, "expenses": [] }),
    };

    Ok(json!({
        "financial_summary": {
            "total_income": total_income,
            "fixed_expenses": fixed_expenses,
            "variable_expenses": variable,
            "total_subscription_cost": total_subscription_cost,
            "total_debt": total_debt,
            "weighted_interest_rate": weighted_rate,
            "budget": budget_json,
        },
        "subscriptions": subs,
        "debts": debts,
        "monthly_trends": {
            "income_trend": trend(conn, user_id, "credit")?,
            "expense_trend": trend(conn, user_id, "debit")?,
        },
    }))
}

/// Totals for the three most recent months carrying the given amount type.
fn trend(conn: &Connection, user_id: &str, amount_type: &str) -> Result<serde_json::Value> {
    let mut stmt = conn.prepare(
        "SELECT substr(date,1,7) AS month, amount FROM transactions
         WHERE user_id=?1 AND amount_type=?2",
    )?;
    let mut cur = stmt.query(params![user_id, amount_type])?;
    let mut map: BTreeMap<String, Decimal> = BTreeMap::new();
    while let Some(r) = cur.next()? {
        let month: String = r.get(0)?;
        let amount_s: String = r.get(1)?;
        let amount = parse_decimal(&amount_s)
            .with_context(|| format!("Invalid amount '{}' in transactions", amount_s))?;
        *map.entry(month).or_insert(Decimal::ZERO) += amount;
    }
    let points: Vec<serde_json::Value> = map
        .iter()
        .rev()
        .take(3)
        .map(|(m, total)| json!({ "month": m, "total": total }))
        .collect();
    Ok(json!(points))
}
