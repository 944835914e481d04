// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::profile::custom_categories;
use crate::utils::{normalize_category, pretty_table, resolve_user, PREDEFINED_CATEGORIES};
use anyhow::Result;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

/// Data hygiene checks: values that slipped past validation (legacy rows,
/// hand-edited databases) and spend that no budget or category list knows
/// about.
pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, m)?;
    let mut rows = Vec::new();

    // 1) Subscriptions whose cost is missing, unparsable, or non-positive
    let mut stmt =
        conn.prepare("SELECT name, cost FROM subscriptions WHERE user_id=?1 ORDER BY id")?;
    let mut cur = stmt.query(params![user])?;
    while let Some(r) = cur.next()? {
        let name: String = r.get(0)?;
        let cost_s: String = r.get(1)?;
        match cost_s.parse::<Decimal>() {
            Ok(c) if c > Decimal::ZERO => {}
            _ => rows.push(vec!["bad_subscription_cost".into(), format!("{} ({})", name, cost_s)]),
        }
    }

    // 2) Debit categories unknown to the predefined list, the user's custom
    //    list, and the budget
    let custom = custom_categories(conn, &user)?;
    let mut known: Vec<String> = PREDEFINED_CATEGORIES
        .iter()
        .map(|c| normalize_category(c))
        .collect();
    known.extend(custom.iter().map(|c| normalize_category(c)));
    known.push("Subscription".to_string());
    let mut bstmt = conn.prepare(
        "SELECT bl.category FROM budget_lines bl JOIN budgets b ON bl.budget_id=b.id
         WHERE b.user_id=?1",
    )?;
    let brows = bstmt.query_map(params![user], |r| r.get::<_, String>(0))?;
    for row in brows {
        known.push(normalize_category(&row?));
    }
    let mut tstmt = conn.prepare(
        "SELECT DISTINCT category FROM transactions WHERE user_id=?1 AND amount_type='debit'",
    )?;
    let trows = tstmt.query_map(params![user], |r| r.get::<_, String>(0))?;
    for row in trows {
        let cat: String = row?;
        if !known.contains(&normalize_category(&cat)) {
            rows.push(vec!["unknown_spend_category".into(), cat]);
        }
    }

    // 3) Negative holdings in the profile
    let prow = conn
        .prepare("SELECT cash_holdings, online_holdings, stock_investments, savings FROM profiles WHERE user_id=?1")?
        .query_row(params![user], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
            ))
        });
    if let Ok((cash, online, stock, savings)) = prow {
        for (label, value) in [
            ("cash_holdings", cash),
            ("online_holdings", online),
            ("stock_investments", stock),
            ("savings", savings),
        ] {
            if let Ok(v) = value.parse::<Decimal>() {
                if v < Decimal::ZERO {
                    rows.push(vec!["negative_holding".into(), format!("{} = {}", label, v)]);
                }
            } else {
                rows.push(vec!["bad_holding_value".into(), format!("{} ({})", label, value)]);
            }
        }
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
