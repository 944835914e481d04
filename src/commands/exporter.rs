// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::resolve_user;
use anyhow::Result;
use rusqlite::{params, Connection};
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut stmt = conn.prepare(
        "SELECT date, amount, amount_type, category, description, mode
         FROM transactions WHERE user_id=?1 ORDER BY date, id",
    )?;
    let rows = stmt.query_map(params![user], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, Option<String>>(5)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date",
                "amount",
                "amount_type",
                "category",
                "description",
                "mode",
            ])?;
            for row in rows {
                let (d, amt, ty, cat, desc, mode) = row?;
                wtr.write_record([d, amt, ty, cat, desc, mode.unwrap_or_default()])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let (d, amt, ty, cat, desc, mode) = row?;
                items.push(json!({
                    "date": d, "amount": amt, "amount_type": ty,
                    "category": cat, "description": desc, "mode": mode
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
        }
    }
    println!("Exported transactions to {}", out);
    Ok(())
}
