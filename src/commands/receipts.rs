// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Receipt ingestion. OCR happens upstream; this command takes the extracted
//! plain text, asks the LLM for the line items, and records one debit per
//! product.

use crate::commands::transactions::{insert_transaction, NewTransaction};
use crate::llm::{self, LlmClient, ReceiptItems};
use crate::utils::{parse_date, pretty_table, resolve_user};
use anyhow::{Context, Result};
use std::io::Read;

pub fn handle(conn: &rusqlite::Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("import", sub)) => import(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn import(conn: &rusqlite::Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = resolve_user(conn, sub)?;
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    let path = sub.get_one::<String>("file").unwrap();
    let text = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Read receipt text from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path.trim())
            .with_context(|| format!("Read receipt text {}", path))?
    };

    let client = LlmClient::from_env()?;
    let reply = client.complete(llm::RECEIPT_PROMPT, &text, 0.0)?;
    let items: ReceiptItems = llm::parse_reply(&reply)?;

    let mut rows = Vec::new();
    for product in &items.products {
        insert_transaction(
            conn,
            &NewTransaction {
                user_id: &user,
                date,
                amount: product.price,
                amount_type: "debit",
                category: &category,
                description: &product.name,
                mode: None,
            },
        )?;
        rows.push(vec![product.name.clone(), format!("{:.2}", product.price)]);
    }
    println!("{}", pretty_table(&["Item", "Price"], rows));
    println!(
        "Recorded {} item(s) under '{}' on {}",
        items.products.len(),
        category,
        date
    );
    Ok(())
}
