// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.finsight", "Finsight", "finsight"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("finsight.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Amounts are stored as decimal strings; dates as YYYY-MM-DD text. All user
/// data is scoped by user_id.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    -- Ledger entries are immutable once inserted: no update/delete surface.
    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        date TEXT NOT NULL,
        amount TEXT NOT NULL,
        amount_type TEXT NOT NULL CHECK(amount_type IN ('credit','debit')),
        category TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        mode TEXT CHECK(mode IN ('cash','online','stock')),
        subscription_id INTEGER,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);

    CREATE TABLE IF NOT EXISTS subscriptions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        cost TEXT NOT NULL,
        usage TEXT NOT NULL CHECK(usage IN ('Daily','Weekly','Monthly','Occasionally')),
        priority TEXT NOT NULL CHECK(priority IN ('High','Medium','Low')),
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_subscriptions_user ON subscriptions(user_id);

    CREATE TABLE IF NOT EXISTS budgets(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL UNIQUE,
        income TEXT NOT NULL DEFAULT '0',
        savings TEXT NOT NULL DEFAULT '0'
    );

    -- One allocation per category per budget; position keeps the
    -- collection's insertion order for reporting.
    CREATE TABLE IF NOT EXISTS budget_lines(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        budget_id INTEGER NOT NULL,
        category TEXT NOT NULL,
        allocated_amount TEXT NOT NULL DEFAULT '0',
        frequency TEXT NOT NULL DEFAULT 'Monthly' CHECK(frequency IN ('Weekly','Monthly')),
        position INTEGER NOT NULL,
        UNIQUE(budget_id, category),
        FOREIGN KEY(budget_id) REFERENCES budgets(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS debts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        amount TEXT NOT NULL,
        interest_rate TEXT NOT NULL,
        priority TEXT NOT NULL CHECK(priority IN ('High','Medium','Low')),
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_debts_user ON debts(user_id);

    CREATE TABLE IF NOT EXISTS profiles(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL UNIQUE,
        cash_holdings TEXT NOT NULL DEFAULT '0',
        online_holdings TEXT NOT NULL DEFAULT '0',
        stock_investments TEXT NOT NULL DEFAULT '0',
        savings TEXT NOT NULL DEFAULT '0',
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS custom_categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        UNIQUE(user_id, name)
    );
    "#,
    )?;
    Ok(())
}
