// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use finsight::{cli, commands, db};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("tx", sub)) => commands::transactions::handle(&conn, sub)?,
        Some(("subscription", sub)) => commands::subscriptions::handle(&conn, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&conn, sub)?,
        Some(("debt", sub)) => commands::debts::handle(&conn, sub)?,
        Some(("profile", sub)) => commands::profile::handle(&conn, sub)?,
        Some(("dashboard", sub)) => commands::dashboard::handle(&conn, sub)?,
        Some(("receipt", sub)) => commands::receipts::handle(&conn, sub)?,
        Some(("recommend", sub)) => commands::recommend::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
