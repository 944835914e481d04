// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, ArgGroup, Command};

fn user_arg() -> Arg {
    Arg::new("user")
        .long("user")
        .short('u')
        .value_name("ID")
        .help("User id (defaults to the active user)")
}

fn with_json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON Lines"),
    )
}

pub fn build_cli() -> Command {
    Command::new("finsight")
        .about("Personal finance tracking, budget reconciliation, and AI-assisted insights")
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(
            Command::new("tx")
                .about("Record and inspect ledger transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record a transaction")
                        .arg(user_arg())
                        .arg(Arg::new("date").long("date").required(true).help("YYYY-MM-DD"))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .value_parser(["credit", "debit"]),
                        )
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("description").long("description"))
                        .arg(
                            Arg::new("mode")
                                .long("mode")
                                .value_parser(["cash", "online", "stock"])
                                .help("Holding moved by this entry"),
                        ),
                )
                .subcommand(with_json_flags(
                    Command::new("list")
                        .about("List transactions")
                        .arg(user_arg())
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["credit", "debit"]),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("subscription")
                .about("Manage subscriptions and their recurring charges")
                .subcommand(
                    Command::new("add")
                        .about("Add a subscription")
                        .arg(user_arg())
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("cost").long("cost").required(true))
                        .arg(
                            Arg::new("usage")
                                .long("usage")
                                .required(true)
                                .value_parser(["Daily", "Weekly", "Monthly", "Occasionally"]),
                        )
                        .arg(
                            Arg::new("priority")
                                .long("priority")
                                .required(true)
                                .value_parser(["High", "Medium", "Low"]),
                        ),
                )
                .subcommand(with_json_flags(
                    Command::new("list")
                        .about("List subscriptions")
                        .arg(user_arg()),
                ))
                .subcommand(
                    Command::new("edit")
                        .about("Update cost, usage, or priority")
                        .arg(user_arg())
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("cost").long("cost"))
                        .arg(
                            Arg::new("usage")
                                .long("usage")
                                .value_parser(["Daily", "Weekly", "Monthly", "Occasionally"]),
                        )
                        .arg(
                            Arg::new("priority")
                                .long("priority")
                                .value_parser(["High", "Medium", "Low"]),
                        ),
                )
                .subcommand(
                    Command::new("cancel")
                        .about("Cancel a subscription")
                        .arg(user_arg())
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                )
                .subcommand(
                    Command::new("materialize")
                        .about("Write this month's charge for each subscription (idempotent)")
                        .arg(user_arg())
                        .arg(Arg::new("date").long("date").help("As-of date, YYYY-MM-DD (default today)"))
                        .arg(
                            Arg::new("dedupe-by")
                                .long("dedupe-by")
                                .value_parser(["description", "subscription-id"])
                                .help("How an existing charge is recognized"),
                        ),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Budget allocations and reconciliation")
                .subcommand(
                    Command::new("set-income")
                        .about("Set monthly income")
                        .arg(user_arg())
                        .arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(
                    Command::new("set-savings")
                        .about("Set the savings goal")
                        .arg(user_arg())
                        .arg(Arg::new("amount").long("amount").required(true)),
                )
                .subcommand(
                    Command::new("allocate")
                        .about("Set the allocation for a category")
                        .arg(user_arg())
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("frequency")
                                .long("frequency")
                                .value_parser(["Weekly", "Monthly"])
                                .default_value("Monthly"),
                        ),
                )
                .subcommand(with_json_flags(
                    Command::new("show").about("Show the budget plan").arg(user_arg()),
                ))
                .subcommand(with_json_flags(
                    Command::new("report")
                        .about("Budget vs spend for one month")
                        .arg(user_arg())
                        .arg(Arg::new("month").long("month").required(true).help("YYYY-MM")),
                ))
                .subcommand(
                    Command::new("parse")
                        .about("Extract a budget from a free-text description via the LLM")
                        .arg(user_arg())
                        .arg(Arg::new("text").long("text"))
                        .arg(Arg::new("file").long("file"))
                        .group(ArgGroup::new("input").args(["text", "file"]).required(true)),
                ),
        )
        .subcommand(
            Command::new("debt")
                .about("Track debts and loans")
                .subcommand(
                    Command::new("add")
                        .about("Record a debt")
                        .arg(user_arg())
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("interest-rate")
                                .long("interest-rate")
                                .required(true)
                                .help("Percentage"),
                        )
                        .arg(
                            Arg::new("priority")
                                .long("priority")
                                .required(true)
                                .value_parser(["High", "Medium", "Low"]),
                        ),
                )
                .subcommand(with_json_flags(
                    Command::new("list").about("List debts").arg(user_arg()),
                ))
                .subcommand(
                    Command::new("summary")
                        .about("Total debt and weighted interest rate")
                        .arg(user_arg()),
                ),
        )
        .subcommand(
            Command::new("profile")
                .about("Holdings, custom categories, and the active user")
                .subcommand(
                    Command::new("init")
                        .about("Record initial holdings")
                        .arg(user_arg())
                        .arg(Arg::new("cash").long("cash").required(true))
                        .arg(Arg::new("online").long("online").required(true))
                        .arg(Arg::new("stocks").long("stocks").required(true))
                        .arg(Arg::new("savings").long("savings").required(true)),
                )
                .subcommand(with_json_flags(
                    Command::new("show").about("Show the profile").arg(user_arg()),
                ))
                .subcommand(
                    Command::new("use")
                        .about("Select the active user")
                        .arg(Arg::new("user_id").required(true)),
                )
                .subcommand(
                    Command::new("category")
                        .about("Custom categories")
                        .subcommand(
                            Command::new("add")
                                .about("Add a custom category")
                                .arg(user_arg())
                                .arg(Arg::new("name").required(true)),
                        )
                        .subcommand(with_json_flags(
                            Command::new("list")
                                .about("List predefined and custom categories")
                                .arg(user_arg()),
                        )),
                ),
        )
        .subcommand(
            Command::new("dashboard")
                .about("Financial summaries")
                .subcommand(with_json_flags(
                    Command::new("summary").about("Totals and holdings").arg(user_arg()),
                ))
                .subcommand(with_json_flags(
                    Command::new("categories")
                        .about("Spend by category")
                        .arg(user_arg())
                        .arg(Arg::new("month").long("month").help("YYYY-MM")),
                ))
                .subcommand(with_json_flags(
                    Command::new("cashflow")
                        .about("Income vs expenses per month")
                        .arg(user_arg())
                        .arg(
                            Arg::new("months")
                                .long("months")
                                .value_parser(value_parser!(usize)),
                        ),
                )),
        )
        .subcommand(
            Command::new("receipt")
                .about("Turn extracted receipt text into transactions")
                .subcommand(
                    Command::new("import")
                        .about("Parse receipt text via the LLM and record each item")
                        .arg(user_arg())
                        .arg(
                            Arg::new("file")
                                .long("file")
                                .required(true)
                                .help("Path to extracted text, or - for stdin"),
                        )
                        .arg(Arg::new("date").long("date").required(true).help("YYYY-MM-DD"))
                        .arg(Arg::new("category").long("category").required(true)),
                ),
        )
        .subcommand(
            Command::new("recommend")
                .about("LLM recommendations from this month's aggregates")
                .arg(user_arg())
                .arg(Arg::new("month").long("month").help("YYYY-MM (default current)"))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print as pretty JSON"),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("transactions")
                        .about("Export transactions to CSV or JSON")
                        .arg(user_arg())
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .value_parser(["csv", "json"]),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check stored data for suspicious values")
                .arg(user_arg()),
        )
}
