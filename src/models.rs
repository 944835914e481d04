// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    /// "credit" or "debit"
    pub amount_type: String,
    pub category: String,
    pub description: String,
    /// "cash", "online" or "stock" when the entry moves a holding
    pub mode: Option<String>,
    pub subscription_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub cost: Decimal,
    /// "Daily", "Weekly", "Monthly" or "Occasionally"
    pub usage: String,
    /// "High", "Medium" or "Low"
    pub priority: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: String,
    pub income: Decimal,
    pub savings: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLine {
    pub category: String,
    pub allocated_amount: Decimal,
    /// "Weekly" or "Monthly"
    pub frequency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub amount: Decimal,
    pub interest_rate: Decimal,
    pub priority: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub cash_holdings: Decimal,
    pub online_holdings: Decimal,
    pub stock_investments: Decimal,
    pub savings: Decimal,
}

impl Profile {
    pub fn total_savings(&self) -> Decimal {
        self.stock_investments + self.savings
    }
}

/// One row of the budget-vs-spend reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStatus {
    pub category: String,
    pub allocated_amount: Decimal,
    pub actual_spent: Decimal,
    pub remaining: Decimal,
    /// "Over Budget" or "Within Budget"
    pub status: String,
}
