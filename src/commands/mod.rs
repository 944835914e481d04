// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod budgets;
pub mod dashboard;
pub mod debts;
pub mod doctor;
pub mod exporter;
pub mod profile;
pub mod receipts;
pub mod recommend;
pub mod subscriptions;
pub mod transactions;
