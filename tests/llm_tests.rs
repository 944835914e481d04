// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use finsight::error::CoreError;
use finsight::llm::{extract_json, parse_reply, BudgetDraft, Recommendation, ReceiptItems};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[test]
fn fenced_block_wins_over_surrounding_text() {
    let reply = "Sure, here is the budget:\n```json\n{\"income\": 5000}\n```\nLet me know!";
    assert_eq!(extract_json(reply).unwrap(), "{\"income\": 5000}");
}

#[test]
fn plain_fence_without_language_tag_is_accepted() {
    let reply = "```\n{\"a\": 1}\n```";
    assert_eq!(extract_json(reply).unwrap(), "{\"a\": 1}");
}

#[test]
fn bare_object_in_prose_is_extracted_by_braces() {
    let reply = "Here you go: {\"a\": {\"b\": 2}} hope that helps";
    assert_eq!(extract_json(reply).unwrap(), "{\"a\": {\"b\": 2}}");
}

#[test]
fn reply_without_object_is_a_schema_violation() {
    let err = extract_json("I could not parse that receipt, sorry.").unwrap_err();
    assert!(matches!(err, CoreError::SchemaViolation(_)));
}

#[test]
fn budget_draft_parses_from_fenced_reply() {
    let reply = r#"```json
{
    "income": 5000,
    "savings": 1000,
    "expenses": [
        {"category": "Rent", "allocated_amount": 2000},
        {"category": "Groceries", "allocated_amount": 500.50}
    ]
}
```"#;
    let draft: BudgetDraft = parse_reply(reply).unwrap();
    assert_eq!(draft.income, dec("5000"));
    assert_eq!(draft.savings, dec("1000"));
    assert_eq!(draft.expenses.len(), 2);
    assert_eq!(draft.expenses[1].category, "Groceries");
    assert_eq!(draft.expenses[1].allocated_amount, dec("500.50"));
}

#[test]
fn receipt_items_parse_with_float_prices() {
    let reply = r#"{"products": [{"name": "Milk", "price": 3.49}, {"name": "Bread", "price": 2.0}]}"#;
    let items: ReceiptItems = parse_reply(reply).unwrap();
    assert_eq!(items.products.len(), 2);
    assert_eq!(items.products[0].name, "Milk");
    assert_eq!(items.products[0].price, dec("3.49"));
}

#[test]
fn recommendation_parses_with_risk_assessment() {
    let reply = r#"{
        "recommendations": ["Cut dining spend"],
        "action_items": ["Cancel one subscription"],
        "risk_assessment": {
            "debt_risk": "low",
            "savings_risk": "moderate",
            "subscription_risk": "high"
        }
    }"#;
    let rec: Recommendation = parse_reply(reply).unwrap();
    assert_eq!(rec.recommendations, vec!["Cut dining spend"]);
    assert_eq!(rec.risk_assessment.subscription_risk, "high");
}

#[test]
fn wrong_shape_is_a_schema_violation() {
    let reply = r#"{"products": "none"}"#;
    let err = parse_reply::<ReceiptItems>(reply).unwrap_err();
    assert!(matches!(err, CoreError::SchemaViolation(_)));
}
