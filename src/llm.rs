// Copyright (c) 2025 Finsight contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Client for the hosted text-to-structured-JSON service. The service is an
//! OpenAI-compatible chat completions endpoint (Groq by default); it is
//! treated as opaque and possibly slow, and there is no retry loop. Replies
//! may wrap the JSON payload in a code fence, so parsing first extracts the
//! object and only then deserializes into the typed target.

use crate::error::CoreError;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

pub const BUDGET_PROMPT: &str = r#"Extract budget details into JSON with this structure:
{
    "income": income_value,
    "savings": savings_value,
    "expenses": [
        {"category": "category_name", "allocated_amount": amount}
    ]
}"#;

pub const RECEIPT_PROMPT: &str = r#"Extract all product names and prices from the receipt in the following JSON format:
{
    "products": [
        {"name": "product1", "price": 10.99},
        {"name": "product2", "price": 5.49}
    ]
}
Only include actual items. Don't include totals or taxes."#;

pub const RECOMMEND_PROMPT: &str = r#"Analyze the user's financial data and provide comprehensive recommendations.
Consider their income, expenses, subscriptions, debts, and savings goals.
Focus on actionable insights and risk assessment.

Provide recommendations in this format:
{
    "recommendations": ["specific recommendation 1", "recommendation 2"],
    "action_items": ["immediate action 1", "action 2"],
    "risk_assessment": {
        "debt_risk": "assessment of debt situation",
        "savings_risk": "assessment of savings progress",
        "subscription_risk": "assessment of subscription costs"
    }
}"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetDraftLine {
    pub category: String,
    pub allocated_amount: Decimal,
}

/// Structured budget extracted from a free-text description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetDraft {
    pub income: Decimal,
    pub savings: Decimal,
    pub expenses: Vec<BudgetDraftLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptProduct {
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptItems {
    pub products: Vec<ReceiptProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub debt_risk: String,
    pub savings_risk: String,
    pub subscription_risk: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub recommendations: Vec<String>,
    pub action_items: Vec<String>,
    pub risk_assessment: RiskAssessment,
}

pub struct LlmClient {
    base: String,
    model: String,
    api_key: String,
    http: reqwest::blocking::Client,
}

impl LlmClient {
    /// Reads FINSIGHT_API_KEY (required), FINSIGHT_MODEL and
    /// FINSIGHT_API_BASE (optional, Groq defaults).
    pub fn from_env() -> Result<Self, CoreError> {
        let api_key = std::env::var("FINSIGHT_API_KEY")
            .map_err(|_| CoreError::InvalidInput("FINSIGHT_API_KEY is not set".into()))?;
        let base = std::env::var("FINSIGHT_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into());
        let model = std::env::var("FINSIGHT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let http = crate::utils::http_client()
            .map_err(|e| CoreError::DependencyUnavailable(e.to_string()))?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            model,
            api_key,
            http,
        })
    }

    /// One chat completion round-trip; returns the assistant's raw text.
    pub fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, CoreError> {
        let body = json!({
            "model": self.model,
            "temperature": temperature,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ]
        });
        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| CoreError::DependencyUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| CoreError::DependencyUnavailable(e.to_string()))?;
        let v: serde_json::Value = resp
            .json()
            .map_err(|e| CoreError::SchemaViolation(e.to_string()))?;
        v["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| CoreError::SchemaViolation("reply carries no message content".into()))
    }
}

static JSON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```").expect("static regex"));

/// Pulls the JSON object out of an assistant reply: a fenced block wins,
/// otherwise the outermost brace pair is taken as-is.
pub fn extract_json(reply: &str) -> Result<&str, CoreError> {
    if let Some(c) = JSON_FENCE.captures(reply) {
        if let Some(m) = c.get(1) {
            return Ok(m.as_str());
        }
    }
    match (reply.find('{'), reply.rfind('}')) {
        (Some(s), Some(e)) if e > s => Ok(&reply[s..=e]),
        _ => Err(CoreError::SchemaViolation(
            "no JSON object found in reply".into(),
        )),
    }
}

pub fn parse_reply<T: DeserializeOwned>(reply: &str) -> Result<T, CoreError> {
    let payload = extract_json(reply)?;
    serde_json::from_str(payload)
        .map_err(|e| CoreError::SchemaViolation(format!("malformed payload: {}", e)))
}
