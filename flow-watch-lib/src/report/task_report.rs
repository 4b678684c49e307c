use crate::sink::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The artifact produced by a completed statement-processing task.
///
/// Every field tolerates omission so that partial payloads still render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskReport {
    pub transactions: Vec<Transaction>,
    pub summary: Summary,
    pub insights: Vec<Insight>,
    pub metadata: Option<ReportMetadata>,
}

impl TaskReport {
    /// Returns `true` if the report carries no transactions and no insights.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() && self.insights.is_empty() && self.summary.total_transactions == 0
    }

    /// Spending categories ordered by amount, largest first.
    #[must_use]
    pub fn top_categories(&self, limit: usize) -> Vec<(&str, &CategoryTotal)> {
        let mut categories: Vec<_> = self
            .summary
            .category_breakdown
            .iter()
            .map(|(name, total)| (name.as_str(), total))
            .collect();
        categories.sort_by(|a, b| b.1.amount.total_cmp(&a.1.amount).then_with(|| a.0.cmp(b.0)));
        categories.truncate(limit);
        categories
    }
}

/// A single categorized bank transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
    #[serde(rename = "Date")]
    pub date: String,

    #[serde(rename = "Description")]
    pub description: String,

    /// `Credit` or `Debit`.
    #[serde(rename = "Type")]
    pub kind: String,

    #[serde(rename = "Amount")]
    pub amount: f64,

    #[serde(rename = "Balance")]
    pub balance: f64,

    #[serde(rename = "Category")]
    pub category: String,

    #[serde(rename = "Transaction_ID")]
    pub id: String,
}

/// Aggregate figures over all transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub total_transactions: u64,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_savings: f64,
    pub savings_rate: f64,
    pub avg_monthly_income: f64,
    pub avg_monthly_expenses: f64,
    pub date_range: Option<DateRange>,
    pub category_breakdown: BTreeMap<String, CategoryTotal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Spending within one category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryTotal {
    pub amount: f64,
    pub count: u64,
}

/// A generated observation about the processed data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub data_quality: String,
    pub categorization: String,
    pub categories_found: u64,
}
