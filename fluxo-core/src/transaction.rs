//! Transaction entity shape handed to the transaction store.
//!
//! This is the "new transaction" record accepted by the store's bulk insert:
//! importers never set `id`, `createdAt` or `category`, those are assigned downstream.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Descriptions longer than this are truncated before they reach the store.
pub const MAX_DESCRIPTION_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// Map a credit/debit marker (`C`/`D`, case-insensitive) to a type.
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker.to_ascii_uppercase() {
            'C' => Some(Self::Income),
            'D' => Some(Self::Expense),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    Pending,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Pending => "pending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// At most [`MAX_DESCRIPTION_LEN`] characters.
    pub description: String,
    /// Always a positive magnitude; direction lives in `kind`.
    pub value: f64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub payment_method: Option<String>,
    pub is_imported: bool,
    pub is_reconciled: bool,
}

impl NewTransaction {
    /// A completed, reconciled imported transaction.
    pub fn imported(
        date: NaiveDate,
        description: impl Into<String>,
        value: f64,
        kind: TransactionType,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            value,
            kind,
            status: TransactionStatus::Completed,
            due_date: None,
            category: None,
            payment_method: None,
            is_imported: true,
            is_reconciled: true,
        }
    }

    /// Mark as scheduled: pending, due on its own date, not reconciled.
    pub fn into_pending(mut self) -> Self {
        self.status = TransactionStatus::Pending;
        self.due_date = Some(self.date);
        self.is_reconciled = false;
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    /// Positive for income, negative for expense.
    pub fn signed_value(&self) -> f64 {
        match self.kind {
            TransactionType::Income => self.value,
            TransactionType::Expense => -self.value,
        }
    }

    /// Value in cents, used wherever amounts must compare exactly.
    pub fn value_cents(&self) -> i64 {
        (self.value * 100.0).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_marker_mapping() {
        assert_eq!(TransactionType::from_marker('C'), Some(TransactionType::Income));
        assert_eq!(TransactionType::from_marker('d'), Some(TransactionType::Expense));
        assert_eq!(TransactionType::from_marker('X'), None);
    }

    #[test]
    fn test_pending_sets_due_date() {
        let t = NewTransaction::imported(ymd(2024, 12, 20), "ALUGUEL", 900.0, TransactionType::Expense)
            .into_pending();
        assert!(t.is_pending());
        assert_eq!(t.due_date, Some(ymd(2024, 12, 20)));
        assert!(!t.is_reconciled);
        assert_eq!(t.signed_value(), -900.0);
    }

    #[test]
    fn test_serializes_store_shape() {
        let t = NewTransaction::imported(ymd(2024, 11, 14), "PIX REC.OUTRA IF MT", 1.0, TransactionType::Income);
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["date"], "2024-11-14");
        assert_eq!(v["type"], "income");
        assert_eq!(v["status"], "completed");
        assert_eq!(v["isImported"], true);
        assert_eq!(v["isReconciled"], true);
        assert!(v["category"].is_null());
        assert!(v["paymentMethod"].is_null());
        assert!(v.get("dueDate").is_none());
    }

    #[test]
    fn test_pending_serializes_due_date() {
        let t = NewTransaction::imported(ymd(2025, 1, 5), "BOLETO", 50.0, TransactionType::Expense)
            .into_pending();
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["status"], "pending");
        assert_eq!(v["dueDate"], "2025-01-05");
    }

    #[test]
    fn test_value_cents_rounds() {
        let t = NewTransaction::imported(ymd(2024, 1, 1), "X", 124.37, TransactionType::Expense);
        assert_eq!(t.value_cents(), 12437);
    }
}
