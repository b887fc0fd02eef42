use serde::{Deserialize, Serialize};

/// One product lent on credit. `item_id` is epoch milliseconds at creation
/// time, unique within its account, never reused or renumbered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanItem {
    pub item_id: i64,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub outstanding_cents: i64, // 0 ..= quantity * unit_price_cents
    pub loan_date: String,      // ISO YYYY-MM-DD
}

impl LoanItem {
    /// Full price of the line at its current quantity/unit price.
    pub fn gross_cents(&self) -> i64 {
        self.quantity * self.unit_price_cents
    }
}

/// A debtor's running balance. `total_cents` is recomputed from the items
/// after every mutation, never decremented incrementally. `version` is the
/// optimistic-concurrency stamp checked by the store on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtAccount {
    pub id: String,
    pub debtor_name: String,
    pub total_cents: i64,
    pub version: i64,
    pub items: Vec<LoanItem>,
}

/// Directory projection for the debt list screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtSummary {
    pub id: String,
    pub debtor_name: String,
    pub total_cents: i64,
}
