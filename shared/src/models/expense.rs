//! Expense Model

use serde::{Deserialize, Serialize};

/// Ledger expense entry (remote table `expenses`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub value: f64,
    pub date: String,
    pub category: String,
    pub description: String,
}

/// Create expense payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCreate {
    pub value: f64,
    pub date: String,
    pub category: String,
    pub description: String,
}

impl ExpenseCreate {
    pub fn into_expense(self, id: String) -> Expense {
        Expense {
            id,
            value: self.value,
            date: self.date,
            category: self.category,
            description: self.description,
        }
    }
}
