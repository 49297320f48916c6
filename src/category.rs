//! The fixed sets of categories that income and expense transactions may use.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Error, transaction::TransactionType};

/// The category used for transactions that do not belong to any category.
///
/// It is valid for both income and expense transactions.
pub const UNCATEGORIZED: &str = "None";

const DEFAULT_INCOME_CATEGORIES: [&str; 5] = ["Salary", "Freelance", "Investment", "Bonus", "Other"];

const DEFAULT_EXPENSE_CATEGORIES: [&str; 7] = [
    "Food",
    "Rent",
    "Utilities",
    "Transport",
    "Entertainment",
    "Shopping",
    "Other",
];

/// The allowed categories for each transaction type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySets {
    /// The categories allowed for income transactions.
    pub income: Vec<String>,
    /// The categories allowed for expense transactions.
    pub expense: Vec<String>,
}

impl Default for CategorySets {
    fn default() -> Self {
        Self {
            income: DEFAULT_INCOME_CATEGORIES.map(str::to_owned).to_vec(),
            expense: DEFAULT_EXPENSE_CATEGORIES.map(str::to_owned).to_vec(),
        }
    }
}

impl CategorySets {
    /// Load the category sets from a JSON file of the form
    /// `{"income": ["Salary", ...], "expense": ["Food", ...]}`.
    ///
    /// # Errors
    /// Returns an [Error::CategoryConfig] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)
            .map_err(|error| Error::CategoryConfig(format!("{}: {error}", path.display())))?;

        Self::from_json(&text)
    }

    /// Parse the category sets from a JSON string.
    ///
    /// # Errors
    /// Returns an [Error::CategoryConfig] if the string is not valid JSON of the expected shape.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|error| Error::CategoryConfig(error.to_string()))
    }

    /// The categories allowed for `transaction_type`, excluding [UNCATEGORIZED].
    pub fn allowed(&self, transaction_type: TransactionType) -> &[String] {
        match transaction_type {
            TransactionType::Income => &self.income,
            TransactionType::Expense => &self.expense,
        }
    }

    /// Check that `category` may be used for a transaction of `transaction_type`.
    ///
    /// # Errors
    /// Returns an [Error::InvalidCategory] if `category` is neither in the
    /// allowed set nor [UNCATEGORIZED].
    pub fn validate(&self, transaction_type: TransactionType, category: &str) -> Result<(), Error> {
        if category == UNCATEGORIZED
            || self
                .allowed(transaction_type)
                .iter()
                .any(|allowed| allowed == category)
        {
            return Ok(());
        }

        Err(Error::InvalidCategory {
            category: category.to_owned(),
            transaction_type,
        })
    }
}
