//! The selection state for browsing a set of transactions.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::transaction::{Transaction, TransactionId, TransactionType};

use super::{
    DateRange, SortKey, SortOrder, TypeFilter, balance, filter_by_date_range, filter_by_type,
    sort_transactions, sum_by_type,
};

/// Which balance to show as the headline figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceMode {
    /// The balance over every transaction regardless of the filters.
    #[default]
    Total,
    /// The balance over the transactions that pass the current filters.
    Timeframe,
}

impl BalanceMode {
    fn toggled(self) -> Self {
        match self {
            BalanceMode::Total => BalanceMode::Timeframe,
            BalanceMode::Timeframe => BalanceMode::Total,
        }
    }
}

/// A set of transactions together with the filters, sort and balance mode
/// used to present them.
///
/// The derived values are computed on every call so they always reflect the
/// current transactions and selection.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetView {
    transactions: Vec<Transaction>,
    date_range: DateRange,
    type_filter: TypeFilter,
    sort_key: SortKey,
    sort_order: SortOrder,
    balance_mode: BalanceMode,
}

impl BudgetView {
    /// Create a view over `transactions` showing the calendar month of `today`,
    /// every type, newest ID first, and the total balance.
    pub fn new(transactions: Vec<Transaction>, today: Date) -> Self {
        Self {
            transactions,
            date_range: DateRange::month_of(today),
            type_filter: TypeFilter::All,
            sort_key: SortKey::Id,
            sort_order: SortOrder::Descending,
            balance_mode: BalanceMode::Total,
        }
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    pub fn type_filter(&self) -> TypeFilter {
        self.type_filter
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn balance_mode(&self) -> BalanceMode {
        self.balance_mode
    }

    /// Every transaction in the view, unfiltered.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn set_date_range(&mut self, date_range: DateRange) {
        self.date_range = date_range;
    }

    pub fn set_type_filter(&mut self, type_filter: TypeFilter) {
        self.type_filter = type_filter;
    }

    /// Select `type_filter`, or go back to [TypeFilter::All] if it is already selected.
    pub fn toggle_type_filter(&mut self, type_filter: TypeFilter) {
        self.type_filter = if self.type_filter == type_filter {
            TypeFilter::All
        } else {
            type_filter
        };
    }

    /// Sort by `key`.
    ///
    /// Choosing the current key again flips the sort order, a new key starts
    /// in ascending order.
    pub fn sort_by(&mut self, key: SortKey) {
        if self.sort_key == key {
            self.sort_order = self.sort_order.toggled();
        } else {
            self.sort_key = key;
            self.sort_order = SortOrder::Ascending;
        }
    }

    /// Sort by `key` in `order`, regardless of the current sort.
    pub fn set_sort(&mut self, key: SortKey, order: SortOrder) {
        self.sort_key = key;
        self.sort_order = order;
    }

    pub fn toggle_sort_order(&mut self) {
        self.sort_order = self.sort_order.toggled();
    }

    pub fn toggle_balance_mode(&mut self) {
        self.balance_mode = self.balance_mode.toggled();
    }

    pub fn add_transaction(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// Remove the transaction with `id`, returning it if it was in the view.
    pub fn remove_transaction(&mut self, id: TransactionId) -> Option<Transaction> {
        let index = self
            .transactions
            .iter()
            .position(|transaction| transaction.id == id)?;

        Some(self.transactions.remove(index))
    }

    /// The transactions in the date range that pass the type filter, in the
    /// selected sort order.
    pub fn filtered_transactions(&self) -> Vec<Transaction> {
        let in_range = filter_by_date_range(&self.transactions, self.date_range);
        let of_type = filter_by_type(&in_range, self.type_filter);

        sort_transactions(&of_type, self.sort_key, self.sort_order)
    }

    /// The income within the current filters.
    pub fn total_income(&self) -> f64 {
        sum_by_type(&self.filtered_transactions(), TransactionType::Income)
    }

    /// The expenses within the current filters.
    pub fn total_expense(&self) -> f64 {
        sum_by_type(&self.filtered_transactions(), TransactionType::Expense)
    }

    /// The balance within the current filters.
    pub fn balance(&self) -> f64 {
        balance(&self.filtered_transactions())
    }

    /// The balance over every transaction, ignoring the filters.
    pub fn total_balance(&self) -> f64 {
        balance(&self.transactions)
    }

    /// The balance selected by the balance mode.
    pub fn displayed_balance(&self) -> f64 {
        match self.balance_mode {
            BalanceMode::Total => self.total_balance(),
            BalanceMode::Timeframe => self.balance(),
        }
    }
}
