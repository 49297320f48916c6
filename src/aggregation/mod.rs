//! Filtering, sorting and totals over an in-memory set of transactions.
//!
//! Every function here is pure: the input slice is never modified and the
//! same input always gives the same output. [BudgetView] holds the state that
//! selects which of these views to show.

mod view;

pub use view::{BalanceMode, BudgetView};

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::{Date, PrimitiveDateTime, macros::time};

use crate::{
    recurring::days_in_month,
    transaction::{Transaction, TransactionType},
};

/// An inclusive range of timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// The earliest timestamp in the range.
    pub start: PrimitiveDateTime,
    /// The latest timestamp in the range.
    pub end: PrimitiveDateTime,
}

impl DateRange {
    /// The range covering the whole days from `start` to `end`, inclusive.
    pub fn from_dates(start: Date, end: Date) -> Self {
        Self {
            start: start.midnight(),
            end: PrimitiveDateTime::new(end, time!(23:59:59.999_999_999)),
        }
    }

    /// The calendar month that `date` falls in.
    pub fn month_of(date: Date) -> Self {
        let first_day = date.replace_day(1).unwrap_or(date);
        let last_day = date
            .replace_day(days_in_month(date.year(), date.month()))
            .unwrap_or(date);

        Self::from_dates(first_day, last_day)
    }

    /// Whether `timestamp` falls within the range.
    pub fn contains(&self, timestamp: &PrimitiveDateTime) -> bool {
        self.start <= *timestamp && *timestamp <= self.end
    }
}

/// Which transactions to keep by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    /// Keep every transaction.
    #[default]
    All,
    /// Keep only income.
    Income,
    /// Keep only expenses.
    Expense,
}

impl TypeFilter {
    fn matches(&self, transaction_type: TransactionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Income => transaction_type == TransactionType::Income,
            TypeFilter::Expense => transaction_type == TransactionType::Expense,
        }
    }
}

/// The field to sort transactions by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// The transaction ID, i.e. creation order.
    #[default]
    Id,
    /// The transaction amount.
    Amount,
    /// When the transaction occurred.
    Date,
}

/// The direction to sort transactions in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Sort in order of increasing value.
    #[serde(alias = "asc")]
    Ascending,
    /// Sort in order of decreasing value.
    #[serde(alias = "desc")]
    Descending,
}

impl SortOrder {
    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Keep the transactions whose date falls within `range`, inclusive.
pub fn filter_by_date_range(transactions: &[Transaction], range: DateRange) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| range.contains(&transaction.date))
        .cloned()
        .collect()
}

/// Keep only income, only expenses, or everything for [TypeFilter::All].
pub fn filter_by_type(transactions: &[Transaction], filter: TypeFilter) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| filter.matches(transaction.transaction_type))
        .cloned()
        .collect()
}

/// Sort a copy of `transactions` by `key`.
///
/// The sort is stable: transactions with equal keys keep their original
/// relative order in both directions.
pub fn sort_transactions(
    transactions: &[Transaction],
    key: SortKey,
    order: SortOrder,
) -> Vec<Transaction> {
    let compare = |a: &Transaction, b: &Transaction| -> Ordering {
        match key {
            SortKey::Id => a.id.cmp(&b.id),
            SortKey::Amount => a.amount.total_cmp(&b.amount),
            SortKey::Date => a.date.cmp(&b.date),
        }
    };

    let mut sorted = transactions.to_vec();

    match order {
        SortOrder::Ascending => sorted.sort_by(compare),
        SortOrder::Descending => sorted.sort_by(|a, b| compare(b, a)),
    }

    sorted
}

/// The sum of the amounts of every transaction of `transaction_type`.
///
/// Returns zero for empty input.
pub fn sum_by_type(transactions: &[Transaction], transaction_type: TransactionType) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.transaction_type == transaction_type)
        .map(|transaction| transaction.amount)
        .sum()
}

/// Total income minus total expenses.
pub fn balance(transactions: &[Transaction]) -> f64 {
    sum_by_type(transactions, TransactionType::Income)
        - sum_by_type(transactions, TransactionType::Expense)
}

#[cfg(test)]
pub(crate) mod test_utils {
    use time::PrimitiveDateTime;

    use crate::transaction::{Frequency, Status, Transaction, TransactionId, TransactionType};

    pub(crate) fn create_test_transaction(
        id: TransactionId,
        transaction_type: TransactionType,
        amount: f64,
        date: PrimitiveDateTime,
    ) -> Transaction {
        Transaction {
            id,
            transaction_type,
            amount,
            description: format!("transaction #{id}"),
            date,
            category: "Other".to_owned(),
            is_recurring: false,
            frequency: Frequency::Monthly,
            status: Status::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use crate::{
        aggregation::{
            DateRange, SortKey, SortOrder, TypeFilter, balance, filter_by_date_range,
            filter_by_type, sort_transactions, sum_by_type, test_utils::create_test_transaction,
        },
        transaction::{Transaction, TransactionId, TransactionType},
    };

    fn ids(transactions: &[Transaction]) -> Vec<TransactionId> {
        transactions.iter().map(|transaction| transaction.id).collect()
    }

    #[test]
    fn sums_by_type() {
        let transactions = vec![
            create_test_transaction(1, TransactionType::Income, 100.0, datetime!(2024-01-01 0:00)),
            create_test_transaction(2, TransactionType::Expense, 40.0, datetime!(2024-01-02 0:00)),
        ];

        assert_eq!(sum_by_type(&transactions, TransactionType::Income), 100.0);
        assert_eq!(sum_by_type(&transactions, TransactionType::Expense), 40.0);
        assert_eq!(balance(&transactions), 60.0);
    }

    #[test]
    fn sums_of_empty_input_are_zero() {
        assert_eq!(sum_by_type(&[], TransactionType::Income), 0.0);
        assert_eq!(balance(&[]), 0.0);
    }

    #[test]
    fn date_range_is_inclusive() {
        let transactions = vec![
            create_test_transaction(1, TransactionType::Income, 1.0, datetime!(2024-01-31 23:59:59)),
            create_test_transaction(2, TransactionType::Income, 1.0, datetime!(2024-02-01 0:00)),
            create_test_transaction(3, TransactionType::Income, 1.0, datetime!(2024-02-29 23:59:59)),
            create_test_transaction(4, TransactionType::Income, 1.0, datetime!(2024-03-01 0:00)),
        ];

        let got = filter_by_date_range(
            &transactions,
            DateRange::from_dates(date!(2024-02-01), date!(2024-02-29)),
        );

        assert_eq!(ids(&got), vec![2, 3]);
    }

    #[test]
    fn month_of_covers_whole_month() {
        assert_eq!(
            DateRange::month_of(date!(2024-02-14)),
            DateRange::from_dates(date!(2024-02-01), date!(2024-02-29))
        );
        assert_eq!(
            DateRange::month_of(date!(2023-12-31)),
            DateRange::from_dates(date!(2023-12-01), date!(2023-12-31))
        );
    }

    #[test]
    fn filters_by_type() {
        let transactions = vec![
            create_test_transaction(1, TransactionType::Income, 1.0, datetime!(2024-01-01 0:00)),
            create_test_transaction(2, TransactionType::Expense, 1.0, datetime!(2024-01-01 0:00)),
            create_test_transaction(3, TransactionType::Income, 1.0, datetime!(2024-01-01 0:00)),
        ];

        assert_eq!(ids(&filter_by_type(&transactions, TypeFilter::Income)), vec![1, 3]);
        assert_eq!(ids(&filter_by_type(&transactions, TypeFilter::Expense)), vec![2]);
        assert_eq!(ids(&filter_by_type(&transactions, TypeFilter::All)), vec![1, 2, 3]);
    }

    #[test]
    fn sorting_by_amount_and_back_restores_order() {
        let transactions = vec![
            create_test_transaction(1, TransactionType::Expense, 50.0, datetime!(2024-01-01 0:00)),
            create_test_transaction(2, TransactionType::Expense, 10.0, datetime!(2024-01-01 0:00)),
        ];

        let ascending = sort_transactions(&transactions, SortKey::Amount, SortOrder::Ascending);
        assert_eq!(ids(&ascending), vec![2, 1]);

        let descending = sort_transactions(&ascending, SortKey::Amount, SortOrder::Descending);
        assert_eq!(ids(&descending), vec![1, 2]);
    }

    #[test]
    fn sorting_is_stable_in_both_directions() {
        let transactions = vec![
            create_test_transaction(3, TransactionType::Expense, 10.0, datetime!(2024-01-02 0:00)),
            create_test_transaction(1, TransactionType::Expense, 20.0, datetime!(2024-01-01 0:00)),
            create_test_transaction(2, TransactionType::Income, 10.0, datetime!(2024-01-03 0:00)),
        ];

        let ascending = sort_transactions(&transactions, SortKey::Amount, SortOrder::Ascending);
        assert_eq!(ids(&ascending), vec![3, 2, 1]);

        let descending = sort_transactions(&transactions, SortKey::Amount, SortOrder::Descending);
        assert_eq!(ids(&descending), vec![1, 3, 2]);
    }

    #[test]
    fn sorts_by_date_and_id() {
        let transactions = vec![
            create_test_transaction(2, TransactionType::Expense, 1.0, datetime!(2024-01-03 0:00)),
            create_test_transaction(3, TransactionType::Expense, 1.0, datetime!(2024-01-01 0:00)),
            create_test_transaction(1, TransactionType::Expense, 1.0, datetime!(2024-01-02 0:00)),
        ];

        assert_eq!(
            ids(&sort_transactions(&transactions, SortKey::Date, SortOrder::Ascending)),
            vec![3, 1, 2]
        );
        assert_eq!(
            ids(&sort_transactions(&transactions, SortKey::Id, SortOrder::Descending)),
            vec![3, 2, 1]
        );
    }

    #[test]
    fn operations_do_not_modify_input() {
        let transactions = vec![
            create_test_transaction(2, TransactionType::Expense, 5.0, datetime!(2024-01-03 0:00)),
            create_test_transaction(1, TransactionType::Income, 9.0, datetime!(2024-01-01 0:00)),
        ];
        let before = transactions.clone();

        let first = sort_transactions(&transactions, SortKey::Id, SortOrder::Ascending);
        let second = sort_transactions(&transactions, SortKey::Id, SortOrder::Ascending);

        assert_eq!(first, second);
        assert_eq!(transactions, before);
    }
}
