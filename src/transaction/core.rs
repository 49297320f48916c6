//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, category::CategorySets, database_id::TransactionId};

use super::timestamp;

/// The maximum number of characters allowed in a transaction description.
pub const MAX_DESCRIPTION_LENGTH: usize = 100;

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, e.g. wages.
    Income,
    /// Money spent, e.g. rent.
    Expense,
}

impl TransactionType {
    /// The name used for this type in the database and the JSON API.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

/// How often a recurring transaction repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every day.
    Daily,
    /// Every seven days.
    Weekly,
    /// A calendar month of variable length.
    #[default]
    Monthly,
    /// A calendar year.
    Yearly,
}

impl Frequency {
    /// The name used for this frequency in the database and the JSON API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

/// Whether a recurring template is still being materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Due instances are generated.
    #[default]
    Active,
    /// No instances are generated until the template is made active again.
    Paused,
    /// The recurring obligation has ended.
    Canceled,
}

impl Status {
    /// The name used for this status in the database and the JSON API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Paused => "paused",
            Status::Canceled => "canceled",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(Error::InvalidFrequency(other.to_owned())),
        }
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Status::Active),
            "paused" => Ok(Status::Paused),
            "canceled" => Ok(Status::Canceled),
            other => Err(Error::InvalidStatus(other.to_owned())),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl ToSql for Frequency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

impl FromSql for Frequency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// A transaction with `is_recurring` set is a template for a recurring
/// obligation rather than a spend/income event itself; the concrete, dated
/// instances generated from it are separate transactions.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The amount of money spent or earned in this transaction, always positive.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    #[serde(with = "timestamp")]
    pub date: PrimitiveDateTime,
    /// The category from the set of categories for `transaction_type`, or
    /// [crate::category::UNCATEGORIZED].
    pub category: String,
    /// Whether this transaction is a template for a recurring transaction.
    pub is_recurring: bool,
    /// How often the template repeats. Ignored for non-recurring transactions.
    pub frequency: Frequency,
    /// Whether instances of the template are still generated.
    pub status: Status,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        transaction_type: TransactionType,
        amount: f64,
        date: PrimitiveDateTime,
        category: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            transaction_type,
            amount,
            description: String::new(),
            date,
            category: category.to_owned(),
            is_recurring: false,
            frequency: Frequency::default(),
            status: Status::default(),
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// # Examples
///
/// ```ignore
/// use time::macros::datetime;
///
/// use crate::transaction::{Frequency, Transaction, TransactionType};
///
/// let rent = Transaction::build(TransactionType::Expense, 450.0, datetime!(2024-01-01 0:00), "Rent")
///     .description("Weekly rent")
///     .recurring(Frequency::Weekly);
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether the money was earned or spent.
    pub transaction_type: TransactionType,

    /// The amount of money, must be positive.
    pub amount: f64,

    /// A human-readable description of the transaction.
    ///
    /// Defaults to an empty string. At most [MAX_DESCRIPTION_LENGTH]
    /// characters.
    pub description: String,

    /// When the transaction occurred. For recurring templates this is the
    /// start of the schedule.
    pub date: PrimitiveDateTime,

    /// The category of the transaction, e.g. "Salary", "Food", "Rent".
    pub category: String,

    /// Whether the transaction is a recurring template.
    pub is_recurring: bool,

    /// How often a recurring template repeats.
    pub frequency: Frequency,

    /// Whether a recurring template is materialized.
    pub status: Status,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Mark the transaction as a recurring template repeating every `frequency`.
    pub fn recurring(mut self, frequency: Frequency) -> Self {
        self.is_recurring = true;
        self.frequency = frequency;
        self
    }

    /// Set the status for the transaction.
    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Check the amount, the description length and the category against
    /// the allowed `categories`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAmount] if the amount is not a positive, finite number,
    /// - or [Error::DescriptionTooLong] if the description is longer than [MAX_DESCRIPTION_LENGTH],
    /// - or [Error::InvalidCategory] if the category is not allowed for the transaction type.
    pub fn validate(&self, categories: &CategorySets) -> Result<(), Error> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidAmount(self.amount));
        }

        let length = self.description.graphemes(true).count();
        if length > MAX_DESCRIPTION_LENGTH {
            return Err(Error::DescriptionTooLong {
                length,
                max: MAX_DESCRIPTION_LENGTH,
            });
        }

        categories.validate(self.transaction_type, &self.category)
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_COLUMNS: &str =
    "id, type, amount, description, date, category, is_recurring, frequency, status";

/// Create a new transaction in the database from a builder.
///
/// The builder is not validated against the category sets here, callers
/// accepting user input should call [TransactionBuilder::validate] first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error,
/// including a violated CHECK constraint on the amount.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "INSERT INTO transactions (type, amount, description, date, category, is_recurring, frequency, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            (
                builder.transaction_type,
                builder.amount,
                builder.description,
                builder.date,
                builder.category,
                builder.is_recurring,
                builder.frequency,
                builder.status,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions WHERE id = :id"
        ))?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve every transaction in the database, ordered by ID.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions ORDER BY id ASC"
        ))?
        .query_map([], map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM transactions;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Delete the transaction with `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM transactions WHERE id = :id", &[(":id", &id)])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Set the status of the transaction with `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction_status(
    id: TransactionId,
    status: Status,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE transactions SET status = ?1 WHERE id = ?2",
        (status, id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction(id));
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// The frequency column is deliberately unconstrained text so that a row with
/// an unknown frequency only stops the materialization of that one template.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                amount REAL NOT NULL CHECK (amount > 0),
                description TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL,
                category TEXT NOT NULL,
                is_recurring INTEGER NOT NULL DEFAULT 0,
                frequency TEXT NOT NULL DEFAULT 'monthly',
                status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'paused', 'canceled'))
                )",
        (),
    )?;

    // Used by the materializer to find the latest generated instance of a template.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_instance_match
         ON transactions(description, amount, category, is_recurring, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// The row must contain the columns in the order of `SELECT_COLUMNS`.
///
/// An unknown frequency, which can only be written outside this crate, is
/// read as the default frequency so the rest of the set can still be read.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id: TransactionId = row.get(0)?;
    let raw_frequency: String = row.get(7)?;
    let frequency = raw_frequency.parse::<Frequency>().unwrap_or_else(|error| {
        tracing::warn!("Transaction {id} has an unreadable frequency: {error}");
        Frequency::default()
    });

    Ok(Transaction {
        id,
        transaction_type: row.get(1)?,
        amount: row.get(2)?,
        description: row.get(3)?,
        date: row.get(4)?,
        category: row.get(5)?,
        is_recurring: row.get(6)?,
        frequency,
        status: row.get(8)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod model_tests {
    use time::macros::datetime;

    use crate::{
        Error,
        category::CategorySets,
        transaction::{Frequency, Status, Transaction, TransactionType},
    };

    #[test]
    fn builder_defaults_to_a_once_off_active_transaction() {
        let builder = Transaction::build(
            TransactionType::Income,
            100.0,
            datetime!(2024-01-01 00:00),
            "Salary",
        );

        assert!(!builder.is_recurring);
        assert_eq!(builder.frequency, Frequency::Monthly);
        assert_eq!(builder.status, Status::Active);
        assert_eq!(builder.description, "");
    }

    #[test]
    fn validate_rejects_category_of_other_type() {
        let builder = Transaction::build(
            TransactionType::Income,
            100.0,
            datetime!(2024-01-01 00:00),
            "Rent",
        );

        assert_eq!(
            builder.validate(&CategorySets::default()),
            Err(Error::InvalidCategory {
                category: "Rent".to_owned(),
                transaction_type: TransactionType::Income
            })
        );
    }

    #[test]
    fn validate_rejects_non_positive_amounts() {
        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let builder = Transaction::build(
                TransactionType::Expense,
                amount,
                datetime!(2024-01-01 00:00),
                "Food",
            );

            assert!(
                matches!(
                    builder.validate(&CategorySets::default()),
                    Err(Error::InvalidAmount(_))
                ),
                "amount {amount} should be rejected"
            );
        }
    }

    #[test]
    fn validate_counts_graphemes_not_bytes() {
        let categories = CategorySets::default();
        let builder = Transaction::build(
            TransactionType::Expense,
            1.0,
            datetime!(2024-01-01 00:00),
            "Food",
        );

        let accented = "é".repeat(100);
        assert!(builder.clone().description(&accented).validate(&categories).is_ok());

        let too_long = "a".repeat(101);
        assert_eq!(
            builder.description(&too_long).validate(&categories),
            Err(Error::DescriptionTooLong {
                length: 101,
                max: 100
            })
        );
    }

    #[test]
    fn serializes_with_api_field_names() {
        let transaction = Transaction {
            id: 1,
            transaction_type: TransactionType::Expense,
            amount: 12.5,
            description: "Lunch".to_owned(),
            date: datetime!(2024-03-01 12:30),
            category: "Food".to_owned(),
            is_recurring: false,
            frequency: Frequency::Monthly,
            status: Status::Active,
        };

        let json = serde_json::to_value(&transaction).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "type": "expense",
                "amount": 12.5,
                "description": "Lunch",
                "date": "2024-03-01T12:30:00",
                "category": "Food",
                "is_recurring": false,
                "frequency": "monthly",
                "status": "active"
            })
        );
    }

    #[test]
    fn parses_enum_names() {
        assert_eq!("yearly".parse::<Frequency>(), Ok(Frequency::Yearly));
        assert_eq!("paused".parse::<Status>(), Ok(Status::Paused));
        assert_eq!(
            "fortnightly".parse::<Frequency>(),
            Err(Error::InvalidFrequency("fortnightly".to_owned()))
        );
    }
}

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        db::initialize,
        transaction::{
            Frequency, Status, Transaction, TransactionType, count_transactions,
            create_transaction, delete_transaction, get_all_transactions, get_transaction,
            update_transaction_status,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let builder = Transaction::build(
            TransactionType::Expense,
            12.3,
            datetime!(2025-10-05 09:15),
            "Food",
        )
        .description("Coffee");

        let transaction = create_transaction(builder, &conn).expect("Could not create transaction");

        assert_eq!(transaction.id, 1);
        assert_eq!(transaction.amount, 12.3);
        assert_eq!(transaction.date, datetime!(2025-10-05 09:15));
        assert_eq!(transaction.description, "Coffee");
        assert_eq!(get_transaction(transaction.id, &conn), Ok(transaction));
    }

    #[test]
    fn create_round_trips_recurring_fields() {
        let conn = get_test_connection();
        let builder = Transaction::build(
            TransactionType::Expense,
            450.0,
            datetime!(2025-01-01 00:00),
            "Rent",
        )
        .recurring(Frequency::Weekly)
        .status(Status::Paused);

        let transaction = create_transaction(builder, &conn).unwrap();
        let got = get_transaction(transaction.id, &conn).unwrap();

        assert!(got.is_recurring);
        assert_eq!(got.frequency, Frequency::Weekly);
        assert_eq!(got.status, Status::Paused);
    }

    #[test]
    fn create_fails_on_non_positive_amount() {
        let conn = get_test_connection();

        let result = create_transaction(
            Transaction::build(
                TransactionType::Expense,
                -5.0,
                datetime!(2025-10-05 00:00),
                "Food",
            ),
            &conn,
        );

        assert!(matches!(result, Err(Error::SqlError(_))));
        assert_eq!(count_transactions(&conn), Ok(0));
    }

    #[test]
    fn get_missing_transaction_returns_not_found() {
        let conn = get_test_connection();

        assert_eq!(get_transaction(42, &conn), Err(Error::NotFound));
    }

    #[test]
    fn get_all_orders_by_id() {
        let conn = get_test_connection();
        for (i, date) in [
            datetime!(2025-03-01 00:00),
            datetime!(2025-01-01 00:00),
            datetime!(2025-02-01 00:00),
        ]
        .into_iter()
        .enumerate()
        {
            create_transaction(
                Transaction::build(TransactionType::Income, (i + 1) as f64, date, "Salary"),
                &conn,
            )
            .unwrap();
        }

        let got = get_all_transactions(&conn).unwrap();

        let ids: Vec<_> = got.iter().map(|transaction| transaction.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(
                Transaction::build(
                    TransactionType::Expense,
                    i as f64,
                    datetime!(2025-10-05 00:00),
                    "Food",
                ),
                &conn,
            )
            .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }

    #[test]
    fn delete_removes_transaction() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            Transaction::build(
                TransactionType::Expense,
                1.23,
                datetime!(2025-10-26 00:00),
                "Food",
            ),
            &conn,
        )
        .unwrap();

        delete_transaction(transaction.id, &conn).unwrap();

        assert_eq!(get_transaction(transaction.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_transaction_leaves_store_unchanged() {
        let conn = get_test_connection();
        create_transaction(
            Transaction::build(
                TransactionType::Expense,
                1.23,
                datetime!(2025-10-26 00:00),
                "Food",
            ),
            &conn,
        )
        .unwrap();

        let result = delete_transaction(1337, &conn);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
        assert_eq!(count_transactions(&conn), Ok(1));
    }

    #[test]
    fn update_status_changes_only_status() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            Transaction::build(
                TransactionType::Expense,
                9.99,
                datetime!(2025-01-01 00:00),
                "Entertainment",
            )
            .recurring(Frequency::Monthly),
            &conn,
        )
        .unwrap();

        update_transaction_status(transaction.id, Status::Canceled, &conn).unwrap();

        let got = get_transaction(transaction.id, &conn).unwrap();
        assert_eq!(
            got,
            Transaction {
                status: Status::Canceled,
                ..transaction
            }
        );
    }

    #[test]
    fn update_status_of_missing_transaction_fails() {
        let conn = get_test_connection();

        assert_eq!(
            update_transaction_status(7, Status::Paused, &conn),
            Err(Error::UpdateMissingTransaction(7))
        );
    }
}
