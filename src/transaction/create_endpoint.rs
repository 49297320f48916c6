//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};
use time::PrimitiveDateTime;

use crate::{
    AppState, Error,
    category::CategorySets,
    transaction::{
        Frequency, Status, Transaction, TransactionType, core::create_transaction, timestamp,
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The categories each transaction type may use.
    pub categories: Arc<CategorySets>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            categories: state.categories.clone(),
        }
    }
}

/// The request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionData {
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The value of the transaction in dollars.
    pub amount: f64,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: String,
    /// When the transaction ocurred.
    #[serde(with = "timestamp")]
    pub date: PrimitiveDateTime,
    pub category: String,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub status: Status,
}

/// A route handler for creating a new transaction.
///
/// Responds with 201 and `{"message": "Transaction added", "transaction": ...}`
/// holding the stored transaction and its new ID.
///
/// # Errors
///
/// Returns an error and stores nothing if the body is malformed or the
/// transaction fails validation.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    data: Result<Json<TransactionData>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let Json(data) = data.map_err(|rejection| Error::InvalidRequest(rejection.body_text()))?;

    let mut builder = Transaction::build(
        data.transaction_type,
        data.amount,
        data.date,
        &data.category,
    )
    .description(&data.description)
    .status(data.status);

    if data.is_recurring {
        builder = builder.recurring(data.frequency);
    }

    builder.validate(&state.categories)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    let transaction = create_transaction(builder, &connection)?;

    tracing::info!(
        "Created {} transaction {} for {}",
        transaction.transaction_type,
        transaction.id,
        transaction.amount
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Transaction added", "transaction": transaction })),
    ))
}
