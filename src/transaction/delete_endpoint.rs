use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    transaction::{TransactionId, core::delete_transaction},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteTransactionData {
    pub id: TransactionId,
}

/// A route handler for deleting the transaction whose ID is in the JSON body.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    data: Result<Json<DeleteTransactionData>, JsonRejection>,
) -> Result<Json<Value>, Error> {
    let Json(data) = data.map_err(|rejection| Error::InvalidRequest(rejection.body_text()))?;
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(data.id, &connection)?;
    tracing::info!("Deleted transaction {}", data.id);

    Ok(Json(json!({ "message": "Transaction deleted" })))
}
