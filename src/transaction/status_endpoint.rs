//! Defines the endpoint for pausing, resuming or cancelling a transaction.

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
    transaction::{Status, TransactionId, core::update_transaction_status},
};

/// The state needed to update the status of a transaction.
#[derive(Debug, Clone)]
pub struct UpdateStatusState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateStatusState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for a status update.
///
/// Both fields are optional here so that a missing field produces the same
/// error as an empty one. Row IDs start at 1, so an ID of 0 counts as missing.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusData {
    pub id: Option<TransactionId>,
    #[serde(rename = "newStatus")]
    pub new_status: Option<String>,
}

/// A route handler for setting the status of a transaction.
///
/// Responds with `{"message": ..., "updatedTransaction": {"id": ..., "status": ...}}`.
///
/// # Errors
///
/// This function will return a:
/// - [Error::MissingStatusUpdateFields] if the ID or new status is missing,
/// - [Error::InvalidStatus] if the new status is not a known status,
/// - or [Error::UpdateMissingTransaction] if no transaction has the ID.
pub async fn update_status_endpoint(
    State(state): State<UpdateStatusState>,
    data: Result<Json<UpdateStatusData>, JsonRejection>,
) -> Result<Json<Value>, Error> {
    let Json(data) = data.map_err(|rejection| Error::InvalidRequest(rejection.body_text()))?;

    let (id, new_status) = match (data.id, data.new_status.as_deref()) {
        (Some(id), Some(new_status)) if id != 0 && !new_status.is_empty() => (id, new_status),
        _ => return Err(Error::MissingStatusUpdateFields),
    };
    let status: Status = new_status.parse()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    update_transaction_status(id, status, &connection)?;

    tracing::info!("Set status of transaction {id} to {status}");

    Ok(Json(json!({
        "message": "Transaction status updated",
        "updatedTransaction": { "id": id, "status": status },
    })))
}
