use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{AppState, Error};

use super::{MaterializeReport, run_materializer};

/// The state needed to run the materializer on demand.
#[derive(Debug, Clone)]
pub struct RecurringState {
    db_connection: Arc<Mutex<Connection>>,
    local_timezone: String,
}

impl FromRef<AppState> for RecurringState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler that materializes every due recurring transaction and
/// responds with the run's report.
///
/// This is how recurring transactions are kept up to date when the server
/// runs without its background task, e.g. from an external cron job.
pub async fn run_recurring_endpoint(
    State(state): State<RecurringState>,
) -> Result<Json<MaterializeReport>, Error> {
    run_materializer(&state.db_connection, &state.local_timezone).map(Json)
}
