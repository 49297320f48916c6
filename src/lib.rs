//! Pennywise is a personal budget tracker: a JSON API over a SQLite store of
//! income and expense transactions.
//!
//! Transactions may be marked as recurring templates that repeat daily,
//! weekly, monthly or yearly. The [materialize_recurring_transactions]
//! function turns the due periods of each active template into concrete,
//! dated transactions, and [BudgetView] filters, sorts and totals a set of
//! transactions for display.

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod aggregation;
mod app_state;
mod auth;
mod category;
mod database_id;
mod db;
mod endpoints;
mod error;
mod logging;
mod recurring;
mod routing;
mod timezone;
mod transaction;

pub use aggregation::{
    BalanceMode, BudgetView, DateRange, SortKey, SortOrder, TypeFilter, balance,
    filter_by_date_range, filter_by_type, sort_transactions, sum_by_type,
};
pub use app_state::AppState;
pub use category::{CategorySets, UNCATEGORIZED};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use recurring::{
    MaterializeReport, TemplateFailure, days_in_month, materialize_recurring_transactions,
    next_due_date, run_materializer, spawn_daily_materializer,
};
pub use routing::build_router;
pub use timezone::{get_local_now, get_local_offset, to_wall_clock};
pub use transaction::{
    Frequency, MAX_DESCRIPTION_LENGTH, Status, Transaction, TransactionBuilder, TransactionId,
    TransactionType, count_transactions, create_transaction, delete_transaction,
    get_all_transactions, get_transaction, update_transaction_status,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
