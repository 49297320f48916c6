//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - The JSON route handlers for listing, creating, deleting and summarising transactions

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;
mod status_endpoint;
mod summary_endpoint;
pub(crate) mod timestamp;

pub use core::{
    Frequency, MAX_DESCRIPTION_LENGTH, Status, Transaction, TransactionBuilder, TransactionType,
    count_transactions, create_transaction, create_transaction_table, delete_transaction,
    get_all_transactions, get_transaction, update_transaction_status,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use status_endpoint::update_status_endpoint;
pub use summary_endpoint::get_summary_endpoint;

pub use crate::database_id::TransactionId;
