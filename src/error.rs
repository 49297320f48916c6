//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{database_id::TransactionId, transaction::TransactionType};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The passcode submitted at log-in did not match the configured passcode.
    #[error("Incorrect passcode")]
    IncorrectPasscode,

    /// The request did not carry a valid, unexpired auth cookie.
    #[error("Unauthorized")]
    Unauthorized,

    /// There was an error formatting or parsing the expiry of an auth token.
    #[error("could not process the auth token expiry: {0}")]
    InvalidTokenExpiry(String),

    /// The request body could not be parsed, e.g. a required field such as
    /// `amount` is missing or has the wrong type.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The string is not one of "income" or "expense".
    #[error("'{0}' is not a valid transaction type")]
    InvalidTransactionType(String),

    /// The category is not in the set of allowed categories for the
    /// transaction type.
    #[error("Invalid category '{category}' for type '{transaction_type}'")]
    InvalidCategory {
        /// The rejected category.
        category: String,
        /// The type the category was checked against.
        transaction_type: TransactionType,
    },

    /// Transaction amounts must be positive, finite numbers.
    #[error("Amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    /// The description exceeds [crate::transaction::MAX_DESCRIPTION_LENGTH] characters.
    #[error(
        "You have reached the maximum characters allowed for a description ({max} characters), got {length}"
    )]
    DescriptionTooLong {
        /// The number of characters in the rejected description.
        length: usize,
        /// The maximum number of characters allowed.
        max: usize,
    },

    /// A status update request was missing the transaction ID or the new status.
    #[error("Missing transaction ID or status")]
    MissingStatusUpdateFields,

    /// The string is not one of "active", "paused" or "canceled".
    #[error("'{0}' is not a valid status")]
    InvalidStatus(String),

    /// The string is not one of "daily", "weekly", "monthly" or "yearly".
    #[error("'{0}' is not a valid frequency")]
    InvalidFrequency(String),

    /// Adding a billing period to a date went outside the supported date range.
    #[error("the next due date after {0} is out of range")]
    DateOutOfRange(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a transaction that does not exist.
    #[error("Transaction not found")]
    DeleteMissingTransaction,

    /// Tried to update the status of a transaction that does not exist.
    #[error("transaction {0} not found")]
    UpdateMissingTransaction(TransactionId),

    /// The category configuration file could not be read or parsed.
    #[error("could not load the category configuration: {0}")]
    CategoryConfig(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code that callers receive for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::IncorrectPasscode | Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::InvalidRequest(_)
            | Error::InvalidTransactionType(_)
            | Error::InvalidCategory { .. }
            | Error::InvalidAmount(_)
            | Error::DescriptionTooLong { .. }
            | Error::MissingStatusUpdateFields
            | Error::InvalidStatus(_)
            | Error::InvalidFrequency(_)
            | Error::DateOutOfRange(_) => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingTransaction(_) => StatusCode::NOT_FOUND,
            Error::InvalidTokenExpiry(_)
            | Error::CategoryConfig(_)
            | Error::InvalidTimezoneError(_)
            | Error::DatabaseLockError
            | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = match self {
            Error::InvalidTimezoneError(timezone) => format!(
                "Could not get local timezone \"{timezone}\". Check your server settings and \
                ensure the timezone has been set to valid, canonical timezone string"
            ),
            // Internal errors are not intended to be shown to the client.
            error if status_code.is_server_error() => {
                tracing::error!("An unexpected error occurred: {}", error);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            error => error.to_string(),
        };

        (status_code, Json(json!({ "message": message }))).into_response()
    }
}
