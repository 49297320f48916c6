//! The API endpoints URIs.

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for logging in with the passcode.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to list, create, delete and update the status of transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route for the filtered view of transactions and its totals.
pub const TRANSACTIONS_SUMMARY: &str = "/api/transactions/summary";
/// The route to generate the due instances of recurring transactions.
pub const RUN_RECURRING: &str = "/api/recurring/run";
