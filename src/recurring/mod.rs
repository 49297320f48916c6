//! Recurring transactions: templates that repeat daily, weekly, monthly or
//! yearly, and the materializer that turns them into dated transactions.

mod endpoint;
mod materialize;
mod schedule;
mod scheduler;

pub use endpoint::run_recurring_endpoint;
pub use materialize::{
    MaterializeReport, TemplateFailure, materialize_recurring_transactions, run_materializer,
};
pub use schedule::{days_in_month, next_due_date};
pub use scheduler::{duration_until_next_midnight, spawn_daily_materializer};
