//! Defines the endpoint for a filtered, sorted view of the transactions and
//! its totals.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    aggregation::{BalanceMode, BudgetView, DateRange, SortKey, SortOrder, TypeFilter},
    timezone::get_local_now,
    transaction::{Transaction, core::get_all_transactions},
};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The state needed to summarise transactions.
#[derive(Debug, Clone)]
pub struct SummaryState {
    db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    local_timezone: String,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query parameters selecting the view.
///
/// Parameters that are left out keep the defaults of [BudgetView::new].
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    /// The first day to include, e.g. "2024-03-01".
    pub start: Option<String>,
    /// The last day to include, e.g. "2024-03-31".
    pub end: Option<String>,
    #[serde(rename = "type")]
    pub type_filter: Option<TypeFilter>,
    pub sort: Option<SortKey>,
    pub order: Option<SortOrder>,
    pub balance_mode: Option<BalanceMode>,
}

#[derive(Debug, Serialize)]
struct DateRangeSummary {
    start: String,
    end: String,
}

/// The response body of the summary endpoint.
#[derive(Debug, Serialize)]
pub struct Summary {
    range: DateRangeSummary,
    #[serde(rename = "type")]
    type_filter: TypeFilter,
    sort: SortKey,
    order: SortOrder,
    balance_mode: BalanceMode,
    transactions: Vec<Transaction>,
    total_income: f64,
    total_expense: f64,
    balance: f64,
    total_balance: f64,
    displayed_balance: f64,
}

impl Summary {
    fn from_view(view: &BudgetView) -> Self {
        let range = view.date_range();

        Self {
            range: DateRangeSummary {
                start: range.start.date().to_string(),
                end: range.end.date().to_string(),
            },
            type_filter: view.type_filter(),
            sort: view.sort_key(),
            order: view.sort_order(),
            balance_mode: view.balance_mode(),
            transactions: view.filtered_transactions(),
            total_income: view.total_income(),
            total_expense: view.total_expense(),
            balance: view.balance(),
            total_balance: view.total_balance(),
            displayed_balance: view.displayed_balance(),
        }
    }
}

/// A route handler that responds with the transactions selected by the query
/// parameters and the income, expense and balance totals.
///
/// The date range defaults to the current month in the server's timezone.
pub async fn get_summary_endpoint(
    State(state): State<SummaryState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<Summary>, Error> {
    let Query(query) = query.map_err(|rejection| Error::InvalidRequest(rejection.body_text()))?;
    let today = get_local_now(&state.local_timezone)?.date();

    let transactions = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        get_all_transactions(&connection)?
    };

    let view = build_view(transactions, today, &query)?;

    Ok(Json(Summary::from_view(&view)))
}

fn build_view(
    transactions: Vec<Transaction>,
    today: Date,
    query: &SummaryQuery,
) -> Result<BudgetView, Error> {
    let mut view = BudgetView::new(transactions, today);

    let default_range = view.date_range();
    let start = parse_date(query.start.as_deref())?.unwrap_or(default_range.start.date());
    let end = parse_date(query.end.as_deref())?.unwrap_or(default_range.end.date());
    view.set_date_range(DateRange::from_dates(start, end));

    if let Some(type_filter) = query.type_filter {
        view.set_type_filter(type_filter);
    }

    match (query.sort, query.order) {
        (Some(key), Some(order)) => view.set_sort(key, order),
        (Some(key), None) => view.set_sort(key, SortOrder::Ascending),
        (None, Some(order)) => view.set_sort(view.sort_key(), order),
        (None, None) => {}
    }

    if query
        .balance_mode
        .is_some_and(|balance_mode| balance_mode != view.balance_mode())
    {
        view.toggle_balance_mode();
    }

    Ok(view)
}

fn parse_date(text: Option<&str>) -> Result<Option<Date>, Error> {
    text.map(|text| {
        Date::parse(text, DATE_FORMAT)
            .map_err(|error| Error::InvalidRequest(format!("invalid date '{text}': {error}")))
    })
    .transpose()
}
