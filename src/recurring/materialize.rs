//! Generates the concrete, dated transactions that recurring templates owe.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;
use time::PrimitiveDateTime;

use crate::{
    Error,
    timezone::{get_local_now, to_wall_clock},
    transaction::{Frequency, Transaction, TransactionId, TransactionType, create_transaction},
};

use super::next_due_date;

/// The outcome of one materializer run.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct MaterializeReport {
    /// The number of active templates that were examined.
    pub templates_processed: u32,
    /// The number of transactions inserted across all templates.
    pub instances_created: u32,
    /// The templates whose catch-up stopped early, and why.
    pub failures: Vec<TemplateFailure>,
}

/// A template whose catch-up was abandoned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateFailure {
    pub template_id: TransactionId,
    pub message: String,
}

/// An active recurring template.
///
/// The frequency is kept as the raw column text so that a row holding an
/// unknown frequency fails on its own instead of failing the whole query.
#[derive(Debug, Clone, PartialEq)]
struct Template {
    id: TransactionId,
    transaction_type: TransactionType,
    amount: f64,
    description: String,
    date: PrimitiveDateTime,
    category: String,
    frequency: String,
}

/// Lock the database and materialize every due instance up to the current
/// wall-clock time in `local_timezone`.
///
/// # Errors
/// Returns an:
/// - [Error::InvalidTimezoneError] if `local_timezone` is not a known timezone,
/// - [Error::DatabaseLockError] if the database lock is poisoned,
/// - or any error from [materialize_recurring_transactions].
pub fn run_materializer(
    db_connection: &Arc<Mutex<Connection>>,
    local_timezone: &str,
) -> Result<MaterializeReport, Error> {
    let now = to_wall_clock(get_local_now(local_timezone)?);
    let connection = db_connection.lock().map_err(|_| Error::DatabaseLockError)?;

    materialize_recurring_transactions(now, &connection)
}

/// Insert every instance of every active recurring template that is due at or
/// before `now`.
///
/// Each template continues from its most recent instance, or from its own
/// date if it has none yet, so running this again inserts nothing new until
/// another period has elapsed. An instance is matched to its template by
/// description, amount and category.
///
/// A template that fails, e.g. because its frequency is not recognised, is
/// logged and recorded in the report, and the run moves on to the next
/// template. Instances inserted before the failure are kept.
///
/// # Errors
/// Returns an [Error::SqlError] if the active templates cannot be read.
pub fn materialize_recurring_transactions(
    now: PrimitiveDateTime,
    connection: &Connection,
) -> Result<MaterializeReport, Error> {
    let templates = get_active_templates(connection)?;
    let mut report = MaterializeReport::default();

    for template in templates {
        report.templates_processed += 1;

        let mut instances_created = 0;
        let result = materialize_template(&template, now, connection, &mut instances_created);
        report.instances_created += instances_created;

        match result {
            Ok(()) if instances_created > 0 => tracing::info!(
                "Created {instances_created} instance(s) of recurring transaction {}",
                template.id
            ),
            Ok(()) => {}
            Err(error) => {
                tracing::error!(
                    "Could not materialize recurring transaction {}: {error}",
                    template.id
                );
                report.failures.push(TemplateFailure {
                    template_id: template.id,
                    message: error.to_string(),
                });
            }
        }
    }

    Ok(report)
}

fn materialize_template(
    template: &Template,
    now: PrimitiveDateTime,
    connection: &Connection,
    instances_created: &mut u32,
) -> Result<(), Error> {
    let frequency: Frequency = template.frequency.parse()?;
    let anchor = get_latest_instance_date(template, connection)?.unwrap_or(template.date);
    let mut due_date = next_due_date(anchor, frequency)?;

    while due_date <= now {
        create_transaction(
            Transaction::build(
                template.transaction_type,
                template.amount,
                due_date,
                &template.category,
            )
            .description(&template.description),
            connection,
        )?;
        *instances_created += 1;

        due_date = next_due_date(due_date, frequency)?;
    }

    Ok(())
}

fn get_active_templates(connection: &Connection) -> Result<Vec<Template>, Error> {
    connection
        .prepare(
            "SELECT id, type, amount, description, date, category, frequency
             FROM transactions
             WHERE is_recurring = 1 AND status = 'active'
             ORDER BY id ASC",
        )?
        .query_map([], map_template_row)?
        .map(|template_result| template_result.map_err(Error::SqlError))
        .collect()
}

fn map_template_row(row: &Row) -> Result<Template, rusqlite::Error> {
    Ok(Template {
        id: row.get(0)?,
        transaction_type: row.get(1)?,
        amount: row.get(2)?,
        description: row.get(3)?,
        date: row.get(4)?,
        category: row.get(5)?,
        frequency: row.get(6)?,
    })
}

fn get_latest_instance_date(
    template: &Template,
    connection: &Connection,
) -> Result<Option<PrimitiveDateTime>, Error> {
    connection
        .query_row(
            "SELECT date FROM transactions
             WHERE description = ?1 AND amount = ?2 AND category = ?3 AND is_recurring = 0
             ORDER BY date DESC
             LIMIT 1",
            (&template.description, template.amount, &template.category),
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
}
