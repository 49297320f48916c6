//! Runs the materializer in the background once at start-up and then every
//! local midnight.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use rusqlite::Connection;
use time::OffsetDateTime;
use time_tz::{Offset, TimeZone};
use tokio::task::JoinHandle;

use crate::timezone::get_timezone;

use super::run_materializer;

const ONE_DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Spawn a task that materializes recurring transactions now and then again
/// at each midnight in `local_timezone`.
///
/// The task runs until the runtime shuts down. Errors are logged and the task
/// waits for the next midnight.
pub fn spawn_daily_materializer(
    db_connection: Arc<Mutex<Connection>>,
    local_timezone: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match run_materializer(&db_connection, &local_timezone) {
                Ok(report) => tracing::info!(
                    "Materialized recurring transactions: {} template(s), {} instance(s) created, {} failure(s)",
                    report.templates_processed,
                    report.instances_created,
                    report.failures.len()
                ),
                Err(error) => {
                    tracing::error!("Could not materialize recurring transactions: {error}")
                }
            }

            let wait = match get_timezone(&local_timezone) {
                Ok(timezone) => duration_until_next_midnight(OffsetDateTime::now_utc(), timezone),
                Err(error) => {
                    tracing::error!("{error}, retrying in one day");
                    ONE_DAY
                }
            };

            tracing::debug!("Next materializer run in {} seconds", wait.as_secs());
            tokio::time::sleep(wait).await;
        }
    })
}

/// The time from `now` until the start of the next day in `timezone`.
///
/// The offset of the next midnight is looked up separately, so the wait is
/// an hour shorter or longer across a daylight saving change.
pub fn duration_until_next_midnight<T: TimeZone>(now: OffsetDateTime, timezone: &T) -> Duration {
    let now = now.to_offset(timezone.get_offset_utc(&now).to_utc());
    let Some(tomorrow) = now.date().next_day() else {
        return ONE_DAY;
    };

    let estimate = tomorrow.midnight().assume_offset(now.offset());
    let offset = timezone.get_offset_utc(&estimate).to_utc();

    (tomorrow.midnight().assume_offset(offset) - now).unsigned_abs()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use time::macros::datetime;

    use crate::{recurring::duration_until_next_midnight, timezone::get_timezone};

    const HOUR: u64 = 60 * 60;

    #[test]
    fn waits_until_next_midnight() {
        let auckland = get_timezone("Pacific/Auckland").unwrap();
        let utc = get_timezone("Etc/UTC").unwrap();

        assert_eq!(
            duration_until_next_midnight(datetime!(2024-04-15 23:30 +12:00), auckland),
            Duration::from_secs(30 * 60)
        );
        assert_eq!(
            duration_until_next_midnight(datetime!(2024-12-31 00:00 UTC), utc),
            Duration::from_secs(24 * HOUR)
        );
    }

    #[test]
    fn converts_now_to_the_local_day() {
        let auckland = get_timezone("Pacific/Auckland").unwrap();

        // 2024-04-15 23:30 in Auckland.
        assert_eq!(
            duration_until_next_midnight(datetime!(2024-04-15 11:30 UTC), auckland),
            Duration::from_secs(30 * 60)
        );
    }

    #[test]
    fn follows_daylight_saving_changes() {
        let auckland = get_timezone("Pacific/Auckland").unwrap();

        // Clocks go back from 03:00 NZDT to 02:00 NZST on 2024-04-07.
        assert_eq!(
            duration_until_next_midnight(datetime!(2024-04-07 01:00 +13:00), auckland),
            Duration::from_secs(24 * HOUR)
        );
        // Clocks go forward from 02:00 NZST to 03:00 NZDT on 2024-09-29.
        assert_eq!(
            duration_until_next_midnight(datetime!(2024-09-29 01:00 +12:00), auckland),
            Duration::from_secs(22 * HOUR)
        );
    }
}
