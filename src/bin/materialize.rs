use std::process::exit;

use clap::Parser;
use rusqlite::Connection;

use pennywise::{get_local_now, initialize_db, materialize_recurring_transactions, to_wall_clock};

/// Generate the due instances of every active recurring transaction once and exit.
///
/// Intended to be run by an external scheduler, e.g. cron, when the server
/// runs in serverless mode.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH")]
    db_path: String,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    #[arg(long, env = "TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let now = match get_local_now(&args.timezone) {
        Ok(now) => to_wall_clock(now),
        Err(error) => {
            tracing::error!("{error}");
            exit(1);
        }
    };

    let conn = match Connection::open(&args.db_path) {
        Ok(conn) => conn,
        Err(error) => {
            tracing::error!("Could not open database file {}: {error}", args.db_path);
            exit(1);
        }
    };

    if let Err(error) = initialize_db(&conn) {
        tracing::error!("Could not initialize the database: {error}");
        exit(1);
    }

    match materialize_recurring_transactions(now, &conn) {
        Ok(report) => {
            println!(
                "Processed {} template(s), created {} transaction(s).",
                report.templates_processed, report.instances_created
            );

            for failure in &report.failures {
                eprintln!("Template {} failed: {}", failure.template_id, failure.message);
            }

            if !report.failures.is_empty() {
                exit(2);
            }
        }
        Err(error) => {
            tracing::error!("Could not materialize recurring transactions: {error}");
            exit(1);
        }
    }
}
