use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::datetime;

use pennywise::{Frequency, Status, Transaction, TransactionType, create_transaction, initialize_db};

/// A utility for creating a test database for the JSON API server of pennywise.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating sample transactions...");

    let transactions = [
        Transaction::build(
            TransactionType::Income,
            3200.0,
            datetime!(2025-01-15 09:00),
            "Salary",
        )
        .description("Monthly salary")
        .recurring(Frequency::Monthly),
        Transaction::build(
            TransactionType::Expense,
            420.0,
            datetime!(2025-01-06 00:00),
            "Rent",
        )
        .description("Weekly rent")
        .recurring(Frequency::Weekly),
        Transaction::build(
            TransactionType::Expense,
            15.99,
            datetime!(2025-01-03 00:00),
            "Entertainment",
        )
        .description("Streaming subscription")
        .recurring(Frequency::Monthly)
        .status(Status::Paused),
        Transaction::build(
            TransactionType::Expense,
            86.40,
            datetime!(2025-01-11 17:45),
            "Food",
        )
        .description("Groceries"),
        Transaction::build(
            TransactionType::Income,
            250.0,
            datetime!(2025-01-20 12:00),
            "Freelance",
        )
        .description("Logo design"),
    ];

    for transaction in transactions {
        create_transaction(transaction, &conn)?;
    }

    println!("Success!");

    Ok(())
}
