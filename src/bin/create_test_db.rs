use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::str::FromStr;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;

use bankease_rs::{NewAccount, NewCustomer, create_account, create_customer, initialize_db};

/// A utility for creating a test database for the REST API server of bankease_rs.
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

    println!("Creating test customers and accounts...");

    let customers = [
        (
            NewCustomer {
                customer_number: "1000001".to_owned(),
                title: "Mr".to_owned(),
                first_name: "Max".to_owned(),
                last_name: "Muster".to_owned(),
                street: "Bahnhofstrasse 1".to_owned(),
                city: "Zurich".to_owned(),
                zip_code: 8001,
            },
            vec![
                ("CH 9300 7620 1162 3852 95A", "1000.00", "200.00"),
                ("CH 5500 4320 9123 4567 89B", "250.50", "0.00"),
            ],
        ),
        (
            NewCustomer {
                customer_number: "1000002".to_owned(),
                title: "Ms".to_owned(),
                first_name: "Erika".to_owned(),
                last_name: "Beispiel".to_owned(),
                street: "Seestrasse 42".to_owned(),
                city: "Lucerne".to_owned(),
                zip_code: 6003,
            },
            vec![("CH 1100 2233 4455 6677 89C", "5000.00", "1000.00")],
        ),
    ];

    for (new_customer, accounts) in customers {
        let customer = create_customer(new_customer, &conn)?;

        for (iban, balance, overdraft) in accounts {
            create_account(
                NewAccount {
                    iban: iban.to_owned(),
                    balance: Decimal::from_str(balance)?,
                    overdraft: Decimal::from_str(overdraft)?,
                    customer_id: customer.id,
                },
                &conn,
            )?;
        }
    }

    println!("Success!");

    Ok(())
}
