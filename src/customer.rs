//! Code for creating the customer table and fetching customers from the database.
//!
//! Customers are provisioned outside the application (see the
//! `create_test_db` binary); the app itself only ever reads them.

use rusqlite::{Connection, Row};

use crate::{Error, database_id::CustomerId};

/// A customer of the bank.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    /// The customer's ID in the application database.
    pub id: CustomerId,
    /// The bank-assigned customer number, unique across all customers.
    pub customer_number: String,
    /// The salutation, e.g. "Mr" or "Ms".
    pub title: String,
    /// The customer's first name.
    pub first_name: String,
    /// The customer's last name.
    pub last_name: String,
    /// The street part of the customer's address.
    pub street: String,
    /// The city part of the customer's address.
    pub city: String,
    /// The zip code part of the customer's address.
    pub zip_code: u16,
}

/// The data required to insert a customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    /// The bank-assigned customer number, unique across all customers.
    pub customer_number: String,
    /// The salutation, e.g. "Mr" or "Ms".
    pub title: String,
    /// The customer's first name.
    pub first_name: String,
    /// The customer's last name.
    pub last_name: String,
    /// The street part of the customer's address.
    pub street: String,
    /// The city part of the customer's address.
    pub city: String,
    /// The zip code part of the customer's address.
    pub zip_code: u16,
}

/// Create the customer table.
///
/// # Errors
/// This function will return an error if the SQL query failed.
pub fn create_customer_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS customer (
                id INTEGER PRIMARY KEY,
                customer_number TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                street TEXT NOT NULL,
                city TEXT NOT NULL,
                zip_code INTEGER NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Customer].
pub fn map_row_to_customer(row: &Row) -> Result<Customer, rusqlite::Error> {
    Ok(Customer {
        id: row.get(0)?,
        customer_number: row.get(1)?,
        title: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        street: row.get(5)?,
        city: row.get(6)?,
        zip_code: row.get(7)?,
    })
}

/// Insert a new customer into the database.
///
/// # Errors
/// Returns an [Error::SqlError] if an SQL related error occurred, e.g. the
/// customer number already exists.
pub fn create_customer(customer: NewCustomer, connection: &Connection) -> Result<Customer, Error> {
    connection.execute(
        "INSERT INTO customer (customer_number, title, first_name, last_name, street, city, zip_code)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            &customer.customer_number,
            &customer.title,
            &customer.first_name,
            &customer.last_name,
            &customer.street,
            &customer.city,
            customer.zip_code,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Customer {
        id,
        customer_number: customer.customer_number,
        title: customer.title,
        first_name: customer.first_name,
        last_name: customer.last_name,
        street: customer.street,
        city: customer.city,
        zip_code: customer.zip_code,
    })
}

/// Get the customer from the database with an ID equal to `customer_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `customer_id` does not belong to a customer,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_customer_by_id(
    customer_id: CustomerId,
    connection: &Connection,
) -> Result<Customer, Error> {
    let customer = connection
        .prepare(
            "SELECT id, customer_number, title, first_name, last_name, street, city, zip_code
             FROM customer WHERE id = :id",
        )?
        .query_one(&[(":id", &customer_id)], map_row_to_customer)?;

    Ok(customer)
}

/// Get all customers, ordered by last name.
///
/// Used by the log-in page to build the customer drop-down.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_all_customers(connection: &Connection) -> Result<Vec<Customer>, Error> {
    connection
        .prepare(
            "SELECT id, customer_number, title, first_name, last_name, street, city, zip_code
             FROM customer ORDER BY last_name ASC",
        )?
        .query_map([], map_row_to_customer)?
        .map(|customer_result| customer_result.map_err(Error::from))
        .collect()
}

#[cfg(test)]
pub(crate) fn test_customer(customer_number: &str) -> NewCustomer {
    NewCustomer {
        customer_number: customer_number.to_owned(),
        title: "Mr".to_owned(),
        first_name: "Max".to_owned(),
        last_name: "Muster".to_owned(),
        street: "Bahnhofstrasse 1".to_owned(),
        city: "Zurich".to_owned(),
        zip_code: 8001,
    }
}
