use crate::domain::directory::{Customer, Employee, Office};
use crate::error::{Result, ShipmentError};
use serde::de::DeserializeOwned;
use std::io::Read;

/// Reads directory seed records (customers, employees, offices) from CSV.
///
/// Customers and employees use `id,name`; offices use `id,address`. The
/// record shapes are the serde entity structs themselves, so the headers
/// must match the field names.
pub struct DirectoryReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> DirectoryReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    fn records<T: DeserializeOwned>(self) -> impl Iterator<Item = Result<T>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(ShipmentError::from))
    }

    pub fn customers(self) -> impl Iterator<Item = Result<Customer>> {
        self.records()
    }

    pub fn employees(self) -> impl Iterator<Item = Result<Employee>> {
        self.records()
    }

    pub fn offices(self) -> impl Iterator<Item = Result<Office>> {
        self.records()
    }
}
