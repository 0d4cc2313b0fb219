use crate::domain::directory::EntityKind;
use crate::domain::shipment::ShipmentStatus;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShipmentError {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: u64 },
    #[error("invalid destination: {0}")]
    InvalidDestination(&'static str),
    #[error("invalid weight {0} kg: must be greater than 0 and at most 10000")]
    InvalidWeight(Decimal),
    #[error("invalid pricing config: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },
    #[error("invalid status transition: {current} -> {requested}")]
    InvalidStatusTransition {
        current: ShipmentStatus,
        requested: ShipmentStatus,
    },
    #[error("cannot modify a shipment in status {0}")]
    CannotModify(ShipmentStatus),
    #[error("no active pricing configuration")]
    NoActiveConfig,
    #[error("invalid command: {0}")]
    InvalidCommand(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, ShipmentError>;
