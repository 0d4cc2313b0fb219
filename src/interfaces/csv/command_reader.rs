use crate::domain::directory::{CustomerId, EmployeeId, OfficeId};
use crate::domain::shipment::{ShipmentDraft, ShipmentId, ShipmentPatch, ShipmentStatus};
use crate::error::{Result, ShipmentError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandOp {
    Register,
    Update,
    Status,
    Delete,
}

/// One row of a shipment command CSV.
///
/// Columns: `op, shipment, sender, recipient, registered_by, office,
/// address, weight, status`. Only `op` is always required; which of the rest
/// must be present depends on the op and is checked by the accessors below.
/// `register` rows get sequential ids starting at 1, so later rows in the
/// same file can reference them.
#[derive(Debug, Deserialize, Clone)]
pub struct Command {
    pub op: CommandOp,
    pub shipment: Option<ShipmentId>,
    pub sender: Option<CustomerId>,
    pub recipient: Option<CustomerId>,
    pub registered_by: Option<EmployeeId>,
    pub office: Option<OfficeId>,
    pub address: Option<String>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub weight: Option<Decimal>,
    pub status: Option<ShipmentStatus>,
}

impl Command {
    /// Extracts the fields a `register` row must carry. The destination
    /// stays in its raw two-optional form; the lifecycle validates
    /// exclusivity.
    pub fn draft(&self) -> Result<ShipmentDraft> {
        Ok(ShipmentDraft {
            sender_id: self.required(self.sender, "sender")?,
            recipient_id: self.required(self.recipient, "recipient")?,
            registered_by: self.required(self.registered_by, "registered_by")?,
            address: self.address.clone(),
            office: self.office,
            weight: self.required(self.weight, "weight")?,
        })
    }

    /// Extracts the fields an `update` row must carry. Unlike `register`
    /// rows, no `registered_by` column is needed: updates leave the
    /// registering employee untouched.
    pub fn patch(&self) -> Result<ShipmentPatch> {
        Ok(ShipmentPatch {
            sender_id: self.required(self.sender, "sender")?,
            recipient_id: self.required(self.recipient, "recipient")?,
            address: self.address.clone(),
            office: self.office,
            weight: self.required(self.weight, "weight")?,
        })
    }

    pub fn shipment_id(&self) -> Result<ShipmentId> {
        self.required(self.shipment, "shipment")
    }

    pub fn requested_status(&self) -> Result<ShipmentStatus> {
        self.required(self.status, "status")
    }

    fn required<T: Copy>(&self, value: Option<T>, field: &str) -> Result<T> {
        value.ok_or_else(|| {
            ShipmentError::InvalidCommand(format!("{:?} row missing {field}", self.op))
        })
    }
}

/// Reads shipment commands from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// yielding commands lazily so large batch files stream without loading
/// everything into memory.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(ShipmentError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "op, shipment, sender, recipient, registered_by, office, address, weight, status\n\
                    register, , 1, 2, 1, 10, , 2.75, \n\
                    status, 1, , , , , , , in_transit";
        let reader = CommandReader::new(data.as_bytes());
        let results: Vec<Result<Command>> = reader.commands().collect();
        assert_eq!(results.len(), 2);

        let register = results[0].as_ref().unwrap();
        assert_eq!(register.op, CommandOp::Register);
        let draft = register.draft().unwrap();
        assert_eq!(draft.sender_id, 1);
        assert_eq!(draft.office, Some(10));
        assert_eq!(draft.address, None);
        assert_eq!(draft.weight, dec!(2.75));

        let status = results[1].as_ref().unwrap();
        assert_eq!(status.op, CommandOp::Status);
        assert_eq!(status.shipment_id().unwrap(), 1);
        assert_eq!(status.requested_status().unwrap(), ShipmentStatus::InTransit);
    }

    #[test]
    fn test_reader_malformed_op() {
        let data = "op, shipment, sender, recipient, registered_by, office, address, weight, status\n\
                    teleport, , 1, 2, 1, 10, , 2.75, ";
        let reader = CommandReader::new(data.as_bytes());
        let results: Vec<Result<Command>> = reader.commands().collect();
        assert!(results[0].is_err());
    }

    #[test]
    fn test_missing_required_field() {
        let data = "op, shipment, sender, recipient, registered_by, office, address, weight, status\n\
                    register, , 1, 2, , 10, , 2.75, ";
        let reader = CommandReader::new(data.as_bytes());
        let command = reader.commands().next().unwrap().unwrap();
        assert!(matches!(
            command.draft(),
            Err(ShipmentError::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_update_row_needs_no_registered_by() {
        let data = "op, shipment, sender, recipient, registered_by, office, address, weight, status\n\
                    update, 1, 1, 2, , 10, , 4.00, ";
        let reader = CommandReader::new(data.as_bytes());
        let command = reader.commands().next().unwrap().unwrap();
        assert_eq!(command.shipment_id().unwrap(), 1);
        let patch = command.patch().unwrap();
        assert_eq!(patch.sender_id, 1);
        assert_eq!(patch.recipient_id, 2);
        assert_eq!(patch.office, Some(10));
        assert_eq!(patch.weight, dec!(4.00));
    }

    #[test]
    fn test_address_row() {
        let data = "op, shipment, sender, recipient, registered_by, office, address, weight, status\n\
                    register, , 1, 2, 1, , 12 Main St, 1.50, ";
        let reader = CommandReader::new(data.as_bytes());
        let command = reader.commands().next().unwrap().unwrap();
        let draft = command.draft().unwrap();
        assert_eq!(draft.address.as_deref(), Some("12 Main St"));
        assert_eq!(draft.office, None);
    }
}
