use crate::domain::directory::{CustomerId, EmployeeId, OfficeId};
use crate::error::ShipmentError;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ShipmentId = u64;

/// Lifecycle status of a shipment.
///
/// `Delivered` and `Cancelled` are terminal: the transition table has no
/// exits from either, and the shipment's content becomes immutable.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Registered,
    InTransit,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    /// Transition table: current status -> allowed next statuses.
    ///
    /// Kept as a data lookup so adding a status is a table change,
    /// not a control-flow change.
    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Registered => &[Self::InTransit, Self::Cancelled],
            Self::InTransit => &[Self::Delivered, Self::Cancelled],
            Self::Delivered | Self::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, requested: Self) -> bool {
        self.allowed_transitions().contains(&requested)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Registered => "registered",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

/// Delivery target of a shipment: a free-text address or a company office.
///
/// Exactly one of the two, by construction. The incoming two-nullable-field
/// form is validated once in [`Destination::from_parts`] instead of at every
/// call site.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Address(String),
    Office(OfficeId),
}

impl Destination {
    pub fn from_parts(
        address: Option<String>,
        office: Option<OfficeId>,
    ) -> Result<Self, ShipmentError> {
        match (address, office) {
            (Some(address), None) => Ok(Self::Address(address)),
            (None, Some(office)) => Ok(Self::Office(office)),
            _ => Err(ShipmentError::InvalidDestination(
                "must specify exactly one of address or office",
            )),
        }
    }

    pub const fn is_office(&self) -> bool {
        matches!(self, Self::Office(_))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(address) => write!(f, "{address}"),
            Self::Office(office) => write!(f, "office:{office}"),
        }
    }
}

/// Shipment weight in kilograms, scale 2, bounded `(0, 10000]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Weight(Decimal);

impl Weight {
    pub const MAX_KG: Decimal = Decimal::from_parts(10000, 0, 0, false, 0);

    /// Rounds the raw value half-up to 2 decimal places, then checks bounds.
    pub fn new(value: Decimal) -> Result<Self, ShipmentError> {
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if rounded > Decimal::ZERO && rounded <= Self::MAX_KG {
            Ok(Self(rounded))
        } else {
            Err(ShipmentError::InvalidWeight(value))
        }
    }

    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Weight {
    type Error = ShipmentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Weight> for Decimal {
    fn from(weight: Weight) -> Self {
        weight.0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted shipment record.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Shipment {
    /// Store-assigned identifier, immutable after creation.
    pub id: ShipmentId,
    pub sender_id: CustomerId,
    pub recipient_id: CustomerId,
    /// Employee who created the record, immutable after creation.
    pub registered_by: EmployeeId,
    pub destination: Destination,
    pub weight: Weight,
    /// Always derived from the pricing engine, never caller-supplied.
    pub price: Decimal,
    pub status: ShipmentStatus,
    pub registered_at: DateTime<Utc>,
    /// Set exactly once when the shipment enters `Delivered`, never cleared.
    pub delivered_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Incoming registration data as supplied by the caller, before validation.
///
/// Carries the destination in its raw two-optional-field form; registration
/// turns it into a [`Destination`] and a [`Weight`].
#[derive(Debug, Deserialize, Clone)]
pub struct ShipmentDraft {
    pub sender_id: CustomerId,
    pub recipient_id: CustomerId,
    pub registered_by: EmployeeId,
    pub address: Option<String>,
    pub office: Option<OfficeId>,
    pub weight: Decimal,
}

impl ShipmentDraft {
    /// The content fields a draft shares with a [`ShipmentPatch`].
    pub fn as_patch(&self) -> ShipmentPatch {
        ShipmentPatch {
            sender_id: self.sender_id,
            recipient_id: self.recipient_id,
            address: self.address.clone(),
            office: self.office,
            weight: self.weight,
        }
    }
}

/// Replacement content for an existing shipment.
///
/// Updates rewrite parties, destination, and weight; the registering
/// employee is part of the registration record and is never patched.
#[derive(Debug, Deserialize, Clone)]
pub struct ShipmentPatch {
    pub sender_id: CustomerId,
    pub recipient_id: CustomerId,
    pub address: Option<String>,
    pub office: Option<OfficeId>,
    pub weight: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transition_table() {
        use ShipmentStatus::*;
        assert!(Registered.can_transition_to(InTransit));
        assert!(Registered.can_transition_to(Cancelled));
        assert!(!Registered.can_transition_to(Delivered));
        assert!(InTransit.can_transition_to(Delivered));
        assert!(InTransit.can_transition_to(Cancelled));
        assert!(!InTransit.can_transition_to(Registered));
        assert!(Delivered.allowed_transitions().is_empty());
        assert!(Cancelled.allowed_transitions().is_empty());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!ShipmentStatus::Registered.is_terminal());
        assert!(!ShipmentStatus::InTransit.is_terminal());
        assert!(ShipmentStatus::Delivered.is_terminal());
        assert!(ShipmentStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_destination_exactly_one() {
        let address = Destination::from_parts(Some("12 Main St".into()), None).unwrap();
        assert_eq!(address, Destination::Address("12 Main St".into()));
        assert!(!address.is_office());

        let office = Destination::from_parts(None, Some(3)).unwrap();
        assert_eq!(office, Destination::Office(3));
        assert!(office.is_office());

        assert!(matches!(
            Destination::from_parts(None, None),
            Err(ShipmentError::InvalidDestination(_))
        ));
        assert!(matches!(
            Destination::from_parts(Some("12 Main St".into()), Some(3)),
            Err(ShipmentError::InvalidDestination(_))
        ));
    }

    #[test]
    fn test_weight_bounds() {
        assert!(Weight::new(dec!(0.01)).is_ok());
        assert!(Weight::new(dec!(10000)).is_ok());
        assert!(matches!(
            Weight::new(dec!(0)),
            Err(ShipmentError::InvalidWeight(_))
        ));
        assert!(matches!(
            Weight::new(dec!(-1.5)),
            Err(ShipmentError::InvalidWeight(_))
        ));
        assert!(matches!(
            Weight::new(dec!(10000.01)),
            Err(ShipmentError::InvalidWeight(_))
        ));
    }

    #[test]
    fn test_weight_rescales_to_two_decimals() {
        assert_eq!(Weight::new(dec!(2.755)).unwrap().value(), dec!(2.76));
        // Rounds to 0.00, which fails the lower bound.
        assert!(Weight::new(dec!(0.001)).is_err());
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&ShipmentStatus::InTransit).unwrap();
        assert_eq!(json, "\"in_transit\"");
        let status: ShipmentStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, ShipmentStatus::Cancelled);
    }
}
