use serde::{Deserialize, Serialize};
use std::fmt;

pub type CustomerId = u32;
pub type EmployeeId = u32;
pub type OfficeId = u32;

/// Names the entity kind missing from a failed reference lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Customer,
    Employee,
    Office,
    Shipment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Customer => "customer",
            Self::Employee => "employee",
            Self::Office => "office",
            Self::Shipment => "shipment",
        };
        write!(f, "{name}")
    }
}


#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Office {
    pub id: OfficeId,
    pub address: String,
}
