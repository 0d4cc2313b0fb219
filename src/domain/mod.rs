pub mod directory;
pub mod ports;
pub mod pricing;
pub mod shipment;
