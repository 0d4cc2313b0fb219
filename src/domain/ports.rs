use crate::domain::directory::{Customer, CustomerId, Employee, EmployeeId, Office, OfficeId};
use crate::domain::pricing::{PricingConfig, PricingRates};
use crate::domain::shipment::{Shipment, ShipmentId};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Mutation applied to a shipment row under the store's write lock.
pub type ShipmentUpdate<'a> = &'a (dyn Fn(&mut Shipment) -> Result<()> + Send + Sync);

/// Persistence port for shipment rows.
///
/// `update_with` is the row-lock seam: the store reads the row, applies the
/// closure, and writes it back as one atomic unit, so read-modify-write
/// sequences (status transitions in particular) cannot race each other.
#[async_trait]
pub trait ShipmentStore: Send + Sync {
    /// Reserves the next sequential shipment id.
    async fn next_id(&self) -> Result<ShipmentId>;
    async fn insert(&self, shipment: Shipment) -> Result<()>;
    async fn get(&self, id: ShipmentId) -> Result<Option<Shipment>>;
    /// Applies `update` to the row atomically and returns the updated row.
    /// Fails `NotFound` if the row is absent; a closure error leaves the
    /// row untouched.
    async fn update_with(&self, id: ShipmentId, update: ShipmentUpdate<'_>) -> Result<Shipment>;
    /// Hard removal. Fails `NotFound` if the row is absent.
    async fn remove(&self, id: ShipmentId) -> Result<()>;
    async fn all(&self) -> Result<Vec<Shipment>>;
}

/// Persistence port for the append-only pricing config history.
#[async_trait]
pub trait PricingConfigStore: Send + Sync {
    /// The single currently active config, if any.
    async fn active(&self) -> Result<Option<PricingConfig>>;
    /// Deactivates the current active config and inserts a new active one
    /// built from `rates`, as one atomic unit: concurrent readers never
    /// observe zero or two active rows, and concurrent replacements
    /// serialize (last committed wins).
    async fn replace_active(&self, rates: PricingRates) -> Result<PricingConfig>;
    /// Full config history, oldest first.
    async fn history(&self) -> Result<Vec<PricingConfig>>;
}

/// Read-only reference lookups owned by the excluded CRUD layer.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn customer(&self, id: CustomerId) -> Result<Option<Customer>>;
    async fn employee(&self, id: EmployeeId) -> Result<Option<Employee>>;
    async fn office(&self, id: OfficeId) -> Result<Option<Office>>;
}

pub type ShipmentStoreRef = Arc<dyn ShipmentStore>;
pub type PricingConfigStoreRef = Arc<dyn PricingConfigStore>;
pub type DirectoryRef = Arc<dyn Directory>;
