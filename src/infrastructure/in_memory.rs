use crate::domain::directory::{
    Customer, CustomerId, Employee, EmployeeId, EntityKind, Office, OfficeId,
};
use crate::domain::ports::{Directory, PricingConfigStore, ShipmentStore, ShipmentUpdate};
use crate::domain::pricing::{ConfigId, PricingConfig, PricingRates};
use crate::domain::shipment::{Shipment, ShipmentId};
use crate::error::{Result, ShipmentError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory store for shipment rows.
///
/// Uses `Arc<RwLock<HashMap<ShipmentId, Shipment>>>` for shared concurrent
/// access; `update_with` holds the write guard across read, apply, and write,
/// which is the row-lock guarantee the lifecycle relies on.
#[derive(Default, Clone)]
pub struct InMemoryShipmentStore {
    shipments: Arc<RwLock<HashMap<ShipmentId, Shipment>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryShipmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShipmentStore for InMemoryShipmentStore {
    async fn next_id(&self) -> Result<ShipmentId> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn insert(&self, shipment: Shipment) -> Result<()> {
        let mut shipments = self.shipments.write().await;
        shipments.insert(shipment.id, shipment);
        Ok(())
    }

    async fn get(&self, id: ShipmentId) -> Result<Option<Shipment>> {
        let shipments = self.shipments.read().await;
        Ok(shipments.get(&id).cloned())
    }

    async fn update_with(&self, id: ShipmentId, update: ShipmentUpdate<'_>) -> Result<Shipment> {
        let mut shipments = self.shipments.write().await;
        let shipment = shipments.get_mut(&id).ok_or(ShipmentError::NotFound {
            entity: EntityKind::Shipment,
            id,
        })?;
        // Apply to a copy so a failing closure cannot leave a partial row.
        let mut updated = shipment.clone();
        update(&mut updated)?;
        *shipment = updated.clone();
        Ok(updated)
    }

    async fn remove(&self, id: ShipmentId) -> Result<()> {
        let mut shipments = self.shipments.write().await;
        shipments.remove(&id).ok_or(ShipmentError::NotFound {
            entity: EntityKind::Shipment,
            id,
        })?;
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Shipment>> {
        let shipments = self.shipments.read().await;
        let mut all: Vec<Shipment> = shipments.values().cloned().collect();
        all.sort_by_key(|s| s.id);
        Ok(all)
    }
}

/// Append-only in-memory pricing config history.
///
/// `replace_active` runs entirely under the write guard, so readers observe
/// either the old active row or the new one, never zero or two.
#[derive(Default, Clone)]
pub struct InMemoryPricingConfigStore {
    configs: Arc<RwLock<Vec<PricingConfig>>>,
}

impl InMemoryPricingConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PricingConfigStore for InMemoryPricingConfigStore {
    async fn active(&self) -> Result<Option<PricingConfig>> {
        let configs = self.configs.read().await;
        Ok(configs.iter().find(|c| c.active).cloned())
    }

    async fn replace_active(&self, rates: PricingRates) -> Result<PricingConfig> {
        let mut configs = self.configs.write().await;
        let now = Utc::now();
        for config in configs.iter_mut().filter(|c| c.active) {
            config.active = false;
            config.updated_at = now;
        }
        let config = PricingConfig {
            id: configs.len() as ConfigId + 1,
            base_price: rates.base_price,
            price_per_kg: rates.price_per_kg,
            address_delivery_fee: rates.address_delivery_fee,
            active: true,
            created_at: now,
            updated_at: now,
        };
        configs.push(config.clone());
        Ok(config)
    }

    async fn history(&self) -> Result<Vec<PricingConfig>> {
        let configs = self.configs.read().await;
        Ok(configs.clone())
    }
}

/// In-memory read-only directory of customers, employees, and offices.
///
/// The `insert_*` methods exist for seeding only; the core consumes the
/// lookups through the [`Directory`] port.
#[derive(Default, Clone)]
pub struct InMemoryDirectory {
    customers: Arc<RwLock<HashMap<CustomerId, Customer>>>,
    employees: Arc<RwLock<HashMap<EmployeeId, Employee>>>,
    offices: Arc<RwLock<HashMap<OfficeId, Office>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_customer(&self, customer: Customer) {
        self.customers.write().await.insert(customer.id, customer);
    }

    pub async fn insert_employee(&self, employee: Employee) {
        self.employees.write().await.insert(employee.id, employee);
    }

    pub async fn insert_office(&self, office: Office) {
        self.offices.write().await.insert(office.id, office);
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.customers.read().await.get(&id).cloned())
    }

    async fn employee(&self, id: EmployeeId) -> Result<Option<Employee>> {
        Ok(self.employees.read().await.get(&id).cloned())
    }

    async fn office(&self, id: OfficeId) -> Result<Option<Office>> {
        Ok(self.offices.read().await.get(&id).cloned())
    }
}
