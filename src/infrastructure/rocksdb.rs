use crate::domain::directory::{
    Customer, CustomerId, Employee, EmployeeId, EntityKind, Office, OfficeId,
};
use crate::domain::ports::{Directory, PricingConfigStore, ShipmentStore, ShipmentUpdate};
use crate::domain::pricing::{ConfigId, PricingConfig, PricingRates};
use crate::domain::shipment::{Shipment, ShipmentId};
use crate::error::{Result, ShipmentError};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for shipment rows.
pub const CF_SHIPMENTS: &str = "shipments";
/// Column Family for the append-only pricing config history.
pub const CF_CONFIGS: &str = "configs";
/// Column Family for customer reference records.
pub const CF_CUSTOMERS: &str = "customers";
/// Column Family for employee reference records.
pub const CF_EMPLOYEES: &str = "employees";
/// Column Family for office reference records.
pub const CF_OFFICES: &str = "offices";
/// Column Family for counters (shipment and config id sequences).
pub const CF_META: &str = "meta";

const KEY_SHIPMENT_SEQ: &[u8] = b"shipment_seq";
const KEY_CONFIG_SEQ: &[u8] = b"config_seq";

/// A persistent store implementation using RocksDB.
///
/// Keys are big-endian integers, values are JSON. One struct backs all three
/// ports; `Clone` shares the underlying `Arc<DB>`. Read-modify-write
/// sequences (`update_with`, `replace_active`, id counters) serialize on a
/// single write mutex, which stands in for row-level locking.
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

fn storage_err(context: &str, err: impl std::fmt::Display) -> ShipmentError {
    ShipmentError::Storage(format!("{context}: {err}"))
}

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// all required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [
            CF_SHIPMENTS,
            CF_CONFIGS,
            CF_CUSTOMERS,
            CF_EMPLOYEES,
            CF_OFFICES,
            CF_META,
        ]
        .into_iter()
        .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
        .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, cfs)
            .map_err(|e| storage_err("failed to open database", e))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| ShipmentError::Storage(format!("column family {name} not found")))
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value).map_err(|e| storage_err("serialization", e))?;
        self.db
            .put_cf(cf, key, bytes)
            .map_err(|e| storage_err("write", e))
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        let bytes = self.db.get_cf(cf, key).map_err(|e| storage_err("read", e))?;
        bytes
            .map(|b| serde_json::from_slice(&b).map_err(|e| storage_err("deserialization", e)))
            .transpose()
    }

    fn scan_json<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item.map_err(|e| storage_err("iteration", e))?;
            values.push(
                serde_json::from_slice(&value).map_err(|e| storage_err("deserialization", e))?,
            );
        }
        Ok(values)
    }

    // Caller must hold the write lock.
    fn bump_sequence(&self, key: &[u8]) -> Result<u64> {
        let current: u64 = self.get_json(CF_META, key)?.unwrap_or(0);
        let next = current + 1;
        self.put_json(CF_META, key, &next)?;
        Ok(next)
    }

    /// Seeds a customer record. Directory data is reference-only for the
    /// core; seeding belongs to the batch surface.
    pub async fn put_customer(&self, customer: Customer) -> Result<()> {
        self.put_json(CF_CUSTOMERS, &customer.id.to_be_bytes(), &customer)
    }

    pub async fn put_employee(&self, employee: Employee) -> Result<()> {
        self.put_json(CF_EMPLOYEES, &employee.id.to_be_bytes(), &employee)
    }

    pub async fn put_office(&self, office: Office) -> Result<()> {
        self.put_json(CF_OFFICES, &office.id.to_be_bytes(), &office)
    }
}

#[async_trait]
impl ShipmentStore for RocksDbStore {
    async fn next_id(&self) -> Result<ShipmentId> {
        let _guard = self.write_lock.lock().await;
        self.bump_sequence(KEY_SHIPMENT_SEQ)
    }

    async fn insert(&self, shipment: Shipment) -> Result<()> {
        self.put_json(CF_SHIPMENTS, &shipment.id.to_be_bytes(), &shipment)
    }

    async fn get(&self, id: ShipmentId) -> Result<Option<Shipment>> {
        self.get_json(CF_SHIPMENTS, &id.to_be_bytes())
    }

    async fn update_with(&self, id: ShipmentId, update: ShipmentUpdate<'_>) -> Result<Shipment> {
        let _guard = self.write_lock.lock().await;
        let mut shipment: Shipment = self.get_json(CF_SHIPMENTS, &id.to_be_bytes())?.ok_or(
            ShipmentError::NotFound {
                entity: EntityKind::Shipment,
                id,
            },
        )?;
        update(&mut shipment)?;
        self.put_json(CF_SHIPMENTS, &id.to_be_bytes(), &shipment)?;
        Ok(shipment)
    }

    async fn remove(&self, id: ShipmentId) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if self
            .get_json::<Shipment>(CF_SHIPMENTS, &id.to_be_bytes())?
            .is_none()
        {
            return Err(ShipmentError::NotFound {
                entity: EntityKind::Shipment,
                id,
            });
        }
        let cf = self.cf(CF_SHIPMENTS)?;
        self.db
            .delete_cf(cf, id.to_be_bytes())
            .map_err(|e| storage_err("delete", e))
    }

    async fn all(&self) -> Result<Vec<Shipment>> {
        // Big-endian keys keep the iteration ordered by id.
        self.scan_json(CF_SHIPMENTS)
    }
}

#[async_trait]
impl PricingConfigStore for RocksDbStore {
    async fn active(&self) -> Result<Option<PricingConfig>> {
        let configs: Vec<PricingConfig> = self.scan_json(CF_CONFIGS)?;
        Ok(configs.into_iter().find(|c| c.active))
    }

    async fn replace_active(&self, rates: PricingRates) -> Result<PricingConfig> {
        let _guard = self.write_lock.lock().await;
        let now = Utc::now();
        let mut batch = WriteBatch::default();
        let cf = self.cf(CF_CONFIGS)?;

        for mut config in self.scan_json::<PricingConfig>(CF_CONFIGS)? {
            if config.active {
                config.active = false;
                config.updated_at = now;
                let bytes =
                    serde_json::to_vec(&config).map_err(|e| storage_err("serialization", e))?;
                batch.put_cf(cf, config.id.to_be_bytes(), bytes);
            }
        }

        let id: ConfigId = self.bump_sequence(KEY_CONFIG_SEQ)?;
        let config = PricingConfig {
            id,
            base_price: rates.base_price,
            price_per_kg: rates.price_per_kg,
            address_delivery_fee: rates.address_delivery_fee,
            active: true,
            created_at: now,
            updated_at: now,
        };
        let bytes = serde_json::to_vec(&config).map_err(|e| storage_err("serialization", e))?;
        batch.put_cf(cf, config.id.to_be_bytes(), bytes);

        // One batch: readers see the old active row or the new one, never
        // zero or two.
        self.db
            .write(batch)
            .map_err(|e| storage_err("config swap", e))?;
        Ok(config)
    }

    async fn history(&self) -> Result<Vec<PricingConfig>> {
        self.scan_json(CF_CONFIGS)
    }
}

#[async_trait]
impl Directory for RocksDbStore {
    async fn customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        self.get_json(CF_CUSTOMERS, &id.to_be_bytes())
    }

    async fn employee(&self, id: EmployeeId) -> Result<Option<Employee>> {
        self.get_json(CF_EMPLOYEES, &id.to_be_bytes())
    }

    async fn office(&self, id: OfficeId) -> Result<Option<Office>> {
        self.get_json(CF_OFFICES, &id.to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shipment::{Destination, ShipmentStatus, Weight};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn shipment(id: ShipmentId) -> Shipment {
        let now = Utc::now();
        Shipment {
            id,
            sender_id: 1,
            recipient_id: 2,
            registered_by: 1,
            destination: Destination::Office(10),
            weight: Weight::new(dec!(2.75)).unwrap(),
            price: dec!(10.50),
            status: ShipmentStatus::Registered,
            registered_at: now,
            delivered_at: None,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_open_creates_column_families() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();
        for cf in [
            CF_SHIPMENTS,
            CF_CONFIGS,
            CF_CUSTOMERS,
            CF_EMPLOYEES,
            CF_OFFICES,
            CF_META,
        ] {
            assert!(store.db.cf_handle(cf).is_some());
        }
    }

    #[tokio::test]
    async fn test_shipment_roundtrip_and_sequence() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();

        assert_eq!(store.next_id().await.unwrap(), 1);
        assert_eq!(store.next_id().await.unwrap(), 2);

        store.insert(shipment(1)).await.unwrap();
        let retrieved = ShipmentStore::get(&store, 1).await.unwrap().unwrap();
        assert_eq!(retrieved.price, dec!(10.50));

        let updated = store
            .update_with(1, &|s| {
                s.status = ShipmentStatus::InTransit;
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(updated.status, ShipmentStatus::InTransit);

        store.remove(1).await.unwrap();
        assert!(matches!(
            store.remove(1).await,
            Err(ShipmentError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_config_swap_keeps_single_active() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();

        store
            .replace_active(PricingRates::new(dec!(5.00), dec!(2.00), dec!(10.00)).unwrap())
            .await
            .unwrap();
        let second = store
            .replace_active(PricingRates::new(dec!(6.00), dec!(1.50), dec!(8.00)).unwrap())
            .await
            .unwrap();

        let history = PricingConfigStore::history(&store).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.iter().filter(|c| c.active).count(), 1);
        assert_eq!(
            PricingConfigStore::active(&store).await.unwrap().unwrap().id,
            second.id
        );
    }

    #[tokio::test]
    async fn test_directory_lookups() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();

        store
            .put_customer(Customer {
                id: 7,
                name: "Alice".into(),
            })
            .await
            .unwrap();
        assert!(store.customer(7).await.unwrap().is_some());
        assert!(store.customer(8).await.unwrap().is_none());
        assert!(store.employee(7).await.unwrap().is_none());
        assert!(store.office(7).await.unwrap().is_none());
    }
}
