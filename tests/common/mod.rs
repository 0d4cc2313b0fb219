use freightdesk::application::lifecycle::ShipmentLifecycle;
use freightdesk::application::metrics::MetricsAggregator;
use freightdesk::application::pricing::PricingEngine;
use freightdesk::domain::directory::{Customer, Employee, Office};
use freightdesk::domain::ports::{PricingConfigStoreRef, ShipmentStoreRef};
use freightdesk::domain::shipment::{ShipmentDraft, ShipmentPatch};
use freightdesk::infrastructure::in_memory::{
    InMemoryDirectory, InMemoryPricingConfigStore, InMemoryShipmentStore,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

/// A fully wired in-memory core: three customers (1-3), one employee (1),
/// one office (10), and an active config of base 5.00 / per-kg 2.00 /
/// address fee 10.00.
pub struct TestCore {
    pub lifecycle: ShipmentLifecycle,
    pub metrics: MetricsAggregator,
    pub pricing: PricingEngine,
    pub shipments: ShipmentStoreRef,
    pub configs: PricingConfigStoreRef,
}

pub async fn test_core() -> TestCore {
    let directory = InMemoryDirectory::new();
    for id in [1, 2, 3] {
        directory
            .insert_customer(Customer {
                id,
                name: format!("customer-{id}"),
            })
            .await;
    }
    directory
        .insert_employee(Employee {
            id: 1,
            name: "Carol".into(),
        })
        .await;
    directory
        .insert_office(Office {
            id: 10,
            address: "1 Depot Rd".into(),
        })
        .await;
    let directory = Arc::new(directory);

    let configs: PricingConfigStoreRef = Arc::new(InMemoryPricingConfigStore::new());
    let pricing = PricingEngine::new(configs.clone());
    pricing
        .update_config(dec!(5.00), dec!(2.00), dec!(10.00))
        .await
        .unwrap();

    let shipments: ShipmentStoreRef = Arc::new(InMemoryShipmentStore::new());
    let lifecycle = ShipmentLifecycle::new(shipments.clone(), directory.clone(), pricing.clone());
    let metrics = MetricsAggregator::new(shipments.clone(), directory);

    TestCore {
        lifecycle,
        metrics,
        pricing,
        shipments,
        configs,
    }
}

pub fn office_draft(weight: Decimal) -> ShipmentDraft {
    ShipmentDraft {
        sender_id: 1,
        recipient_id: 2,
        registered_by: 1,
        address: None,
        office: Some(10),
        weight,
    }
}

pub fn address_draft(weight: Decimal) -> ShipmentDraft {
    ShipmentDraft {
        sender_id: 1,
        recipient_id: 2,
        registered_by: 1,
        address: Some("12 Main St".into()),
        office: None,
        weight,
    }
}

pub fn office_patch(weight: Decimal) -> ShipmentPatch {
    office_draft(weight).as_patch()
}

pub fn address_patch(weight: Decimal) -> ShipmentPatch {
    address_draft(weight).as_patch()
}
