use crate::application::pricing::PricingEngine;
use crate::domain::directory::{CustomerId, EmployeeId, EntityKind, OfficeId};
use crate::domain::ports::{DirectoryRef, ShipmentStoreRef};
use crate::domain::shipment::{
    Destination, Shipment, ShipmentDraft, ShipmentId, ShipmentPatch, ShipmentStatus, Weight,
};
use crate::error::{Result, ShipmentError};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

/// Owns creation, content mutation, and status transitions of shipments.
///
/// All validation and reference resolution happens before any write, so a
/// failing registration or update never leaves a partial row behind.
#[derive(Clone)]
pub struct ShipmentLifecycle {
    shipments: ShipmentStoreRef,
    directory: DirectoryRef,
    pricing: PricingEngine,
}

/// Validated registration/update content: destination, weight, and the price
/// quoted against the config active at validation time.
struct ValidatedContent {
    destination: Destination,
    weight: Weight,
    price: Decimal,
}

impl ShipmentLifecycle {
    pub fn new(
        shipments: ShipmentStoreRef,
        directory: DirectoryRef,
        pricing: PricingEngine,
    ) -> Self {
        Self {
            shipments,
            directory,
            pricing,
        }
    }

    /// Creates a shipment in status `Registered` with a freshly quoted price.
    pub async fn register_shipment(&self, draft: ShipmentDraft) -> Result<Shipment> {
        let validated = self
            .validate_content(&draft.as_patch(), Some(draft.registered_by))
            .await?;
        let id = self.shipments.next_id().await?;
        let now = Utc::now();
        let shipment = Shipment {
            id,
            sender_id: draft.sender_id,
            recipient_id: draft.recipient_id,
            registered_by: draft.registered_by,
            destination: validated.destination,
            weight: validated.weight,
            price: validated.price,
            status: ShipmentStatus::Registered,
            registered_at: now,
            delivered_at: None,
            updated_at: now,
        };
        self.shipments.insert(shipment.clone()).await?;
        info!(
            shipment_id = id,
            sender = draft.sender_id,
            recipient = draft.recipient_id,
            price = %shipment.price,
            "shipment registered"
        );
        Ok(shipment)
    }

    /// Moves a shipment through the status state machine.
    ///
    /// Requesting the current status is an idempotent no-op in every state,
    /// terminal ones included. The transition check and the write run as one
    /// atomic unit inside the store, so racing updates cannot both apply
    /// against stale state. Entering `Delivered` stamps `delivered_at`.
    pub async fn update_status(
        &self,
        id: ShipmentId,
        requested: ShipmentStatus,
    ) -> Result<Shipment> {
        let now = Utc::now();
        let shipment = self
            .shipments
            .update_with(id, &|shipment| {
                if shipment.status == requested {
                    return Ok(());
                }
                if !shipment.status.can_transition_to(requested) {
                    return Err(ShipmentError::InvalidStatusTransition {
                        current: shipment.status,
                        requested,
                    });
                }
                shipment.status = requested;
                if requested == ShipmentStatus::Delivered {
                    shipment.delivered_at = Some(now);
                }
                shipment.updated_at = now;
                Ok(())
            })
            .await?;
        info!(shipment_id = id, status = %shipment.status, "shipment status updated");
        Ok(shipment)
    }

    /// Replaces a shipment's content, recomputing the price from scratch.
    ///
    /// Terminal shipments are immutable: fails `CannotModify` without
    /// touching the row. The previous price is always discarded, never
    /// incrementally adjusted. The registering employee is part of the
    /// registration record and stays untouched.
    pub async fn update_shipment(&self, id: ShipmentId, patch: ShipmentPatch) -> Result<Shipment> {
        let current = self
            .shipments
            .get(id)
            .await?
            .ok_or(ShipmentError::NotFound {
                entity: EntityKind::Shipment,
                id,
            })?;
        if current.status.is_terminal() {
            return Err(ShipmentError::CannotModify(current.status));
        }

        let validated = self.validate_content(&patch, None).await?;
        let now = Utc::now();
        let shipment = self
            .shipments
            .update_with(id, &|shipment| {
                // The first check raced nothing out; re-check under the lock.
                if shipment.status.is_terminal() {
                    return Err(ShipmentError::CannotModify(shipment.status));
                }
                shipment.sender_id = patch.sender_id;
                shipment.recipient_id = patch.recipient_id;
                shipment.destination = validated.destination.clone();
                shipment.weight = validated.weight;
                shipment.price = validated.price;
                shipment.updated_at = now;
                Ok(())
            })
            .await?;
        info!(shipment_id = id, price = %shipment.price, "shipment updated");
        Ok(shipment)
    }

    /// Hard removal; fails `NotFound` if the shipment does not exist.
    pub async fn delete_shipment(&self, id: ShipmentId) -> Result<()> {
        self.shipments.remove(id).await?;
        info!(shipment_id = id, "shipment deleted");
        Ok(())
    }

    pub async fn get_shipment(&self, id: ShipmentId) -> Result<Shipment> {
        self.shipments
            .get(id)
            .await?
            .ok_or(ShipmentError::NotFound {
                entity: EntityKind::Shipment,
                id,
            })
    }

    /// Validates content fields and resolves every referenced entity.
    ///
    /// Registration passes the registering employee for resolution; updates
    /// pass `None` since they never rewrite that field.
    async fn validate_content(
        &self,
        patch: &ShipmentPatch,
        registered_by: Option<EmployeeId>,
    ) -> Result<ValidatedContent> {
        let destination = Destination::from_parts(patch.address.clone(), patch.office)?;
        let weight = Weight::new(patch.weight)?;
        self.require_customer(patch.sender_id).await?;
        self.require_customer(patch.recipient_id).await?;
        if let Some(employee_id) = registered_by {
            self.require_employee(employee_id).await?;
        }
        if let Destination::Office(office_id) = destination {
            self.require_office(office_id).await?;
        }
        let price = self
            .pricing
            .calculate_price(weight, destination.is_office())
            .await?;
        Ok(ValidatedContent {
            destination,
            weight,
            price,
        })
    }

    async fn require_customer(&self, id: CustomerId) -> Result<()> {
        self.directory
            .customer(id)
            .await?
            .map(|_| ())
            .ok_or(ShipmentError::NotFound {
                entity: EntityKind::Customer,
                id: u64::from(id),
            })
    }

    async fn require_employee(&self, id: EmployeeId) -> Result<()> {
        self.directory
            .employee(id)
            .await?
            .map(|_| ())
            .ok_or(ShipmentError::NotFound {
                entity: EntityKind::Employee,
                id: u64::from(id),
            })
    }

    async fn require_office(&self, id: OfficeId) -> Result<()> {
        self.directory
            .office(id)
            .await?
            .map(|_| ())
            .ok_or(ShipmentError::NotFound {
                entity: EntityKind::Office,
                id: u64::from(id),
            })
    }
}
