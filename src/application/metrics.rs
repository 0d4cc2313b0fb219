use crate::domain::directory::{CustomerId, EntityKind};
use crate::domain::ports::{DirectoryRef, ShipmentStoreRef};
use crate::domain::shipment::{Shipment, ShipmentStatus};
use crate::error::{Result, ShipmentError};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Revenue over a `delivered_at` date window.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct RevenueReport {
    pub total_revenue: Decimal,
    pub delivered_count: u64,
}

/// Whole-fleet counts plus lifetime delivered revenue.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct DashboardMetrics {
    pub total: u64,
    pub in_transit: u64,
    pub delivered: u64,
    pub total_revenue: Decimal,
}

/// Per-customer shipment counters.
///
/// `total_spent` sums the price of every shipment the customer sent,
/// cancelled ones included: it tracks the amount committed, not the amount
/// delivered.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct CustomerMetrics {
    pub sent: u64,
    pub received: u64,
    pub in_transit: u64,
    pub total_spent: Decimal,
}

/// Read-only aggregation over persisted shipments.
///
/// Never mutates state; depends on the shipment data model and its status
/// semantics, not on the lifecycle or pricing services.
pub struct MetricsAggregator {
    shipments: ShipmentStoreRef,
    directory: DirectoryRef,
}

impl MetricsAggregator {
    pub fn new(shipments: ShipmentStoreRef, directory: DirectoryRef) -> Self {
        Self {
            shipments,
            directory,
        }
    }

    /// Sums price and counts shipments delivered within
    /// `[start-of-day(start), end-of-day(end)]` inclusive. Zeroes, not an
    /// error, when nothing matches.
    pub async fn revenue_report(&self, start: NaiveDate, end: NaiveDate) -> Result<RevenueReport> {
        let from = start.and_time(NaiveTime::MIN).and_utc();
        // Inclusive end-of-day expressed as exclusive start-of-next-day;
        // at NaiveDate::MAX the window degrades to unbounded above.
        let until = end.succ_opt().map(|d| d.and_time(NaiveTime::MIN).and_utc());

        let mut total_revenue = Decimal::ZERO;
        let mut delivered_count = 0u64;
        for shipment in self.shipments.all().await? {
            if shipment.status == ShipmentStatus::Delivered
                && delivered_within(&shipment, from, until)
            {
                total_revenue += shipment.price;
                delivered_count += 1;
            }
        }
        Ok(RevenueReport {
            total_revenue,
            delivered_count,
        })
    }

    /// Counts over all statuses plus revenue over all delivered shipments,
    /// unbounded by date.
    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics> {
        let mut metrics = DashboardMetrics {
            total: 0,
            in_transit: 0,
            delivered: 0,
            total_revenue: Decimal::ZERO,
        };
        for shipment in self.shipments.all().await? {
            metrics.total += 1;
            match shipment.status {
                ShipmentStatus::InTransit => metrics.in_transit += 1,
                ShipmentStatus::Delivered => {
                    metrics.delivered += 1;
                    metrics.total_revenue += shipment.price;
                }
                ShipmentStatus::Registered | ShipmentStatus::Cancelled => {}
            }
        }
        Ok(metrics)
    }

    /// Per-customer counters; fails `NotFound` before aggregating when the
    /// customer does not exist.
    pub async fn customer_metrics(&self, customer_id: CustomerId) -> Result<CustomerMetrics> {
        self.directory
            .customer(customer_id)
            .await?
            .ok_or(ShipmentError::NotFound {
                entity: EntityKind::Customer,
                id: u64::from(customer_id),
            })?;

        let mut metrics = CustomerMetrics {
            sent: 0,
            received: 0,
            in_transit: 0,
            total_spent: Decimal::ZERO,
        };
        for shipment in self.shipments.all().await? {
            let is_sender = shipment.sender_id == customer_id;
            let is_recipient = shipment.recipient_id == customer_id;
            let in_transit = shipment.status == ShipmentStatus::InTransit;
            // The in-transit counter sums across both roles, so a
            // self-shipment (sender == recipient) contributes twice.
            if is_sender {
                metrics.sent += 1;
                metrics.total_spent += shipment.price;
                if in_transit {
                    metrics.in_transit += 1;
                }
            }
            if is_recipient {
                if shipment.status == ShipmentStatus::Delivered {
                    metrics.received += 1;
                }
                if in_transit {
                    metrics.in_transit += 1;
                }
            }
        }
        Ok(metrics)
    }
}

fn delivered_within(
    shipment: &Shipment,
    from: DateTime<Utc>,
    until: Option<DateTime<Utc>>,
) -> bool {
    shipment
        .delivered_at
        .is_some_and(|at| at >= from && until.is_none_or(|u| at < u))
}
