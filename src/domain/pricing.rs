use crate::domain::shipment::Weight;
use crate::error::ShipmentError;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

pub type ConfigId = u64;

/// The three pricing rates, validated non-negative at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingRates {
    pub base_price: Decimal,
    pub price_per_kg: Decimal,
    pub address_delivery_fee: Decimal,
}

impl PricingRates {
    pub fn new(
        base_price: Decimal,
        price_per_kg: Decimal,
        address_delivery_fee: Decimal,
    ) -> Result<Self, ShipmentError> {
        for (field, value) in [
            ("base_price", base_price),
            ("price_per_kg", price_per_kg),
            ("address_delivery_fee", address_delivery_fee),
        ] {
            if value < Decimal::ZERO {
                return Err(ShipmentError::InvalidConfig {
                    field,
                    reason: format!("must be non-negative, got {value}"),
                });
            }
        }
        Ok(Self {
            base_price,
            price_per_kg,
            address_delivery_fee,
        })
    }
}

/// A versioned pricing configuration row.
///
/// Configs are append-only history: updating pricing deactivates the current
/// row and inserts a new active one. At most one row is active at any
/// observable instant, and price calculation always reads exactly that row.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PricingConfig {
    pub id: ConfigId,
    pub base_price: Decimal,
    pub price_per_kg: Decimal,
    pub address_delivery_fee: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PricingConfig {
    /// Prices a shipment against this config snapshot.
    ///
    /// `base_price + weight * price_per_kg`, plus the address-delivery fee
    /// when the shipment is not delivered to an office. Rounded half-up to
    /// 2 decimal places once, on the final sum.
    pub fn quote(&self, weight: Weight, office_delivery: bool) -> Decimal {
        let mut price = self.base_price + weight.value() * self.price_per_kg;
        if !office_delivery {
            price += self.address_delivery_fee;
        }
        price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    pub const fn rates(&self) -> PricingRates {
        PricingRates {
            base_price: self.base_price,
            price_per_kg: self.price_per_kg,
            address_delivery_fee: self.address_delivery_fee,
        }
    }
}
