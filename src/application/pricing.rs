use crate::domain::ports::PricingConfigStoreRef;
use crate::domain::pricing::{PricingConfig, PricingRates};
use crate::domain::shipment::Weight;
use crate::error::{Result, ShipmentError};
use rust_decimal::Decimal;
use tracing::info;

/// Stateless price calculator over the versioned pricing configuration.
///
/// Owns the config store port; the shipment lifecycle only ever sees a
/// snapshot of the active config through `calculate_price`.
#[derive(Clone)]
pub struct PricingEngine {
    configs: PricingConfigStoreRef,
}

impl PricingEngine {
    pub fn new(configs: PricingConfigStoreRef) -> Self {
        Self { configs }
    }

    /// Prices a shipment against the config active at call time.
    ///
    /// No lock is held after the read: a config replaced between pricing and
    /// the shipment write is expected, the price reflects the snapshot.
    pub async fn calculate_price(&self, weight: Weight, office_delivery: bool) -> Result<Decimal> {
        let config = self.active_config().await?;
        Ok(config.quote(weight, office_delivery))
    }

    pub async fn active_config(&self) -> Result<PricingConfig> {
        self.configs
            .active()
            .await?
            .ok_or(ShipmentError::NoActiveConfig)
    }

    /// Replaces the active config with a new row built from the given rates.
    ///
    /// Validation happens before any write; the deactivate-then-insert pair
    /// is atomic inside the store.
    pub async fn update_config(
        &self,
        base_price: Decimal,
        price_per_kg: Decimal,
        address_delivery_fee: Decimal,
    ) -> Result<PricingConfig> {
        let rates = PricingRates::new(base_price, price_per_kg, address_delivery_fee)?;
        let config = self.configs.replace_active(rates).await?;
        info!(
            config_id = config.id,
            %base_price,
            %price_per_kg,
            %address_delivery_fee,
            "pricing config replaced"
        );
        Ok(config)
    }
}
