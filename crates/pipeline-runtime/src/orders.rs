//! Order source, its published versions and the consumer-side record.

use pipeline_core::{PipelineSource, SchemaBuilder, TargetRecord, VersionedPayload};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A customer order as the host application keeps it.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: u64,
    pub sku: String,
    pub quantity: u32,
    pub unit_price_cents: u64,
    /// Tenant whose key encrypts the envelopes
    pub tenant: Option<String>,
}

impl Order {
    /// `None` when the total does not fit in a `u64`.
    pub fn total_cents(&self) -> Option<u64> {
        self.unit_price_cents.checked_mul(u64::from(self.quantity))
    }
}

/// First published shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderV1_0 {
    pub id: u64,
    pub sku: String,
    pub quantity: u32,
}

impl VersionedPayload for OrderV1_0 {
    const TYPE_NAME: &'static str = "shop.Order_1_0";
}

/// Adds pricing. Lives on the v2 channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderV2_0 {
    pub id: u64,
    pub sku: String,
    pub quantity: u32,
    pub total_cents: u64,
}

impl VersionedPayload for OrderV2_0 {
    const TYPE_NAME: &'static str = "shop.Order_2_0";
}

impl PipelineSource for Order {
    const SOURCE_NAME: &'static str = "Order";

    fn declare(schema: &mut SchemaBuilder<Self>) {
        schema
            .default_producer(|o: &Order| {
                Ok(OrderV1_0 {
                    id: o.id,
                    sku: o.sku.clone(),
                    quantity: o.quantity,
                })
            })
            .version("2_0", |o: &Order| {
                let total_cents = o
                    .total_cents()
                    .ok_or_else(|| anyhow::anyhow!("order {} total overflows", o.id))?;
                Ok(OrderV2_0 {
                    id: o.id,
                    sku: o.sku.clone(),
                    quantity: o.quantity,
                    total_cents,
                })
            });
    }

    fn owner_info(&self) -> Option<String> {
        self.tenant.clone()
    }
}

/// Consumer-side projection built from `OrderV2_0`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSummary {
    pub id: u64,
    pub total_cents: u64,
}

impl TargetRecord for OrderSummary {
    fn save(&mut self) -> anyhow::Result<()> {
        info!(order_id = self.id, total_cents = self.total_cents, "Order summary saved");
        Ok(())
    }
}
