//! Step pricing by total duration ("escalonado")

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::flat::MILLIS_PER_HOUR;
use crate::domain::error::{TariffError, TariffResult};

/// One step: stays up to `hours` long cost `price`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    #[serde(rename = "horas")]
    pub hours: Decimal,
    #[serde(rename = "precio")]
    pub price: Decimal,
}

/// Decoded tiered tariff. Tiers are kept sorted by threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierSchedule {
    tiers: Vec<Tier>,
    /// Length of one overflow block past the last tier, in hours
    pub overflow_unit_hours: Decimal,
    /// Price of each overflow block
    pub overflow_price: Decimal,
}

#[derive(Debug, Deserialize)]
struct TierPayload {
    #[serde(default)]
    tarifas: Option<Vec<Tier>>,
    #[serde(default)]
    adicional: Option<Decimal>,
    #[serde(default)]
    tiempo_adicional: Option<Decimal>,
}

/// How a duration was priced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierCharge {
    /// The tier whose price is the base of the total
    pub tier: Tier,
    pub overflow_blocks: Decimal,
    pub total: Decimal,
}

impl TierSchedule {
    pub fn new(
        mut tiers: Vec<Tier>,
        overflow_unit_hours: Decimal,
        overflow_price: Decimal,
    ) -> TariffResult<Self> {
        if tiers.is_empty() {
            return Err(TariffError::EmptyTiers);
        }
        tiers.sort_by(|a, b| a.hours.cmp(&b.hours));
        Ok(Self {
            tiers,
            overflow_unit_hours,
            overflow_price,
        })
    }

    /// Decode `{ "tarifas": [{ "horas", "precio" }], "adicional", "tiempo_adicional" }`.
    pub fn from_json(payload: &str) -> TariffResult<Self> {
        let raw: TierPayload = serde_json::from_str(payload)?;
        Self::new(
            raw.tarifas.unwrap_or_default(),
            raw.tiempo_adicional.unwrap_or_default(),
            raw.adicional.unwrap_or_default(),
        )
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Price a duration expressed in (fractional) hours.
    ///
    /// The first tier whose threshold is at or above `hours` wins outright.
    /// Past the last threshold the last tier's price is charged plus one
    /// overflow price per started overflow block.
    pub fn price_for_hours(&self, hours: Decimal) -> TierCharge {
        let hours = hours.max(Decimal::ZERO);
        // `new` guarantees at least one tier
        let last = self.tiers[self.tiers.len() - 1];

        if let Some(tier) = self.tiers.iter().find(|t| hours <= t.hours) {
            return TierCharge {
                tier: *tier,
                overflow_blocks: Decimal::ZERO,
                total: tier.price,
            };
        }

        // A quotient past Decimal's range saturates
        let overflow_blocks = if self.overflow_unit_hours > Decimal::ZERO {
            hours
                .saturating_sub(last.hours)
                .checked_div(self.overflow_unit_hours)
                .map_or(Decimal::MAX, |blocks| blocks.ceil())
        } else {
            Decimal::ZERO
        };
        TierCharge {
            tier: last,
            overflow_blocks,
            total: last
                .price
                .saturating_add(overflow_blocks.saturating_mul(self.overflow_price)),
        }
    }

    pub fn charge(&self, entry: NaiveDateTime, exit: NaiveDateTime) -> TierCharge {
        self.price_for_hours(hours_between(entry, exit))
    }
}

/// Total for a tiered tariff.
pub fn tiered(entry: NaiveDateTime, exit: NaiveDateTime, schedule: &TierSchedule) -> Decimal {
    schedule.charge(entry, exit).total
}

/// Elapsed time in fractional hours, clamped at zero for inverted stays.
pub fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> Decimal {
    let millis = (end - start).num_milliseconds().max(0);
    Decimal::from(millis) / Decimal::from(MILLIS_PER_HOUR)
}
