//! Tariff aggregate
//!
//! Contains the tariff record and its decoded form, plus one calculator per
//! pricing strategy.

pub mod flat;
pub mod model;
pub mod schedule;
pub mod tiered;

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Offset, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

pub use model::{FlatRate, Frequency, Tariff, TariffKind, TariffRecord};
pub use schedule::{
    ScheduleBlock, ScheduleWalk, Segment, WalkOutcome, WeeklySchedule, MAX_SCHEDULE_ITERATIONS,
};
pub use tiered::{Tier, TierCharge, TierSchedule};

/// Wall clock and loop bound used to price a stay.
///
/// Schedules and calendar months are read in local time at `offset`; elapsed
/// durations do not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingClock {
    pub offset: FixedOffset,
    pub iteration_cap: u32,
}

impl BillingClock {
    pub fn new(offset: FixedOffset, iteration_cap: u32) -> Self {
        Self {
            offset,
            iteration_cap,
        }
    }

    /// Local wall-clock time of `instant`, saturating at the ends of the
    /// calendar range.
    pub fn local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        let shift = Duration::seconds(i64::from(self.offset.local_minus_utc()));
        match instant.naive_utc().checked_add_signed(shift) {
            Some(local) => local,
            None if shift > Duration::zero() => NaiveDateTime::MAX,
            None => NaiveDateTime::MIN,
        }
    }
}

impl Default for BillingClock {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
            iteration_cap: MAX_SCHEDULE_ITERATIONS,
        }
    }
}

/// Priced stay with the details each strategy produces
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargeBreakdown {
    pub kind: TariffKind,
    pub total: Decimal,
    /// Flat tariffs: units billed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<i64>,
    /// Tiered tariffs: the matched tier and overflow blocks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<TierCharge>,
    /// Scheduled tariffs: the block-by-block walk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub walk: Option<ScheduleWalk>,
}

impl Tariff {
    /// Price `[entry, exit)` in wall-clock time.
    pub fn charge(
        &self,
        entry: NaiveDateTime,
        exit: NaiveDateTime,
        iteration_cap: u32,
    ) -> ChargeBreakdown {
        let mut breakdown = ChargeBreakdown {
            kind: self.kind(),
            total: Decimal::ZERO,
            units: None,
            tier: None,
            walk: None,
        };
        match self {
            Tariff::Flat(rate) => {
                let charge = flat::flat_charge(entry, exit, rate);
                breakdown.total = charge.total;
                breakdown.units = Some(charge.units);
            }
            Tariff::Tiered(tiers) => {
                let charge = tiers.charge(entry, exit);
                breakdown.total = charge.total;
                breakdown.tier = Some(charge);
            }
            Tariff::Scheduled(week) => {
                let walk = schedule::walk(entry, exit, week, iteration_cap);
                breakdown.total = walk.total;
                breakdown.walk = Some(walk);
            }
        }
        breakdown.total = breakdown.total.max(Decimal::ZERO);
        breakdown
    }

    /// Price a stay given as UTC instants, converted with `clock`.
    pub fn charge_at(
        &self,
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
        clock: &BillingClock,
    ) -> ChargeBreakdown {
        self.charge(clock.local(entry), clock.local(exit), clock.iteration_cap)
    }
}
