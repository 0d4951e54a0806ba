//! Billing service: dispatches a tariff record to its calculator

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::domain::{
    BillingClock, ChargeBreakdown, Stay, Tariff, TariffRecord, TariffResult, WalkOutcome,
};

/// Prices stays against tariff records.
///
/// Holds only the billing clock, so one engine can be shared freely across
/// threads; every call is independent of the last.
#[derive(Debug, Clone, Copy, Default)]
pub struct TariffEngine {
    clock: BillingClock,
}

impl TariffEngine {
    pub fn new(clock: BillingClock) -> Self {
        Self { clock }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.billing.clock())
    }

    pub fn clock(&self) -> &BillingClock {
        &self.clock
    }

    /// Amount owed for `[entry, exit)` under `record`.
    ///
    /// Never fails: a record that cannot be decoded prices at zero.
    pub fn compute_total(
        &self,
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
        record: &TariffRecord,
    ) -> Decimal {
        self.breakdown(entry, exit, record)
            .map(|b| b.total)
            .unwrap_or(Decimal::ZERO)
    }

    /// Running or final total for a stay; active stays are billed until `now`.
    pub fn quote_stay(&self, stay: &Stay, now: DateTime<Utc>, record: &TariffRecord) -> Decimal {
        self.compute_total(stay.entry, stay.billed_until(now), record)
    }

    /// Like [`compute_total`](Self::compute_total) but keeps the breakdown.
    ///
    /// Returns `None` when the record does not decode; the reason is logged.
    pub fn breakdown(
        &self,
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
        record: &TariffRecord,
    ) -> Option<ChargeBreakdown> {
        match self.decode(record) {
            Ok(tariff) => Some(self.charge(entry, exit, &tariff)),
            Err(e) => {
                warn!(
                    kind = record.kind.as_deref().unwrap_or("<none>"),
                    error = %e,
                    "Tariff record not billable, charging zero"
                );
                None
            }
        }
    }

    pub fn decode(&self, record: &TariffRecord) -> TariffResult<Tariff> {
        Tariff::from_record(record)
    }

    /// Price an already decoded tariff.
    pub fn charge(
        &self,
        entry: DateTime<Utc>,
        exit: DateTime<Utc>,
        tariff: &Tariff,
    ) -> ChargeBreakdown {
        let breakdown = tariff.charge_at(entry, exit, &self.clock);

        if let Some(walk) = &breakdown.walk {
            match walk.outcome {
                WalkOutcome::Completed => {}
                WalkOutcome::GapHalted => warn!(
                    billed_segments = walk.segments.len(),
                    total = %walk.total,
                    "Schedule gap reached before exit, billing partial total"
                ),
                WalkOutcome::ForcedHalt => warn!(
                    iterations = walk.iterations,
                    total = %walk.total,
                    "Schedule walk hit its iteration cap"
                ),
            }
        }

        debug!(
            kind = %breakdown.kind,
            %entry,
            %exit,
            total = %breakdown.total,
            "Stay priced"
        );
        breakdown
    }
}

/// Amount owed for `[entry, exit)` using the default clock (UTC, default cap).
pub fn compute_total(entry: DateTime<Utc>, exit: DateTime<Utc>, record: &TariffRecord) -> Decimal {
    TariffEngine::default().compute_total(entry, exit, record)
}
