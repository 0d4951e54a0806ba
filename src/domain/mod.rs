//! Domain layer: stays, tariffs and settlement, with no I/O.

pub mod error;
pub mod settlement;
pub mod stay;
pub mod tariff;

pub use error::{SettlementError, TariffError, TariffResult};
pub use settlement::{PaymentMethod, PaymentSelection, Settlement};
pub use stay::Stay;
pub use tariff::{
    BillingClock, ChargeBreakdown, FlatRate, Frequency, ScheduleBlock, ScheduleWalk, Segment,
    Tariff, TariffKind, TariffRecord, Tier, TierCharge, TierSchedule, WalkOutcome, WeeklySchedule,
    MAX_SCHEDULE_ITERATIONS,
};
