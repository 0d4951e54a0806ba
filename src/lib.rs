//! # Parking Tariff
//!
//! Parking fee computation engine. Given an entry instant, an exit instant
//! (or "now" for a vehicle still parked) and a tariff record, it returns the
//! amount owed.
//!
//! ## Architecture
//!
//! - **domain**: stays, tariff records, the decoded tariff union and one
//!   calculator per pricing strategy (flat, tiered, scheduled); payment
//!   settlement
//! - **application**: the billing engine that dispatches records to
//!   calculators and maps unbillable records to zero
//! - **config**: TOML configuration and tracing setup
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use parking_tariff::{compute_total, TariffRecord};
//! use rust_decimal::Decimal;
//!
//! let entry = Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap();
//! let record = TariffRecord::flat("por hora", Decimal::from(10));
//! let total = compute_total(entry, entry + Duration::minutes(90), &record);
//! assert_eq!(total, Decimal::from(20));
//! ```

pub mod application;
pub mod config;
pub mod domain;

pub use application::{compute_total, TariffEngine};
pub use config::{default_config_path, init_tracing, AppConfig};
pub use domain::{
    ChargeBreakdown, PaymentMethod, PaymentSelection, Settlement, Stay, Tariff, TariffError,
    TariffKind, TariffRecord,
};
