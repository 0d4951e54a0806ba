//! Flat per-unit billing

use chrono::{Datelike, Months, NaiveDateTime};
use rust_decimal::Decimal;

use super::model::{FlatRate, Frequency};

pub const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Number of units billed for a stay.
///
/// Hours and days are ceilings over the exact elapsed milliseconds. Months
/// count calendar months from the entry date: each `entry + n months` reached
/// at or before `exit` is a full unit, and any remainder is one more unit.
/// An empty or inverted interval bills zero units here; the one-unit rule for
/// `exit < entry` lives in [`flat_charge`].
pub fn billed_units(entry: NaiveDateTime, exit: NaiveDateTime, frequency: Frequency) -> i64 {
    if exit <= entry {
        return 0;
    }
    let elapsed = (exit - entry).num_milliseconds();
    match frequency {
        Frequency::PerHour => ceil_div(elapsed, MILLIS_PER_HOUR),
        Frequency::PerDay => ceil_div(elapsed, MILLIS_PER_DAY),
        Frequency::PerMonth => calendar_months(entry, exit),
    }
}

/// Units billed for a flat stay and what they cost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatCharge {
    pub units: i64,
    pub total: Decimal,
}

/// Price a flat stay: `units × base_price`, or one unit when the stay ends
/// before it starts.
pub fn flat_charge(entry: NaiveDateTime, exit: NaiveDateTime, rate: &FlatRate) -> FlatCharge {
    let units = if exit < entry {
        1
    } else {
        billed_units(entry, exit, rate.frequency)
    };
    FlatCharge {
        units,
        total: Decimal::from(units).saturating_mul(rate.base_price),
    }
}

/// Total for a flat tariff.
pub fn flat(entry: NaiveDateTime, exit: NaiveDateTime, rate: &FlatRate) -> Decimal {
    flat_charge(entry, exit, rate).total
}

fn ceil_div(value: i64, unit: i64) -> i64 {
    (value + unit - 1) / unit
}

// Offsets are always applied to the entry itself, so a stay starting on the
// 31st bills through Feb 28/29 and then through Mar 31 rather than drifting
// to the 28th of every later month.
fn calendar_months(entry: NaiveDateTime, exit: NaiveDateTime) -> i64 {
    // `entry + diff months` lands in exit's calendar month, so the answer is
    // `diff` or `diff + 1`.
    let diff = i64::from(exit.year() - entry.year()) * 12 + i64::from(exit.month())
        - i64::from(entry.month());
    let mut months = u32::try_from(diff.max(1)).unwrap_or(u32::MAX);
    loop {
        match entry.checked_add_months(Months::new(months)) {
            Some(boundary) if boundary < exit => months = months.saturating_add(1),
            _ => return i64::from(months),
        }
    }
}
