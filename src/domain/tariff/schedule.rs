//! Day-of-week, time-of-day pricing ("por horario")
//!
//! A stay is walked block by block in wall-clock time. Each block the stay
//! touches is billed on its own, rounding its hours up, so a stay across three
//! blocks pays three rounded charges rather than one ceiling over the whole.

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::tiered::hours_between;
use crate::domain::error::{TariffError, TariffResult};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Upper bound on blocks visited in one walk.
///
/// 10 000 segments is over a year of hourly blocks; a walk that hits it ends
/// with [`WalkOutcome::ForcedHalt`].
pub const MAX_SCHEDULE_ITERATIONS: u32 = 10_000;

/// A priced `[start, end)` interval within one day, in minutes from midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleBlock {
    pub start_minute: u32,
    /// Exclusive; 1440 means midnight at the end of the day
    pub end_minute: u32,
    /// Price per started hour
    pub price: Decimal,
}

impl ScheduleBlock {
    pub fn contains(&self, minute_of_day: u32) -> bool {
        self.start_minute <= minute_of_day && minute_of_day < self.end_minute
    }
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    start: String,
    end: String,
    price: Decimal,
}

impl TryFrom<RawBlock> for ScheduleBlock {
    type Error = TariffError;

    fn try_from(raw: RawBlock) -> TariffResult<Self> {
        let start_minute = parse_time_of_day(&raw.start)?;
        let end_minute = match parse_time_of_day(&raw.end)? {
            0 => MINUTES_PER_DAY,
            m => m,
        };
        if start_minute >= MINUTES_PER_DAY {
            return Err(TariffError::InvalidTime(raw.start));
        }
        Ok(Self {
            start_minute,
            end_minute,
            price: raw.price,
        })
    }
}

/// Parse `"HH:MM"` into minutes from midnight. `"24:00"` is accepted.
pub fn parse_time_of_day(s: &str) -> TariffResult<u32> {
    let invalid = || TariffError::InvalidTime(s.to_string());
    let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
    let hour: u32 = h.parse().map_err(|_| invalid())?;
    let minute: u32 = m.parse().map_err(|_| invalid())?;
    if minute >= 60 || hour > 24 || (hour == 24 && minute != 0) {
        return Err(invalid());
    }
    Ok(hour * 60 + minute)
}

/// Blocks for each day of the week, Sunday first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklySchedule {
    days: [Vec<ScheduleBlock>; 7],
}

impl WeeklySchedule {
    pub fn new(days: [Vec<ScheduleBlock>; 7]) -> Self {
        Self { days }
    }

    /// Same blocks on every day of the week.
    pub fn every_day(blocks: Vec<ScheduleBlock>) -> Self {
        Self::new(std::array::from_fn(|_| blocks.clone()))
    }

    /// Decode an array of 7 arrays of `{ "start", "end", "price" }`.
    pub fn from_json(payload: &str) -> TariffResult<Self> {
        let raw: Vec<Vec<RawBlock>> = serde_json::from_str(payload)?;
        let count = raw.len();
        let days: Vec<Vec<ScheduleBlock>> = raw
            .into_iter()
            .map(|day| day.into_iter().map(ScheduleBlock::try_from).collect())
            .collect::<TariffResult<_>>()?;
        let days: [Vec<ScheduleBlock>; 7] =
            days.try_into().map_err(|_| TariffError::WrongDayCount(count))?;
        Ok(Self { days })
    }

    /// Blocks for a day, 0 = Sunday.
    pub fn day(&self, days_from_sunday: usize) -> &[ScheduleBlock] {
        self.days
            .get(days_from_sunday)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The block covering `at`, by minute of day. Seconds are ignored.
    pub fn block_at(&self, at: NaiveDateTime) -> Option<&ScheduleBlock> {
        let minute = at.hour() * 60 + at.minute();
        self.day(at.weekday().num_days_from_sunday() as usize)
            .iter()
            .find(|b| b.contains(minute))
    }
}

/// Why a walk stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkOutcome {
    /// The cursor reached the exit
    Completed,
    /// No block covers the cursor; the total so far is the result
    GapHalted,
    /// The iteration cap was reached before the exit
    ForcedHalt,
}

/// One billed piece of a stay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub charged_hours: Decimal,
    pub price: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleWalk {
    pub total: Decimal,
    pub outcome: WalkOutcome,
    pub segments: Vec<Segment>,
    pub iterations: u32,
}

/// Walk `[entry, exit)` across the schedule, visiting at most `iteration_cap` blocks.
pub fn walk(
    entry: NaiveDateTime,
    exit: NaiveDateTime,
    schedule: &WeeklySchedule,
    iteration_cap: u32,
) -> ScheduleWalk {
    let mut cursor = entry;
    let mut total = Decimal::ZERO;
    let mut segments = Vec::new();
    let mut iterations = 0;

    let outcome = loop {
        if cursor >= exit {
            break WalkOutcome::Completed;
        }
        if iterations >= iteration_cap {
            break WalkOutcome::ForcedHalt;
        }
        iterations += 1;

        let Some(block) = schedule.block_at(cursor) else {
            break WalkOutcome::GapHalted;
        };

        // A block ending past the last representable day runs to exit
        let segment_end = cursor
            .date()
            .and_time(NaiveTime::MIN)
            .checked_add_signed(Duration::minutes(i64::from(block.end_minute)))
            .map_or(exit, |block_end| block_end.min(exit));
        if segment_end <= cursor {
            match cursor.checked_add_signed(Duration::milliseconds(1)) {
                Some(next) => cursor = next,
                None => break WalkOutcome::ForcedHalt,
            }
            continue;
        }

        let charged_hours = hours_between(cursor, segment_end).ceil();
        let amount = charged_hours.saturating_mul(block.price);
        total = total.saturating_add(amount);
        trace!(%cursor, %segment_end, %charged_hours, %amount, "Schedule segment billed");

        segments.push(Segment {
            start: cursor,
            end: segment_end,
            charged_hours,
            price: block.price,
            amount,
        });
        cursor = segment_end;
    };

    ScheduleWalk {
        total,
        outcome,
        segments,
        iterations,
    }
}

/// Total for a scheduled tariff, using [`MAX_SCHEDULE_ITERATIONS`].
pub fn scheduled(entry: NaiveDateTime, exit: NaiveDateTime, schedule: &WeeklySchedule) -> Decimal {
    walk(entry, exit, schedule, MAX_SCHEDULE_ITERATIONS).total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    // 2024-06-03 is a Monday
    fn at(d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn block(start: u32, end: u32, price: Decimal) -> ScheduleBlock {
        ScheduleBlock {
            start_minute: start * 60,
            end_minute: end * 60,
            price,
        }
    }

    #[test]
    fn parse_time_of_day_accepts_hh_mm() {
        assert_eq!(parse_time_of_day("00:00").unwrap(), 0);
        assert_eq!(parse_time_of_day("08:30").unwrap(), 510);
        assert_eq!(parse_time_of_day("7:05").unwrap(), 425);
        assert_eq!(parse_time_of_day("24:00").unwrap(), 1440);
        assert!(parse_time_of_day("24:30").is_err());
        assert!(parse_time_of_day("12:60").is_err());
        assert!(parse_time_of_day("noon").is_err());
        assert!(parse_time_of_day("12").is_err());
    }

    #[test]
    fn midnight_end_covers_rest_of_day() {
        let json = r#"[
            [], [{"start": "18:00", "end": "00:00", "price": 3}], [], [], [], [], []
        ]"#;
        let s = WeeklySchedule::from_json(json).unwrap();
        let b = s.day(1)[0];
        assert_eq!(b.end_minute, MINUTES_PER_DAY);
        assert!(s.block_at(at(3, 23, 59)).is_some());
        assert!(s.block_at(at(3, 17, 59)).is_none());
    }

    #[test]
    fn decode_requires_seven_days() {
        assert!(matches!(
            WeeklySchedule::from_json("[[], [], []]"),
            Err(TariffError::WrongDayCount(3))
        ));
        assert!(matches!(
            WeeklySchedule::from_json("[]"),
            Err(TariffError::WrongDayCount(0))
        ));
    }

    #[test]
    fn decode_rejects_bad_times_and_shapes() {
        let bad_time = r#"[[{"start": "8am", "end": "10:00", "price": 1}], [], [], [], [], [], []]"#;
        assert!(matches!(
            WeeklySchedule::from_json(bad_time),
            Err(TariffError::InvalidTime(_))
        ));
        assert!(matches!(
            WeeklySchedule::from_json(r#"{"lunes": []}"#),
            Err(TariffError::MalformedPayload(_))
        ));
    }

    #[test]
    fn single_block_rounds_up_once() {
        let s = WeeklySchedule::every_day(vec![block(0, 24, dec!(10))]);
        // Mon 08:00 - 10:30: ceil(2.5) = 3 hours
        let w = walk(at(3, 8, 0), at(3, 10, 30), &s, MAX_SCHEDULE_ITERATIONS);
        assert_eq!(w.total, dec!(30));
        assert_eq!(w.outcome, WalkOutcome::Completed);
        assert_eq!(w.segments.len(), 1);
    }

    #[test]
    fn each_block_is_rounded_on_its_own() {
        let s = WeeklySchedule::every_day(vec![
            block(0, 8, dec!(2)),
            block(8, 18, dec!(10)),
            block(18, 24, dec!(4)),
        ]);
        // 07:30-08:00 -> 1h * 2, 08:00-18:00 -> 10h * 10, 18:00-18:20 -> 1h * 4
        let w = walk(at(3, 7, 30), at(3, 18, 20), &s, MAX_SCHEDULE_ITERATIONS);
        assert_eq!(w.segments.len(), 3);
        assert_eq!(w.total, dec!(106));
        let hours: Vec<_> = w.segments.iter().map(|seg| seg.charged_hours).collect();
        assert_eq!(hours, vec![dec!(1), dec!(10), dec!(1)]);
    }

    #[test]
    fn walk_crosses_midnight_into_next_weekday() {
        let mut days: [Vec<ScheduleBlock>; 7] = Default::default();
        days[1] = vec![block(0, 24, dec!(5))]; // Monday
        days[2] = vec![block(0, 24, dec!(8))]; // Tuesday
        let s = WeeklySchedule::new(days);
        // Mon 22:30 -> Tue 01:15: ceil(1.5) * 5 + ceil(1.25) * 8
        let w = walk(at(3, 22, 30), at(4, 1, 15), &s, MAX_SCHEDULE_ITERATIONS);
        assert_eq!(w.outcome, WalkOutcome::Completed);
        assert_eq!(w.total, dec!(26));
        assert_eq!(w.segments[1].start, at(4, 0, 0));
    }

    #[test]
    fn gap_returns_total_so_far() {
        let s = WeeklySchedule::every_day(vec![block(8, 12, dec!(6)), block(14, 20, dec!(9))]);
        // 09:00-12:00 billed, 12:00 falls in the gap
        let w = walk(at(3, 9, 0), at(3, 16, 0), &s, MAX_SCHEDULE_ITERATIONS);
        assert_eq!(w.outcome, WalkOutcome::GapHalted);
        assert_eq!(w.total, dec!(18));
        assert_eq!(scheduled(at(3, 9, 0), at(3, 16, 0), &s), dec!(18));
    }

    #[test]
    fn gap_at_entry_yields_zero() {
        let s = WeeklySchedule::every_day(vec![block(8, 12, dec!(6))]);
        let w = walk(at(3, 6, 0), at(3, 10, 0), &s, MAX_SCHEDULE_ITERATIONS);
        assert_eq!(w.outcome, WalkOutcome::GapHalted);
        assert_eq!(w.total, Decimal::ZERO);
    }

    #[test]
    fn iteration_cap_forces_halt() {
        let s = WeeklySchedule::every_day(vec![
            block(0, 1, dec!(1)),
            block(1, 2, dec!(1)),
            block(2, 24, dec!(1)),
        ]);
        let w = walk(at(3, 0, 0), at(3, 5, 0), &s, 2);
        assert_eq!(w.outcome, WalkOutcome::ForcedHalt);
        assert_eq!(w.iterations, 2);
        assert_eq!(w.total, dec!(2));
    }

    #[test]
    fn cap_reached_exactly_at_exit_completes() {
        let s = WeeklySchedule::every_day(vec![block(0, 1, dec!(1)), block(1, 24, dec!(1))]);
        let w = walk(at(3, 0, 0), at(3, 2, 0), &s, 2);
        assert_eq!(w.outcome, WalkOutcome::Completed);
    }

    #[test]
    fn long_stay_terminates_under_default_cap() {
        // Half-hour blocks around the clock for 400 days exceed the cap
        let blocks: Vec<_> = (0..48)
            .map(|i| ScheduleBlock {
                start_minute: i * 30,
                end_minute: (i + 1) * 30,
                price: dec!(1),
            })
            .collect();
        let s = WeeklySchedule::every_day(blocks);
        let exit = at(3, 0, 0) + Duration::days(400);
        let w = walk(at(3, 0, 0), exit, &s, MAX_SCHEDULE_ITERATIONS);
        assert_eq!(w.outcome, WalkOutcome::ForcedHalt);
        assert_eq!(w.iterations, MAX_SCHEDULE_ITERATIONS);
        assert_eq!(w.total, Decimal::from(MAX_SCHEDULE_ITERATIONS));
    }

    #[test]
    fn zero_length_blocks_never_match() {
        let s = WeeklySchedule::every_day(vec![block(9, 9, dec!(100))]);
        let w = walk(at(3, 9, 0), at(3, 10, 0), &s, MAX_SCHEDULE_ITERATIONS);
        assert_eq!(w.outcome, WalkOutcome::GapHalted);
        assert_eq!(w.total, Decimal::ZERO);
    }

    #[test]
    fn walk_ending_on_last_representable_day() {
        let s = WeeklySchedule::every_day(vec![block(0, 24, dec!(5))]);
        let exit = NaiveDateTime::MAX;
        let w = walk(exit - Duration::hours(2), exit, &s, MAX_SCHEDULE_ITERATIONS);
        assert_eq!(w.outcome, WalkOutcome::Completed);
        assert_eq!(w.total, dec!(10));
        assert_eq!(w.segments.len(), 1);
        assert_eq!(w.segments[0].end, exit);
    }

    #[test]
    fn inverted_stay_bills_nothing() {
        let s = WeeklySchedule::every_day(vec![block(0, 24, dec!(10))]);
        let w = walk(at(3, 10, 0), at(3, 8, 0), &s, MAX_SCHEDULE_ITERATIONS);
        assert_eq!(w.outcome, WalkOutcome::Completed);
        assert_eq!(w.total, Decimal::ZERO);
        assert!(w.segments.is_empty());
    }
}
