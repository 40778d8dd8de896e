//! Cycle date arithmetic
//!
//! Maps "today" to a position inside a client's rolling 4-week production
//! cycle, and spreads a per-cycle target across the cycle's weeks.
//!
//! All functions are pure; callers are responsible for handing in valid
//! dates. Positions are recomputed on every evaluation and never cached,
//! so a changed cycle start self-corrects on the next run.

use chrono::{Datelike, Duration, NaiveDate};

/// Derived position within the active cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclePosition {
    /// The Wednesday strictly before the upcoming posting week's Monday.
    /// Content for that week must be ready by this date.
    pub buffer_deadline: NaiveDate,
    /// 1..=4 position of the upcoming week within the cycle
    pub week_in_cycle: u32,
    /// 1-based count of 4-week blocks since the cycle start
    pub cycle_number: u32,
}

/// Compute the cycle position for `today` given the client's cycle start.
///
/// The evaluation anchors on the next Monday on/after `today` (inclusive
/// of `today` itself when it is a Monday), clamped so it never precedes
/// `cycle_start`.
pub fn compute_cycle(today: NaiveDate, cycle_start: NaiveDate) -> CyclePosition {
    let days_to_monday = (7 - today.weekday().num_days_from_monday()) % 7;
    let mut next_monday = today + Duration::days(i64::from(days_to_monday));
    if next_monday < cycle_start {
        next_monday = cycle_start;
    }

    let days_elapsed = (next_monday - cycle_start).num_days().max(0);
    let weeks_elapsed = days_elapsed / 7;
    let cycle_number = (weeks_elapsed / 4 + 1) as u32;
    let week_in_cycle = (weeks_elapsed % 4 + 1) as u32;

    // Wednesday strictly before next_monday. The `or 7` keeps the deadline
    // in the preceding week even when next_monday (clamped) is a Wednesday.
    let back = {
        let d = (next_monday.weekday().num_days_from_monday() + 7 - 2) % 7;
        if d == 0 {
            7
        } else {
            d
        }
    };
    let buffer_deadline = next_monday - Duration::days(i64::from(back));

    CyclePosition {
        buffer_deadline,
        week_in_cycle,
        cycle_number,
    }
}

/// Weekly slice of a per-cycle total, remainder going to the earliest weeks.
///
/// The same `(total_target, week_in_cycle)` pair always yields the same
/// target, and the four weekly targets sum to the total.
pub fn week_target(total_target: u32, week_in_cycle: u32) -> u32 {
    let base = total_target / 4;
    let remainder = total_target % 4;
    if week_in_cycle <= remainder {
        base + 1
    } else {
        base
    }
}
