//! Business longevity indicator derived from registry (CEIDG) firm records.
//!
//! Each firm contributes `ln(1 + days_active)` points to its section. Section
//! totals are then min-max rescaled to `0..=100` within the batch, so the
//! indicator is relative to the current run's spread.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::sectors;

pub const STATUS_ACTIVE: &str = "AKTYWNY";
pub const STATUS_REMOVED: &str = "WYKRESLONY";

/// The subset of a registry row needed for scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmLifespan {
    /// Two-digit PKD division of the firm's main activity, e.g. `"62"`.
    pub pkd_division: String,
    pub started: Option<NaiveDate>,
    pub ended: Option<NaiveDate>,
    pub status: String,
}

/// Points and counters accumulated for one section.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SectorTally {
    pub points: f64,
    pub firms: usize,
    /// Active firms minus removed firms.
    pub active_balance: i64,
}

/// Days a firm has been operating as of `today`.
///
/// Removed firms are measured to their end date. Returns `None` when the
/// start date is missing, or when a removed firm has no end date.
#[must_use]
pub fn days_active(firm: &FirmLifespan, today: NaiveDate) -> Option<i64> {
    let started = firm.started?;
    let end = if firm.status == STATUS_REMOVED {
        firm.ended?
    } else {
        today
    };
    Some((end - started).num_days().max(0))
}

/// `ln(1 + days)`, flattening the advantage of very old firms.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn longevity_points(days: i64) -> f64 {
    (days.max(0) as f64).ln_1p()
}

/// Sum longevity points per PKD section.
///
/// Firms whose division maps to no section, or whose lifespan cannot be
/// measured, are skipped.
#[must_use]
pub fn tally_sectors(firms: &[FirmLifespan], today: NaiveDate) -> BTreeMap<&'static str, SectorTally> {
    let mut tallies: BTreeMap<&'static str, SectorTally> = BTreeMap::new();

    for firm in firms {
        let Some(section) = sectors::section_for_pkd_code(&firm.pkd_division) else {
            continue;
        };
        let Some(days) = days_active(firm, today) else {
            continue;
        };

        let tally = tallies.entry(section).or_default();
        tally.points += longevity_points(days);
        tally.firms += 1;
        match firm.status.as_str() {
            STATUS_ACTIVE => tally.active_balance += 1,
            STATUS_REMOVED => tally.active_balance -= 1,
            _ => {}
        }
    }

    tallies
}

/// Min-max rescale section points to `0..=100`.
///
/// When every section has the same total there is no spread to rescale and
/// all sections score 100.
#[must_use]
pub fn normalize(tallies: &BTreeMap<&'static str, SectorTally>) -> BTreeMap<&'static str, f64> {
    let min = tallies
        .values()
        .map(|t| t.points)
        .fold(f64::INFINITY, f64::min);
    let max = tallies
        .values()
        .map(|t| t.points)
        .fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;

    tallies
        .iter()
        .map(|(code, tally)| {
            let score = if spread > f64::EPSILON {
                (tally.points - min) / spread * 100.0
            } else {
                100.0
            };
            (*code, score)
        })
        .collect()
}
