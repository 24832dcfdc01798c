//! Exchange holiday table.
//!
//! Built-in closures for 2024–2025 (SSE / SZSE notices). Weekend days that
//! fall inside a holiday block are listed too so every day of the block
//! carries the holiday name. Dates outside the covered years resolve to "not
//! a holiday"; extend the table by loading a JSON file (see
//! [`HolidayTable::load_json_file`]) instead of editing this list.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::date::parse_calendar_date;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayKind {
    /// Statutory public holiday block.
    Statutory,
    /// Ad-hoc exchange closure announced separately.
    Special,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEntry {
    #[serde(rename = "type")]
    pub kind: HolidayKind,
    pub name: String,
}

/// Date → holiday lookup. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HolidayTable {
    entries: BTreeMap<NaiveDate, HolidayEntry>,
}

// ---------------------------------------------------------------------------
// Built-in data
// ---------------------------------------------------------------------------

/// (first day, last day, name): inclusive ranges.
const BUILTIN_BLOCKS: &[((i32, u32, u32), (i32, u32, u32), &str)] = &[
    // ── 2024 ─────────────────────────────────────────────────────────
    ((2024, 1, 1), (2024, 1, 1), "元旦"),
    ((2024, 2, 9), (2024, 2, 17), "春节"),
    ((2024, 4, 4), (2024, 4, 6), "清明节"),
    ((2024, 5, 1), (2024, 5, 5), "劳动节"),
    ((2024, 6, 10), (2024, 6, 10), "端午节"),
    ((2024, 9, 15), (2024, 9, 17), "中秋节"),
    ((2024, 10, 1), (2024, 10, 7), "国庆节"),
    // ── 2025 ─────────────────────────────────────────────────────────
    ((2025, 1, 1), (2025, 1, 1), "元旦"),
    ((2025, 1, 28), (2025, 2, 4), "春节"),
    ((2025, 4, 4), (2025, 4, 6), "清明节"),
    ((2025, 5, 1), (2025, 5, 5), "劳动节"),
    ((2025, 5, 31), (2025, 6, 2), "端午节"),
    ((2025, 10, 1), (2025, 10, 8), "国庆节、中秋节"),
];

impl HolidayTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The compiled-in table (2024–2025).
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();
        for &((y0, m0, d0), (y1, m1, d1), name) in BUILTIN_BLOCKS {
            let (Some(first), Some(last)) = (
                NaiveDate::from_ymd_opt(y0, m0, d0),
                NaiveDate::from_ymd_opt(y1, m1, d1),
            ) else {
                continue;
            };
            for date in first.iter_days().take_while(|d| *d <= last) {
                entries.insert(
                    date,
                    HolidayEntry {
                        kind: HolidayKind::Statutory,
                        name: name.to_string(),
                    },
                );
            }
        }
        Self { entries }
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, HolidayEntry)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Parse a JSON object of the form
    /// `{"2026-01-01": {"type": "statutory", "name": "元旦"}, ...}`.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let parsed: BTreeMap<String, HolidayEntry> =
            serde_json::from_str(raw).context("holiday table json decode failed")?;
        let mut entries = BTreeMap::new();
        for (k, v) in parsed {
            let date = parse_calendar_date(&k)
                .with_context(|| format!("holiday table: bad date key '{k}'"))?;
            entries.insert(date, v);
        }
        Ok(Self { entries })
    }

    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read holiday file: {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    /// `self` with `other` layered on top (other wins on duplicate dates).
    pub fn merged(mut self, other: HolidayTable) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn entry(&self, date: NaiveDate) -> Option<&HolidayEntry> {
        self.entries.get(&date)
    }

    /// Holiday name for `date`, or `None` when it is not a designated holiday.
    pub fn lookup(&self, date: NaiveDate) -> Option<&str> {
        self.entries.get(&date).map(|e| e.name.as_str())
    }

    /// Batch lookup. Every requested date appears in the result.
    pub fn lookup_many<'a, I>(&self, dates: I) -> BTreeMap<NaiveDate, Option<String>>
    where
        I: IntoIterator<Item = &'a NaiveDate>,
    {
        dates
            .into_iter()
            .map(|d| (*d, self.lookup(*d).map(str::to_string)))
            .collect()
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.entries.contains_key(&date)
    }

    /// Years with at least one entry. Years not listed here have no holiday
    /// information at all, which callers may want to surface.
    pub fn covered_years(&self) -> BTreeSet<i32> {
        self.entries.keys().map(|d| d.year()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &HolidayEntry)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn builtin_covers_two_years() {
        let t = HolidayTable::builtin();
        assert_eq!(t.covered_years().into_iter().collect::<Vec<_>>(), vec![2024, 2025]);
        assert_eq!(t.lookup(d(2024, 10, 3)), Some("国庆节"));
        assert_eq!(t.lookup(d(2025, 1, 29)), Some("春节"));
        assert_eq!(t.lookup(d(2024, 10, 8)), None);
    }

    #[test]
    fn outside_covered_years_is_not_a_holiday() {
        let t = HolidayTable::builtin();
        assert_eq!(t.lookup(d(2030, 10, 1)), None);
        assert_eq!(t.lookup(d(2023, 1, 2)), None);
    }

    #[test]
    fn lookup_many_returns_every_requested_date() {
        let t = HolidayTable::builtin();
        let dates = [d(2024, 6, 10), d(2024, 6, 11)];
        let got = t.lookup_many(dates.iter());
        assert_eq!(got.len(), 2);
        assert_eq!(got[&d(2024, 6, 10)].as_deref(), Some("端午节"));
        assert_eq!(got[&d(2024, 6, 11)], None);
    }

    #[test]
    fn json_table_merges_over_builtin() {
        let extra = HolidayTable::from_json_str(
            r#"{
                "2026-01-01": {"type": "statutory", "name": "元旦"},
                "2024-10-08": {"type": "special", "name": "临时休市"}
            }"#,
        )
        .unwrap();
        let t = HolidayTable::builtin().merged(extra);
        assert_eq!(t.lookup(d(2026, 1, 1)), Some("元旦"));
        assert_eq!(t.entry(d(2024, 10, 8)).unwrap().kind, HolidayKind::Special);
        assert!(t.covered_years().contains(&2026));
    }

    #[test]
    fn json_table_rejects_bad_keys() {
        let err = HolidayTable::from_json_str(r#"{"not-a-date": {"type": "statutory", "name": "x"}}"#);
        assert!(err.is_err());
    }
}
