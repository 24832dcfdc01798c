//! Aggregates over completed calendar days.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::date::MonthKey;
use crate::day::{CalendarDay, DisplayStatus};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub total_days: u32,
    pub trading_days: u32,
    pub holidays: u32,
    pub weekends: u32,
    /// Percentage of trading days, 0–100.
    pub trading_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthStats {
    pub month: String,
    #[serde(flatten)]
    pub stats: PeriodStats,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingClosure {
    pub date: NaiveDate,
    pub kind: DisplayStatus,
    pub name: String,
    pub description: String,
    pub days_until: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarStats {
    pub year: i32,
    pub months: Vec<MonthStats>,
    pub totals: PeriodStats,
    pub upcoming: Vec<UpcomingClosure>,
}

impl PeriodStats {
    fn add(&mut self, day: &CalendarDay) {
        self.total_days += 1;
        if day.is_trade_day {
            self.trading_days += 1;
            return;
        }
        match day.display_status {
            DisplayStatus::Weekend => self.weekends += 1,
            DisplayStatus::Holiday | DisplayStatus::Trading => self.holidays += 1,
        }
    }

    fn finish(mut self) -> Self {
        self.trading_rate = if self.total_days > 0 {
            f64::from(self.trading_days) / f64::from(self.total_days) * 100.0
        } else {
            0.0
        };
        self
    }
}

/// Per-month counts, ascending by month.
pub fn monthly_stats(days: &[CalendarDay]) -> Vec<MonthStats> {
    let mut by_month: BTreeMap<MonthKey, PeriodStats> = BTreeMap::new();
    for day in days {
        by_month.entry(MonthKey::of(day.date)).or_default().add(day);
    }
    by_month
        .into_iter()
        .map(|(k, s)| MonthStats {
            month: k.to_string(),
            stats: s.finish(),
        })
        .collect()
}

pub fn totals(days: &[CalendarDay]) -> PeriodStats {
    let mut s = PeriodStats::default();
    for day in days {
        s.add(day);
    }
    s.finish()
}

/// First `limit` non-trading days strictly after `today`.
pub fn upcoming_closures(days: &[CalendarDay], today: NaiveDate, limit: usize) -> Vec<UpcomingClosure> {
    days.iter()
        .filter(|d| d.date > today && !d.is_trade_day)
        .take(limit)
        .map(|d| {
            let kind = match d.display_status {
                DisplayStatus::Weekend => DisplayStatus::Weekend,
                DisplayStatus::Holiday | DisplayStatus::Trading => DisplayStatus::Holiday,
            };
            let description = match (&d.holiday_name, kind) {
                (Some(name), _) => name.clone(),
                (None, DisplayStatus::Weekend) => "周末休市".to_string(),
                (None, _) => "休市".to_string(),
            };
            UpcomingClosure {
                date: d.date,
                kind,
                name: d.status_text.clone(),
                description,
                days_until: (d.date - today).num_days(),
            }
        })
        .collect()
}

pub fn calendar_stats(year: i32, days: &[CalendarDay], today: NaiveDate) -> CalendarStats {
    CalendarStats {
        year,
        months: monthly_stats(days),
        totals: totals(days),
        upcoming: upcoming_closures(days, today, 5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{complete_month, complete_year, HolidayTable, StoredDay};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn october_2024_counts() {
        let days = complete_month(MonthKey::new(2024, 10).unwrap(), &[], &HolidayTable::builtin());
        let s = totals(&days);
        // 31 days; Oct 1–7 holiday; remaining weekends: 12,13,19,20,26,27.
        assert_eq!(s.total_days, 31);
        assert_eq!(s.holidays, 7);
        assert_eq!(s.weekends, 6);
        assert_eq!(s.trading_days, 18);
        assert!((s.trading_rate - 18.0 / 31.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn upcoming_skips_today_and_trading_days() {
        let days = complete_month(MonthKey::new(2024, 9).unwrap(), &[], &HolidayTable::builtin());
        let up = upcoming_closures(&days, d(2024, 9, 13), 3);
        let dates: Vec<_> = up.iter().map(|u| u.date).collect();
        assert_eq!(dates, vec![d(2024, 9, 14), d(2024, 9, 15), d(2024, 9, 16)]);
        assert_eq!(up[0].kind, DisplayStatus::Weekend);
        assert_eq!(up[0].description, "周末休市");
        assert_eq!(up[1].kind, DisplayStatus::Holiday);
        assert_eq!(up[1].description, "中秋节");
        assert_eq!(up[2].days_until, 3);
    }

    #[test]
    fn stored_weekday_closure_counts_as_holiday() {
        // 2024-10-15 is a Tuesday; stored closed without a holiday flag.
        let stored = [StoredDay::new(d(2024, 10, 15), false)];
        let days = complete_month(MonthKey::new(2024, 10).unwrap(), &stored, &HolidayTable::builtin());
        assert_eq!(days[14].display_status, DisplayStatus::Holiday);

        let s = totals(&days);
        assert_eq!(s.holidays, 8);
        assert_eq!(s.weekends, 6);
        assert_eq!(s.trading_days, 17);

        let up = upcoming_closures(&days, d(2024, 10, 14), 1);
        assert_eq!(up[0].date, d(2024, 10, 15));
        assert_eq!(up[0].kind, DisplayStatus::Holiday);
        assert_eq!(up[0].name, "休市");
        assert_eq!(up[0].description, "休市");
    }

    #[test]
    fn yearly_stats_has_twelve_months() {
        let days = complete_year(2025, &[], &HolidayTable::builtin());
        let stats = calendar_stats(2025, &days, d(2025, 1, 1));
        assert_eq!(stats.months.len(), 12);
        assert_eq!(stats.months[0].month, "2025-01");
        assert_eq!(stats.totals.total_days, 365);
        assert_eq!(stats.upcoming.len(), 5);
    }
}
