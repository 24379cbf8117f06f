//! Read-only projections over a [`FacilitySnapshot`].
//!
//! Nothing here touches the facility lock: every query works on an owned
//! snapshot, so all figures of one aggregator are mutually consistent.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{round_currency, FacilitySnapshot, ParkingSession, SpotType, TimeWindow};

/// Occupancy of one floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorOccupancy {
    /// Floor number.
    pub floor: u16,
    /// Spots on the floor.
    pub total: usize,
    /// Occupied spots.
    pub occupied: usize,
    /// Free spots.
    pub available: usize,
}

/// Occupancy of one spot type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeOccupancy {
    /// Spot type.
    pub spot_type: SpotType,
    /// Spots of this type.
    pub total: usize,
    /// Occupied spots.
    pub occupied: usize,
    /// Free spots.
    pub available: usize,
}

/// Facility-wide occupancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyReport {
    /// All spots.
    pub total_spots: usize,
    /// Occupied spots.
    pub occupied_spots: usize,
    /// Free spots.
    pub available_spots: usize,
    /// Occupied share in percent, two decimals.
    pub occupancy_rate: f64,
    /// Per-floor breakdown, ascending floors.
    pub floors: Vec<FloorOccupancy>,
    /// Per-type breakdown.
    pub types: Vec<TypeOccupancy>,
}

/// Mean and median stay length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationStats {
    /// Closed sessions considered.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: Duration,
    /// Median (mean of the two middle values for even counts).
    pub median: Duration,
}

impl DurationStats {
    /// Mean in fractional hours.
    pub fn mean_hours(&self) -> f64 {
        hours(self.mean)
    }
}

/// Revenue of one UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRevenue {
    /// UTC date.
    pub date: NaiveDate,
    /// Fees of sessions closed that day.
    pub revenue: Decimal,
}

/// Sessions present during one hour of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyOccupancy {
    /// Hour of day, 0..24.
    pub hour: u32,
    /// Sessions overlapping the hour.
    pub occupancy: usize,
}

/// Headline figures for today (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Vehicles on site.
    pub current_occupancy: usize,
    /// Fees collected since midnight.
    pub today_revenue: Decimal,
    /// Entries since midnight.
    pub today_vehicles: usize,
    /// Mean stay of sessions closed today, hours, two decimals.
    pub average_duration_hours: f64,
}

/// Vehicle attribute used for grouping and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleAttribute {
    /// Body color.
    Color,
    /// Manufacturer.
    Brand,
}

/// Optional attribute filter for duration statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleFilter {
    /// Case-insensitive color match.
    pub color: Option<String>,
    /// Case-insensitive brand match.
    pub brand: Option<String>,
}

impl VehicleFilter {
    /// Filter on color only.
    pub fn color(color: &str) -> Self {
        Self {
            color: Some(color.to_string()),
            brand: None,
        }
    }

    fn matches(&self, session: &ParkingSession) -> bool {
        let color_ok = self
            .color
            .as_deref()
            .is_none_or(|c| session.vehicle.color.eq_ignore_ascii_case(c.trim()));
        let brand_ok = self
            .brand
            .as_deref()
            .is_none_or(|b| session.vehicle.brand.eq_ignore_ascii_case(b.trim()));
        color_ok && brand_ok
    }
}

/// Statistics derived from one snapshot.
pub struct AnalyticsAggregator<'a> {
    snapshot: &'a FacilitySnapshot,
}

impl<'a> AnalyticsAggregator<'a> {
    /// Aggregator over `snapshot`.
    pub const fn new(snapshot: &'a FacilitySnapshot) -> Self {
        Self { snapshot }
    }

    /// Instant the snapshot was taken.
    pub const fn now(&self) -> DateTime<Utc> {
        self.snapshot.taken_at
    }

    /// Sessions still open.
    pub fn open_sessions(&self) -> impl Iterator<Item = &'a ParkingSession> {
        self.snapshot.sessions.iter().filter(|s| s.is_open())
    }

    /// Sessions already closed.
    pub fn closed_sessions(&self) -> impl Iterator<Item = &'a ParkingSession> {
        self.snapshot.sessions.iter().filter(|s| !s.is_open())
    }

    /// Free/occupied counts overall, per floor and per type.
    pub fn occupancy(&self) -> OccupancyReport {
        let mut floors: BTreeMap<u16, (usize, usize)> = BTreeMap::new();
        let mut types: BTreeMap<SpotType, (usize, usize)> = BTreeMap::new();
        for spot in &self.snapshot.spots {
            let occupied = usize::from(spot.is_occupied());
            let floor = floors.entry(spot.id.floor).or_default();
            floor.0 += 1;
            floor.1 += occupied;
            let kind = types.entry(spot.spot_type).or_default();
            kind.0 += 1;
            kind.1 += occupied;
        }

        let total_spots = self.snapshot.spots.len();
        let occupied_spots: usize = floors.values().map(|(_, occupied)| occupied).sum();
        OccupancyReport {
            total_spots,
            occupied_spots,
            available_spots: total_spots - occupied_spots,
            occupancy_rate: percentage(occupied_spots, total_spots),
            floors: floors
                .into_iter()
                .map(|(floor, (total, occupied))| FloorOccupancy {
                    floor,
                    total,
                    occupied,
                    available: total - occupied,
                })
                .collect(),
            types: types
                .into_iter()
                .map(|(spot_type, (total, occupied))| TypeOccupancy {
                    spot_type,
                    total,
                    occupied,
                    available: total - occupied,
                })
                .collect(),
        }
    }

    /// Vehicles currently on site.
    pub fn current_vehicle_count(&self) -> usize {
        self.open_sessions().count()
    }

    /// Parked vehicles of `color` (case-insensitive).
    pub fn count_by_color(&self, color: &str) -> usize {
        let color = color.trim();
        self.open_sessions()
            .filter(|s| s.vehicle.color.eq_ignore_ascii_case(color))
            .count()
    }

    /// Parked vehicles grouped by `attribute`. Keys are lower-cased.
    pub fn distribution(&self, attribute: VehicleAttribute) -> BTreeMap<String, usize> {
        let mut groups = BTreeMap::new();
        for session in self.open_sessions() {
            let value = match attribute {
                VehicleAttribute::Color => &session.vehicle.color,
                VehicleAttribute::Brand => &session.vehicle.brand,
            };
            *groups.entry(value.to_lowercase()).or_insert(0) += 1;
        }
        groups
    }

    /// Parked vehicles per floor.
    pub fn floor_distribution(&self) -> BTreeMap<u16, usize> {
        let mut floors = BTreeMap::new();
        for session in self.open_sessions() {
            *floors.entry(session.spot.floor).or_insert(0) += 1;
        }
        floors
    }

    /// Fees of sessions whose exit lies in `window`.
    pub fn revenue(&self, window: TimeWindow) -> Decimal {
        let total: Decimal = self
            .closed_sessions()
            .filter(|s| s.exit_time.is_some_and(|exit| window.contains(exit)))
            .filter_map(|s| s.fee)
            .sum();
        round_currency(total)
    }

    /// Fees collected in the `hours` hours up to the snapshot.
    pub fn revenue_last_hours(&self, hours: u32) -> Decimal {
        self.revenue(TimeWindow::last_hours(hours, self.now()))
    }

    /// Mean and median stay of closed sessions matching `filter`.
    pub fn duration_stats(&self, filter: &VehicleFilter) -> Option<DurationStats> {
        let mut millis: Vec<i64> = self
            .closed_sessions()
            .filter(|s| filter.matches(s))
            .filter_map(ParkingSession::duration)
            .map(|d| d.num_milliseconds())
            .collect();
        if millis.is_empty() {
            return None;
        }
        millis.sort_unstable();
        let count = millis.len();
        let sum: i128 = millis.iter().map(|&m| i128::from(m)).sum();
        let mean = i64::try_from(sum / count as i128).unwrap_or(i64::MAX);
        let mid = count / 2;
        let median = if count % 2 == 0 {
            millis[mid - 1] / 2 + millis[mid] / 2 + (millis[mid - 1] % 2 + millis[mid] % 2) / 2
        } else {
            millis[mid]
        };
        Some(DurationStats {
            count,
            mean: Duration::milliseconds(mean),
            median: Duration::milliseconds(median),
        })
    }

    /// Mean stay of closed sessions of `color`.
    pub fn average_duration_by_color(&self, color: &str) -> Option<Duration> {
        self.duration_stats(&VehicleFilter::color(color))
            .map(|stats| stats.mean)
    }

    /// Revenue per UTC day over the last `days` days, oldest first.
    pub fn revenue_by_day(&self, days: u32) -> Vec<DailyRevenue> {
        let cutoff = self.now() - Duration::days(i64::from(days));
        let mut per_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for session in self.closed_sessions() {
            if let (Some(exit), Some(fee)) = (session.exit_time, session.fee) {
                if exit >= cutoff {
                    *per_day.entry(exit.date_naive()).or_default() += fee;
                }
            }
        }
        per_day
            .into_iter()
            .map(|(date, revenue)| DailyRevenue {
                date,
                revenue: round_currency(revenue),
            })
            .collect()
    }

    /// Mean number of entries per day with at least one entry, over the
    /// last `days` days.
    pub fn daily_average_vehicles(&self, days: u32) -> f64 {
        let cutoff = self.now() - Duration::days(i64::from(days));
        let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for session in &self.snapshot.sessions {
            if session.entry_time >= cutoff {
                *per_day.entry(session.entry_time.date_naive()).or_insert(0) += 1;
            }
        }
        if per_day.is_empty() {
            return 0.0;
        }
        let entries: usize = per_day.values().sum();
        round2(entries as f64 / per_day.len() as f64)
    }

    /// Revenue per paying vehicle-day over the last `days` days.
    pub fn average_daily_spending(&self, days: u32) -> Decimal {
        let cutoff = self.now() - Duration::days(i64::from(days));
        let mut revenue = Decimal::ZERO;
        let mut payers: BTreeSet<(NaiveDate, &str)> = BTreeSet::new();
        for session in self.closed_sessions() {
            if let (Some(exit), Some(fee)) = (session.exit_time, session.fee) {
                if exit >= cutoff {
                    revenue += fee;
                    payers.insert((exit.date_naive(), session.vehicle.plate.as_str()));
                }
            }
        }
        if payers.is_empty() {
            return Decimal::ZERO;
        }
        round_currency(revenue / Decimal::from(payers.len()))
    }

    /// Sessions overlapping each UTC hour of `date`.
    pub fn hourly_occupancy(&self, date: NaiveDate) -> Vec<HourlyOccupancy> {
        let midnight = date.and_time(NaiveTime::MIN).and_utc();
        (0..24)
            .map(|hour| {
                let start = midnight + Duration::hours(i64::from(hour));
                let end = start + Duration::hours(1);
                let occupancy = self
                    .snapshot
                    .sessions
                    .iter()
                    .filter(|s| s.entry_time < end && s.exit_time.is_none_or(|exit| exit > start))
                    .count();
                HourlyOccupancy { hour, occupancy }
            })
            .collect()
    }

    /// Today's headline figures.
    pub fn summary(&self) -> DailySummary {
        let now = self.now();
        let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let today = TimeWindow::new(midnight, now);
        let durations: Vec<Duration> = self
            .closed_sessions()
            .filter(|s| s.exit_time.is_some_and(|exit| today.contains(exit)))
            .filter_map(ParkingSession::duration)
            .collect();
        let average_duration_hours = if durations.is_empty() {
            0.0
        } else {
            round2(durations.iter().map(|d| hours(*d)).sum::<f64>() / durations.len() as f64)
        };
        DailySummary {
            current_occupancy: self.current_vehicle_count(),
            today_revenue: self.revenue(today),
            today_vehicles: self
                .snapshot
                .sessions
                .iter()
                .filter(|s| today.contains(s.entry_time))
                .count(),
            average_duration_hours,
        }
    }
}

/// Fractional hours of a duration.
pub fn hours(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 3_600_000.0
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
