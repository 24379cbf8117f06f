//! Templated answers computed straight from the analytics aggregator.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::assistant::{QueryIntent, RevenuePeriod};
use crate::core::analytics::hours;
use crate::core::{AnalyticsAggregator, VehicleAttribute, VehicleFilter};

/// Reply to questions no intent matches.
pub const HELP_TEXT: &str = "I can help you with:
- How many cars are currently parked?
- How many [color] cars are in the parking?
- What's the color distribution?
- What's the brand distribution?
- What's the floor distribution?
- What's the revenue from the last [N] hours?
- What's the average parking duration for [color] cars?
- What's the parking status?

Please ask a specific question about the parking system.";

const EMPTY_FACILITY: &str = "There are no vehicles currently in the parking.";

/// Answer `intent` from `analytics`.
pub fn respond(intent: &QueryIntent, analytics: &AnalyticsAggregator<'_>) -> String {
    match intent {
        QueryIntent::CountVehicles => format!(
            "There are currently {} vehicles in the parking.",
            analytics.current_vehicle_count()
        ),
        QueryIntent::CountByColor(color) => format!(
            "There are currently {} {color} cars in the parking.",
            analytics.count_by_color(color)
        ),
        QueryIntent::RevenueInWindow { window, period } => {
            let revenue = analytics.revenue(*window);
            match period {
                RevenuePeriod::LastHours(h) => {
                    format!("Revenue generated in the last {h} hour(s): ${revenue:.2}")
                }
                RevenuePeriod::Today => format!("Revenue generated today: ${revenue:.2}"),
            }
        }
        QueryIntent::OccupancyStatus => {
            let report = analytics.occupancy();
            format!(
                "Current Parking Status:
- Total spots: {}
- Available spots: {}
- Occupied spots: {}
- Occupancy rate: {:.1}%",
                report.total_spots,
                report.available_spots,
                report.occupied_spots,
                report.occupancy_rate
            )
        }
        QueryIntent::AverageDurationByColor(color) => {
            match analytics.duration_stats(&VehicleFilter::color(color)) {
                Some(stats) => format!(
                    "{color} cars stayed {:.2} hours on average ({} completed stays).",
                    stats.mean_hours(),
                    stats.count
                ),
                None => format!("No completed stays of {color} cars yet."),
            }
        }
        QueryIntent::AverageDuration => match analytics.duration_stats(&VehicleFilter::default()) {
            Some(stats) => format!(
                "Vehicles stayed {:.2} hours on average (median {:.2} hours, {} completed stays).",
                stats.mean_hours(),
                hours(stats.median),
                stats.count
            ),
            None => "No completed stays yet.".to_string(),
        },
        QueryIntent::ColorDistribution => distribution(
            "color",
            analytics.current_vehicle_count(),
            analytics
                .distribution(VehicleAttribute::Color)
                .into_iter()
                .map(|(color, n)| (capitalize(&color), n)),
        ),
        QueryIntent::BrandDistribution => distribution(
            "brand",
            analytics.current_vehicle_count(),
            analytics
                .distribution(VehicleAttribute::Brand)
                .into_iter()
                .map(|(brand, n)| (capitalize(&brand), n)),
        ),
        QueryIntent::FloorDistribution => distribution(
            "floor",
            analytics.current_vehicle_count(),
            analytics
                .floor_distribution()
                .into_iter()
                .map(|(floor, n)| (format!("Floor {floor}"), n)),
        ),
    }
}

fn distribution(label: &str, total: usize, groups: impl Iterator<Item = (String, usize)>) -> String {
    let groups: BTreeMap<String, usize> = groups.collect();
    if total == 0 || groups.is_empty() {
        return EMPTY_FACILITY.to_string();
    }
    let mut out = format!("Current {label} distribution (total {total} vehicles):\n");
    for (name, count) in groups {
        let share = count as f64 / total as f64 * 100.0;
        let _ = writeln!(out, "- {name}: {count} vehicles ({share:.1}%)");
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
