//! Deterministic classification of questions into supported intents.
//!
//! Each intent has one matcher; matchers run in a fixed order and the first
//! hit wins. Matching works on lower-cased word tokens, so "parked" never
//! matches the color "red".

use chrono::{DateTime, NaiveTime, Utc};

use crate::core::TimeWindow;

/// Colors recognised in questions.
pub const KNOWN_COLORS: [&str; 12] = [
    "red", "blue", "black", "white", "green", "yellow", "silver", "gray", "grey", "orange",
    "brown", "purple",
];

/// Revenue window used when a question names none.
pub const DEFAULT_REVENUE_HOURS: u32 = 24;

/// How a revenue window was phrased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevenuePeriod {
    /// The last N hours.
    LastHours(u32),
    /// Since UTC midnight.
    Today,
}

/// A question the fallback path can answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryIntent {
    /// Vehicles currently parked.
    CountVehicles,
    /// Parked vehicles of one color.
    CountByColor(String),
    /// Revenue of sessions closed in a window.
    RevenueInWindow {
        /// Inclusive window.
        window: TimeWindow,
        /// Phrasing of the window, for the answer.
        period: RevenuePeriod,
    },
    /// Free and occupied spots.
    OccupancyStatus,
    /// Mean stay of vehicles of one color.
    AverageDurationByColor(String),
    /// Mean stay of all vehicles.
    AverageDuration,
    /// Parked vehicles per color.
    ColorDistribution,
    /// Parked vehicles per brand.
    BrandDistribution,
    /// Parked vehicles per floor.
    FloorDistribution,
}

impl QueryIntent {
    /// Stable name, used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CountVehicles => "count_vehicles",
            Self::CountByColor(_) => "count_by_color",
            Self::RevenueInWindow { .. } => "revenue_in_window",
            Self::OccupancyStatus => "occupancy_status",
            Self::AverageDurationByColor(_) => "average_duration_by_color",
            Self::AverageDuration => "average_duration",
            Self::ColorDistribution => "color_distribution",
            Self::BrandDistribution => "brand_distribution",
            Self::FloorDistribution => "floor_distribution",
        }
    }
}

struct Question<'a> {
    text: &'a str,
    words: Vec<String>,
    now: DateTime<Utc>,
}

impl Question<'_> {
    fn has(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    fn has_any(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.has(w))
    }

    fn has_phrase(&self, phrase: &str) -> bool {
        self.text.contains(phrase)
    }

    fn color(&self) -> Option<String> {
        self.words
            .iter()
            .find(|w| KNOWN_COLORS.contains(&w.as_str()))
            .cloned()
    }

    fn first_number(&self) -> Option<u32> {
        self.words.iter().find_map(|w| w.parse().ok())
    }

    fn asks_distribution(&self) -> bool {
        self.has_any(&["distribution", "repartition", "breakdown", "split", "per", "by"])
    }

    fn asks_count(&self) -> bool {
        self.has_phrase("how many") || self.has_any(&["count", "number", "total"])
    }
}

type Matcher = fn(&Question<'_>) -> Option<QueryIntent>;

const MATCHERS: [Matcher; 8] = [
    match_revenue,
    match_color_distribution,
    match_brand_distribution,
    match_floor_distribution,
    match_average_duration,
    match_count_by_color,
    match_count_vehicles,
    match_occupancy,
];

/// Classify `question`; `now` anchors relative time windows.
pub fn classify(question: &str, now: DateTime<Utc>) -> Option<QueryIntent> {
    let text = question.to_lowercase();
    let words = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    let question = Question {
        text: &text,
        words,
        now,
    };
    let intent = MATCHERS.iter().find_map(|matcher| matcher(&question));
    tracing::debug!(
        intent = intent.as_ref().map_or("none", QueryIntent::name),
        "question classified"
    );
    intent
}

fn match_color_distribution(q: &Question<'_>) -> Option<QueryIntent> {
    (q.has_any(&["color", "colour", "colors", "colours"]) && q.asks_distribution())
        .then_some(QueryIntent::ColorDistribution)
}

fn match_brand_distribution(q: &Question<'_>) -> Option<QueryIntent> {
    (q.has_any(&["brand", "brands", "makes"]) && q.asks_distribution())
        .then_some(QueryIntent::BrandDistribution)
}

fn match_floor_distribution(q: &Question<'_>) -> Option<QueryIntent> {
    (q.has_any(&["floor", "floors"]) && q.asks_distribution())
        .then_some(QueryIntent::FloorDistribution)
}

fn match_average_duration(q: &Question<'_>) -> Option<QueryIntent> {
    let asks = q.has_phrase("how long")
        || (q.has_any(&["average", "mean", "typical"])
            && q.has_any(&["duration", "stay", "time", "long", "parked"]));
    if !asks {
        return None;
    }
    Some(q.color().map_or(QueryIntent::AverageDuration, QueryIntent::AverageDurationByColor))
}

fn match_revenue(q: &Question<'_>) -> Option<QueryIntent> {
    if !q.has_any(&["revenue", "earned", "earnings", "income", "money", "made"]) {
        return None;
    }
    if q.has("today") {
        let midnight = q.now.date_naive().and_time(NaiveTime::MIN).and_utc();
        return Some(QueryIntent::RevenueInWindow {
            window: TimeWindow::new(midnight, q.now),
            period: RevenuePeriod::Today,
        });
    }
    let hours = q
        .first_number()
        .filter(|h| *h > 0)
        .unwrap_or(DEFAULT_REVENUE_HOURS);
    Some(QueryIntent::RevenueInWindow {
        window: TimeWindow::last_hours(hours, q.now),
        period: RevenuePeriod::LastHours(hours),
    })
}

fn match_count_by_color(q: &Question<'_>) -> Option<QueryIntent> {
    if !q.asks_count() {
        return None;
    }
    q.color().map(QueryIntent::CountByColor)
}

fn match_count_vehicles(q: &Question<'_>) -> Option<QueryIntent> {
    let vehicles = q.has_any(&["cars", "vehicles", "car", "vehicle"]);
    let counted = q.asks_count() || q.has_phrase("currently parked");
    (vehicles && counted).then_some(QueryIntent::CountVehicles)
}

fn match_occupancy(q: &Question<'_>) -> Option<QueryIntent> {
    let asks = q.has_any(&["occupancy", "status", "available", "free", "full", "capacity"])
        || q.has_phrase("spots left");
    asks.then_some(QueryIntent::OccupancyStatus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_count_vehicles() {
        assert_eq!(
            classify("How many cars are currently parked?", now()),
            Some(QueryIntent::CountVehicles)
        );
    }

    #[test]
    fn test_parked_does_not_match_red() {
        assert_eq!(
            classify("Total vehicles parked right now", now()),
            Some(QueryIntent::CountVehicles)
        );
    }

    #[test]
    fn test_count_by_color() {
        assert_eq!(
            classify("How many RED cars are in the parking?", now()),
            Some(QueryIntent::CountByColor("red".into()))
        );
    }

    #[test]
    fn test_revenue_hours() {
        let Some(QueryIntent::RevenueInWindow { window, period }) =
            classify("What's the revenue from the last 3 hours?", now())
        else {
            panic!("expected revenue intent");
        };
        assert_eq!(period, RevenuePeriod::LastHours(3));
        assert_eq!(window.end, now());
        assert_eq!(window.start, now() - chrono::Duration::hours(3));
    }

    #[test]
    fn test_revenue_defaults_and_today() {
        assert!(matches!(
            classify("revenue?", now()),
            Some(QueryIntent::RevenueInWindow { period: RevenuePeriod::LastHours(24), .. })
        ));
        let Some(QueryIntent::RevenueInWindow { window, period }) =
            classify("How much money did we make today?", now())
        else {
            panic!("expected revenue intent");
        };
        assert_eq!(period, RevenuePeriod::Today);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_distributions_and_durations() {
        assert_eq!(classify("What's the color distribution?", now()), Some(QueryIntent::ColorDistribution));
        assert_eq!(classify("Brand repartition please", now()), Some(QueryIntent::BrandDistribution));
        assert_eq!(classify("vehicles per floor", now()), Some(QueryIntent::FloorDistribution));
        assert_eq!(
            classify("How long do blue cars stay?", now()),
            Some(QueryIntent::AverageDurationByColor("blue".into()))
        );
        assert_eq!(classify("average parking duration", now()), Some(QueryIntent::AverageDuration));
        assert_eq!(classify("What's the parking status?", now()), Some(QueryIntent::OccupancyStatus));
    }

    #[test]
    fn test_revenue_wins_over_distribution_words() {
        assert!(matches!(
            classify("How much money did we make per hour today?", now()),
            Some(QueryIntent::RevenueInWindow { period: RevenuePeriod::Today, .. })
        ));
    }

    #[test]
    fn test_distribution_words_match_whole_tokens() {
        assert_eq!(
            classify("How many cars are parked nearby the floor exit?", now()),
            Some(QueryIntent::CountVehicles)
        );
        assert_eq!(classify("cars by brand", now()), Some(QueryIntent::BrandDistribution));
    }

    #[test]
    fn test_unmatched() {
        assert_eq!(classify("Tell me a joke", now()), None);
    }
}
