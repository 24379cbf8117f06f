//! Read-only tools exposed to agents.
//!
//! Every tool call takes a fresh snapshot, so an agent never holds the
//! facility lock and never sees a session mid-transition.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::analytics::hours;
use crate::core::{
    AgentError, AnalyticsAggregator, FacilitySnapshot, SnapshotSource, VehicleAttribute,
    VehicleFilter,
};

/// A parsed tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    /// Vehicles on site.
    GetCurrentCount,
    /// Parked vehicles of one color.
    CountByColor {
        /// Color to count.
        color: String,
    },
    /// Fees collected over the last hours.
    GetRevenue {
        /// Window length in hours.
        hours: u32,
    },
    /// Occupancy per floor and type.
    GetParkingStatus,
    /// Parked vehicles per brand.
    GetBrandDistribution,
    /// Parked vehicles per color.
    GetColorDistribution,
    /// Parked vehicles per floor.
    GetFloorDistribution,
    /// Mean stay, optionally for one color.
    AverageDurationByColor {
        /// Color filter.
        color: Option<String>,
    },
    /// Today's headline figures.
    GetDailySummary,
}

#[derive(Deserialize)]
struct ColorArgs {
    color: String,
}

#[derive(Deserialize)]
struct OptionalColorArgs {
    #[serde(default)]
    color: Option<String>,
}

#[derive(Deserialize)]
struct HoursArgs {
    hours: u32,
}

impl ToolCall {
    /// Parse a call from a tool name and its JSON arguments.
    ///
    /// Arguments may be an object or a JSON-encoded string, as chat
    /// completion APIs send them.
    pub fn parse(name: &str, arguments: &Value) -> Result<Self, AgentError> {
        let arguments = match arguments {
            Value::Null => json!({}),
            Value::String(raw) if raw.trim().is_empty() => json!({}),
            Value::String(raw) => serde_json::from_str(raw)
                .map_err(|e| AgentError::Malformed(format!("arguments of `{name}`: {e}")))?,
            other => other.clone(),
        };
        let call = match name {
            "get_current_count" => Self::GetCurrentCount,
            "count_by_color" => {
                let args: ColorArgs = decode_args(name, arguments)?;
                Self::CountByColor { color: args.color }
            }
            "get_revenue" => {
                let args: HoursArgs = decode_args(name, arguments)?;
                Self::GetRevenue { hours: args.hours }
            }
            "get_parking_status" => Self::GetParkingStatus,
            "get_brand_distribution" => Self::GetBrandDistribution,
            "get_color_distribution" => Self::GetColorDistribution,
            "get_floor_distribution" => Self::GetFloorDistribution,
            "average_duration_by_color" => {
                let args: OptionalColorArgs = decode_args(name, arguments)?;
                Self::AverageDurationByColor { color: args.color }
            }
            "get_daily_summary" => Self::GetDailySummary,
            other => return Err(AgentError::Malformed(format!("unknown tool `{other}`"))),
        };
        Ok(call)
    }

    /// Tool name as advertised to the model.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GetCurrentCount => "get_current_count",
            Self::CountByColor { .. } => "count_by_color",
            Self::GetRevenue { .. } => "get_revenue",
            Self::GetParkingStatus => "get_parking_status",
            Self::GetBrandDistribution => "get_brand_distribution",
            Self::GetColorDistribution => "get_color_distribution",
            Self::GetFloorDistribution => "get_floor_distribution",
            Self::AverageDurationByColor { .. } => "average_duration_by_color",
            Self::GetDailySummary => "get_daily_summary",
        }
    }
}

fn decode_args<T: serde::de::DeserializeOwned>(name: &str, arguments: Value) -> Result<T, AgentError> {
    serde_json::from_value(arguments)
        .map_err(|e| AgentError::Malformed(format!("arguments of `{name}`: {e}")))
}

/// Tool set bound to a facility.
#[derive(Clone)]
pub struct ParkingTools {
    source: Arc<dyn SnapshotSource>,
}

impl ParkingTools {
    /// Tools reading from `source`.
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self { source }
    }

    /// Fresh snapshot of the facility.
    pub fn snapshot(&self) -> FacilitySnapshot {
        self.source.snapshot()
    }

    /// Run `call` and return its JSON result.
    pub fn invoke(&self, call: &ToolCall) -> Value {
        let snapshot = self.snapshot();
        let analytics = AnalyticsAggregator::new(&snapshot);
        tracing::debug!(tool = call.name(), "tool invoked");
        match call {
            ToolCall::GetCurrentCount => json!({ "count": analytics.current_vehicle_count() }),
            ToolCall::CountByColor { color } => json!({
                "color": color.to_lowercase(),
                "count": analytics.count_by_color(color),
            }),
            ToolCall::GetRevenue { hours } => json!({
                "hours": hours,
                "revenue": analytics.revenue_last_hours(*hours),
            }),
            ToolCall::GetParkingStatus => json!(analytics.occupancy()),
            ToolCall::GetBrandDistribution => json!(analytics.distribution(VehicleAttribute::Brand)),
            ToolCall::GetColorDistribution => json!(analytics.distribution(VehicleAttribute::Color)),
            ToolCall::GetFloorDistribution => json!(analytics.floor_distribution()),
            ToolCall::AverageDurationByColor { color } => {
                let filter = VehicleFilter {
                    color: color.clone(),
                    brand: None,
                };
                let stats = analytics.duration_stats(&filter);
                json!({
                    "color": color,
                    "completed_stays": stats.map_or(0, |s| s.count),
                    "average_hours": stats.map(|s| (s.mean_hours() * 100.0).round() / 100.0),
                    "median_hours": stats.map(|s| (hours(s.median) * 100.0).round() / 100.0),
                })
            }
            ToolCall::GetDailySummary => json!(analytics.summary()),
        }
    }

    /// Invoke by name, reporting failures as a JSON error object.
    pub fn invoke_named(&self, name: &str, arguments: &Value) -> Value {
        match ToolCall::parse(name, arguments) {
            Ok(call) => self.invoke(&call),
            Err(err) => json!({ "error": err.to_string() }),
        }
    }

    /// Tool declarations in the chat-completions `tools` format.
    pub fn definitions() -> Value {
        let color = json!({
            "type": "object",
            "properties": { "color": { "type": "string", "description": "Vehicle color, e.g. red" } },
            "required": ["color"],
        });
        let optional_color = json!({
            "type": "object",
            "properties": { "color": { "type": "string", "description": "Vehicle color; omit for all vehicles" } },
        });
        let hours = json!({
            "type": "object",
            "properties": { "hours": { "type": "integer", "minimum": 1, "description": "Window length in hours" } },
            "required": ["hours"],
        });
        let none = json!({ "type": "object", "properties": {} });
        Value::Array(
            [
                ("get_current_count", "Number of vehicles currently parked.", none.clone()),
                ("count_by_color", "Number of parked vehicles of a color.", color),
                ("get_revenue", "Fees collected over the last N hours.", hours),
                ("get_parking_status", "Total, free and occupied spots per floor and spot type.", none.clone()),
                ("get_brand_distribution", "Parked vehicles grouped by brand.", none.clone()),
                ("get_color_distribution", "Parked vehicles grouped by color.", none.clone()),
                ("get_floor_distribution", "Parked vehicles grouped by floor.", none.clone()),
                ("average_duration_by_color", "Average stay in hours of completed sessions.", optional_color),
                ("get_daily_summary", "Today's occupancy, revenue, entries and average stay.", none),
            ]
            .into_iter()
            .map(|(name, description, parameters)| {
                json!({
                    "type": "function",
                    "function": { "name": name, "description": description, "parameters": parameters },
                })
            })
            .collect(),
        )
    }
}
