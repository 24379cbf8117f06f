//! Agent interface and the in-process agent.

use async_trait::async_trait;
use serde_json::Value;

use crate::assistant::{classify, ParkingTools, QueryIntent, RevenuePeriod, ToolCall};
use crate::core::AgentError;

/// A question-answering agent with access to the parking tools.
#[async_trait]
pub trait ParkingAgent: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Answer `question`, calling `tools` as needed.
    async fn ask(&self, question: &str, tools: &ParkingTools) -> Result<String, AgentError>;
}

/// Agent that maps the question to one tool call and phrases its result.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectAgent;

impl DirectAgent {
    /// Tool call answering `intent`.
    pub fn tool_for(intent: &QueryIntent) -> ToolCall {
        match intent {
            QueryIntent::CountVehicles => ToolCall::GetCurrentCount,
            QueryIntent::CountByColor(color) => ToolCall::CountByColor {
                color: color.clone(),
            },
            QueryIntent::RevenueInWindow {
                period: RevenuePeriod::LastHours(hours),
                ..
            } => ToolCall::GetRevenue { hours: *hours },
            QueryIntent::RevenueInWindow {
                period: RevenuePeriod::Today,
                ..
            } => ToolCall::GetDailySummary,
            QueryIntent::OccupancyStatus => ToolCall::GetParkingStatus,
            QueryIntent::AverageDurationByColor(color) => ToolCall::AverageDurationByColor {
                color: Some(color.clone()),
            },
            QueryIntent::AverageDuration => ToolCall::AverageDurationByColor { color: None },
            QueryIntent::ColorDistribution => ToolCall::GetColorDistribution,
            QueryIntent::BrandDistribution => ToolCall::GetBrandDistribution,
            QueryIntent::FloorDistribution => ToolCall::GetFloorDistribution,
        }
    }
}

#[async_trait]
impl ParkingAgent for DirectAgent {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn ask(&self, question: &str, tools: &ParkingTools) -> Result<String, AgentError> {
        let now = tools.snapshot().taken_at;
        let intent = classify(question, now)
            .ok_or_else(|| AgentError::Malformed("question matches no tool".into()))?;
        let call = Self::tool_for(&intent);
        let result = tools.invoke(&call);
        phrase(&call, &result)
    }
}

fn phrase(call: &ToolCall, result: &Value) -> Result<String, AgentError> {
    let missing = || AgentError::Malformed(format!("unexpected result from `{}`", call.name()));
    let text = match call {
        ToolCall::GetCurrentCount => {
            let count = result["count"].as_u64().ok_or_else(missing)?;
            format!("{count} vehicles are parked right now.")
        }
        ToolCall::CountByColor { .. } => {
            let count = result["count"].as_u64().ok_or_else(missing)?;
            let color = result["color"].as_str().ok_or_else(missing)?;
            format!("{count} {color} vehicles are parked right now.")
        }
        ToolCall::GetRevenue { hours } => {
            let revenue = result["revenue"].as_str().ok_or_else(missing)?;
            format!("The facility collected ${revenue} over the last {hours} hour(s).")
        }
        ToolCall::GetDailySummary => {
            let revenue = result["today_revenue"].as_str().ok_or_else(missing)?;
            let entries = result["today_vehicles"].as_u64().ok_or_else(missing)?;
            format!("Today the facility collected ${revenue} from {entries} entries so far.")
        }
        ToolCall::GetParkingStatus => {
            let total = result["total_spots"].as_u64().ok_or_else(missing)?;
            let free = result["available_spots"].as_u64().ok_or_else(missing)?;
            let rate = result["occupancy_rate"].as_f64().ok_or_else(missing)?;
            format!("{free} of {total} spots are free ({rate:.1}% occupied).")
        }
        ToolCall::AverageDurationByColor { color } => {
            let who = color
                .as_deref()
                .map_or_else(|| "Vehicles".to_string(), |c| format!("{c} vehicles"));
            match result["average_hours"].as_f64() {
                Some(avg) => format!("{who} stay {avg:.2} hours on average."),
                None => format!("{who} have no completed stays yet."),
            }
        }
        ToolCall::GetBrandDistribution
        | ToolCall::GetColorDistribution
        | ToolCall::GetFloorDistribution => {
            let groups = result.as_object().ok_or_else(missing)?;
            if groups.is_empty() {
                "No vehicles are parked right now.".to_string()
            } else {
                let parts: Vec<String> = groups
                    .iter()
                    .map(|(key, count)| format!("{key}: {count}"))
                    .collect();
                format!("Parked vehicles by group: {}.", parts.join(", "))
            }
        }
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_phrase_count() {
        let text = phrase(&ToolCall::GetCurrentCount, &json!({ "count": 4 })).unwrap();
        assert_eq!(text, "4 vehicles are parked right now.");
    }

    #[test]
    fn test_phrase_rejects_unexpected_shape() {
        let err = phrase(&ToolCall::GetCurrentCount, &json!({ "error": "boom" })).unwrap_err();
        assert!(matches!(err, AgentError::Malformed(_)));
    }

    #[test]
    fn test_tool_for_today_revenue_uses_summary() {
        let now = chrono::Utc::now();
        let intent = classify("revenue today", now).unwrap();
        assert_eq!(DirectAgent::tool_for(&intent), ToolCall::GetDailySummary);
    }
}
