//! Facility, billing and assistant configuration.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{ConfigError, FeeCalculator, ParkingSpot, SpotId, SpotType};

const DEFAULT_HOURLY_RATE: Decimal = Decimal::from_parts(500, 0, 0, false, 2);

/// Which agent implementation answers questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentBackendConfig {
    /// In-process agent that drives the tool set directly.
    #[default]
    Direct,
    /// OpenAI-compatible chat completions endpoint with tool calling.
    ChatCompletions,
}

impl FromStr for AgentBackendConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "chat_completions" | "chat-completions" | "openai" => Ok(Self::ChatCompletions),
            other => Err(format!("unknown agent backend `{other}`")),
        }
    }
}

/// Agent connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Backend selection.
    pub backend: AgentBackendConfig,
    /// Base URL of the chat completions API.
    pub api_base: String,
    /// Model name sent with each request.
    pub model: String,
    /// Bearer token, if the endpoint needs one.
    pub api_key: Option<String>,
    /// Tool-call round trips allowed per question.
    pub max_tool_rounds: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            backend: AgentBackendConfig::Direct,
            api_base: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            api_key: None,
            max_tool_rounds: 3,
        }
    }
}

/// Root configuration of one facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityConfig {
    /// Fee per billed hour.
    pub hourly_rate: Decimal,
    /// Hours billed at least per stay.
    ///
    /// Applied on top of the started-hour count, so with the default of 1 a
    /// zero-length stay is charged one hour instead of nothing. Set 0 for the
    /// bare ceiling rule.
    pub minimum_billed_hours: u32,
    /// Number of floors.
    pub floors: u16,
    /// Spots on every floor.
    pub spots_per_floor: u16,
    /// Explicit spot types keyed by spot label (`"1-03"`).
    pub spot_type_layout: BTreeMap<String, SpotType>,
    /// Apply the standard layout (1-2 disabled, 3-5 vip) to unlisted spots.
    pub default_layout: bool,
    /// Agent deadline in milliseconds.
    pub agent_timeout_ms: u64,
    /// Whether the agent path is tried at all.
    pub agent_enabled: bool,
    /// Agent connection settings.
    pub agent: AgentConfig,
    /// Verbose logging.
    pub dev_mode: bool,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            hourly_rate: DEFAULT_HOURLY_RATE,
            minimum_billed_hours: 1,
            floors: 3,
            spots_per_floor: 20,
            spot_type_layout: BTreeMap::new(),
            default_layout: true,
            agent_timeout_ms: 10_000,
            agent_enabled: false,
            agent: AgentConfig::default(),
            dev_mode: false,
        }
    }
}

impl FacilityConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.hourly_rate <= Decimal::ZERO {
            return Err("hourly_rate must be greater than 0".into());
        }
        if self.floors == 0 {
            return Err("floors must be greater than 0".into());
        }
        if self.spots_per_floor == 0 {
            return Err("spots_per_floor must be greater than 0".into());
        }
        if self.spots_per_floor > 99 {
            return Err("spots_per_floor must be at most 99".into());
        }
        if self.agent_enabled && self.agent_timeout_ms == 0 {
            return Err("agent_timeout_ms must be greater than 0 when the agent is enabled".into());
        }
        if self.agent_enabled && self.agent.max_tool_rounds == 0 {
            return Err("agent.max_tool_rounds must be greater than 0".into());
        }
        for label in self.spot_type_layout.keys() {
            let id = SpotId::from_str(label)
                .map_err(|e| format!("spot_type_layout key `{label}` invalid: {e}"))?;
            if !self.contains(id) {
                return Err(format!("spot_type_layout key `{label}` is outside the facility"));
            }
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate().map_err(ConfigError::Invalid)?;
        Ok(cfg)
    }

    /// Defaults overridden by the process environment (after loading `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        if let Some(v) = parse_var(&lookup, "PARKING_HOURLY_RATE")? {
            cfg.hourly_rate = v;
        }
        if let Some(v) = parse_var(&lookup, "PARKING_FLOORS")? {
            cfg.floors = v;
        }
        if let Some(v) = parse_var(&lookup, "PARKING_SPOTS_PER_FLOOR")? {
            cfg.spots_per_floor = v;
        }
        if let Some(v) = parse_var(&lookup, "PARKING_AGENT_TIMEOUT_MS")? {
            cfg.agent_timeout_ms = v;
        }
        if let Some(v) = flag_var(&lookup, "PARKING_AGENT_ENABLED")? {
            cfg.agent_enabled = v;
        }
        if let Some(v) = parse_var(&lookup, "PARKING_AGENT_BACKEND")? {
            cfg.agent.backend = v;
        }
        if let Some(v) = lookup("OPENAI_API_BASE") {
            cfg.agent.api_base = v;
        }
        if let Some(v) = lookup("OPENAI_MODEL_NAME") {
            cfg.agent.model = v;
        }
        if let Some(v) = lookup("OPENAI_API_KEY").filter(|k| !k.is_empty()) {
            cfg.agent.api_key = Some(v);
        }
        if let Some(v) = flag_var(&lookup, "DEV_MODE")? {
            cfg.dev_mode = v;
        }
        cfg.validate().map_err(ConfigError::Invalid)?;
        Ok(cfg)
    }

    /// Type of the spot `id` under this layout.
    pub fn spot_type_of(&self, id: SpotId) -> SpotType {
        let listed = self
            .spot_type_layout
            .iter()
            .find(|(label, _)| SpotId::from_str(label).is_ok_and(|labelled| labelled == id));
        if let Some((_, spot_type)) = listed {
            return *spot_type;
        }
        if !self.default_layout {
            return SpotType::Regular;
        }
        match id.number {
            1..=2 => SpotType::Disabled,
            3..=5 => SpotType::Vip,
            _ => SpotType::Regular,
        }
    }

    /// Initial spot list, all free, in allocation order.
    pub fn spots(&self) -> Vec<ParkingSpot> {
        (1..=self.floors)
            .flat_map(|floor| (1..=self.spots_per_floor).map(move |number| SpotId::new(floor, number)))
            .map(|id| ParkingSpot::free(id, self.spot_type_of(id)))
            .collect()
    }

    /// Fee calculator for this configuration.
    pub const fn fee_calculator(&self) -> FeeCalculator {
        FeeCalculator::new(self.minimum_billed_hours)
    }

    /// Agent deadline.
    pub const fn agent_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.agent_timeout_ms)
    }

    const fn contains(&self, id: SpotId) -> bool {
        id.floor >= 1 && id.floor <= self.floors && id.number >= 1 && id.number <= self.spots_per_floor
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Env {
                key: key.to_string(),
                message: e.to_string(),
            })
        })
        .transpose()
}

fn flag_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<bool>, ConfigError> {
    lookup(key)
        .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::Env {
                key: key.to_string(),
                message: format!("`{other}` is not a boolean"),
            }),
        })
        .transpose()
}
