//! Builders wiring configuration, gateway, clock and agent into a service.

use std::sync::Arc;

use anyhow::Context;

use crate::assistant::{DirectAgent, ParkingAgent, QueryRouter};
use crate::config::{AgentBackendConfig, FacilityConfig};
use crate::core::{AppResult, Facility, PersistenceGateway, SnapshotSource};
use crate::runtime::ParkingService;
use crate::util::Clock;

/// Load the facility from `gateway`, initialising its spots from `cfg` when
/// the gateway has none yet.
pub fn build_facility(
    cfg: &FacilityConfig,
    gateway: Arc<dyn PersistenceGateway>,
    clock: Arc<dyn Clock>,
) -> AppResult<Facility> {
    cfg.validate()
        .map_err(|e| anyhow::anyhow!("config invalid: {e}"))?;

    if gateway.load_spots().context("loading spots")?.is_empty() {
        let spots = cfg.spots();
        tracing::info!(
            floors = cfg.floors,
            spots_per_floor = cfg.spots_per_floor,
            "initialising facility layout"
        );
        gateway.save_spots(&spots).context("saving initial spots")?;
    }

    let facility = Facility::load(gateway, clock, cfg.fee_calculator(), cfg.hourly_rate)
        .context("restoring facility state")?;
    Ok(facility)
}

/// Agent selected by `cfg.agent.backend`.
pub fn build_agent(cfg: &FacilityConfig) -> AppResult<Arc<dyn ParkingAgent>> {
    match cfg.agent.backend {
        AgentBackendConfig::Direct => Ok(Arc::new(DirectAgent)),
        #[cfg(feature = "chat-agent")]
        AgentBackendConfig::ChatCompletions => Ok(Arc::new(
            crate::assistant::ChatCompletionsAgent::new(cfg.agent.clone()),
        )),
        #[cfg(not(feature = "chat-agent"))]
        AgentBackendConfig::ChatCompletions => {
            anyhow::bail!("chat completions backend requires the `chat-agent` feature")
        }
    }
}

/// Full service with the agent chosen by configuration.
pub fn build_service(
    cfg: &FacilityConfig,
    gateway: Arc<dyn PersistenceGateway>,
    clock: Arc<dyn Clock>,
) -> AppResult<ParkingService> {
    let agent = build_agent(cfg)?;
    build_service_with_agent(cfg, gateway, clock, agent)
}

/// Full service with an explicit agent.
pub fn build_service_with_agent(
    cfg: &FacilityConfig,
    gateway: Arc<dyn PersistenceGateway>,
    clock: Arc<dyn Clock>,
    agent: Arc<dyn ParkingAgent>,
) -> AppResult<ParkingService> {
    let facility = Arc::new(build_facility(cfg, gateway, clock)?);
    let source: Arc<dyn SnapshotSource> = facility.clone();
    let router = QueryRouter::new(source, cfg.agent_timeout())
        .with_agent(agent)
        .agent_enabled(cfg.agent_enabled);
    tracing::info!(
        agent_enabled = cfg.agent_enabled,
        backend = ?cfg.agent.backend,
        "parking service ready"
    );
    Ok(ParkingService::new(facility, router, cfg.agent_enabled))
}
