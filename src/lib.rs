//! # Parking Facility
//!
//! Spot allocation, session lifecycle, billing and analytics for a single
//! parking facility, plus a question-answering layer that arbitrates between
//! a tool-using agent and deterministic fallback handlers.
//!
//! ## Core Problem Solved
//!
//! Vehicles arrive and leave concurrently. Every arrival must get a spot no
//! other vehicle holds, every departure must free exactly the spot its
//! session held, and the durable store must agree with memory even when a
//! write fails halfway.
//!
//! ## Key Features
//!
//! - **Deterministic Allocation**: lowest floor, then lowest spot number
//! - **Atomic Transitions**: entry and exit each run as one critical section
//!   with rollback when persistence fails
//! - **Per-Started-Hour Billing**: exact UTC arithmetic, cent rounding
//! - **Snapshot Analytics**: occupancy, revenue, distributions, durations
//! - **Agent With Fallback**: bounded agent calls, templated answers on
//!   timeout or failure
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use parking_facility::builders::build_service;
//! use parking_facility::config::FacilityConfig;
//! use parking_facility::infra::InMemoryGateway;
//! use parking_facility::runtime::EntryRequest;
//! use parking_facility::util::SystemClock;
//!
//! let cfg = FacilityConfig::from_env()?;
//! let service = build_service(&cfg, Arc::new(InMemoryGateway::new()), Arc::new(SystemClock))?;
//! let receipt = service.register_entry(&EntryRequest {
//!     plate: "AB-123".into(),
//!     color: "red".into(),
//!     brand: "Toyota".into(),
//!     spot_type: Default::default(),
//! })?;
//! let answer = service.answer_question("How many cars are currently parked?").await;
//! ```
//!
//! For complete scenarios, see `tests/facility_test.rs` and
//! `tests/query_router_test.rs`.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Natural-language questions: intents, fallback, agents and routing.
pub mod assistant;
/// Builders to construct facilities and services from configuration.
pub mod builders;
/// Configuration models for layout, billing and the assistant.
pub mod config;
/// Spots, sessions, fees, analytics and the facility aggregate.
pub mod core;
/// Persistence gateway backends.
pub mod infra;
/// Caller-facing service and API models.
pub mod runtime;
/// Shared utilities.
pub mod util;
