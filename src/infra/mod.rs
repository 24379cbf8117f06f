//! Infrastructure adapters for durable storage.

pub mod gateway;

pub use gateway::{InMemoryGateway, JsonlGateway, SessionReplay};
