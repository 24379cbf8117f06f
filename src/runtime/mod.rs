//! Caller-facing service and its API models.

pub mod api;
pub mod service;

pub use api::{
    EntryReceipt, EntryRequest, ErrorResponse, ExitReceipt, Health, QuestionRequest,
    StatusResponse,
};
pub use service::ParkingService;
