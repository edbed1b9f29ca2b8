pub mod client;
pub mod error;
pub mod message;
pub mod orchestrator;
pub mod types;

pub use client::AvailabilityClient;
pub use error::ApiError;
pub use message::availability_message;
pub use orchestrator::Orchestrator;
pub use types::{AvailabilitySlot, JobKey, LoginResponse};
