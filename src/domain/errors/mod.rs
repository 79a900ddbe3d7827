//! Domain error types.

mod api_error;
mod payload_error;

pub use api_error::ApiError;
pub use payload_error::PayloadError;
