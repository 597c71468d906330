mod error;
mod server;

pub use crate::error::ApiError;
pub use crate::server::{router, serve, ServerError};
