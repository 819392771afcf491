mod client;
mod error;
mod models;

pub use client::ApiClient;
pub use error::{ApiError, Result};
pub use models::*;
