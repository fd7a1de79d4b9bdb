pub mod handler;
pub mod models;

pub use handler::{calculate_conversion_rate, conversion_rate, create_conversion_router};
pub use models::{ConversionRateRequest, ConversionRateResponse};
