pub mod handler;

pub use handler::{DEBUG_PANIC_MESSAGE, create_debug_router};
