pub mod client;
pub mod handler;
pub mod models;
pub mod multipart;

pub use client::{MediaClient, sign_params};
pub use handler::{create_upload_router, upload_file};
pub use models::{DataUri, IncomingUpload};
