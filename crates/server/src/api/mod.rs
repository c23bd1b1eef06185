pub mod blacklist;
pub mod handlers;
pub mod keyword;
pub mod resolve;
pub mod routes;

pub use routes::create_router;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
