//! Tower middleware: bearer authentication and request ID propagation.

mod auth;
mod request_id;

pub use auth::AuthLayer;
pub use request_id::{RequestId, RequestIdLayer};
