//! HTTP request model and transport seam

pub mod request;
pub mod response;
pub mod transport;

pub use request::{Method, RequestSpec, ResolvedRequest};
pub use response::ApiResponse;
pub use transport::{HttpTransport, Transport};
