//! HTTP response domain types

mod spec;

pub use spec::{ApiResponse, STATUS_UNAUTHORIZED, extract_error_message};
