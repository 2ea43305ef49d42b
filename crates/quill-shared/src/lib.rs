//! # Quill Shared
//!
//! Wire types shared by the server and API clients: the JSON response
//! envelope and request payloads.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, Pagination};
