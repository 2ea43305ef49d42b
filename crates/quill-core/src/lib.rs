//! # Quill Core
//!
//! The domain layer of the Quill blog.
//! Holds the post model, the typed site configuration, the ports that
//! infrastructure implements and the content repository built on top of them.
//! No I/O happens in this crate.

pub mod content;
pub mod domain;
pub mod error;
pub mod ports;

pub use content::ContentRepository;
pub use error::{DomainError, RepoError};
