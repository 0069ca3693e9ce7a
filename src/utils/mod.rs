//! Utility functions and helpers.

pub mod http;
pub mod log;
pub mod url;

pub use self::url::{is_structurally_valid, normalize, resolve, resolve_url};
