//! OAuth client identifiers and redacted client secrets.

pub mod id;
pub mod secret;

pub use id::*;
pub use secret::*;
