//! Route handlers for the REST API
//!
//! - [`stories`] - the best-stories endpoint
//! - [`system`] - health and OpenAPI

mod stories;
mod system;

pub use stories::*;
pub use system::*;
