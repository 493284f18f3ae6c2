//! Models Module - Configuration & Errors
//!
//! Single source of truth for settings and the error taxonomy.

pub mod config;
pub mod errors;

pub use config::*;
pub use errors::*;
