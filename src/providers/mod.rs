//! Providers Module - Outbound email delivery
//!
//! One dispatcher, two transports: SMTP relay or HTTPS email API.

pub mod dispatcher;
pub mod http_api;
pub mod smtp;

pub use dispatcher::*;
pub use http_api::*;
pub use smtp::*;
