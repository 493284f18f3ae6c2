//! Domain Module - Origin policy, location reports and the share pipeline

pub mod gate;
pub mod origin;
pub mod report;

pub use gate::*;
pub use origin::*;
pub use report::*;
