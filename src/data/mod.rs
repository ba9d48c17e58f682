//! External parameter sources.
//!
//! - country-specific JSON parameter tables (`country`)

pub mod country;

pub use country::*;
