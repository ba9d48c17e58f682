//! Input/output helpers.
//!
//! - fleet CSV ingest + validation (`ingest`)
//! - vehicle JSON read (`vehicle`)
//! - result exports (CSV/JSON) (`export`)
//! - sweep JSON read/write (`sweep_file`)

pub mod export;
pub mod ingest;
pub mod sweep_file;
pub mod vehicle;

pub use export::*;
pub use ingest::*;
pub use sweep_file::*;
pub use vehicle::*;
